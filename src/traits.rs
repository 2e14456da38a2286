//! Traits used by the event loop to reach its external collaborators

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::BoxError;
use crate::task::{NewTask, TaskId};
use crate::store::SnapshotReceiver;
use crate::schedule::ScheduleEvent;

/// A shared collection of tasks, that pushes a full snapshot to its subscribers whenever it changes.
///
/// Writes are last-write-wins: a store is not expected to detect concurrent updates of the same task.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Start (or join) a live query over every task, ordered by creation date, newest first.
    ///
    /// The returned receiver always holds the latest full snapshot
    fn subscribe(&self) -> SnapshotReceiver;

    /// Commit a new task. The store assigns its identifier and its creation timestamp
    async fn add_task(&self, new_task: NewTask) -> Result<TaskId, BoxError>;

    /// Update the completion status of a single task.
    /// Returns an error if this task does not exist
    async fn set_completed(&self, id: &TaskId, completed: bool) -> Result<(), BoxError>;

    /// Remove a task
    async fn delete_task(&self, id: &TaskId) -> Result<(), BoxError>;
}

/// Somewhere to fetch the events of a school calendar from
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Returns the events listed for a given day.
    /// A day without events is not an error, and yields an empty list.
    async fn fetch_events(&self, day: NaiveDate) -> Result<Vec<ScheduleEvent>, BoxError>;
}
