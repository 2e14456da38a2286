//! The task board: every write to the shared task collection goes through here
//!
//! Writes are fire-and-forget. Their result is never applied locally: a successful write only shows up
//! when the store publishes its next snapshot. Failures are logged, and never retried.

use std::sync::Arc;

use crate::alert::Alert;
use crate::session::Session;
use crate::store::SnapshotReceiver;
use crate::submission::TaskDraft;
use crate::task::TaskId;
use crate::traits::TaskStore;


/// A handle to the shared task collection. It is cheap to clone
#[derive(Clone)]
pub struct TaskBoard {
    store: Arc<dyn TaskStore>,
}

impl TaskBoard {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Start listening to the task collection. Only a started session can do that
    pub fn subscribe(&self, session: &Session) -> SnapshotReceiver {
        log::debug!("{} subscribes to the task list", session.nickname());
        self.store.subscribe()
    }

    /// Create a task on behalf of `session`.
    ///
    /// Returns the identifier of the new task, or `None` if it could not be created (the error is logged)
    pub async fn create(&self, session: &Session, draft: TaskDraft) -> Option<TaskId> {
        let new_task = draft.into_new_task(session);
        match self.store.add_task(new_task).await {
            Ok(id) => Some(id),
            Err(err) => {
                log::error!("Unable to add a task: {}", err);
                None
            },
        }
    }

    /// Flip the completion status of a task, from the status it had when it was displayed.
    ///
    /// There is no concurrency check: the last write to reach the store wins.
    pub async fn toggle(&self, id: &TaskId, currently_completed: bool) {
        if let Err(err) = self.store.set_completed(id, !currently_completed).await {
            log::error!("Unable to change the status of task {}: {}", id, err);
        }
    }

    /// Delete a task from its control in the task list. Errors are only logged
    pub async fn delete_from_list(&self, id: &TaskId) {
        match self.store.delete_task(id).await {
            Ok(()) => log::info!("Deleted task {}", id),
            Err(err) => log::error!("Unable to delete task {}: {}", id, err),
        }
    }

    /// Delete a task directly. Errors are logged, and also reported as an [`Alert`]
    pub async fn delete(&self, id: &TaskId) -> Result<(), Alert> {
        match self.store.delete_task(id).await {
            Ok(()) => {
                log::info!("Deleted task {}", id);
                Ok(())
            },
            Err(err) => {
                log::error!("Unable to delete task {}: {}", id, err);
                Err(Alert::DeleteFailed)
            },
        }
    }
}
