//! Task stores, and the live snapshots they publish

pub mod memory_store;
pub mod firestore_store;

use std::cmp::Reverse;

use crate::task::Task;

/// See [`snapshot_channel`]
pub type SnapshotSender = tokio::sync::watch::Sender<Snapshot>;
/// See [`snapshot_channel`]
pub type SnapshotReceiver = tokio::sync::watch::Receiver<Snapshot>;

/// Create the channel a store publishes its snapshots into. It starts with an empty snapshot
pub fn snapshot_channel() -> (SnapshotSender, SnapshotReceiver) {
    tokio::sync::watch::channel(Snapshot::default())
}


/// The full content of a task collection at some point in time, newest tasks first
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    tasks: Vec<Task>,
}

impl Snapshot {
    /// Build a snapshot from tasks that are already ordered
    pub fn from_ordered(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// Build a snapshot, sorting tasks by creation date, newest first.
    /// The sort is stable, so that ties keep the order of `tasks`
    pub fn from_unordered(mut tasks: Vec<Task>) -> Self {
        tasks.sort_by_key(|task| Reverse(*task.created_at()));
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
