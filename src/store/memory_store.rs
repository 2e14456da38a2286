//! A task store that lives in this process, optionally backed by a JSON file

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::BoxError;
use crate::traits::TaskStore;
use crate::task::{NewTask, Task, TaskId};
use crate::store::{snapshot_channel, Snapshot, SnapshotReceiver, SnapshotSender};
use crate::mock_behaviour::MockBehaviour;


/// A [`TaskStore`] that keeps its tasks in memory.
///
/// Every committed write publishes a new snapshot to every subscriber.
/// Creation timestamps are strictly increasing, so that the snapshot order never has ties.
#[derive(Debug)]
pub struct MemoryStore {
    backing_file: Option<PathBuf>,
    data: Mutex<StoredData>,
    sender: SnapshotSender,

    mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>,
}

#[derive(Default, Debug, PartialEq, Serialize, Deserialize)]
struct StoredData {
    /// Tasks, in commit order
    tasks: Vec<Task>,
}

impl StoredData {
    /// A creation timestamp that is later than every existing one
    fn next_creation_date(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.tasks.iter().map(|t| *t.created_at()).max() {
            Some(latest) if latest >= now => latest + Duration::microseconds(1),
            _ => now,
        }
    }
}

impl MemoryStore {
    /// An empty store, that is not saved anywhere
    pub fn new() -> Self {
        Self::with_data(None, StoredData::default())
    }

    /// An empty store, that will save its content to `path` after every write
    pub fn new_with_file(path: &Path) -> Self {
        Self::with_data(Some(PathBuf::from(path)), StoredData::default())
    }

    /// Initialize a store from the content of a valid backing file if it exists.
    /// Returns an error otherwise
    pub fn from_file(path: &Path) -> Result<Self, BoxError> {
        let data = match std::fs::File::open(path) {
            Err(err) => {
                return Err(format!("Unable to open file {:?}: {}", path, err).into());
            },
            Ok(file) => serde_json::from_reader(file)?,
        };

        Ok(Self::with_data(Some(PathBuf::from(path)), data))
    }

    fn with_data(backing_file: Option<PathBuf>, data: StoredData) -> Self {
        let (sender, _) = snapshot_channel();
        sender.send_replace(Snapshot::from_unordered(data.tasks.clone()));
        Self {
            backing_file,
            data: Mutex::new(data),
            sender,
            mock_behaviour: None,
        }
    }

    /// Make some of the next writes fail
    pub fn set_mock_behaviour(&mut self, mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>) {
        self.mock_behaviour = mock_behaviour;
    }

    /// The content of this store, right now
    pub fn snapshot(&self) -> Snapshot {
        self.sender.borrow().clone()
    }

    fn check_behaviour<F>(&self, check: F) -> Result<(), BoxError>
    where
        F: FnOnce(&mut MockBehaviour) -> Result<(), BoxError>,
    {
        match &self.mock_behaviour {
            None => Ok(()),
            Some(behaviour) => {
                let mut behaviour = behaviour.lock().map_err(|_| "mock behaviour lock is poisoned")?;
                check(&mut behaviour)
            },
        }
    }

    /// Persist the data (if there is a backing file), then notify subscribers
    fn commit(&self, data: &StoredData) {
        if let Some(path) = &self.backing_file {
            save_to_file(path, data);
        }
        self.sender.send_replace(Snapshot::from_unordered(data.tasks.clone()));
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Store the current data to its backing file
fn save_to_file(path: &Path, data: &StoredData) {
    let file = match std::fs::File::create(path) {
        Err(err) => {
            log::warn!("Unable to save file {:?}: {}", path, err);
            return;
        },
        Ok(f) => f,
    };

    if let Err(err) = serde_json::to_writer(file, data) {
        log::warn!("Unable to serialize: {}", err);
    };
}


#[async_trait]
impl TaskStore for MemoryStore {
    fn subscribe(&self) -> SnapshotReceiver {
        self.sender.subscribe()
    }

    async fn add_task(&self, new_task: NewTask) -> Result<TaskId, BoxError> {
        self.check_behaviour(|b| b.can_add_task())?;

        let mut data = self.data.lock().map_err(|_| "store lock is poisoned")?;
        let id = TaskId::random();
        let created_at = data.next_creation_date();
        data.tasks.push(Task::from_new(id.clone(), new_task, created_at));
        log::debug!("Added task {}", id);

        self.commit(&data);
        Ok(id)
    }

    async fn set_completed(&self, id: &TaskId, completed: bool) -> Result<(), BoxError> {
        self.check_behaviour(|b| b.can_set_completed())?;

        let mut data = self.data.lock().map_err(|_| "store lock is poisoned")?;
        match data.tasks.iter_mut().find(|t| t.id() == id) {
            None => return Err(format!("No task {} in this store", id).into()),
            Some(task) => task.set_completed(completed),
        }

        self.commit(&data);
        Ok(())
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), BoxError> {
        self.check_behaviour(|b| b.can_delete_task())?;

        let mut data = self.data.lock().map_err(|_| "store lock is poisoned")?;
        let len_before = data.tasks.len();
        data.tasks.retain(|t| t.id() != id);
        if data.tasks.len() == len_before {
            return Err(format!("No task {} in this store", id).into());
        }

        self.commit(&data);
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_task(text: &str) -> NewTask {
        let deadline = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap().and_hms_opt(18, 0, 0).unwrap();
        NewTask::new(text.to_string(), "민수".to_string(), deadline)
    }

    #[tokio::test]
    async fn writes_publish_snapshots() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();
        assert!(rx.borrow_and_update().is_empty());

        let first = store.add_task(new_task("first")).await.unwrap();
        let second = store.add_task(new_task("second")).await.unwrap();
        assert!(rx.has_changed().unwrap());

        let snapshot = rx.borrow_and_update().clone();
        let ids: Vec<&TaskId> = snapshot.tasks().iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![&second, &first]);
        assert!(snapshot.tasks()[0].created_at() > snapshot.tasks()[1].created_at());

        store.set_completed(&first, true).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().tasks()[1].completed());

        store.delete_task(&second).await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);
    }

    #[tokio::test]
    async fn unknown_ids() {
        let store = MemoryStore::new();
        let id = TaskId::from("nope");
        assert!(store.set_completed(&id, true).await.is_err());
        assert!(store.delete_task(&id).await.is_err());
    }

    #[tokio::test]
    async fn mocked_failures_leave_data_untouched() {
        let mut store = MemoryStore::new();
        store.set_mock_behaviour(Some(Arc::new(Mutex::new(MockBehaviour::fail_now(1)))));

        assert!(store.add_task(new_task("a")).await.is_err());
        assert!(store.snapshot().is_empty());
        assert!(store.add_task(new_task("a")).await.is_ok());
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn serde_store() {
        let path = std::env::temp_dir().join(format!("todo-board-{}.json", TaskId::random()));

        let store = MemoryStore::new_with_file(&path);
        store.add_task(new_task("persisted")).await.unwrap();

        let retrieved = MemoryStore::from_file(&path).unwrap();
        assert_eq!(retrieved.snapshot(), store.snapshot());
        let _ = std::fs::remove_file(&path);
    }
}
