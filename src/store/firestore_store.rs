//! A task store backed by a Cloud Firestore collection, reached through its REST API
//!
//! The REST API has no push channel, so the live query is emulated by polling.
//! Polling starts with the first subscription, is triggered again right after every write made through this store,
//! and stops when every subscriber has gone.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Response;
use serde_json::{json, Value};
use tokio::sync::Notify;
use url::Url;

use crate::BoxError;
use crate::config;
use crate::traits::TaskStore;
use crate::task::{format_deadline, parse_deadline, NewTask, Task, TaskId};
use crate::store::{snapshot_channel, Snapshot, SnapshotReceiver, SnapshotSender};

static FIRESTORE_API_URL: &str = "https://firestore.googleapis.com/v1";


/// A [`TaskStore`] that lives in a Firestore database
pub struct FirestoreStore {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    api_url: String,
    /// e.g. `projects/my-project/databases/(default)/documents`
    documents_path: String,
    collection: String,
    api_key: Option<String>,

    sender: SnapshotSender,
    refresh: Notify,
    is_polling: AtomicBool,
}

impl FirestoreStore {
    /// Create a store for the default database of a project. This does not start a connection
    pub fn new<S: AsRef<str>>(project_id: S, api_key: Option<String>) -> Self {
        Self::with_api_url(FIRESTORE_API_URL, project_id, api_key)
    }

    /// Same as [`FirestoreStore::new`], for another endpoint, e.g. `http://localhost:8080/v1` for a local emulator
    pub fn with_api_url<S: AsRef<str>>(api_url: &str, project_id: S, api_key: Option<String>) -> Self {
        let (sender, _) = snapshot_channel();
        let inner = Inner {
            http: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            documents_path: format!("projects/{}/databases/(default)/documents", project_id.as_ref()),
            collection: config::get(&config::TASK_COLLECTION),
            api_key,
            sender,
            refresh: Notify::new(),
            is_polling: AtomicBool::new(false),
        };
        Self { inner: Arc::new(inner) }
    }
}

impl Inner {
    /// Build a request URL. `suffix` is appended to the documents path
    fn url(&self, suffix: &str) -> Result<Url, BoxError> {
        let mut url = Url::parse(&format!("{}/{}{}", self.api_url, self.documents_path, suffix))?;
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }

    fn document_name(&self, id: &TaskId) -> String {
        format!("{}/{}/{}", self.documents_path, self.collection, id)
    }

    /// Run the live query once
    async fn fetch_snapshot(&self) -> Result<Snapshot, BoxError> {
        let query = json!({
            "structuredQuery": {
                "from": [ { "collectionId": self.collection } ],
                "orderBy": [ { "field": { "fieldPath": "createdAt" }, "direction": "DESCENDING" } ],
            }
        });

        let response = self.http
            .post(self.url(":runQuery")?)
            .timeout(config::REQUEST_TIMEOUT)
            .json(&query)
            .send()
            .await?;
        let results: Vec<Value> = check_status(response)?.json().await?;

        let mut tasks = Vec::new();
        for result in &results {
            // The API returns a single result without any document for empty collections
            let document = match result.get("document") {
                None => continue,
                Some(doc) => doc,
            };
            match task_from_document(document) {
                Err(err) => log::warn!("Ignoring a malformed task document: {}", err),
                Ok(task) => tasks.push(task),
            }
        }
        Ok(Snapshot::from_ordered(tasks))
    }

    /// Publish a snapshot, unless it is the same as the current one
    fn publish(&self, snapshot: Snapshot) {
        self.sender.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }

    /// Clear the polling flag once the poller has seen every subscriber go.
    ///
    /// Returns false when the poller must go on instead: a subscriber that came in meanwhile may have seen the
    /// flag still set, and did not start a poller of its own.
    fn stop_polling(&self) -> bool {
        self.is_polling.store(false, Ordering::SeqCst);
        if self.sender.receiver_count() == 0 {
            return true;
        }
        self.is_polling.swap(true, Ordering::SeqCst)
    }
}

fn spawn_poller(inner: Arc<Inner>) {
    tokio::spawn(async move {
        loop {
            log::debug!("Starting to poll the task collection");
            poll_until_closed(&inner).await;
            if inner.stop_polling() {
                break;
            }
        }
        log::debug!("No more subscribers, polling stopped");
    });
}

async fn poll_until_closed(inner: &Inner) {
    let mut interval = tokio::time::interval(config::POLL_PERIOD);
    loop {
        tokio::select! {
            _ = inner.sender.closed() => return,
            _ = interval.tick() => {},
            _ = inner.refresh.notified() => {},
        }

        match inner.fetch_snapshot().await {
            Err(err) => log::warn!("Unable to refresh the task list: {}", err),
            Ok(snapshot) => inner.publish(snapshot),
        }
    }
}

fn check_status(response: Response) -> Result<Response, BoxError> {
    if response.status().is_success() == false {
        return Err(format!("Unexpected HTTP status code {:?}", response.status()).into());
    }
    Ok(response)
}

/// The Firestore representation of the fields of a new task (without its server-side timestamp)
fn fields_of(new_task: &NewTask) -> Value {
    json!({
        "text": { "stringValue": new_task.text() },
        "completed": { "booleanValue": false },
        "userName": { "stringValue": new_task.user_name() },
        "deadline": { "stringValue": format_deadline(new_task.deadline()) },
    })
}

/// Returns the typed value of a document field, e.g. the `stringValue` of `text`
fn field<'a>(fields: &'a Value, name: &str, kind: &str) -> Option<&'a Value> {
    fields.get(name).and_then(|f| f.get(kind))
}

/// Decode a Firestore document into a [`Task`]
fn task_from_document(document: &Value) -> Result<Task, BoxError> {
    let name = document.get("name").and_then(Value::as_str).ok_or("document has no name")?;
    let id = match name.rsplit('/').next() {
        Some(id) if id.is_empty() == false => TaskId::from(id),
        _ => return Err(format!("invalid document name {}", name).into()),
    };

    let fields = document.get("fields").ok_or_else(|| format!("document {} has no fields", id))?;

    let text = field(fields, "text", "stringValue").and_then(Value::as_str)
        .ok_or_else(|| format!("document {} has no text", id))?;
    let completed = field(fields, "completed", "booleanValue").and_then(Value::as_bool).unwrap_or(false);
    let user_name = field(fields, "userName", "stringValue").and_then(Value::as_str).unwrap_or_default();
    let deadline = field(fields, "deadline", "stringValue").and_then(Value::as_str).and_then(parse_deadline)
        .ok_or_else(|| format!("document {} has no valid deadline", id))?;
    let created_at = field(fields, "createdAt", "timestampValue").and_then(Value::as_str)
        .ok_or_else(|| format!("document {} has no creation date", id))?;
    let created_at = DateTime::parse_from_rfc3339(created_at)?.with_timezone(&Utc);

    Ok(Task::new_with_parameters(id, text.to_string(), completed, user_name.to_string(), deadline, created_at))
}


#[async_trait]
impl TaskStore for FirestoreStore {
    /// Must be called from within a Tokio runtime, since it may start the polling task
    fn subscribe(&self) -> SnapshotReceiver {
        let receiver = self.inner.sender.subscribe();
        if self.inner.is_polling.swap(true, Ordering::SeqCst) == false {
            spawn_poller(Arc::clone(&self.inner));
        }
        receiver
    }

    async fn add_task(&self, new_task: NewTask) -> Result<TaskId, BoxError> {
        let id = TaskId::random();
        let body = json!({
            "writes": [{
                "update": {
                    "name": self.inner.document_name(&id),
                    "fields": fields_of(&new_task),
                },
                "updateTransforms": [ { "fieldPath": "createdAt", "setToServerValue": "REQUEST_TIME" } ],
                "currentDocument": { "exists": false },
            }]
        });

        let response = self.inner.http
            .post(self.inner.url(":commit")?)
            .json(&body)
            .send()
            .await?;
        check_status(response)?;

        log::debug!("Added task {}", id);
        self.inner.refresh.notify_one();
        Ok(id)
    }

    async fn set_completed(&self, id: &TaskId, completed: bool) -> Result<(), BoxError> {
        let mut url = self.inner.url(&format!("/{}/{}", self.inner.collection, id))?;
        url.query_pairs_mut()
            .append_pair("updateMask.fieldPaths", "completed")
            .append_pair("currentDocument.exists", "true");
        let body = json!({ "fields": { "completed": { "booleanValue": completed } } });

        let response = self.inner.http
            .patch(url)
            .json(&body)
            .send()
            .await?;
        check_status(response)?;

        self.inner.refresh.notify_one();
        Ok(())
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), BoxError> {
        let url = self.inner.url(&format!("/{}/{}", self.inner.collection, id))?;
        let response = self.inner.http
            .delete(url)
            .send()
            .await?;
        check_status(response)?;

        self.inner.refresh.notify_one();
        Ok(())
    }
}
