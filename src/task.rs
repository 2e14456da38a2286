//! To-do tasks, as stored in the shared task collection

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use chrono::{DateTime, NaiveDateTime, Utc};

/// The textual format of a deadline, as typed in a `datetime-local` input
pub const DEADLINE_FORMAT: &str = "%Y-%m-%dT%H:%M";
const DEADLINE_FORMAT_WITH_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a deadline as typed by the user (local wall-clock time).
///
/// Both minute and second precision are accepted.
pub fn parse_deadline(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    NaiveDateTime::parse_from_str(input, DEADLINE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(input, DEADLINE_FORMAT_WITH_SECONDS))
        .ok()
}

/// Format a deadline the way it is stored in the shared collection
pub fn format_deadline(deadline: &NaiveDateTime) -> String {
    deadline.format(DEADLINE_FORMAT).to_string()
}


/// The identifier of a task. It is opaque, and assigned by the store that holds the task
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaskId {
    content: String,
}

impl TaskId {
    /// Generate a random TaskId
    pub fn random() -> Self {
        let random = uuid::Uuid::new_v4().to_simple().to_string();
        Self { content: random }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }
}

impl From<String> for TaskId {
    fn from(content: String) -> Self {
        Self { content }
    }
}
impl From<&str> for TaskId {
    fn from(content: &str) -> Self {
        Self { content: content.to_string() }
    }
}
impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}

/// Used to support serde
impl Serialize for TaskId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.content)
    }
}
/// Used to support serde
impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(deserializer: D) -> Result<TaskId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let content = String::deserialize(deserializer)?;
        Ok(TaskId{ content })
    }
}


/// A task that has been validated on the client, but is not in a store yet.
///
/// The store will assign its identifier and its creation timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct NewTask {
    text: String,
    user_name: String,
    deadline: NaiveDateTime,
}

impl NewTask {
    pub fn new(text: String, user_name: String, deadline: NaiveDateTime) -> Self {
        Self { text, user_name, deadline }
    }

    pub fn text(&self) -> &str                 { &self.text      }
    pub fn user_name(&self) -> &str            { &self.user_name }
    pub fn deadline(&self) -> &NaiveDateTime   { &self.deadline  }
}


/// A to-do task, as it exists in a store
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    /// What has to be done
    text: String,
    completed: bool,
    /// The nickname of the session that created this task. This is informative only
    user_name: String,
    /// Local wall-clock time the task is due
    deadline: NaiveDateTime,
    /// Set by the store when the task is committed. This is only used to sort tasks
    created_at: DateTime<Utc>,
}

impl Task {
    /// Build the stored version of a [`NewTask`]. Stores use this when they commit a creation.
    pub fn from_new(id: TaskId, new_task: NewTask, created_at: DateTime<Utc>) -> Self {
        Self::new_with_parameters(id, new_task.text, false, new_task.user_name, new_task.deadline, created_at)
    }

    /// Create a new Task instance, that may come from any store
    pub fn new_with_parameters(id: TaskId, text: String, completed: bool, user_name: String,
                               deadline: NaiveDateTime, created_at: DateTime<Utc>) -> Self
    {
        Self { id, text, completed, user_name, deadline, created_at }
    }

    pub fn id(&self) -> &TaskId                   { &self.id         }
    pub fn text(&self) -> &str                    { &self.text       }
    pub fn completed(&self) -> bool               { self.completed   }
    pub fn user_name(&self) -> &str               { &self.user_name  }
    pub fn deadline(&self) -> &NaiveDateTime      { &self.deadline   }
    pub fn created_at(&self) -> &DateTime<Utc>    { &self.created_at }

    /// Set the completion status
    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }
}
