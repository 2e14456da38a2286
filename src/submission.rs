//! Validation of the task form

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::alert::Alert;
use crate::session::Session;
use crate::task::{format_deadline, parse_deadline, NewTask};

/// A task that passed every check of the form, but has no owner yet
#[derive(Clone, Debug, PartialEq)]
pub struct TaskDraft {
    text: String,
    deadline: NaiveDateTime,
}

impl TaskDraft {
    pub fn text(&self) -> &str                 { &self.text     }
    pub fn deadline(&self) -> &NaiveDateTime   { &self.deadline }

    /// Attach the draft to the session that submitted it
    pub fn into_new_task(self, session: &Session) -> NewTask {
        NewTask::new(self.text, session.nickname().to_string(), self.deadline)
    }
}

/// Check a submitted form, at time `now` (local wall-clock).
///
/// Returns
/// * `Ok(None)` when the text or the deadline is empty: nothing should happen, and nothing is reported
/// * `Err(alert)` when the deadline is rejected
/// * `Ok(Some(draft))` when the task can be created
///
/// Checks happen in this order: emptiness, deadline after now, deadline today.
/// A deadline that cannot be parsed never matches today, and is reported as such.
pub fn validate(text: &str, deadline_input: &str, now: NaiveDateTime) -> Result<Option<TaskDraft>, Alert> {
    let text = text.trim();
    if text.is_empty() || deadline_input.trim().is_empty() {
        return Ok(None);
    }

    let deadline = match parse_deadline(deadline_input) {
        None => return Err(Alert::DeadlineNotToday),
        Some(d) => d,
    };
    if deadline <= now {
        return Err(Alert::DeadlineNotAfterNow);
    }
    if deadline.date() != now.date() {
        return Err(Alert::DeadlineNotToday);
    }

    Ok(Some(TaskDraft { text: text.to_string(), deadline }))
}


/// The range a deadline input accepts, from the first to the last minute of a day
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeadlineBounds {
    min: NaiveDateTime,
    max: NaiveDateTime,
}

impl DeadlineBounds {
    pub fn for_day(day: NaiveDate) -> Self {
        Self {
            min: day.and_time(NaiveTime::MIN),
            max: day.and_time(NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)),
        }
    }

    /// The `min` value, formatted like a deadline input
    pub fn min_input(&self) -> String { format_deadline(&self.min) }
    /// The `max` value, formatted like a deadline input
    pub fn max_input(&self) -> String { format_deadline(&self.max) }
}
