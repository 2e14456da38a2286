//! Turns a task snapshot into what the task list displays

use std::fmt::{Display, Error, Formatter};

use chrono::{NaiveDateTime, Timelike};

use crate::store::Snapshot;
use crate::task::{Task, TaskId};

/// How long a task has left before its deadline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeLeft {
    /// Whole hours and whole remaining minutes
    Remaining { hours: i64, minutes: i64 },
    Expired,
}

impl TimeLeft {
    /// Compute the time left at `now`. Anything that is not strictly positive is expired
    pub fn until(deadline: &NaiveDateTime, now: &NaiveDateTime) -> Self {
        let diff_ms = (*deadline - *now).num_milliseconds();
        if diff_ms <= 0 {
            return TimeLeft::Expired;
        }
        TimeLeft::Remaining {
            hours: diff_ms / 3_600_000,
            minutes: (diff_ms % 3_600_000) / 60_000,
        }
    }
}

impl Display for TimeLeft {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            TimeLeft::Remaining { hours, minutes } => write!(f, "남은 시간: {}시간 {}분", hours, minutes),
            TimeLeft::Expired => write!(f, "마감됨"),
        }
    }
}


/// One row of the task list, with its controls bound to the task identifier
#[derive(Clone, Debug, PartialEq)]
pub struct TaskView {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    /// The deadline, as a Korean 12-hour clock time (e.g. `오후 6:00:00`)
    pub deadline_label: String,
    pub time_left: TimeLeft,
}

impl TaskView {
    pub fn new(task: &Task, now: &NaiveDateTime) -> Self {
        Self {
            id: task.id().clone(),
            text: task.text().to_string(),
            completed: task.completed(),
            deadline_label: korean_time_label(task.deadline()),
            time_left: TimeLeft::until(task.deadline(), now),
        }
    }
}

/// Render a whole snapshot, keeping its order.
///
/// This is computed once per snapshot: remaining times do not tick on their own.
pub fn render_list(snapshot: &Snapshot, now: &NaiveDateTime) -> Vec<TaskView> {
    snapshot.tasks().iter()
        .map(|task| TaskView::new(task, now))
        .collect()
}

/// Format a time the way a Korean locale does by default, e.g. `오전 9:05:00`
pub fn korean_time_label(time: &NaiveDateTime) -> String {
    let (is_pm, hour) = time.hour12();
    let half = if is_pm { "오후" } else { "오전" };
    format!("{} {}:{:02}:{:02}", half, hour, time.minute(), time.second())
}
