//! School schedule events, and the panels that display them

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::BoxError;
use crate::traits::ScheduleSource;

/// An event of the school calendar
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEvent {
    /// The event name
    #[serde(rename = "EVENT_NM")]
    pub name: String,
    /// The event date, as the API sends it (`YYYYMMDD`)
    #[serde(rename = "AA_YMD")]
    pub date: String,
}

/// Extract events from a schedule API response.
///
/// Events are expected under `SchoolSchedule[1].row`. Any other shape (e.g. the "no data" result the API sends
/// for days without events) means there are no events.
/// Rows that do not describe an event are skipped.
pub fn parse_events(body: &Value) -> Result<Vec<ScheduleEvent>, BoxError> {
    let rows = match body.get("SchoolSchedule").and_then(|s| s.get(1)).and_then(|s| s.get("row")) {
        None => {
            log::debug!("No schedule rows in this response");
            return Ok(Vec::new());
        },
        Some(rows) => rows,
    };
    let rows = rows.as_array().ok_or("schedule rows are not a list")?;

    let mut events = Vec::with_capacity(rows.len());
    for row in rows {
        match ScheduleEvent::deserialize(row) {
            Err(err) => log::warn!("Ignoring a malformed schedule row: {}", err),
            Ok(event) => events.push(event),
        }
    }
    Ok(events)
}

/// Fetch the events of a day, reporting (and swallowing) any error.
///
/// A failed fetch is displayed exactly like a day without events.
pub async fn fetch_or_empty<S: ScheduleSource + ?Sized>(source: &S, day: chrono::NaiveDate) -> Vec<ScheduleEvent> {
    match source.fetch_events(day).await {
        Ok(events) => {
            log::info!("Fetched {} schedule events for {}", events.len(), day);
            events
        },
        Err(err) => {
            log::error!("Unable to fetch the school schedule: {}", err);
            Vec::new()
        },
    }
}


/// What a schedule panel shows
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Panel {
    /// A placeholder text, when there is nothing to show
    Empty(&'static str),
    Events(Vec<ScheduleEvent>),
}

/// The two schedule panels.
///
/// Both currently receive the same, unfiltered events: the week panel does not restrict anything to the current week.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulePanels {
    pub today: Panel,
    pub week: Panel,
}

pub const NO_EVENTS_TODAY: &str = "오늘 일정이 없습니다.";
pub const NO_EVENTS_THIS_WEEK: &str = "이번 주 일정이 없습니다.";

impl SchedulePanels {
    pub fn from_events(events: Vec<ScheduleEvent>) -> Self {
        if events.is_empty() {
            return Self {
                today: Panel::Empty(NO_EVENTS_TODAY),
                week: Panel::Empty(NO_EVENTS_THIS_WEEK),
            };
        }
        Self {
            today: Panel::Events(events.clone()),
            week: Panel::Events(events),
        }
    }
}
