//! Support for library configuration options

use std::sync::{Arc, Mutex};
use std::time::Duration;
use once_cell::sync::Lazy;

/// Endpoint of the school schedule API.
/// Feel free to override it when initing this library.
pub static SCHEDULE_API_URL: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("https://open.neis.go.kr/hub/SchoolSchedule".to_string())));

/// Code of the regional education office the school belongs to (`ATPT_OFCDC_SC_CODE`).
pub static EDUCATION_OFFICE_CODE: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("J10".to_string())));

/// Code of the school whose schedule is displayed (`SD_SCHUL_CODE`).
pub static SCHOOL_CODE: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("7530475".to_string())));

/// Name of the collection tasks are stored into, on remote document stores
pub static TASK_COLLECTION: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("todos".to_string())));

/// How often the clock display is refreshed
pub const CLOCK_PERIOD: Duration = Duration::from_millis(1000);
/// How often the school schedule is fetched again
pub const SCHEDULE_REFRESH_PERIOD: Duration = Duration::from_millis(3_600_000);
/// How often a polling store re-runs its live query
pub const POLL_PERIOD: Duration = Duration::from_secs(2);
/// How long a polling store waits for its live query to answer
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Returns the current value of a string setting.
///
/// A poisoned setting still holds a valid string, so it is read anyway.
pub fn get(setting: &Lazy<Arc<Mutex<String>>>) -> String {
    match setting.lock() {
        Ok(value) => value.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Overrides a string setting
pub fn set<S: ToString>(setting: &Lazy<Arc<Mutex<String>>>, value: S) {
    match setting.lock() {
        Ok(mut current) => *current = value.to_string(),
        Err(poisoned) => *poisoned.into_inner() = value.to_string(),
    }
}
