//! The clock display

use chrono::{Datelike, NaiveDateTime, Weekday};

/// What the clock shows at a given time
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClockDisplay {
    /// 24-hour time of day, e.g. `14:05:09`
    pub time: String,
    /// Long date with weekday, e.g. `2026년 10월 19일 월요일`
    pub date: String,
}

impl ClockDisplay {
    pub fn at(now: &NaiveDateTime) -> Self {
        Self {
            time: now.format("%H:%M:%S").to_string(),
            date: format!("{}년 {}월 {}일 {}", now.year(), now.month(), now.day(), korean_weekday(now.weekday())),
        }
    }
}

fn korean_weekday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "월요일",
        Weekday::Tue => "화요일",
        Weekday::Wed => "수요일",
        Weekday::Thu => "목요일",
        Weekday::Fri => "금요일",
        Weekday::Sat => "토요일",
        Weekday::Sun => "일요일",
    }
}
