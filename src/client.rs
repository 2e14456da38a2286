//! This module provides a client for the school schedule API

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use url::Url;

use crate::BoxError;
use crate::config;
use crate::schedule::{parse_events, ScheduleEvent};
use crate::traits::ScheduleSource;


/// A [`ScheduleSource`] that queries the NEIS open API for a single school
pub struct Client {
    base_url: Url,
    office_code: String,
    school_code: String,
    http: reqwest::Client,
}

impl Client {
    /// Create a client from the current settings. This does not start a connection
    pub fn new() -> Result<Self, BoxError> {
        Self::with_codes(config::get(&config::SCHEDULE_API_URL),
                         config::get(&config::EDUCATION_OFFICE_CODE),
                         config::get(&config::SCHOOL_CODE))
    }

    /// Create a client for a given school
    pub fn with_codes<S: AsRef<str>, T: ToString, U: ToString>(url: S, office_code: T, school_code: U) -> Result<Self, BoxError> {
        let base_url = Url::parse(url.as_ref())?;

        Ok(Self{
            base_url,
            office_code: office_code.to_string(),
            school_code: school_code.to_string(),
            http: reqwest::Client::new(),
        })
    }

    /// The URL that lists the events of a given day
    pub fn request_url(&self, day: NaiveDate) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("ATPT_OFCDC_SC_CODE", &self.office_code)
            .append_pair("SD_SCHUL_CODE", &self.school_code)
            .append_pair("Type", "json")
            .append_pair("AA_YMD", &day.format("%Y%m%d").to_string());
        url
    }
}

#[async_trait]
impl ScheduleSource for Client {
    async fn fetch_events(&self, day: NaiveDate) -> Result<Vec<ScheduleEvent>, BoxError> {
        let url = self.request_url(day);
        log::debug!("Fetching the school schedule from {}", url);

        let response = self.http
            .get(url)
            .send()
            .await?;

        if response.status().is_success() == false {
            log::warn!("Unexpected HTTP status code {:?} from the schedule API", response.status());
            return Ok(Vec::new());
        }

        let body: Value = response.json().await?;
        parse_events(&body)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_url() {
        let client = Client::with_codes("https://open.neis.go.kr/hub/SchoolSchedule", "J10", "7530475").unwrap();
        let url = client.request_url(NaiveDate::from_ymd_opt(2026, 10, 9).unwrap());
        assert_eq!(url.as_str(), "https://open.neis.go.kr/hub/SchoolSchedule?ATPT_OFCDC_SC_CODE=J10&SD_SCHUL_CODE=7530475&Type=json&AA_YMD=20261009");
    }

    #[test]
    fn invalid_base_url() {
        assert!(Client::with_codes("not a url", "J10", "7530475").is_err());
    }
}
