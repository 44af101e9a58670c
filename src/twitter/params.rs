//! Request parameters for the Twitter API v2 search endpoint.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, SourceError};

/// Smallest and largest `max_results` accepted by the recent search endpoint.
pub const MIN_RESULTS_PER_CALL: usize = 10;
pub const MAX_RESULTS_PER_CALL: usize = 100;

const START_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

static RELATIVE_PERIOD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)([dhm])$").expect("valid period pattern"));

/// Inputs for building a search request, with field lists already serialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams {
    pub query: String,
    pub results_per_call: usize,
    pub place_fields: Option<String>,
    pub expansions: Option<String>,
    pub user_fields: Option<String>,
    pub tweet_fields: Option<String>,
    pub since_id: Option<u64>,
    pub until_id: Option<u64>,
    pub start_time: Option<String>,
}

/// A ready-to-send set of query string parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    params: Vec<(String, String)>,
}

impl SearchRequest {
    /// Builds a request from `params`, converting the lookup period with `now` as
    /// the reference time.
    ///
    /// # Returns
    ///
    /// - `Ok(SearchRequest)`: The request parameters
    /// - `Err(SourceError::InvalidInput)`: If the lookup period cannot be understood
    pub fn from_params(params: &RequestParams, now: DateTime<Utc>) -> Result<Self> {
        let results_per_call = params
            .results_per_call
            .clamp(MIN_RESULTS_PER_CALL, MAX_RESULTS_PER_CALL);

        let mut request = SearchRequest { params: Vec::new() };
        request.push("query", Some(params.query.clone()));
        request.push("max_results", Some(results_per_call.to_string()));
        request.push("tweet.fields", params.tweet_fields.clone());
        request.push("user.fields", params.user_fields.clone());
        request.push("place.fields", params.place_fields.clone());
        request.push("expansions", params.expansions.clone());
        request.push("since_id", params.since_id.map(|id| id.to_string()));
        request.push("until_id", params.until_id.map(|id| id.to_string()));
        let start_time = params
            .start_time
            .as_deref()
            .map(|period| convert_lookup_period(period, now))
            .transpose()?;
        request.push("start_time", start_time);
        Ok(request)
    }

    fn push(&mut self, key: &str, value: Option<String>) {
        if let Some(value) = value {
            self.params.push((key.to_string(), value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Encodes the parameters as a URL query string, appending `next_token` when
    /// given.
    pub fn to_query_string(&self, next_token: Option<&str>) -> String {
        let next = next_token.map(|token| ("next_token", token));
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(next)
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Converts a lookup period into the API's `start_time` format.
///
/// Accepts relative periods (`10d`, `6h`, `15m`, counted back from `now`), dates
/// (`2024-01-31`), dates with minutes (`2024-01-31 08:30`) and RFC 3339 timestamps.
pub fn convert_lookup_period(period: &str, now: DateTime<Utc>) -> Result<String> {
    let period = period.trim();
    let invalid = || SourceError::InvalidInput(format!("unrecognized lookup period '{}'", period));

    if let Some(caps) = RELATIVE_PERIOD_RE.captures(period) {
        let amount: i64 = caps[1].parse().map_err(|_| invalid())?;
        let delta = match &caps[2] {
            "d" => chrono::Duration::try_days(amount),
            "h" => chrono::Duration::try_hours(amount),
            _ => chrono::Duration::try_minutes(amount),
        }
        .ok_or_else(invalid)?;
        let start = now.checked_sub_signed(delta).ok_or_else(invalid)?;
        return Ok(start.format(START_TIME_FORMAT).to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(period) {
        return Ok(dt.with_timezone(&Utc).format(START_TIME_FORMAT).to_string());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(period, "%Y-%m-%d %H:%M") {
        return Ok(dt.and_utc().format(START_TIME_FORMAT).to_string());
    }
    if let Ok(date) = NaiveDate::parse_from_str(period, "%Y-%m-%d") {
        let dt = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
        return Ok(dt.and_utc().format(START_TIME_FORMAT).to_string());
    }

    Err(invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_relative_periods() {
        assert_eq!(
            convert_lookup_period("10d", now()).unwrap(),
            "2024-02-29T12:00:00Z"
        );
        assert_eq!(
            convert_lookup_period("15m", now()).unwrap(),
            "2024-03-10T11:45:00Z"
        );
        assert_eq!(
            convert_lookup_period("6h", now()).unwrap(),
            "2024-03-10T06:00:00Z"
        );
    }

    #[test]
    fn test_absolute_periods() {
        assert_eq!(
            convert_lookup_period("2024-01-31", now()).unwrap(),
            "2024-01-31T00:00:00Z"
        );
        assert_eq!(
            convert_lookup_period("2024-01-31 08:30", now()).unwrap(),
            "2024-01-31T08:30:00Z"
        );
        assert_eq!(
            convert_lookup_period("2024-01-31T08:30:00+02:00", now()).unwrap(),
            "2024-01-31T06:30:00Z"
        );
    }

    #[test]
    fn test_invalid_period() {
        let err = convert_lookup_period("yesterday", now()).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_request_clamps_and_omits_missing_fields() {
        let params = RequestParams {
            query: "(rust) (-is:reply)".to_string(),
            results_per_call: 5,
            tweet_fields: Some("id,text".to_string()),
            since_id: Some(99),
            ..Default::default()
        };
        let request = SearchRequest::from_params(&params, now()).unwrap();

        assert_eq!(request.get("max_results"), Some("10"));
        assert_eq!(request.get("since_id"), Some("99"));
        assert_eq!(request.get("user.fields"), None);
        assert_eq!(
            request.to_query_string(Some("abc")),
            "query=%28rust%29%20%28-is%3Areply%29&max_results=10&tweet.fields=id%2Ctext&since_id=99&next_token=abc"
        );
    }
}
