use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::analytics::{JobStatus, TrainsetStatus};
use crate::error::FleetError;

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));
static US_SLASH_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("valid regex"));
static US_DASH_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})-(\d{1,2})-(\d{4})$").expect("valid regex"));

/// Trims and drops empty strings.
pub fn clean_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

pub fn required_text(raw: Option<&str>, field: &str) -> Result<String, FleetError> {
    clean_text(raw).ok_or_else(|| FleetError::Validation(format!("{} is required", field)))
}

/// Parses `YYYY-MM-DD`, `MM/DD/YYYY`, `MM-DD-YYYY` or RFC 3339 into a UTC
/// timestamp. Plain dates land at midnight.
pub fn parse_date(raw: &str) -> Result<NaiveDateTime, FleetError> {
    let value = raw.trim();
    let invalid = || FleetError::Validation(format!("invalid date format: {}", value));

    let date = if ISO_DATE.is_match(value) {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
    } else if let Some(caps) = US_SLASH_DATE.captures(value).or_else(|| US_DASH_DATE.captures(value)) {
        let month = caps[1].parse().ok();
        let day = caps[2].parse().ok();
        let year = caps[3].parse().ok();
        match (year, month, day) {
            (Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y, m, d),
            _ => None,
        }
    } else {
        return DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.naive_utc())
            .map_err(|_| invalid());
    };

    date.and_then(|d| d.and_hms_opt(0, 0, 0)).ok_or_else(invalid)
}

pub fn parse_optional_date(raw: Option<&str>) -> Result<Option<NaiveDateTime>, FleetError> {
    clean_text(raw).map(|v| parse_date(&v)).transpose()
}

/// Case-insensitive match against `options`, then partial containment in
/// either direction ("progress" -> "InProgress").
fn match_enum<T: Copy>(raw: &str, options: &[(T, &str)], field: &str) -> Result<T, FleetError> {
    let needle = raw.trim().to_lowercase().replace([' ', '_', '-'], "");
    if needle.is_empty() {
        return Err(FleetError::Validation(format!("{} is required", field)));
    }

    let exact = options.iter().find(|(_, name)| name.to_lowercase() == needle);
    let partial = || {
        options.iter().find(|(_, name)| {
            let name = name.to_lowercase();
            name.contains(&needle) || needle.contains(&name)
        })
    };

    exact.or_else(partial).map(|(value, _)| *value).ok_or_else(|| {
        let expected: Vec<&str> = options.iter().map(|(_, name)| *name).collect();
        FleetError::Validation(format!(
            "invalid {} '{}', expected one of: {}",
            field,
            raw.trim(),
            expected.join(", ")
        ))
    })
}

pub fn parse_trainset_status(raw: &str) -> Result<TrainsetStatus, FleetError> {
    let options = TrainsetStatus::ALL.map(|s| (s, s.as_str()));
    match_enum(raw, &options, "trainset status")
}

pub fn parse_job_status(raw: &str) -> Result<JobStatus, FleetError> {
    let options = JobStatus::ALL.map(|s| (s, s.as_str()));
    match_enum(raw, &options, "job card status")
}

pub fn parse_mileage(raw: Option<i64>) -> Result<i64, FleetError> {
    match raw {
        None => Ok(0),
        Some(km) if km >= 0 => Ok(km),
        Some(km) => Err(FleetError::Validation(format!("mileage must be non-negative, got {}", km))),
    }
}
