use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

// Parse a date string like "YYYY-MM-DD" or RFC3339 into the calendar date it names.
// RFC3339 values keep the date of their own offset; timestamps without an offset
// keep their wall-clock date. Returns None if empty or unparseable.
pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    // "YYYY-MM-DD"
    if let Ok(nd) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(nd);
    }
    // RFC3339
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    // local timestamp, no offset
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.date());
        }
    }
    None
}

// Helper for Option<String> inputs used by CLI flags like --today
pub fn parse_today_opt(today: &Option<String>) -> Result<Option<NaiveDate>> {
    let Some(s) = today.as_ref() else { return Ok(None) };
    match parse_date_str(s) {
        Some(d) => Ok(Some(d)),
        None => bail!("Invalid --today date: {} (expected YYYY-MM-DD)", s),
    }
}
