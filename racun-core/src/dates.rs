//! Date parsing and the derived night count.

use chrono::{Duration, NaiveDate};

use crate::error::{RacunError, Result};

/// Days between issue date and the default due date.
pub const DUE_AFTER_DAYS: i64 = 7;

/// A validated arrival/departure pair and its night count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stay {
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    pub nights: u32,
}

/// Parse a form date value. Accepts `YYYY-MM-DD`, optionally followed by a
/// time of day (`T10:30`, ` 10:30:00`) which is discarded.
pub fn parse_date_input(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    let date_part = trimmed
        .split(['T', ' '])
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|source| RacunError::Date {
        input: input.to_string(),
        source,
    })
}

/// Whole nights between two calendar dates. Zero unless departure is
/// strictly after arrival, so a same-day stay counts as no stay.
pub fn calculate_nights(arrival: NaiveDate, departure: NaiveDate) -> u32 {
    if arrival < departure {
        // Both sides are midnight, so the difference is already whole days.
        let days = departure.signed_duration_since(arrival).num_days();
        u32::try_from(days).unwrap_or(u32::MAX)
    } else {
        0
    }
}

/// Parse both dates and derive the night count.
pub fn normalize_stay(arrival: &str, departure: &str) -> Result<Stay> {
    let arrival = parse_date_input(arrival)?;
    let departure = parse_date_input(departure)?;
    Ok(Stay {
        arrival,
        departure,
        nights: calculate_nights(arrival, departure),
    })
}

pub fn default_due_date(issue: NaiveDate) -> NaiveDate {
    issue + Duration::days(DUE_AFTER_DAYS)
}

/// ISO representation used for date inputs.
pub fn format_date_for_input(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
