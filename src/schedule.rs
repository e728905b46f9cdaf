//! Turning end-time text into an absolute target instant.

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

/// Parses `HH:MM:SS` (or `HH:MM`) wall-clock text.
pub fn parse_clock_time(text: &str) -> Result<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .with_context(|| format!("'{text}' is not a valid HH:MM:SS time"))
}

/// Anchors `time` on the date of `now`, rolling to the next day when that
/// instant has already passed.
pub fn resolve_end_time(time: NaiveTime, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date().and_time(time);
    if today < now {
        today + TimeDelta::days(1)
    } else {
        today
    }
}

pub fn end_time_from_text(text: &str, now: NaiveDateTime) -> Result<NaiveDateTime> {
    Ok(resolve_end_time(parse_clock_time(text)?, now))
}
