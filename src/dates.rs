//! Display-date handling.
//!
//! Dates travel and persist as text in `DD/MM/YYYY` form because the
//! stored date column is textual and not always well-formed. This module
//! is the only place that parses or formats them: strict parsing for
//! validation, lenient parsing for grouping and ordering keys, and range
//! helpers for the "recent window" dashboard mode.

use chrono::{Duration, NaiveDate, Utc};
use std::fmt;

const DISPLAY_FORMAT: &str = "%d/%m/%Y";
const ISO_FORMAT: &str = "%Y-%m-%d";

/// A validated calendar date carried in display (`DD/MM/YYYY`) form.
///
/// Ordering is calendar order, not textual order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DisplayDate(NaiveDate);

impl DisplayDate {
    /// Parse a strict `YYYY-MM-DD` string (zero-padded, real calendar
    /// date). This is the external form accepted on request parameters.
    pub fn from_iso(s: &str) -> Option<DisplayDate> {
        let date = NaiveDate::parse_from_str(s, ISO_FORMAT).ok()?;
        // chrono tolerates unpadded fields; the exchange format does not.
        if date.format(ISO_FORMAT).to_string() == s {
            Some(DisplayDate(date))
        } else {
            None
        }
    }

    /// Parse a strict `DD/MM/YYYY` string; validates data already in
    /// internal form.
    pub fn parse(s: &str) -> Option<DisplayDate> {
        let date = NaiveDate::parse_from_str(s, DISPLAY_FORMAT).ok()?;
        if date.format(DISPLAY_FORMAT).to_string() == s {
            Some(DisplayDate(date))
        } else {
            None
        }
    }

    /// Today's date from the process clock.
    pub fn today() -> DisplayDate {
        DisplayDate(Utc::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The `YYYY-MM-DD` key used for sort-friendly output and SQL range
    /// comparison.
    pub fn iso_key(&self) -> String {
        self.0.format(ISO_FORMAT).to_string()
    }
}

impl fmt::Display for DisplayDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DISPLAY_FORMAT))
    }
}

impl From<NaiveDate> for DisplayDate {
    fn from(date: NaiveDate) -> Self {
        DisplayDate(date)
    }
}

/// Whether a stored string is a well-formed display date.
pub fn is_valid_display(s: &str) -> bool {
    DisplayDate::parse(s).is_some()
}

/// Lenient display-form parse: accepts unpadded day/month ("7/1/2025").
/// Used for grouping and comparison of stored values, where syntactic
/// variants of the same calendar date must collapse together.
pub fn parse_display_lenient(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DISPLAY_FORMAT).ok()
}

/// Canonical per-day grouping key: the `YYYY-MM-DD` form when the stored
/// string denotes a calendar date, otherwise the raw string itself so
/// malformed rows still bucket deterministically.
pub fn day_key(raw: &str) -> String {
    match parse_display_lenient(raw) {
        Some(date) => date.format(ISO_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

/// Calendar month key (year, month) for a stored display date; None when
/// the string does not parse.
pub fn month_key(raw: &str) -> Option<(i32, u32)> {
    use chrono::Datelike;
    let date = parse_display_lenient(raw)?;
    Some((date.year(), date.month()))
}

/// English month label for a 1-based month number.
pub fn month_label(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "",
    }
}

/// The `[today − n days, today]` window from the process clock.
pub fn last_n_days(n: i64) -> (DisplayDate, DisplayDate) {
    last_n_days_from(Utc::now().date_naive(), n)
}

/// Deterministic variant of [`last_n_days`] anchored at a given day.
pub fn last_n_days_from(today: NaiveDate, n: i64) -> (DisplayDate, DisplayDate) {
    (DisplayDate(today - Duration::days(n)), DisplayDate(today))
}
