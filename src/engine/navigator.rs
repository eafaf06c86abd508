//! Date-cursor navigator.
//!
//! Resolves which single date of the sparse date axis a browse request
//! lands on. Input is the distinct display-date list induced by the
//! filter, already sorted descending by calendar date; `before`/`after`
//! move the cursor relative to that list. Comparison needs a parseable
//! date, so malformed entries can never match a cursor, but they still
//! occupy a position and therefore count for the next/previous flags.

use tracing::debug;

use crate::dates::{parse_display_lenient, DisplayDate};

/// Outcome of cursor resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDate {
    /// The display date whose rows should be fetched; None when the
    /// distinct-date set is empty.
    pub date: Option<String>,
    /// A newer date exists in the set.
    pub has_next: bool,
    /// An older date exists in the set.
    pub has_previous: bool,
}

impl ResolvedDate {
    fn none() -> Self {
        ResolvedDate {
            date: None,
            has_next: false,
            has_previous: false,
        }
    }
}

/// Resolve the cursor over `dates_desc` (newest first).
///
/// `before` picks the first date strictly earlier than the cursor,
/// falling back to the oldest; `after` picks the first date strictly
/// later (the newest such date, given the ordering), falling back to the
/// newest; with no cursor the newest date wins.
pub fn resolve(
    dates_desc: &[String],
    before: Option<DisplayDate>,
    after: Option<DisplayDate>,
) -> ResolvedDate {
    if dates_desc.is_empty() {
        return ResolvedDate::none();
    }

    let index = if let Some(before) = before {
        dates_desc
            .iter()
            .position(|d| matches!(parse_display_lenient(d), Some(parsed) if parsed < before.date()))
            .unwrap_or(dates_desc.len() - 1)
    } else if let Some(after) = after {
        dates_desc
            .iter()
            .position(|d| matches!(parse_display_lenient(d), Some(parsed) if parsed > after.date()))
            .unwrap_or(0)
    } else {
        0
    };

    let resolved = ResolvedDate {
        date: Some(dates_desc[index].clone()),
        has_next: index > 0,
        has_previous: index < dates_desc.len() - 1,
    };
    debug!(
        date = resolved.date.as_deref().unwrap_or(""),
        has_next = resolved.has_next,
        has_previous = resolved.has_previous,
        "resolved date cursor"
    );
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn cursor(s: &str) -> Option<DisplayDate> {
        Some(DisplayDate::parse(s).unwrap())
    }

    #[test]
    fn test_before_resolves_first_strictly_earlier() {
        let list = dates(&["20/01/2025", "15/01/2025", "10/01/2025", "05/01/2025"]);
        let resolved = resolve(&list, cursor("15/01/2025"), None);
        assert_eq!(resolved.date.as_deref(), Some("10/01/2025"));
        assert!(resolved.has_next);
        assert!(resolved.has_previous);
    }

    #[test]
    fn test_before_earlier_than_all_falls_back_to_oldest() {
        let list = dates(&["20/01/2025", "15/01/2025", "10/01/2025", "05/01/2025"]);
        let resolved = resolve(&list, cursor("01/01/2025"), None);
        assert_eq!(resolved.date.as_deref(), Some("05/01/2025"));
        assert!(resolved.has_next);
        assert!(!resolved.has_previous);
    }

    #[test]
    fn test_after_resolves_newest_strictly_later() {
        let list = dates(&["20/01/2025", "15/01/2025", "10/01/2025"]);
        let resolved = resolve(&list, None, cursor("10/01/2025"));
        // The descending scan finds the newest later date, not the
        // adjacent one.
        assert_eq!(resolved.date.as_deref(), Some("20/01/2025"));
        assert!(!resolved.has_next);
        assert!(resolved.has_previous);
    }

    #[test]
    fn test_after_later_than_all_falls_back_to_newest() {
        let list = dates(&["20/01/2025", "15/01/2025"]);
        let resolved = resolve(&list, None, cursor("25/01/2025"));
        assert_eq!(resolved.date.as_deref(), Some("20/01/2025"));
        assert!(!resolved.has_next);
        assert!(resolved.has_previous);
    }

    #[test]
    fn test_no_cursor_picks_newest() {
        let list = dates(&["20/01/2025", "15/01/2025"]);
        let resolved = resolve(&list, None, None);
        assert_eq!(resolved.date.as_deref(), Some("20/01/2025"));
        assert!(!resolved.has_next);
        assert!(resolved.has_previous);
    }

    #[test]
    fn test_empty_set() {
        let resolved = resolve(&[], None, None);
        assert_eq!(resolved, ResolvedDate::none());
    }

    #[test]
    fn test_single_date_has_no_neighbours() {
        let list = dates(&["20/01/2025"]);
        let resolved = resolve(&list, None, None);
        assert!(!resolved.has_next);
        assert!(!resolved.has_previous);
    }

    #[test]
    fn test_malformed_dates_never_match_but_hold_positions() {
        let list = dates(&["soon", "15/01/2025", "05/01/2025"]);
        let resolved = resolve(&list, cursor("16/01/2025"), None);
        // "soon" cannot be compared; the first real earlier date wins,
        // and the malformed entry above it still makes has_next true.
        assert_eq!(resolved.date.as_deref(), Some("15/01/2025"));
        assert!(resolved.has_next);
        assert!(resolved.has_previous);
    }

    #[test]
    fn test_unpadded_dates_compare_by_calendar() {
        let list = dates(&["20/01/2025", "9/1/2025"]);
        let resolved = resolve(&list, cursor("10/01/2025"), None);
        assert_eq!(resolved.date.as_deref(), Some("9/1/2025"));
    }
}
