//! Date parsing for warehouse DATE columns
//!
//! Source files carry dates in several shapes ("2025-06-26", "6/26/2025",
//! "Jun 26, 2025"). The warehouse wants `YYYY-MM-DD` or NULL.

use chrono::NaiveDate;

/// Accepted formats, tried in order. The order is deliberate: ISO first,
/// then the remaining numeric forms with month-before-day, then month-name
/// forms. Ambiguous numeric dates (e.g. "01/02/2025") therefore always
/// resolve month-first.
const FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Parse a free-text date into a `NaiveDate`, or `None`.
///
/// Empty or whitespace-only input, calendar-invalid dates (February 30)
/// and unparseable text all yield `None`. Never panics.
///
/// ```
/// use chrono::NaiveDate;
/// use gvw_ingest::parse_date;
///
/// assert_eq!(parse_date("Jun 26, 2025"), NaiveDate::from_ymd_opt(2025, 6, 26));
/// assert_eq!(parse_date("2025-02-30"), None);
/// assert_eq!(parse_date(""), None);
/// ```
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_iso() {
        assert_eq!(parse_date("2025-06-26"), ymd(2025, 6, 26));
        assert_eq!(parse_date("2025/06/26"), ymd(2025, 6, 26));
    }

    #[test]
    fn test_us_slash() {
        assert_eq!(parse_date("6/26/2025"), ymd(2025, 6, 26));
        assert_eq!(parse_date("06/26/2025"), ymd(2025, 6, 26));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(parse_date("Jun 26, 2025"), ymd(2025, 6, 26));
        assert_eq!(parse_date("June 26, 2025"), ymd(2025, 6, 26));
        assert_eq!(parse_date("26 Jun 2025"), ymd(2025, 6, 26));
    }

    #[test]
    fn test_ambiguous_resolves_month_first() {
        assert_eq!(parse_date("01/02/2025"), ymd(2025, 1, 2));
    }

    #[test]
    fn test_invalid() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("2025-02-30"), None);
        assert_eq!(parse_date("13/13/2025"), None);
        assert_eq!(parse_date("not a date"), None);
    }
}
