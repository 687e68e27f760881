//! Date parsing and age computation for the patient header.

use chrono::{Datelike, NaiveDate};

/// Date formats accepted in patient fields and section stamps.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Parses a date written as `YYYY-MM-DD`, `DD-MM-YYYY` or `DD/MM/YYYY`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Completed years between `birth` and `on`.
///
/// Returns `None` when `on` precedes `birth`.
pub fn age_on(birth: NaiveDate, on: NaiveDate) -> Option<u32> {
    if on < birth {
        return None;
    }
    let mut years = on.year() - birth.year();
    if (on.month(), on.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Age from textual dates, `None` if either is malformed or out of order.
pub fn age_from_strings(birth: &str, on: &str) -> Option<u32> {
    age_on(parse_date(birth)?, parse_date(on)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_day_before_birthday() {
        assert_eq!(age_from_strings("2000-05-10", "2024-05-09"), Some(23));
    }

    #[test]
    fn test_age_on_birthday() {
        assert_eq!(age_from_strings("2000-05-10", "2024-05-10"), Some(24));
    }

    #[test]
    fn test_age_leap_day_birth() {
        assert_eq!(age_from_strings("2000-02-29", "2023-02-28"), Some(22));
        assert_eq!(age_from_strings("2000-02-29", "2023-03-01"), Some(23));
    }

    #[test]
    fn test_report_before_birth() {
        assert_eq!(age_from_strings("2024-01-02", "2024-01-01"), None);
    }

    #[test]
    fn test_parse_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
        assert_eq!(parse_date("2024-05-09"), Some(expected));
        assert_eq!(parse_date("09-05-2024"), Some(expected));
        assert_eq!(parse_date(" 09/05/2024 "), Some(expected));
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date("ayer"), None);
    }
}
