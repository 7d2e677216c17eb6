use chrono::{NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];

/// Parse a reference date as published by the regulator.
///
/// `Ok(None)` for an empty cell, `Err(())` when the text is not a recognised date.
pub fn parse_reference_date(s: &str) -> Result<Option<NaiveDate>, ()> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
        .map(Some)
        .ok_or(())
}

/// ISO `YYYY-MM-DD`, empty for a missing date.
pub fn format_iso(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn accepts_published_layouts() {
        assert_eq!(parse_reference_date("2023-03-31"), Ok(ymd(2023, 3, 31)));
        assert_eq!(parse_reference_date(" 2023/06/30 "), Ok(ymd(2023, 6, 30)));
        assert_eq!(parse_reference_date("30/09/2023"), Ok(ymd(2023, 9, 30)));
        assert_eq!(parse_reference_date("2023-12-31 00:00:00"), Ok(ymd(2023, 12, 31)));
    }

    #[test]
    fn empty_is_missing_and_garbage_fails() {
        assert_eq!(parse_reference_date(""), Ok(None));
        assert_eq!(parse_reference_date("31 de março"), Err(()));
        assert_eq!(parse_reference_date("2023-02-30"), Err(()));
    }

    #[test]
    fn formats_iso() {
        assert_eq!(format_iso(ymd(2024, 1, 5)), "2024-01-05");
        assert_eq!(format_iso(None), "");
    }
}
