use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Control characters a spreadsheet cell cannot hold.
static ILLEGAL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").expect("illegal-char pattern"));

/// Column whose values carry a unit suffix to strip.
pub const AREA_COLUMN: &str = "Area";

pub fn strip_illegal(value: &str) -> Cow<'_, str> {
    ILLEGAL_CHARS.replace_all(value, "")
}

/// Cell text as written to the workbook.
pub fn clean_cell(column: &str, value: &str) -> String {
    let cleaned = strip_illegal(value);
    if column == AREA_COLUMN {
        cleaned.replace(" m²", "").replace(" m", "")
    } else {
        cleaned.into_owned()
    }
}
