//! Vietnamese date parsing.
//!
//! Article pages print dates like `Thứ hai, 15/3/2024, 10:05 (GMT+7)` or
//! `Ngày 15-03-2024`. Only the calendar date is kept.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Leading weekday (`Thứ hai,`, `Chủ nhật,`) and/or `Ngày` marker.
static PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:(?:thứ\s+\p{L}+|chủ\s+nhật)\s*,?\s*)?(?i:ngày\s*)?").expect("static regex")
});

/// Tried in order; the first that matches anywhere in the text wins.
static PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").expect("static regex"),
        Regex::new(r"(\d{1,2})-(\d{1,2})-(\d{4})").expect("static regex"),
        Regex::new(r"(\d{4})-(\d{1,2})-(\d{1,2})").expect("static regex"),
    ]
});

/// Parse a Vietnamese date string into a calendar date.
///
/// Returns `None` for anything that does not contain a valid date; a missing
/// publish date never blocks an article.
pub fn parse_vietnamese_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    let text = PREFIX.replace(text, "");

    let caps = PATTERNS.iter().find_map(|re| re.captures(&text))?;
    let (a, b, c) = (&caps[1], &caps[2], &caps[3]);

    // Year-first when the leading group is four digits, day-first otherwise.
    let (year, month, day) = if a.len() == 4 { (a, b, c) } else { (c, b, a) };
    let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?);
    if date.is_none() {
        debug!(raw, "Date text matched a pattern but is not a calendar date");
    }
    date
}
