use chrono::NaiveDate;
use regex_lite::Regex;
use static_init::dynamic;

pub mod cafenero_parser;
pub mod stw_parser;

/// Parses the vendor date label `"<Weekday>, DD.MM.YYYY"`.
///
/// Only the part after the last comma is looked at, so a bare `DD.MM.YYYY`
/// works as well.
fn parse_german_date(label: &str) -> Option<NaiveDate> {
    #[dynamic]
    static RE: Regex = Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4})$").unwrap();

    let day_str = label.rsplit(',').next()?.trim();
    let caps = RE.captures(day_str)?;

    let day = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let month = caps.get(2)?.as_str().parse::<u32>().ok()?;
    let year = caps.get(3)?.as_str().parse::<i32>().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// `"4,50"` / `"4.50"` -> 4.5, only positive amounts count
fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Collapses whitespace runs and glues a detached euro sign to its amount.
fn collapse_whitespace(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .replace(" €", "€")
}
