use crate::constants::{
    BUFFER_TERMINATORS, DEFAULT_PDF_CATEGORY, DIETARY_KEYWORDS, LUNCH_KEYWORD, PDF_RULE,
    PDF_WATERMARK,
};
use crate::data_backend::{collapse_whitespace, parse_decimal};
use crate::data_types::{DayMenu, Meal, PriceTier, Prices};
use crate::errors::FetchError;
use crate::fetcher::Fetcher;

use chrono::NaiveDate;
use std::time::Instant;

pub async fn get_today_menus(
    fetcher: &Fetcher,
    pdf_url: &str,
    today: NaiveDate,
) -> Result<Vec<DayMenu>, FetchError> {
    let text = fetcher.get_pdf_text(pdf_url).await?;
    Ok(parse_menu_text(&text, today))
}

/// Weekly PDF text -> a single day menu for `today`.
///
/// The PDF carries no per-day structure, every meal found is offered today.
pub fn parse_menu_text(text: &str, today: NaiveDate) -> Vec<DayMenu> {
    let now = Instant::now();
    let lines = text_to_menu_lines(text);
    let menu = build_day_menu(&lines, today);
    log::debug!(
        "parsing pdf text: {} lines, {} meals, {:.2?}",
        lines.len(),
        menu.meals.len(),
        now.elapsed()
    );

    vec![menu]
}

/// Reassembles the linearized PDF text into one entry per menu line.
///
/// Lines before the first blank line are the header and pass through as
/// they are. After it, physical lines are buffered until the buffer ends
/// with a price or a dietary keyword, since the extractor wraps long meal
/// descriptions. A buffer without such an ending is carried into the next
/// entry.
pub fn text_to_menu_lines(text: &str) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    let mut header_region = true;
    let mut buffer = String::new();

    // form feeds separate pages
    for line in text.lines().flat_map(|l| l.split(&['\x0b', '\x0c'][..])) {
        if line.contains(PDF_WATERMARK) {
            continue;
        }

        if line.to_lowercase().contains(LUNCH_KEYWORD) {
            cleaned.push(collapse_whitespace(line));
            cleaned.push(String::new());
        } else if line.contains(PDF_RULE) {
            cleaned.extend(line.split(PDF_RULE).map(collapse_whitespace));
        } else if line.trim().is_empty() {
            header_region = false;
        } else if header_region {
            cleaned.push(collapse_whitespace(line));
        } else {
            buffer.push(' ');
            buffer.push_str(line);

            let trimmed = buffer.trim();
            if BUFFER_TERMINATORS.iter().any(|t| trimmed.ends_with(*t)) {
                cleaned.push(collapse_whitespace(&buffer));
                buffer.clear();
            }
        }
    }

    if !buffer.trim().is_empty() {
        cleaned.push(collapse_whitespace(&buffer));
    }

    cleaned.retain(|entry| !entry.trim().is_empty());
    cleaned
}

pub fn build_day_menu(lines: &[String], today: NaiveDate) -> DayMenu {
    let mut category = DEFAULT_PDF_CATEGORY.to_string();
    let mut meals = Vec::new();

    for line in lines {
        let low = line.to_lowercase();

        if low.contains(LUNCH_KEYWORD) {
            category = line.clone();
            continue;
        }

        let (name, prices) = split_trailing_price(line);
        let notes = DIETARY_KEYWORDS
            .iter()
            .filter(|keyword| low.contains(**keyword))
            .map(|keyword| keyword.to_string())
            .collect();

        meals.push(Meal {
            category: category.clone(),
            name,
            notes,
            prices,
            allergens: Vec::new(),
        });
    }

    DayMenu::new(today, meals)
}

/// `"Linsensuppe 3,80€"` -> (`"Linsensuppe"`, other: 3.8)
fn split_trailing_price(line: &str) -> (String, Prices) {
    if let Some((name, last)) = line.rsplit_once(' ') {
        if last.ends_with('€') {
            if let Some(price) = parse_decimal(&last.replace('€', "")) {
                return (name.to_string(), Prices::from([(PriceTier::Other, price)]));
            }
            log::debug!("unreadable trailing price {:?}", last);
        }
    }

    (line.to_string(), Prices::new())
}
