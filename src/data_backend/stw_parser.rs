use crate::constants::{CLOSED_PHRASES, UNKNOWN_CATEGORY};
use crate::data_backend::{parse_decimal, parse_german_date};
use crate::data_types::{DayMenu, Meal, PriceTier, Prices};
use crate::errors::FetchError;
use crate::fetcher::Fetcher;

use chrono::{Local, NaiveDate};
use scraper::{ElementRef, Html, Selector};
use selectors::Element;
use std::time::Instant;

// their text never shows up on the rendered page
const HIDDEN_ELEMENTS: [&str; 3] = ["script", "style", "template"];

pub async fn get_day_menus(
    fetcher: &Fetcher,
    resource_id: u32,
    requested_date: NaiveDate,
) -> Result<Vec<DayMenu>, FetchError> {
    let html_text = fetcher.post_day_fragment(resource_id, requested_date).await?;
    Ok(parse_day_html(&html_text, Some(requested_date)))
}

pub fn parse_day_html_bytes(content: &[u8], fallback: Option<NaiveDate>) -> Vec<DayMenu> {
    parse_day_html(&String::from_utf8_lossy(content), fallback)
}

/// Parses one `speiseplan-wochentag` fragment.
///
/// Malformed markup never fails the page: unreadable dates fall back to
/// `fallback` (or today), entries without a name are skipped and a page
/// without meals yields a closed day.
pub fn parse_day_html(html_text: &str, fallback: Option<NaiveDate>) -> Vec<DayMenu> {
    let now = Instant::now();
    let document = Html::parse_fragment(html_text);

    let date = received_date(&document)
        .or(fallback)
        .unwrap_or_else(|| Local::now().date_naive());

    let page_text = visible_text(&document).to_lowercase();

    if CLOSED_PHRASES.iter().any(|phrase| page_text.contains(phrase)) {
        log::debug!("{}: closed by notice", date);
        return vec![DayMenu::closed(date)];
    }

    let group_sel = selector(".splGroupWrapper");
    let group_name_sel = selector(".splGroup");
    let meal_sel = selector(".splMeal");
    let parts = MealSelectors::new();

    let mut meals = Vec::new();
    for group in document.select(&group_sel) {
        let category = group
            .select(&group_name_sel)
            .next()
            .map(stripped_text)
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());

        for meal_element in group.select(&meal_sel) {
            if let Some(meal) = extract_meal(meal_element, &category, &parts) {
                meals.push(meal);
            }
        }
    }

    log::debug!("parsing html for {}: {:.2?}", date, now.elapsed());
    vec![DayMenu::new(date, meals)]
}

/// Text nodes outside of non-rendered elements, joined by single spaces.
fn visible_text(document: &Html) -> String {
    document
        .root_element()
        .descendants()
        .filter(|node| {
            !node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
            })
        })
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<&str>>()
        .join(" ")
}

fn received_date(document: &Html) -> Option<NaiveDate> {
    // the label sits in the span right after the calendar glyph
    let icon_sel = selector(".glyphicon-calendar");

    let label = document
        .select(&icon_sel)
        .filter_map(|icon| icon.next_sibling_element())
        .find(|sibling| sibling.value().name() == "span")?
        .text()
        .collect::<String>();

    let date = parse_german_date(&label);
    if date.is_none() {
        log::warn!("unreadable date label {:?}, using fallback", label.trim());
    }
    date
}

struct MealSelectors {
    name: Selector,
    price: Selector,
    allergen_row: Selector,
    cell: Selector,
    icon: Selector,
}

impl MealSelectors {
    fn new() -> Self {
        MealSelectors {
            name: selector(".bold"),
            price: selector(".col-md-3.text-right"),
            allergen_row: selector(".tooltip_content tr"),
            cell: selector("td"),
            icon: selector(".splIcon"),
        }
    }
}

fn extract_meal(meal_element: ElementRef, category: &str, sel: &MealSelectors) -> Option<Meal> {
    let name = match meal_element.select(&sel.name).next() {
        Some(name_element) => stripped_text(name_element),
        None => {
            log::debug!("skipping entry without name in {:?}", category);
            return None;
        }
    };
    if name.is_empty() {
        log::debug!("skipping entry with empty name in {:?}", category);
        return None;
    }

    let prices = meal_element
        .select(&sel.price)
        .next()
        .map(|price_element| parse_prices(&price_element.text().collect::<String>()))
        .unwrap_or_default();

    let allergens: Vec<String> = meal_element
        .select(&sel.allergen_row)
        .filter_map(|row| {
            let cols: Vec<String> = row.select(&sel.cell).map(stripped_text).collect();
            match cols.as_slice() {
                [code, description] => Some(format!("Allergens: {} {}", code, description)),
                _ => None,
            }
        })
        .collect();

    let mut notes: Vec<String> = meal_element
        .select(&sel.icon)
        .filter_map(|icon| icon.value().attr("alt"))
        .map(strip_markup)
        .filter(|note| !note.is_empty())
        .collect();
    notes.extend(allergens.iter().cloned());

    Some(Meal {
        category: category.to_string(),
        name,
        notes,
        prices,
        allergens,
    })
}

/// `"3,50 / 4,20 / 5,90€"` -> student, employee, other.
///
/// Anything but three readable amounts gives no prices at all.
fn parse_prices(price_text: &str) -> Prices {
    if !price_text.contains('€') {
        return Prices::new();
    }

    let parts: Vec<Option<f64>> = price_text
        .trim()
        .replace('€', "")
        .split('/')
        .map(parse_decimal)
        .collect();

    match parts.as_slice() {
        [Some(student), Some(employee), Some(other), ..] => Prices::from([
            (PriceTier::Student, *student),
            (PriceTier::Employee, *employee),
            (PriceTier::Other, *other),
        ]),
        _ => {
            log::debug!("unusable price text {:?}", price_text.trim());
            Prices::new()
        }
    }
}

// icon alt texts sometimes carry escaped markup like "<b>vegan</b>"
fn strip_markup(alt: &str) -> String {
    Html::parse_fragment(alt)
        .root_element()
        .text()
        .collect::<Vec<&str>>()
        .join(" ")
        .trim()
        .to_string()
}

fn stripped_text(element: ElementRef) -> String {
    element.text().map(str::trim).collect()
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("hard-coded selector")
}
