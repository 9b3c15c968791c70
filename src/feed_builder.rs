use std::collections::BTreeMap;
use std::io::Write;

use chrono::NaiveDate;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::constants::{
    DEFAULT_SCHEDULE, MAX_MEAL_NAME_CHARS, OPENMENSA_NS, OPENMENSA_VERSION, XSI_NS,
};
use crate::data_types::canteen_data_types::CanteenMeta;
use crate::data_types::{DayMenu, Meal};
use crate::errors::FeedError;

type Categories = Vec<(String, Vec<Meal>)>;

/// Collects day menus of one canteen and renders them as an OpenMensa v2
/// feed. Days come out sorted; categories keep their first appearance.
#[derive(Default)]
pub struct FeedBuilder {
    days: BTreeMap<NaiveDate, Categories>,
}

impl FeedBuilder {
    pub fn new() -> Self {
        FeedBuilder::default()
    }

    pub fn add_day_menu(&mut self, menu: &DayMenu) {
        // a closed menu only registers the day; meals from another menu
        // for the same date reopen it
        let categories = self.days.entry(menu.day).or_default();

        for meal in &menu.meals {
            match categories.iter_mut().find(|(name, _)| *name == meal.category) {
                Some((_, meals)) => meals.push(meal.clone()),
                None => categories.push((meal.category.clone(), vec![meal.clone()])),
            }
        }
    }

    pub fn extend<'a>(&mut self, menus: impl IntoIterator<Item = &'a DayMenu>) {
        for menu in menus {
            self.add_day_menu(menu);
        }
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    pub fn to_xml(&self, canteen: &CanteenMeta) -> Result<String, FeedError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        write_prolog(&mut writer)?;
        writer.write_event(Event::Start(BytesStart::new("canteen")))?;
        write_canteen_info(&mut writer, canteen)?;

        for (day, categories) in &self.days {
            let date = day.format("%Y-%m-%d").to_string();
            let mut day_start = BytesStart::new("day");
            day_start.push_attribute(("date", date.as_str()));
            writer.write_event(Event::Start(day_start))?;

            if categories.is_empty() {
                writer.write_event(Event::Empty(BytesStart::new("closed")))?;
            }

            for (category, meals) in categories {
                let mut category_start = BytesStart::new("category");
                category_start.push_attribute(("name", category.as_str()));
                writer.write_event(Event::Start(category_start))?;

                for meal in meals {
                    write_meal(&mut writer, meal)?;
                }

                writer.write_event(Event::End(BytesEnd::new("category")))?;
            }

            writer.write_event(Event::End(BytesEnd::new("day")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("canteen")))?;
        writer.write_event(Event::End(BytesEnd::new("openmensa")))?;

        Ok(String::from_utf8(writer.into_inner())?)
    }
}

/// Metadata document announcing the canteen and where its feed lives.
pub fn build_meta_xml(canteen: &CanteenMeta) -> Result<String, FeedError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_prolog(&mut writer)?;
    writer.write_event(Event::Start(BytesStart::new("canteen")))?;
    write_canteen_info(&mut writer, canteen)?;

    if !canteen.url.is_empty() {
        let mut feed_start = BytesStart::new("feed");
        feed_start.push_attribute(("name", "full"));
        writer.write_event(Event::Start(feed_start))?;

        let mut schedule = BytesStart::new("schedule");
        schedule.extend_attributes(DEFAULT_SCHEDULE);
        writer.write_event(Event::Empty(schedule))?;

        write_optional(&mut writer, "url", &canteen.url)?;
        write_optional(&mut writer, "source", &canteen.source)?;
        writer.write_event(Event::End(BytesEnd::new("feed")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("canteen")))?;
    writer.write_event(Event::End(BytesEnd::new("openmensa")))?;

    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_prolog<W: Write>(writer: &mut Writer<W>) -> Result<(), FeedError> {
    let schema_location = format!("{} {}.xsd", OPENMENSA_NS, OPENMENSA_NS);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let mut root = BytesStart::new("openmensa");
    root.extend_attributes([
        ("version", OPENMENSA_VERSION),
        ("xmlns", OPENMENSA_NS),
        ("xmlns:xsi", XSI_NS),
        ("xsi:schemaLocation", schema_location.as_str()),
    ]);
    writer.write_event(Event::Start(root))?;

    Ok(())
}

fn write_canteen_info<W: Write>(
    writer: &mut Writer<W>,
    canteen: &CanteenMeta,
) -> Result<(), FeedError> {
    write_optional(writer, "name", &canteen.name)?;
    write_optional(writer, "address", &canteen.street)?;
    write_optional(writer, "city", &canteen.city)?;
    Ok(())
}

fn write_meal<W: Write>(writer: &mut Writer<W>, meal: &Meal) -> Result<(), FeedError> {
    writer.write_event(Event::Start(BytesStart::new("meal")))?;

    // OpenMensa rejects longer names, the cut-off part moves into the notes
    let (name, overflow) = split_name(&meal.name);
    write_text_element(writer, BytesStart::new("name"), name)?;
    if let Some(rest) = overflow {
        write_text_element(writer, BytesStart::new("note"), rest)?;
    }
    for note in &meal.notes {
        write_text_element(writer, BytesStart::new("note"), note)?;
    }

    for (tier, price) in &meal.prices {
        let mut price_start = BytesStart::new("price");
        price_start.push_attribute(("role", tier.as_role()));
        write_text_element(writer, price_start, &format!("{:.2}", price))?;
    }

    writer.write_event(Event::End(BytesEnd::new("meal")))?;
    Ok(())
}

fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.char_indices().nth(MAX_MEAL_NAME_CHARS) {
        Some((cut, _)) => (&name[..cut], Some(name[cut..].trim())),
        None => (name, None),
    }
}

fn write_optional<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    text: &str,
) -> Result<(), FeedError> {
    if text.is_empty() {
        return Ok(());
    }
    write_text_element(writer, BytesStart::new(tag), text)
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    start: BytesStart,
    text: &str,
) -> Result<(), FeedError> {
    let end = start.to_end().into_owned();
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(end))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::{PriceTier, Prices};

    fn canteen() -> CanteenMeta {
        CanteenMeta {
            key: "tu-hardenberg".into(),
            name: "Mensa TU Hardenbergstraße".into(),
            street: "Hardenbergstraße 34".into(),
            city: "Berlin".into(),
            id: 321,
            url: "https://example.org/feeds/tu-hardenberg.xml".into(),
            source: "https://www.stw.berlin/mensen.html".into(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    fn meal(category: &str, name: &str) -> Meal {
        Meal {
            category: category.into(),
            name: name.into(),
            notes: vec!["vegan".into()],
            prices: Prices::from([(PriceTier::Student, 1.15), (PriceTier::Other, 1.42)]),
            allergens: vec![],
        }
    }

    #[test]
    fn renders_days_sorted_with_closed_marker() {
        let mut builder = FeedBuilder::new();
        builder.add_day_menu(&DayMenu::new(day(30), vec![meal("Essen", "Gulasch")]));
        builder.add_day_menu(&DayMenu::closed(day(29)));

        let xml = builder.to_xml(&canteen()).unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"<openmensa version="2.1" xmlns="http://openmensa.org/open-mensa-v2""#));
        assert!(xml.contains("<name>Mensa TU Hardenbergstraße</name>"));
        assert!(xml.contains("<address>Hardenbergstraße 34</address>"));

        let closed_day = xml.find(r#"<day date="2025-10-29">"#).unwrap();
        let open_day = xml.find(r#"<day date="2025-10-30">"#).unwrap();
        assert!(closed_day < open_day);
        assert_eq!(xml.matches("<closed/>").count(), 1);

        assert!(xml.contains(r#"<category name="Essen">"#));
        assert!(xml.contains("<name>Gulasch</name>"));
        assert!(xml.contains("<note>vegan</note>"));
        assert!(xml.contains(r#"<price role="student">1.15</price>"#));
        assert!(xml.contains(r#"<price role="other">1.42</price>"#));
        assert!(!xml.contains(r#"role="employee""#));
    }

    #[test]
    fn categories_are_grouped_in_first_seen_order() {
        let mut builder = FeedBuilder::new();
        builder.extend(&[DayMenu::new(
            day(30),
            vec![
                meal("Essen", "Gulasch"),
                meal("Beilagen", "Reis"),
                meal("Essen", "Curry"),
            ],
        )]);

        let xml = builder.to_xml(&canteen()).unwrap();
        assert_eq!(xml.matches("<category ").count(), 2);
        let essen = xml.find(r#"name="Essen""#).unwrap();
        let curry = xml.find("<name>Curry</name>").unwrap();
        let beilagen = xml.find(r#"name="Beilagen""#).unwrap();
        assert!(essen < curry && curry < beilagen);
    }

    #[test]
    fn meals_reopen_a_closed_day() {
        let mut builder = FeedBuilder::new();
        builder.add_day_menu(&DayMenu::closed(day(30)));
        builder.add_day_menu(&DayMenu::new(day(30), vec![meal("Essen", "Gulasch")]));

        assert_eq!(builder.day_count(), 1);
        assert!(!builder.to_xml(&canteen()).unwrap().contains("<closed/>"));
    }

    #[test]
    fn text_is_escaped() {
        let mut builder = FeedBuilder::new();
        builder.add_day_menu(&DayMenu::new(day(30), vec![meal("Pasta & Co", "Nudeln <hausgemacht>")]));

        let xml = builder.to_xml(&canteen()).unwrap();
        assert!(xml.contains(r#"<category name="Pasta &amp; Co">"#));
        assert!(xml.contains("<name>Nudeln &lt;hausgemacht&gt;</name>"));
    }

    #[test]
    fn long_names_overflow_into_notes() {
        let long = "ä".repeat(MAX_MEAL_NAME_CHARS + 5);
        let (name, rest) = split_name(&long);
        assert_eq!(name.chars().count(), MAX_MEAL_NAME_CHARS);
        assert_eq!(rest, Some("äääää"));
        assert_eq!(split_name("Gulasch"), ("Gulasch", None));
    }

    #[test]
    fn meta_document_has_feed_and_schedule() {
        let xml = build_meta_xml(&canteen()).unwrap();
        assert!(xml.contains(r#"<feed name="full">"#));
        assert!(xml.contains(
            r#"<schedule dayOfMonth="*" dayOfWeek="*" hour="7,9" minute="10" retry="65 1 1440"/>"#
        ));
        assert!(xml.contains("<url>https://example.org/feeds/tu-hardenberg.xml</url>"));
        assert!(xml.contains("<source>https://www.stw.berlin/mensen.html</source>"));
        assert!(xml.contains("<city>Berlin</city>"));
    }

    #[test]
    fn meta_document_without_url_has_no_feed() {
        let mut c = canteen();
        c.url.clear();
        c.street.clear();
        let xml = build_meta_xml(&c).unwrap();
        assert!(!xml.contains("<feed"));
        assert!(!xml.contains("<address>"));
    }
}
