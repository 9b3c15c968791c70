use std::{collections::BTreeMap, path::Path};

use serde::Deserialize;

use crate::data_types::canteen_data_types::CanteenMeta;
use crate::errors::ConfigError;

#[derive(Deserialize)]
struct CanteenRegistry {
    #[serde(default)]
    canteens: BTreeMap<String, CanteenMeta>,
}

pub fn load_canteens(path: &Path) -> Result<BTreeMap<String, CanteenMeta>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let canteens = parse_canteens(&content)?;
    log::info!("Loaded {} canteens from {}", canteens.len(), path.display());

    Ok(canteens)
}

/// Reads `[canteens.<key>]` tables; the table key becomes `CanteenMeta::key`.
pub fn parse_canteens(content: &str) -> Result<BTreeMap<String, CanteenMeta>, ConfigError> {
    let registry: CanteenRegistry = toml::from_str(content)?;

    Ok(registry
        .canteens
        .into_iter()
        .map(|(key, mut canteen)| {
            canteen.key = key.clone();
            (key, canteen)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = r#"
[canteens.tu-hardenberg]
name = "Mensa TU Hardenbergstraße"
street = "Hardenbergstraße 34"
city = "Berlin"
id = 321
url = "https://example.org/feeds/tu-hardenberg.xml"
source = "https://www.stw.berlin/mensen/einrichtungen/technische-universitaet-berlin/mensa-tu-hardenbergstrasse.html"

[canteens.cafenero]
name = "Cafenero"
street = "Hardenbergstraße 34"
city = "Berlin"
id = 0
url = ""
source = "https://cafenero.net/speisekarte.pdf"
"#;

    #[test]
    fn loads_tables_keyed_and_sorted() {
        let canteens = parse_canteens(REGISTRY).unwrap();
        let keys: Vec<_> = canteens.keys().map(String::as_str).collect();
        assert_eq!(keys, ["cafenero", "tu-hardenberg"]);

        let tu = &canteens["tu-hardenberg"];
        assert_eq!(tu.key, "tu-hardenberg");
        assert_eq!(tu.id, 321);
        assert_eq!(tu.city, "Berlin");
    }

    #[test]
    fn missing_field_is_an_error() {
        let broken = "[canteens.x]\nname = \"X\"\nid = 1\n";
        assert!(matches!(parse_canteens(broken), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn wrong_id_type_is_an_error() {
        let broken = REGISTRY.replace("id = 321", "id = \"drei\"");
        assert!(parse_canteens(&broken).is_err());
    }

    #[test]
    fn empty_file_has_no_canteens() {
        assert!(parse_canteens("").unwrap().is_empty());
    }

    #[test]
    fn unreadable_file_is_io_error() {
        let err = load_canteens(Path::new("/nonexistent/canteens.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
