use serde::{Deserialize, Serialize};

use crate::constants::{CAFENERO_SOURCE_MARKER, STW_SOURCE_MARKER};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CanteenMeta {
    #[serde(skip_deserializing)]
    pub key: String,
    pub name: String,
    pub street: String,
    pub city: String,
    pub id: u32,
    pub url: String,
    pub source: String,
}

/// Upstream vendor of a canteen, picked from its configured `source`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Source {
    StwBerlin,
    Cafenero,
}

impl Source {
    pub fn from_source_str(source: &str) -> Option<Source> {
        if source.contains(STW_SOURCE_MARKER) {
            Some(Source::StwBerlin)
        } else if source.contains(CAFENERO_SOURCE_MARKER) {
            Some(Source::Cafenero)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_vendor_by_substring() {
        assert_eq!(
            Source::from_source_str("https://www.stw.berlin/mensen/einrichtungen/tu.html"),
            Some(Source::StwBerlin)
        );
        assert_eq!(
            Source::from_source_str("https://cafenero.net/"),
            Some(Source::Cafenero)
        );
        assert_eq!(Source::from_source_str("https://example.org"), None);
    }
}
