pub const STW_DAY_URL: &str = "https://www.stw.berlin/xhr/speiseplan-wochentag.html";
pub const STW_REFERER: &str = "https://www.stw.berlin/mensen/mensa-tu-hardenbergstrasse.html";
pub const STW_ORIGIN: &str = "https://www.stw.berlin";
pub const CAFENERO_PDF_URL: &str = "https://cafenero.net/speisekarte.pdf";

pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.1 Safari/537.36";
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

// substrings of the configured `source` that select a parser
pub const STW_SOURCE_MARKER: &str = "stw.berlin";
pub const CAFENERO_SOURCE_MARKER: &str = "cafenero";

pub const CLOSED_PHRASES: [&str; 2] = ["kein speiseplan", "kein speisenangebot"];
pub const UNKNOWN_CATEGORY: &str = "Unbekannt";

pub const LUNCH_KEYWORD: &str = "mittagstisch";
pub const DEFAULT_PDF_CATEGORY: &str = "Mittagstisch";
pub const PDF_WATERMARK: &str = "cafeneroinder";
pub const PDF_RULE: &str = "---";
pub const DIETARY_KEYWORDS: [&str; 3] = ["vegan", "vegetarisch", "fisch"];
pub const BUFFER_TERMINATORS: [&str; 4] = ["€", "vegetarisch", "vegan", "fisch"];

pub const OPENMENSA_NS: &str = "http://openmensa.org/open-mensa-v2";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const OPENMENSA_VERSION: &str = "2.1";
pub const MAX_MEAL_NAME_CHARS: usize = 250;

// dayOfMonth, dayOfWeek, hour, minute, retry
pub const DEFAULT_SCHEDULE: [(&str, &str); 5] = [
    ("dayOfMonth", "*"),
    ("dayOfWeek", "*"),
    ("hour", "7,9"),
    ("minute", "10"),
    ("retry", "65 1 1440"),
];
