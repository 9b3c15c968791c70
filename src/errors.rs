use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream answered {0} for {1}")]
    Status(u16, String),
    #[error("PDF text extraction failed: {0}")]
    PdfExtract(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("canteen registry could not be read: {0}")]
    Io(#[from] std::io::Error),
    #[error("canteen registry is malformed: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("writing feed failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML serialization failed: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("feed is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}
