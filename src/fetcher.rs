use std::time::{Duration, Instant};

use chrono::NaiveDate;
use rand::Rng;
use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::constants::{REQUEST_TIMEOUT_SECS, STW_DAY_URL, STW_ORIGIN, STW_REFERER, USER_AGENT};
use crate::errors::FetchError;

/// HTTP access to both upstreams.
///
/// The stw.berlin endpoint only answers requests that look like the XHR of
/// its own menu page, so those carry the browser headers.
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Fetcher { client })
    }

    pub async fn post_day_fragment(
        &self,
        resource_id: u32,
        date: NaiveDate,
    ) -> Result<String, FetchError> {
        let form = [
            ("resources_id", resource_id.to_string()),
            ("date", date.format("%Y-%m-%d").to_string()),
        ];

        let now = Instant::now();
        let resp = self
            .client
            .post(STW_DAY_URL)
            .headers(xhr_headers())
            .form(&form)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(
                resp.status().as_u16(),
                STW_DAY_URL.to_string(),
            ));
        }

        let html_text = resp.text().await?;
        log::debug!(
            "stw.berlin response for {} @ {}: {:.2?}",
            resource_id,
            date,
            now.elapsed()
        );

        Ok(html_text)
    }

    pub async fn get_pdf_text(&self, url: &str) -> Result<String, FetchError> {
        let now = Instant::now();
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16(), url.to_string()));
        }

        let pdf_bytes = resp.bytes().await?;
        log::debug!("got {} PDF bytes after {:.2?}", pdf_bytes.len(), now.elapsed());

        let now = Instant::now();
        let text = pdf_extract::extract_text_from_mem(&pdf_bytes)
            .map_err(|e| FetchError::PdfExtract(e.to_string()))?;
        log::debug!("PDF text extraction: {:.2?}", now.elapsed());

        Ok(text)
    }
}

/// Headers of the menu page's own XHR, only the day endpoint wants them.
fn xhr_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::REFERER, HeaderValue::from_static(STW_REFERER));
    headers.insert(header::ORIGIN, HeaderValue::from_static(STW_ORIGIN));
    headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
    headers
}

/// Sleeps `base_ms` plus up to a quarter of it as jitter, to space out
/// requests to the same upstream.
pub async fn pace(base_ms: u64) {
    if base_ms == 0 {
        return;
    }
    let jitter = rand::thread_rng().gen_range(0..=base_ms / 4);
    tokio::time::sleep(Duration::from_millis(base_ms + jitter)).await;
}
