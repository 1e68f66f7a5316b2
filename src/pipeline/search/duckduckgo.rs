use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{ImageSearch, SearchError};
use crate::model::search::ImageHit;

const BASE_URL: &str = "https://duckduckgo.com/";
const IMAGES_URL: &str = "https://duckduckgo.com/i.js";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_PAGES: usize = 3;

#[derive(Debug, Deserialize)]
struct DdgResponse {
    #[serde(default)]
    results: Vec<DdgResult>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DdgResult {
    thumbnail: Option<String>,
    image: Option<String>,
}

pub struct DuckDuckGoSearch {
    client: Client,
}

impl DuckDuckGoSearch {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn fetch_token(&self, keywords: &str) -> Result<String, SearchError> {
        let html = self
            .client
            .get(BASE_URL)
            .query(&[("q", keywords)])
            .timeout(REQUEST_TIMEOUT)
            .send()?
            .error_for_status()?
            .text()?;
        extract_vqd(&html).ok_or(SearchError::MissingToken)
    }

    fn fetch_page(
        &self,
        keywords: &str,
        vqd: &str,
        offset: Option<&str>,
    ) -> Result<(Vec<ImageHit>, Option<String>), SearchError> {
        let mut query = vec![
            ("l", "wt-wt"),
            ("o", "json"),
            ("q", keywords),
            ("vqd", vqd),
            ("f", ",,,,,"),
            ("p", "1"),
        ];
        if let Some(s) = offset {
            query.push(("s", s));
        }

        let body = self
            .client
            .get(IMAGES_URL)
            .query(&query)
            .header(reqwest::header::REFERER, BASE_URL)
            .timeout(REQUEST_TIMEOUT)
            .send()?
            .error_for_status()?
            .text()?;
        parse_page(&body)
    }
}

impl ImageSearch for DuckDuckGoSearch {
    fn name(&self) -> &'static str {
        "DuckDuckGo"
    }

    fn search(&self, keywords: &str, max_results: usize) -> Result<Vec<ImageHit>, SearchError> {
        let vqd = self.fetch_token(keywords)?;

        let mut hits = Vec::new();
        let mut offset: Option<String> = None;
        for _ in 0..MAX_PAGES {
            let (page, next) = self.fetch_page(keywords, &vqd, offset.as_deref())?;
            hits.extend(page);
            if hits.len() >= max_results {
                break;
            }
            match next.as_deref().and_then(next_offset) {
                Some(s) => offset = Some(s),
                None => break,
            }
        }

        hits.truncate(max_results);
        Ok(hits)
    }
}

/// Pulls the `vqd` token out of the DuckDuckGo landing page.
pub fn extract_vqd(html: &str) -> Option<String> {
    for (prefix, terminator) in [("vqd=\"", '"'), ("vqd='", '\''), ("vqd=", '&')] {
        if let Some(start) = html.find(prefix) {
            let rest = &html[start + prefix.len()..];
            let end = rest
                .find(|c: char| c == terminator || c == '"' || c == '\'' || c.is_whitespace())
                .unwrap_or(rest.len());
            let token = &rest[..end];
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }
    None
}

fn parse_page(body: &str) -> Result<(Vec<ImageHit>, Option<String>), SearchError> {
    let response: DdgResponse = serde_json::from_str(body)?;
    let hits = response
        .results
        .iter()
        .filter_map(|r| ImageHit::new(r.thumbnail.as_deref(), r.image.as_deref()))
        .collect();
    Ok((hits, response.next))
}

/// Reads the `s=` offset from a `next` link such as `i.js?q=cats&s=100&...`.
fn next_offset(next: &str) -> Option<String> {
    let query = next.split_once('?').map(|(_, q)| q).unwrap_or(next);
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == "s")
        .map(|(_, v)| v.to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_vqd_variants() {
        assert_eq!(
            extract_vqd(r#"<script>vqd="4-1234567890";</script>"#).as_deref(),
            Some("4-1234567890")
        );
        assert_eq!(extract_vqd("nrj('/d.js?q=x&vqd='4-99'&p=1')").as_deref(), Some("4-99"));
        assert_eq!(extract_vqd("/t.js?vqd=4-abc&l=us-en").as_deref(), Some("4-abc"));
        assert_eq!(extract_vqd("<html>no token</html>"), None);
    }

    #[test]
    fn test_parse_page_skips_incomplete_results() {
        let body = r#"{
            "results": [
                {"thumbnail": "https://t/1.jpg", "image": "https://i/1.jpg", "title": "one"},
                {"thumbnail": "https://t/2.jpg"},
                {"image": "https://i/3.jpg"}
            ],
            "next": "i.js?q=cats&o=json&p=1&s=100&u=bing&f=,,,&l=wt-wt"
        }"#;
        let (hits, next) = parse_page(body).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].full_url, "https://i/1.jpg");
        assert_eq!(next.as_deref().and_then(next_offset).as_deref(), Some("100"));
    }

    #[test]
    fn test_parse_page_rejects_garbage() {
        assert!(matches!(parse_page("<html>"), Err(SearchError::Parse(_))));
    }

    #[test]
    fn test_next_offset_missing() {
        assert_eq!(next_offset("i.js?q=cats&o=json"), None);
    }
}
