use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{ImageSearch, SearchError};
use crate::model::search::ImageHit;

const ENDPOINT: &str = "https://api.search.brave.com/res/v1/images/search";
const TOKEN_HEADER: &str = "X-Subscription-Token";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_COUNT: usize = 100;

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    thumbnail: Option<BraveThumbnail>,
    properties: Option<BraveProperties>,
    url: Option<String>,
    #[serde(rename = "thumbnailUrl")]
    thumbnail_url: Option<String>,
    #[serde(rename = "contentUrl")]
    content_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BraveThumbnail {
    src: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BraveProperties {
    url: Option<String>,
}

impl BraveResult {
    fn thumb(&self) -> Option<&str> {
        self.thumbnail
            .as_ref()
            .and_then(|t| t.src.as_deref())
            .or(self.thumbnail_url.as_deref())
    }

    fn full(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.url.as_deref())
            .or(self.url.as_deref())
            .or(self.content_url.as_deref())
    }
}

pub struct BraveSearch {
    client: Client,
    api_key: String,
}

impl BraveSearch {
    pub fn new(client: Client, api_key: String) -> Self {
        Self { client, api_key }
    }
}

impl ImageSearch for BraveSearch {
    fn name(&self) -> &'static str {
        "Brave"
    }

    fn search(&self, keywords: &str, max_results: usize) -> Result<Vec<ImageHit>, SearchError> {
        if self.api_key.trim().is_empty() {
            return Err(SearchError::MissingCredentials("Brave"));
        }

        let count = max_results.min(MAX_COUNT).to_string();
        let body = self
            .client
            .get(ENDPOINT)
            .header(TOKEN_HEADER, self.api_key.trim())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("q", keywords), ("count", count.as_str())])
            .timeout(REQUEST_TIMEOUT)
            .send()?
            .error_for_status()?
            .text()?;
        parse_response(&body)
    }
}

fn parse_response(body: &str) -> Result<Vec<ImageHit>, SearchError> {
    let response: BraveResponse = serde_json::from_str(body)?;
    Ok(response
        .results
        .iter()
        .filter_map(|r| ImageHit::new(r.thumb(), r.full()))
        .collect())
}
