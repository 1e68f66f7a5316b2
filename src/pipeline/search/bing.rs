use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{ImageSearch, SearchError};
use crate::model::search::ImageHit;

const ENDPOINT: &str = "https://api.bing.microsoft.com/v7.0/images/search";
const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct BingResponse {
    #[serde(default)]
    value: Vec<BingImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingImage {
    thumbnail_url: Option<String>,
    content_url: Option<String>,
}

pub struct BingSearch {
    client: Client,
    api_key: String,
}

impl BingSearch {
    pub fn new(client: Client, api_key: String) -> Self {
        Self { client, api_key }
    }
}

impl ImageSearch for BingSearch {
    fn name(&self) -> &'static str {
        "Bing"
    }

    fn search(&self, keywords: &str, max_results: usize) -> Result<Vec<ImageHit>, SearchError> {
        if self.api_key.trim().is_empty() {
            return Err(SearchError::MissingCredentials("Bing"));
        }

        let count = max_results.to_string();
        let body = self
            .client
            .get(ENDPOINT)
            .header(KEY_HEADER, self.api_key.trim())
            .query(&[("q", keywords), ("count", count.as_str())])
            .timeout(REQUEST_TIMEOUT)
            .send()?
            .error_for_status()?
            .text()?;
        parse_response(&body)
    }
}

fn parse_response(body: &str) -> Result<Vec<ImageHit>, SearchError> {
    let response: BingResponse = serde_json::from_str(body)?;
    Ok(response
        .value
        .iter()
        .filter_map(|img| ImageHit::new(img.thumbnail_url.as_deref(), img.content_url.as_deref()))
        .collect())
}
