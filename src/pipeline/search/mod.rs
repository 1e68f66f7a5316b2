// Image search providers and the dispatcher that streams thumbnails

pub mod bing;
pub mod brave;
pub mod duckduckgo;

use anyhow::Result;
use crossbeam_channel::Sender;
use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::event::{AppMsg, SearchEvent};
use crate::model::search::{ImageHit, SearchResultItem};

pub use bing::BingSearch;
pub use brave::BraveSearch;
pub use duckduckgo::DuckDuckGoSearch;

/// Providers are asked for this many extra hits to make up for thumbnails
/// that fail to download.
pub const RESULT_SLACK: usize = 10;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{0} API key not provided")]
    MissingCredentials(&'static str),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("could not obtain a search token")]
    MissingToken,
}

pub trait ImageSearch: Send {
    fn name(&self) -> &'static str;

    fn search(&self, keywords: &str, max_results: usize) -> Result<Vec<ImageHit>, SearchError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchEngine {
    #[default]
    DuckDuckGo,
    Bing,
    Brave,
}

impl SearchEngine {
    pub fn all() -> [SearchEngine; 3] {
        [SearchEngine::DuckDuckGo, SearchEngine::Bing, SearchEngine::Brave]
    }

    pub fn name(&self) -> &'static str {
        match self {
            SearchEngine::DuckDuckGo => "DuckDuckGo",
            SearchEngine::Bing => "Bing",
            SearchEngine::Brave => "Brave",
        }
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|e| e == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|e| e == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }

    pub fn provider(&self, client: Client, config: &Config) -> Box<dyn ImageSearch> {
        match self {
            SearchEngine::DuckDuckGo => Box::new(DuckDuckGoSearch::new(client)),
            SearchEngine::Bing => Box::new(BingSearch::new(client, config.bing_api_key.clone())),
            SearchEngine::Brave => {
                Box::new(BraveSearch::new(client, config.brave_api_key.clone()))
            }
        }
    }
}

/// Queries `provider` and streams up to `max_results` thumbnails into
/// `thumbs`. `fetch` downloads one thumbnail. A `Complete` marker is always
/// sent last. Returns the number of thumbnails sent.
pub fn run_search<F>(
    provider: &dyn ImageSearch,
    keywords: &str,
    max_results: usize,
    mut fetch: F,
    tx: &Sender<AppMsg>,
    thumbs: &Sender<SearchEvent>,
) -> usize
where
    F: FnMut(&str) -> Result<Vec<u8>>,
{
    let name = provider.name();
    let _ = tx.send(AppMsg::Status(format!(
        "Searching {} for '{}'...",
        name, keywords
    )));
    info!(provider = name, keywords, "starting image search");

    let mut sent = 0;
    match provider.search(keywords, max_results + RESULT_SLACK) {
        Ok(hits) => {
            for hit in hits {
                if sent >= max_results {
                    break;
                }
                match fetch(&hit.thumb_url) {
                    Ok(thumbnail) => {
                        let item = SearchResultItem {
                            thumbnail,
                            full_url: hit.full_url,
                            thumb_url: hit.thumb_url,
                        };
                        if thumbs.send(SearchEvent::Thumbnail(item)).is_err() {
                            break;
                        }
                        sent += 1;
                    }
                    Err(e) => {
                        warn!(url = %hit.thumb_url, "thumbnail skipped: {:#}", e);
                        let _ = tx.send(AppMsg::LogMessage(format!(
                            "Failed to download thumbnail {}: {:#}",
                            hit.thumb_url, e
                        )));
                    }
                }
            }
            let _ = tx.send(AppMsg::Status(format!(
                "Found {} potential thumbnails ({}).",
                sent, name
            )));
            info!(provider = name, sent, "image search finished");
        }
        Err(e) => {
            warn!(provider = name, "image search failed: {}", e);
            let _ = tx.send(AppMsg::Status(format!(
                "Error during {} search: {}",
                name, e
            )));
        }
    }

    let _ = thumbs.send(SearchEvent::Complete);
    sent
}
