use crossterm::event::KeyEvent;
use std::path::PathBuf;

use crate::model::search::SearchResultItem;

#[derive(Clone, Debug)]
pub enum AppMsg {
    Tick,
    Key(KeyEvent),
    Quit,

    // Search
    StartSearch(String),
    Status(String),

    // Selection
    ToggleSelection { url: String },
    DownloadFinished {
        url: String,
        generation: u64,
        result: Result<PathBuf, String>,
    },

    // Options
    BrowseMusic,
    MusicSelected(PathBuf),
    BrowseCancelled,

    // Video
    RequestVideo,
    ConfirmVideo(bool),
    VideoProgress(u8),
    VideoFinished(Result<PathBuf, String>),

    // General
    LogMessage(String),
}

/// Messages on the thumbnail channel. One search produces any number of
/// `Thumbnail`s followed by exactly one `Complete`.
#[derive(Clone, Debug)]
pub enum SearchEvent {
    Thumbnail(SearchResultItem),
    Complete,
}
