// Background jobs for searching, downloading selections and exporting video

use crossbeam_channel::Sender;
use reqwest::blocking::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tracing::error;

use crate::config::Config;
use crate::event::{AppMsg, SearchEvent};
use crate::model::options::VideoOptions;
use crate::pipeline::download::{download_full_image, fetch_thumbnail};
use crate::pipeline::search::{SearchEngine, run_search};
use crate::pipeline::video::create_video;

pub struct PipelineWorker {
    tx: Sender<AppMsg>,
    thumbs: Sender<SearchEvent>,
    client: Client,
    config: Arc<Config>,
}

impl PipelineWorker {
    pub fn new(
        tx: Sender<AppMsg>,
        thumbs: Sender<SearchEvent>,
        client: Client,
        config: Arc<Config>,
    ) -> Self {
        Self {
            tx,
            thumbs,
            client,
            config,
        }
    }

    pub fn start_search(&self, engine: SearchEngine, keywords: String) {
        let tx = self.tx.clone();
        let thumbs = self.thumbs.clone();
        let client = self.client.clone();
        let config = Arc::clone(&self.config);

        thread::spawn(move || {
            let provider = engine.provider(client.clone(), &config);
            run_search(
                provider.as_ref(),
                &keywords,
                config.max_results,
                |url| fetch_thumbnail(&client, url),
                &tx,
                &thumbs,
            );
        });
    }

    pub fn start_download(&self, url: String, generation: u64) {
        let tx = self.tx.clone();
        let client = self.client.clone();
        let dir = self.config.download_dir.clone();

        thread::spawn(move || {
            let short: String = url.chars().take(50).collect();
            let _ = tx.send(AppMsg::Status(format!(
                "Downloading full image: {}...",
                short
            )));
            let result = download_full_image(&client, &url, &dir).map_err(|e| format!("{:#}", e));
            let _ = tx.send(AppMsg::DownloadFinished {
                url,
                generation,
                result,
            });
        });
    }

    pub fn start_video(&self, paths: Vec<PathBuf>, options: VideoOptions) {
        let tx = self.tx.clone();
        let config = Arc::clone(&self.config);

        thread::spawn(move || {
            let result = create_video(&paths, &options, &config, &tx).map_err(|e| {
                error!("video export failed: {:#}", e);
                format!("{:#}", e)
            });
            let _ = tx.send(AppMsg::VideoFinished(result));
        });
    }
}
