use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, prelude::*};

use reelforge::app::App;
use reelforge::config::{APP_DIR_NAME, Config};
use reelforge::pipeline::fs_ops::ensure_dir;

const LOG_FILE_NAME: &str = "reelforge.log";

/// Sends tracing output to a file, since the terminal belongs to the UI.
fn init_logging() -> Result<PathBuf> {
    let dir = dirs::cache_dir()
        .context("No cache directory available")?
        .join(APP_DIR_NAME);
    fs::create_dir_all(&dir)?;
    let path = dir.join(LOG_FILE_NAME);
    let file = File::create(&path).with_context(|| format!("Cannot open {}", path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(env_filter),
        )
        .init();
    Ok(path)
}

fn run() -> Result<()> {
    match init_logging() {
        Ok(path) => info!(log = %path.display(), "starting reelforge"),
        Err(e) => eprintln!("Logging disabled: {:#}", e),
    }

    let (config, warning) = Config::load();
    if let Some(warning) = &warning {
        warn!("{}", warning);
    }

    ensure_dir(&config.download_dir).with_context(|| {
        format!(
            "Cannot create download folder {}",
            config.download_dir.display()
        )
    })?;

    let picker = ratatui_image::picker::Picker::from_query_stdio().unwrap_or_else(|e| {
        warn!("Failed to query terminal ({}), using fallback", e);
        ratatui_image::picker::Picker::from_fontsize((8, 16))
    });

    let mut app = App::new(config, picker)?;
    if let Some(warning) = warning {
        app.logs.add_log(format!("Warning: {}", warning));
    }
    app.run()
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
