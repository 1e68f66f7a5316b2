pub mod ffmpeg;
pub mod plan;
pub mod probe;

use anyhow::{Context, Result, bail};
use crossbeam_channel::Sender;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::Config;
use crate::event::AppMsg;
use crate::model::options::VideoOptions;
use crate::pipeline::fs_ops::display_name;
use plan::{RenderSettings, VideoPlan, wrap_caption};

/// Builds the video for `paths` in order and writes it to the configured
/// output file. Progress and per-clip problems are reported on `tx`; the
/// returned error is the terminal one.
pub fn create_video(
    paths: &[PathBuf],
    options: &VideoOptions,
    config: &Config,
    tx: &Sender<AppMsg>,
) -> Result<PathBuf> {
    let log = |msg: String| {
        let _ = tx.send(AppMsg::LogMessage(msg));
    };

    let existing: Vec<PathBuf> = paths.iter().filter(|p| p.exists()).cloned().collect();
    if existing.len() < paths.len() {
        let missing = paths.len() - existing.len();
        warn!(missing, "selected files vanished before export");
        log(format!(
            "Warning: {} selected file(s) are missing and will be skipped.",
            missing
        ));
    }
    if existing.is_empty() {
        bail!("No valid image files found to create video.");
    }

    let ffmpeg = ffmpeg::locate_ffmpeg(config.ffmpeg_path.as_deref())?;

    let per_clip = probe::per_clip_duration(config.target_duration_secs, existing.len());
    log(format!("Aiming for ~{:.2} seconds per clip.", per_clip));

    let clips = probe::probe_clips(&existing, per_clip, log);
    if clips.is_empty() {
        bail!("No clips were successfully created.");
    }

    let (width, height) = config.resolution;
    let settings = RenderSettings {
        width,
        height,
        fps: config.fps,
        font: config.font.clone(),
    };
    let plan = VideoPlan::new(clips, settings, options.clone());

    // Kept alive until ffmpeg exits.
    let caption_file = match options.caption() {
        Some(text) => {
            let mut file = tempfile::Builder::new()
                .prefix("reelforge_caption_")
                .suffix(".txt")
                .tempfile()
                .context("Failed to create caption file")?;
            file.write_all(wrap_caption(text, width).as_bytes())?;
            file.flush()?;
            Some(file)
        }
        None => None,
    };

    let output = config.output_file.clone();
    let args = plan.ffmpeg_args(caption_file.as_ref().map(|f| f.path()), &output);
    let total = plan.total_duration();
    info!(
        clips = plan.clips.len(),
        total_secs = total,
        output = %output.display(),
        "starting export"
    );

    let file_name = display_name(&output);
    let _ = tx.send(AppMsg::Status(format!("Writing video file: {}...", file_name)));
    ffmpeg::run_ffmpeg(&ffmpeg, &args, total, |percent| {
        let _ = tx.send(AppMsg::VideoProgress(percent));
    })?;

    info!(output = %output.display(), "export finished");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_all_missing_is_terminal() {
        let (tx, rx) = unbounded();
        let paths = vec![PathBuf::from("/no/such/a.png"), PathBuf::from("/no/such/b.png")];
        let err = create_video(&paths, &VideoOptions::default(), &Config::default(), &tx)
            .unwrap_err();
        assert_eq!(err.to_string(), "No valid image files found to create video.");

        let logs: Vec<String> = rx
            .try_iter()
            .filter_map(|m| match m {
                AppMsg::LogMessage(s) => Some(s),
                _ => None,
            })
            .collect();
        assert!(logs.iter().any(|l| l.contains("2 selected file(s) are missing")));
    }
}
