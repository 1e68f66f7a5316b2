// Turns downloaded files into clip descriptions the planner can lay out

use anyhow::{Context, Result, bail};
use image::AnimationDecoder;
use image::codecs::gif::GifDecoder;
use rayon::prelude::*;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::pipeline::fs_ops::{display_name, has_extension};

pub const MIN_CLIP_SECS: f64 = 1.0;
pub const SHORT_ANIMATION_SECS: f64 = 0.1;
pub const SHORT_ANIMATION_FALLBACK_SECS: f64 = 0.5;
/// Frame delays under 20 ms play at 100 ms, as ffmpeg's gif demuxer does.
const GIF_MIN_DELAY_MS: f64 = 20.0;
const GIF_DEFAULT_DELAY_MS: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipKind {
    Still,
    Animated,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClipSource {
    pub path: PathBuf,
    pub kind: ClipKind,
    pub duration: f64,
    pub width: u32,
    pub height: u32,
}

/// Even split of the target length, never under one second.
pub fn per_clip_duration(target_secs: f64, count: usize) -> f64 {
    if count == 0 {
        return target_secs.max(MIN_CLIP_SECS);
    }
    (target_secs / count as f64).max(MIN_CLIP_SECS)
}

/// Animated clips play at most once and never longer than their slot.
pub fn animated_duration(per_clip: f64, animation_secs: f64) -> f64 {
    let secs = per_clip.min(animation_secs);
    if secs < SHORT_ANIMATION_SECS {
        SHORT_ANIMATION_FALLBACK_SECS
    } else {
        secs
    }
}

fn frame_delay_ms(numer: u32, denom: u32) -> f64 {
    let ms = if denom > 0 {
        numer as f64 / denom as f64
    } else {
        0.0
    };
    if ms < GIF_MIN_DELAY_MS {
        GIF_DEFAULT_DELAY_MS
    } else {
        ms
    }
}

/// Playback length of one pass through a GIF, or `None` for a single-frame GIF.
pub fn gif_length(path: &Path) -> Result<Option<f64>> {
    let reader = BufReader::new(File::open(path)?);
    let decoder = GifDecoder::new(reader).context("Failed to read GIF header")?;
    let mut frames = 0usize;
    let mut total_ms = 0.0;
    for frame in decoder.into_frames() {
        let frame = frame.context("Failed to decode GIF frame")?;
        let (numer, denom) = frame.delay().numer_denom_ms();
        total_ms += frame_delay_ms(numer, denom);
        frames += 1;
    }
    Ok((frames > 1).then_some(total_ms / 1000.0))
}

pub fn probe_clip(path: &Path, per_clip: f64) -> Result<ClipSource> {
    let (width, height) = image::ImageReader::open(path)?
        .with_guessed_format()?
        .into_dimensions()
        .context("Unreadable image")?;
    if width == 0 || height == 0 {
        bail!("Invalid dimensions {}x{}", width, height);
    }

    let animation = if has_extension(path, &["gif"]) {
        gif_length(path)?
    } else {
        None
    };
    // Single-frame GIFs are looped like any other still.
    let (kind, duration) = match animation {
        Some(secs) => (ClipKind::Animated, animated_duration(per_clip, secs)),
        None => (ClipKind::Still, per_clip),
    };

    Ok(ClipSource {
        path: path.to_path_buf(),
        kind,
        duration,
        width,
        height,
    })
}

/// Probes every path in parallel. Failures are reported through `log_fn` and
/// skipped, and the surviving clips keep their input order.
pub fn probe_clips<F>(paths: &[PathBuf], per_clip: f64, log_fn: F) -> Vec<ClipSource>
where
    F: Fn(String) + Sync,
{
    let total = paths.len();
    let results: Vec<(String, Result<ClipSource>)> = paths
        .par_iter()
        .enumerate()
        .map(|(idx, path)| {
            let name = display_name(path);
            log_fn(format!("Processing clip {}/{}: {}", idx + 1, total, name));
            (name, probe_clip(path, per_clip))
        })
        .collect();

    results
        .into_iter()
        .filter_map(|(name, result)| match result {
            Ok(clip) => Some(clip),
            Err(e) => {
                log_fn(format!("Error processing {}: {:#}. Skipping.", name, e));
                None
            }
        })
        .collect()
}
