// Runs ffmpeg and turns its progress stream into percentages

use anyhow::{Context, Result, bail};
use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use tracing::{debug, error};
use which::which;

const STDERR_TAIL_LINES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// Seconds of output written so far.
    OutTime(f64),
    End,
}

/// Finds the ffmpeg binary: the configured path if set, otherwise PATH.
pub fn locate_ffmpeg(configured: Option<&Path>) -> Result<PathBuf> {
    match configured {
        Some(path) if path.exists() => Ok(path.to_path_buf()),
        Some(path) => bail!("Configured ffmpeg not found at {}", path.display()),
        None => which("ffmpeg").context("`ffmpeg` not found in PATH"),
    }
}

/// Parses one `key=value` line of `-progress` output.
pub fn parse_progress_line(line: &str) -> Option<Progress> {
    let (key, value) = line.trim().split_once('=')?;
    match key {
        // Despite the name ffmpeg reports microseconds here.
        "out_time_ms" | "out_time_us" => value
            .parse::<u64>()
            .ok()
            .map(|us| Progress::OutTime(us as f64 / 1_000_000.0)),
        "progress" if value == "end" => Some(Progress::End),
        _ => None,
    }
}

pub fn percent_done(out_secs: f64, total_secs: f64) -> u8 {
    if total_secs <= 0.0 {
        return 0;
    }
    ((out_secs / total_secs) * 100.0).clamp(0.0, 99.0) as u8
}

/// Runs ffmpeg to completion, reporting whole percentages through
/// `on_progress` as they change.
pub fn run_ffmpeg<F>(ffmpeg: &Path, args: &[OsString], total_secs: f64, mut on_progress: F) -> Result<()>
where
    F: FnMut(u8),
{
    debug!(program = %ffmpeg.display(), ?args, "spawning ffmpeg");
    let mut child = Command::new(ffmpeg)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("failed to spawn ffmpeg")?;

    let stderr = child.stderr.take().context("ffmpeg stderr unavailable")?;
    let stderr_thread = thread::spawn(move || {
        let mut text = String::new();
        let _ = BufReader::new(stderr).read_to_string(&mut text);
        text
    });

    let stdout = child.stdout.take().context("ffmpeg stdout unavailable")?;
    let mut last = None;
    for line in BufReader::new(stdout).lines() {
        let percent = match parse_progress_line(&line?) {
            Some(Progress::OutTime(secs)) => percent_done(secs, total_secs),
            Some(Progress::End) => 100,
            None => continue,
        };
        if last != Some(percent) {
            last = Some(percent);
            on_progress(percent);
        }
    }

    let status = child.wait()?;
    let stderr_text = stderr_thread.join().unwrap_or_default();
    if !status.success() {
        let tail: Vec<&str> = stderr_text
            .lines()
            .rev()
            .take(STDERR_TAIL_LINES)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        error!(%status, "ffmpeg failed: {}", stderr_text);
        bail!("ffmpeg failed with status {}: {}", status, tail.join(" | "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_progress_lines() {
        assert_eq!(
            parse_progress_line("out_time_ms=2500000"),
            Some(Progress::OutTime(2.5))
        );
        assert_eq!(parse_progress_line("progress=end"), Some(Progress::End));
        assert_eq!(parse_progress_line("progress=continue"), None);
        assert_eq!(parse_progress_line("frame=12"), None);
        assert_eq!(parse_progress_line("out_time_ms=N/A"), None);
        assert_eq!(parse_progress_line("garbage"), None);
    }

    #[test]
    fn test_percent_done_caps_below_complete() {
        assert_eq!(percent_done(15.0, 60.0), 25);
        assert_eq!(percent_done(70.0, 60.0), 99);
        assert_eq!(percent_done(1.0, 0.0), 0);
    }

    #[test]
    fn test_missing_configured_binary() {
        let err = locate_ffmpeg(Some(Path::new("/no/such/ffmpeg"))).unwrap_err();
        assert!(err.to_string().contains("/no/such/ffmpeg"));
    }
}
