// Lays probed clips out on a timeline and renders the ffmpeg invocation

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::probe::{ClipKind, ClipSource};
use crate::model::options::{TransitionStyle, VideoOptions};

pub const FADE_SECS: f64 = 0.5;
pub const ZOOM_AMOUNT: f64 = 0.05;
pub const CAPTION_FONT_SIZE: u32 = 70;
pub const CAPTION_MARGIN: u32 = 120;
pub const ENCODER_THREADS: u32 = 4;

#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub font: String,
}

#[derive(Clone, Debug)]
pub struct VideoPlan {
    pub clips: Vec<ClipSource>,
    pub settings: RenderSettings,
    pub options: VideoOptions,
}

impl VideoPlan {
    pub fn new(clips: Vec<ClipSource>, settings: RenderSettings, options: VideoOptions) -> Self {
        Self {
            clips,
            settings,
            options,
        }
    }

    fn frame_secs(&self) -> f64 {
        1.0 / self.settings.fps.max(1) as f64
    }

    /// Overlap between adjacent clips, if crossfading applies at all. It is
    /// kept one frame shorter than the shortest clip.
    pub fn transition(&self) -> Option<f64> {
        if self.options.transition != TransitionStyle::Crossfade || self.clips.len() < 2 {
            return None;
        }
        let wanted = self.options.transition_secs;
        if wanted <= 0.0 {
            return None;
        }
        let shortest = self
            .clips
            .iter()
            .map(|c| c.duration)
            .fold(f64::INFINITY, f64::min);
        let ceiling = shortest - self.frame_secs();
        (ceiling > 0.0).then(|| wanted.min(ceiling))
    }

    pub fn total_duration(&self) -> f64 {
        let sum: f64 = self.clips.iter().map(|c| c.duration).sum();
        let overlap = self.transition().unwrap_or(0.0);
        sum - overlap * self.clips.len().saturating_sub(1) as f64
    }

    /// Start time of each crossfade, one per clip after the first.
    pub fn xfade_offsets(&self) -> Vec<f64> {
        let overlap = self.transition().unwrap_or(0.0);
        let mut elapsed = 0.0;
        self.clips
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, _)| {
                elapsed += self.clips[k - 1].duration;
                elapsed - overlap * k as f64
            })
            .collect()
    }

    fn clip_filter(&self, idx: usize, clip: &ClipSource) -> String {
        let RenderSettings {
            width, height, fps, ..
        } = self.settings;
        let frames = (clip.duration * fps as f64).ceil().max(1.0);

        let mut chain = vec![format!("fps={}", fps)];
        if clip.kind == ClipKind::Animated {
            // Hold the last frame when the animation ends before its slot.
            chain.push(format!(
                "tpad=stop_mode=clone:stop_duration={:.3}",
                clip.duration
            ));
        }
        chain.extend([
            format!(
                "scale={}:{}:force_original_aspect_ratio=increase",
                width, height
            ),
            format!("crop={}:{}", width, height),
            format!(
                "zoompan=z='1+{}*on/{}':x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)':d=1:s={}x{}:fps={}",
                ZOOM_AMOUNT, frames, width, height, fps
            ),
        ]);
        if let Some(factor) = self.options.filter.factor() {
            chain.push(format!(
                "colorchannelmixer=rr={f}:gg={f}:bb={f}",
                f = factor
            ));
        }
        chain.push("setsar=1".to_string());
        chain.push("format=yuv420p".to_string());
        chain.push(format!("trim=duration={:.3}", clip.duration));
        chain.push("setpts=PTS-STARTPTS".to_string());
        chain.push("settb=AVTB".to_string());

        format!("[{}:v]{}[v{}]", idx, chain.join(","), idx)
    }

    /// The full `-filter_complex` graph. Its output pad is `[vout]`.
    pub fn filter_graph(&self, caption_file: Option<&Path>) -> String {
        let mut parts: Vec<String> = self
            .clips
            .iter()
            .enumerate()
            .map(|(i, clip)| self.clip_filter(i, clip))
            .collect();

        let joined = match (self.clips.len(), self.transition()) {
            (1, _) => "v0".to_string(),
            (n, Some(overlap)) => {
                let mut previous = "v0".to_string();
                for (k, offset) in self.xfade_offsets().into_iter().enumerate() {
                    let label = format!("x{}", k + 1);
                    parts.push(format!(
                        "[{}][v{}]xfade=transition=fade:duration={:.3}:offset={:.3}[{}]",
                        previous,
                        k + 1,
                        overlap,
                        offset,
                        label
                    ));
                    previous = label;
                }
                debug_assert_eq!(previous, format!("x{}", n - 1));
                previous
            }
            (n, None) => {
                let inputs: String = (0..n).map(|i| format!("[v{}]", i)).collect();
                parts.push(format!("{}concat=n={}:v=1:a=0[vcat]", inputs, n));
                "vcat".to_string()
            }
        };

        let total = self.total_duration();
        let mut post = vec![
            format!("fade=t=in:st=0:d={}", FADE_SECS),
            format!(
                "fade=t=out:st={:.3}:d={}",
                (total - FADE_SECS).max(0.0),
                FADE_SECS
            ),
        ];
        if let Some(file) = caption_file {
            post.push(format!(
                "drawtext=textfile='{}':font='{}':fontsize={}:fontcolor=white:line_spacing=12:x=(w-text_w)/2:y=h-text_h-{}",
                escape_filter_path(file),
                self.settings.font.replace('\'', ""),
                CAPTION_FONT_SIZE,
                CAPTION_MARGIN
            ));
        }
        parts.push(format!("[{}]{}[vout]", joined, post.join(",")));

        parts.join(";")
    }

    /// Command-line arguments for ffmpeg, excluding the program itself.
    pub fn ffmpeg_args(&self, caption_file: Option<&Path>, output: &Path) -> Vec<OsString> {
        let fps = self.settings.fps.to_string();
        let mut args: Vec<OsString> = ["-hide_banner", "-nostats", "-loglevel", "error"]
            .into_iter()
            .map(OsString::from)
            .collect();

        for clip in &self.clips {
            if clip.kind == ClipKind::Still {
                args.extend(["-loop", "1", "-framerate", fps.as_str()].map(OsString::from));
            }
            let duration = format!("{:.3}", clip.duration);
            args.extend(["-t", duration.as_str(), "-i"].map(OsString::from));
            args.push(clip.path.as_os_str().to_owned());
        }

        let music: Option<&PathBuf> = self.options.existing_music();
        if let Some(music) = music {
            args.push(OsString::from("-i"));
            args.push(music.as_os_str().to_owned());
        }

        let graph = self.filter_graph(caption_file);
        args.extend(["-filter_complex", graph.as_str(), "-map", "[vout]"].map(OsString::from));
        if music.is_some() {
            let audio_map = format!("{}:a", self.clips.len());
            args.extend(
                ["-map", audio_map.as_str(), "-c:a", "aac", "-b:a", "192k"].map(OsString::from),
            );
        }
        let total = format!("{:.3}", self.total_duration());
        let threads = ENCODER_THREADS.to_string();
        args.extend(
            [
                "-t", total.as_str(),
                "-c:v", "libx264",
                "-preset", "medium",
                "-pix_fmt", "yuv420p",
                "-r", fps.as_str(),
                "-threads", threads.as_str(),
                "-movflags", "+faststart",
                "-progress", "pipe:1",
                "-y",
            ]
            .map(OsString::from),
        );
        args.push(output.as_os_str().to_owned());
        args
    }
}

/// Escapes a path for use inside a quoted filter option.
pub fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .replace('\'', "")
        .replace(':', "\\:")
}

/// Wraps caption text so each line fits across the frame at the caption
/// font size.
pub fn wrap_caption(text: &str, frame_width: u32) -> String {
    let columns = ((frame_width as f64 / (CAPTION_FONT_SIZE as f64 * 0.6)).floor() as usize).max(1);
    textwrap::wrap(text.trim(), columns).join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::options::ColorFilter;

    fn settings() -> RenderSettings {
        RenderSettings {
            width: 1080,
            height: 1920,
            fps: 24,
            font: "Arial".to_string(),
        }
    }

    fn still(name: &str, duration: f64) -> ClipSource {
        ClipSource {
            path: PathBuf::from(name),
            kind: ClipKind::Still,
            duration,
            width: 800,
            height: 600,
        }
    }

    fn plan(durations: &[f64], options: VideoOptions) -> VideoPlan {
        let clips = durations
            .iter()
            .enumerate()
            .map(|(i, d)| still(&format!("{}.jpg", i), *d))
            .collect();
        VideoPlan::new(clips, settings(), options)
    }

    #[test]
    fn test_crossfade_shortens_total_and_offsets() {
        let plan = plan(&[10.0, 10.0, 10.0], VideoOptions::default());
        assert_eq!(plan.transition(), Some(0.5));
        assert_eq!(plan.total_duration(), 29.0);
        assert_eq!(plan.xfade_offsets(), vec![9.5, 19.0]);
    }

    #[test]
    fn test_no_transition_concatenates() {
        let options = VideoOptions {
            transition: TransitionStyle::None,
            ..VideoOptions::default()
        };
        let plan = plan(&[10.0, 10.0], options);
        assert_eq!(plan.transition(), None);
        assert_eq!(plan.total_duration(), 20.0);
        let graph = plan.filter_graph(None);
        assert!(graph.contains("[v0][v1]concat=n=2:v=1:a=0[vcat]"));
        assert!(graph.contains("[vcat]fade=t=in:st=0:d=0.5,fade=t=out:st=19.500:d=0.5[vout]"));
        assert!(!graph.contains("xfade"));
    }

    #[test]
    fn test_transition_clamped_to_shortest_clip() {
        let options = VideoOptions {
            transition_secs: 5.0,
            ..VideoOptions::default()
        };
        let plan = plan(&[2.0, 10.0], options);
        let overlap = plan.transition().unwrap();
        assert!(overlap < 2.0 && overlap > 1.9);
    }

    #[test]
    fn test_single_clip_has_no_join() {
        let plan = plan(&[60.0], VideoOptions::default());
        assert_eq!(plan.transition(), None);
        let graph = plan.filter_graph(None);
        assert!(graph.ends_with("[v0]fade=t=in:st=0:d=0.5,fade=t=out:st=59.500:d=0.5[vout]"));
    }

    #[test]
    fn test_filter_and_caption_in_graph() {
        let options = VideoOptions {
            filter: ColorFilter::Vintage,
            ..VideoOptions::default()
        };
        let plan = plan(&[3.0, 3.0], options);
        let graph = plan.filter_graph(Some(Path::new("C:\\tmp\\cap.txt")));
        assert!(graph.contains("colorchannelmixer=rr=0.8:gg=0.8:bb=0.8"));
        assert!(graph.contains("[v0][v1]xfade=transition=fade:duration=0.500:offset=2.500[x1]"));
        assert!(graph.contains("drawtext=textfile='C\\:/tmp/cap.txt':font='Arial':fontsize=70"));
        assert!(graph.contains("zoompan=z='1+0.05*on/72'"));
    }

    #[test]
    fn test_args_layout() {
        let mut plan = plan(&[4.0, 4.0], VideoOptions::default());
        plan.clips[1].kind = ClipKind::Animated;
        let args: Vec<String> = plan
            .ffmpeg_args(None, Path::new("out.mp4"))
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect();

        let first_input = args.iter().position(|a| a == "0.jpg").unwrap();
        assert_eq!(
            &args[first_input - 7..first_input],
            &["-loop", "1", "-framerate", "24", "-t", "4.000", "-i"]
        );
        let second_input = args.iter().position(|a| a == "1.jpg").unwrap();
        assert_eq!(&args[second_input - 3..second_input], &["-t", "4.000", "-i"]);
        let graph = plan.filter_graph(None);
        assert!(!graph.contains("[0:v]fps=24,tpad"));
        assert!(graph.contains("[1:v]fps=24,tpad=stop_mode=clone:stop_duration=4.000,"));
        assert!(!args.iter().any(|a| a == "-c:a"));
        assert_eq!(args.last().unwrap(), "out.mp4");
        let t = args.iter().rposition(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "7.500");
    }

    #[test]
    fn test_wrap_caption() {
        let wrapped = wrap_caption("  this caption is definitely longer than one line  ", 1080);
        assert!(wrapped.lines().count() >= 2);
        assert!(wrapped.lines().all(|l| l.chars().count() <= 25));
    }
}
