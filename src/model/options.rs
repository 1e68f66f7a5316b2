use std::path::PathBuf;

pub const DEFAULT_TRANSITION_SECS: f64 = 0.5;
pub const DEFAULT_OVERLAY_TEXT: &str = "Your Viral Video!";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransitionStyle {
    #[default]
    Crossfade,
    None,
}

impl TransitionStyle {
    pub fn name(&self) -> &'static str {
        match self {
            TransitionStyle::Crossfade => "Crossfade",
            TransitionStyle::None => "None",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            TransitionStyle::Crossfade => TransitionStyle::None,
            TransitionStyle::None => TransitionStyle::Crossfade,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorFilter {
    #[default]
    None,
    Vintage,
    Bright,
}

impl ColorFilter {
    pub fn all() -> [ColorFilter; 3] {
        [ColorFilter::None, ColorFilter::Vintage, ColorFilter::Bright]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorFilter::None => "None",
            ColorFilter::Vintage => "Vintage",
            ColorFilter::Bright => "Bright",
        }
    }

    /// Per-channel multiplier, or `None` when the frame is left untouched.
    pub fn factor(&self) -> Option<f64> {
        match self {
            ColorFilter::None => None,
            ColorFilter::Vintage => Some(0.8),
            ColorFilter::Bright => Some(1.2),
        }
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

/// Styling chosen in the options panel, captured when a job starts.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoOptions {
    pub transition: TransitionStyle,
    pub transition_secs: f64,
    pub overlay_text: String,
    pub filter: ColorFilter,
    pub music: Option<PathBuf>,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            transition: TransitionStyle::default(),
            transition_secs: DEFAULT_TRANSITION_SECS,
            overlay_text: DEFAULT_OVERLAY_TEXT.to_string(),
            filter: ColorFilter::default(),
            music: None,
        }
    }
}

impl VideoOptions {
    pub fn caption(&self) -> Option<&str> {
        let text = self.overlay_text.trim();
        (!text.is_empty()).then_some(text)
    }

    /// Music path if one was chosen and it is still on disk.
    pub fn existing_music(&self) -> Option<&PathBuf> {
        self.music.as_ref().filter(|p| p.exists())
    }
}

/// Parses the free-text transition duration. Anything unusable falls back to
/// the default.
pub fn parse_transition_secs(input: &str) -> f64 {
    match input.trim().parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => secs,
        _ => DEFAULT_TRANSITION_SECS,
    }
}
