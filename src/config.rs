use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const APP_DIR_NAME: &str = "reelforge";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Thumbnails shown per search.
    pub max_results: usize,
    /// Bounding box (px) thumbnails are shrunk to before display.
    pub thumbnail_size: u32,
    pub target_duration_secs: f64,
    pub output_file: PathBuf,
    pub download_dir: PathBuf,
    pub resolution: (u32, u32),
    pub fps: u32,
    pub font: String,
    pub ffmpeg_path: Option<PathBuf>,
    pub bing_api_key: String,
    pub brave_api_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_results: 30,
            thumbnail_size: 100,
            target_duration_secs: 60.0,
            output_file: PathBuf::from("reelforge_video.mp4"),
            download_dir: PathBuf::from("selected_images"),
            resolution: (1080, 1920),
            fps: 24,
            font: "Arial".to_string(),
            ffmpeg_path: None,
            bing_api_key: String::new(),
            brave_api_key: String::new(),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Loads the user's config file if there is one. The returned warning is
    /// set when a file existed but could not be used.
    pub fn load() -> (Self, Option<String>) {
        let mut warning = None;
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => match Self::load_from_file(&path) {
                Ok(config) => config,
                Err(e) => {
                    warning = Some(format!(
                        "Ignoring config file {}: {}",
                        path.display(),
                        e
                    ));
                    Self::default()
                }
            },
            _ => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        (config, warning)
    }

    /// Fills empty API keys from the environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.bing_api_key.trim().is_empty()
            && let Some(key) = lookup("BING_API_KEY")
        {
            self.bing_api_key = key;
        }
        if self.brave_api_key.trim().is_empty()
            && let Some(key) = lookup("BRAVE_API_KEY")
        {
            self.brave_api_key = key;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_vertical_short() {
        let config = Config::default();
        assert_eq!(config.max_results, 30);
        assert_eq!(config.resolution, (1080, 1920));
        assert_eq!(config.fps, 24);
        assert_eq!(config.target_duration_secs, 60.0);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml_str("max_results = 12\nfont = \"DejaVu Sans\"\n").unwrap();
        assert_eq!(config.max_results, 12);
        assert_eq!(config.font, "DejaVu Sans");
        assert_eq!(config.download_dir, PathBuf::from("selected_images"));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut config = Config::default();
        config.bing_api_key = "abc".to_string();
        fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.bing_api_key, "abc");
        assert_eq!(loaded.resolution, (1080, 1920));
    }

    #[test]
    fn test_malformed_file_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "max_results = \"many\"").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_env_fills_only_empty_keys() {
        let mut config = Config::default();
        config.brave_api_key = "from-file".to_string();
        config.apply_env_overrides(|key| Some(format!("env-{}", key)));

        assert_eq!(config.bing_api_key, "env-BING_API_KEY");
        assert_eq!(config.brave_api_key, "from-file");
    }
}
