//! Simple configuration persistence for hush
//!
//! Stores the last noise color and volume, plus optional device and asset
//! settings.

use hush_audio::{GainStage, NoiseColor};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Color selected when the app last exited
    pub noise: NoiseColor,
    /// Output volume (0.0-1.0)
    pub volume: f32,
    /// Directory the offline asset cache is installed from
    pub asset_origin: Option<PathBuf>,
    /// Fixed device buffer size in frames (device default when unset)
    pub buffer_frames: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            noise: NoiseColor::None,
            volume: GainStage::DEFAULT_GAIN,
            asset_origin: None,
            buffer_frames: None,
        }
    }
}

impl Config {
    /// Load config from the default location
    ///
    /// Returns default config if file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        let path = Self::config_path();
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to read config: {}", e);
                Self::default()
            }
        }
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Save config to the default location
    pub fn save(&self) -> io::Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = self.serialize();
        fs::write(path, content)
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hush")
            .join("config.txt")
    }

    /// Parse config from simple key=value format
    ///
    /// Malformed values leave the default in place.
    fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();

            match key.trim() {
                "noise" => {
                    if let Ok(color) = value.parse() {
                        config.noise = color;
                    }
                }
                "volume" => {
                    if let Ok(volume) = value.parse::<f32>() {
                        if volume.is_finite() {
                            config.volume = volume.clamp(0.0, 1.0);
                        }
                    }
                }
                "asset_origin" => {
                    if !value.is_empty() {
                        config.asset_origin = Some(PathBuf::from(value));
                    }
                }
                "buffer_frames" => {
                    config.buffer_frames = value.parse().ok().filter(|&n: &u32| n > 0);
                }
                _ => {} // Ignore unknown keys
            }
        }

        config
    }

    /// Serialize config to simple key=value format
    fn serialize(&self) -> String {
        let mut lines = Vec::new();
        lines.push("# hush configuration".to_string());
        lines.push(format!("noise={}", self.noise.key()));
        lines.push(format!("volume={:.2}", self.volume));

        if let Some(ref origin) = self.asset_origin {
            lines.push(format!("asset_origin={}", origin.display()));
        }
        if let Some(frames) = self.buffer_frames {
            lines.push(format!("buffer_frames={}", frames));
        }

        lines.join("\n")
    }
}
