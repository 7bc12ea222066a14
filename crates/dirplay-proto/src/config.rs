use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub mpv: MpvConfig,
}

/// Where the music lives and how the static server lays it out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Directory-listing URL whose anchors are album folders.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Optional per-album JSON descriptor file.
    #[serde(default = "default_descriptor_name")]
    pub descriptor_name: String,
    #[serde(default = "default_cover_name")]
    pub cover_name: String,
    #[serde(default = "default_audio_suffix")]
    pub audio_suffix: String,
    /// Album selected on startup when the server lists it.
    #[serde(default = "default_album")]
    pub default_album: Option<String>,
    /// 0 disables the request timeout.
    #[serde(default)]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MpvConfig {
    #[serde(default = "default_volume")]
    pub default_volume: f32,
    /// Explicit mpv binary; empty means search beside the exe, then PATH.
    #[serde(default)]
    pub binary: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            descriptor_name: default_descriptor_name(),
            cover_name: default_cover_name(),
            audio_suffix: default_audio_suffix(),
            default_album: default_album(),
            request_timeout_secs: 0,
        }
    }
}

impl Default for MpvConfig {
    fn default() -> Self {
        Self {
            default_volume: default_volume(),
            binary: String::new(),
        }
    }
}

impl MpvConfig {
    pub fn binary_override(&self) -> Option<PathBuf> {
        let trimmed = self.binary.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:3000/spotify/music/".to_string()
}

fn default_descriptor_name() -> String {
    "info.json".to_string()
}

fn default_cover_name() -> String {
    "cover.jpg".to_string()
}

fn default_audio_suffix() -> String {
    ".mp3".to_string()
}

fn default_album() -> Option<String> {
    Some("ncs".to_string())
}

fn default_volume() -> f32 {
    1.0
}

impl Config {
    /// Load from the default location, writing defaults on first run.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(config_path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
