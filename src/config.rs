use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::kernel::phase::Pacing;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_PERCEPTION_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_VOICE: &str = "Kore";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Never logged.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub perception_model: String,
    pub speech_model: String,
    pub voice: String,
    pub temperature: f32,
    /// Accepted and recorded on each result; the belief blend is fixed at 0.7/0.3.
    pub alpha: f64,
    pub pacing: Pacing,
    /// Command that plays a WAV file, e.g. `aplay` or `afplay`.
    pub player: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            perception_model: DEFAULT_PERCEPTION_MODEL.to_string(),
            speech_model: DEFAULT_SPEECH_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            temperature: 0.3,
            alpha: 0.5,
            pacing: Pacing::default(),
            player: None,
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies environment overrides on top of `self`.
    pub fn with_env(self) -> Self {
        self.with_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::with_env`] with an injectable lookup.
    pub fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(url) = non_empty("CORTEX_BASE_URL") {
            self.base_url = url;
        }
        if let Some(model) = non_empty("CORTEX_PERCEPTION_MODEL") {
            self.perception_model = model;
        }
        if let Some(model) = non_empty("CORTEX_SPEECH_MODEL") {
            self.speech_model = model;
        }
        if let Some(voice) = non_empty("CORTEX_VOICE") {
            self.voice = voice;
        }
        if let Some(player) = non_empty("CORTEX_PLAYER") {
            self.player = Some(player);
        }
        self
    }
}
