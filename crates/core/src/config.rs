use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::{AutotubeError, Result},
    provider::Provider,
};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Settings for a single run, read once from `config.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Chat completion backend used for the script
    #[serde(default)]
    pub provider: Provider,

    /// Overrides the provider's default model
    #[serde(default)]
    pub chat_model: Option<String>,

    /// Used when the provider's environment variable is unset
    #[serde(default)]
    pub chat_api_key: Option<String>,

    /// Speech language code, e.g. "en"
    pub voice: String,

    pub pexels_api_key: String,

    pub video: VideoConfig,

    pub youtube: PublishConfig,

    /// Where narration and rendered videos are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Length in seconds each stock clip is trimmed to
    pub slide_duration: f64,

    pub fps: u32,

    /// Total clip quota across all keywords
    #[serde(default = "default_max_clips")]
    pub max_clips: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// "private", "unlisted" or "public"
    pub privacy_status: String,

    pub category_id: String,

    /// OAuth client secret downloaded from the Google Cloud console
    #[serde(default = "default_client_secret")]
    pub client_secret: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_max_clips() -> usize {
    5
}

fn default_client_secret() -> PathBuf {
    PathBuf::from("client_secret.json")
}

impl Config {
    /// Load the configuration, failing before anything else happens if the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AutotubeError::MissingConfig {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| AutotubeError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn parse(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn chat_model(&self) -> &str {
        self.chat_model
            .as_deref()
            .unwrap_or_else(|| self.provider.config().model)
    }

    pub fn chat_api_key(&self) -> Result<String> {
        Ok(self
            .provider
            .resolve_api_key(self.chat_api_key.as_deref())?)
    }
}
