use std::path::PathBuf;
use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Error, Debug)]
pub enum AutotubeError {
    #[error(
        "Configuration not found at {path}. Copy config_example.json to config.json and fill the keys."
    )]
    MissingConfig { path: PathBuf },

    #[error("Invalid configuration in {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("Script generation failed: {reason}")]
    ScriptFailed { reason: String },

    #[error("Speech synthesis failed: {reason}")]
    SynthesisFailed { reason: String },

    #[error("Stock footage search failed for '{keyword}': HTTP {status}")]
    SearchFailed { keyword: String, status: u16 },

    #[error("Download failed for {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Trimming failed for {clip_path}: {reason}")]
    TrimFailed { clip_path: PathBuf, reason: String },

    #[error("Video composition failed: {reason}")]
    ComposeFailed { reason: String },

    #[error("Authorization failed: {reason}")]
    AuthorizationFailed { reason: String },

    #[error("Upload failed: {reason}")]
    UploadFailed { reason: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, AutotubeError>;
