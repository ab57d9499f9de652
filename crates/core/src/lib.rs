//! Autotube Core Library
//!
//! Turns a topic into a narrated stock-footage video and publishes it to
//! YouTube: script from a chat model, speech synthesis, Pexels clips, ffmpeg
//! composition and a resumable upload.

pub mod artifacts;
pub mod config;
pub mod error;
pub mod footage;
pub mod format;
pub mod keywords;
pub mod media;
pub mod narration;
pub mod oauth;
pub mod pexels;
pub mod pipeline;
pub mod progress;
pub mod provider;
pub mod script;
pub mod types;
pub mod youtube;

// Re-export commonly used items at crate root
pub use config::{Config, DEFAULT_CONFIG_PATH, PublishConfig, VideoConfig};
pub use error::{AutotubeError, Result};
pub use footage::{ClipTrimmer, FootageFetcher, StockClip, StockLibrary, StockVideo};
pub use format::{format_bytes, format_duration, mask_key};
pub use keywords::extract_keywords;
pub use media::Composer;
pub use narration::Narrator;
pub use pipeline::{Components, Pipeline, RunSummary};
pub use progress::{Observer, Silent, Stage};
pub use provider::{Provider, ProviderConfig};
pub use script::ScriptWriter;
pub use types::{UploadResult, VideoMetadata};
pub use youtube::Publisher;
