use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    config::PublishConfig,
    format::{format_description, format_tags, format_title, watch_url},
};

/// Title, description and publishing options sent with the upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub privacy_status: String,
    pub category_id: String,
}

impl VideoMetadata {
    pub fn new(topic: &str, script: &str, date: NaiveDate, publish: &PublishConfig) -> Self {
        Self {
            title: format_title(topic, date),
            description: format_description(script),
            tags: format_tags(topic),
            privacy_status: publish.privacy_status.clone(),
            category_id: publish.category_id.clone(),
        }
    }

    /// Body of a `videos.insert` request with `part=snippet,status`.
    pub fn request_body(&self) -> serde_json::Value {
        serde_json::json!({
            "snippet": {
                "title": self.title,
                "description": self.description,
                "tags": self.tags,
                "categoryId": self.category_id,
            },
            "status": {
                "privacyStatus": self.privacy_status,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    pub video_id: String,
    pub url: String,
}

impl UploadResult {
    pub fn new(video_id: String) -> Self {
        let url = watch_url(&video_id);
        Self { video_id, url }
    }
}
