use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;

use crate::{
    artifacts::clip_download_path,
    error::{AutotubeError, Result},
    footage::{StockLibrary, StockVideo},
};

const SEARCH_URL: &str = "https://api.pexels.com/videos/search";

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub videos: Vec<PexelsVideo>,
}

#[derive(Debug, Deserialize)]
pub struct PexelsVideo {
    pub id: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub video_files: Vec<VideoFile>,
}

#[derive(Debug, Deserialize)]
pub struct VideoFile {
    pub link: String,
}

impl From<PexelsVideo> for StockVideo {
    fn from(video: PexelsVideo) -> Self {
        StockVideo {
            id: video.id,
            page_url: video.url,
            renditions: video.video_files.into_iter().map(|f| f.link).collect(),
        }
    }
}

pub fn parse_search_response(body: &str) -> Result<Vec<StockVideo>> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response.videos.into_iter().map(StockVideo::from).collect())
}

/// Stock footage from the Pexels video API.
pub struct PexelsLibrary {
    client: reqwest::Client,
    api_key: String,
}

impl PexelsLibrary {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl StockLibrary for PexelsLibrary {
    async fn search(&self, keyword: &str, per_page: u32) -> Result<Vec<StockVideo>> {
        let per_page = per_page.to_string();
        let response = self
            .client
            .get(SEARCH_URL)
            .header("Authorization", self.api_key.as_str())
            .query(&[("query", keyword), ("per_page", per_page.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AutotubeError::SearchFailed {
                keyword: keyword.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_search_response(&body)
    }

    async fn download(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AutotubeError::DownloadFailed {
                url: url.to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        let path = clip_download_path(dest_dir, url);
        debug!(%url, path = %path.display(), "downloading clip");

        let mut file = fs::File::create(&path).await?;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(path)
    }
}
