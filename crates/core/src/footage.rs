use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    error::{AutotubeError, Result},
    progress::Observer,
};

/// Results requested per keyword search.
pub const RESULTS_PER_KEYWORD: u32 = 5;

/// A search hit: one stock video with its downloadable renditions.
#[derive(Debug, Clone, PartialEq)]
pub struct StockVideo {
    pub id: u64,
    pub page_url: String,
    pub renditions: Vec<String>,
}

impl StockVideo {
    pub fn first_rendition(&self) -> Option<&str> {
        self.renditions.first().map(String::as_str)
    }
}

/// A downloaded clip trimmed to the configured duration.
#[derive(Debug, Clone, PartialEq)]
pub struct StockClip {
    pub keyword: String,
    pub source_url: String,
    pub path: PathBuf,
}

#[async_trait]
pub trait StockLibrary: Send + Sync {
    /// Search for videos matching `keyword`. A non-success response is
    /// reported as [`AutotubeError::SearchFailed`].
    async fn search(&self, keyword: &str, per_page: u32) -> Result<Vec<StockVideo>>;

    /// Download `url` into `dest_dir`, returning the local file.
    async fn download(&self, url: &str, dest_dir: &Path) -> Result<PathBuf>;
}

#[async_trait]
pub trait ClipTrimmer: Send + Sync {
    /// Cut the clip down to its first `seconds`, returning the new file.
    async fn trim(&self, clip: &Path, seconds: f64) -> Result<PathBuf>;
}

pub struct FootageFetcher {
    library: Box<dyn StockLibrary>,
    trimmer: Box<dyn ClipTrimmer>,
    download_dir: PathBuf,
    clip_duration: f64,
    max_clips: usize,
}

impl FootageFetcher {
    pub fn new(
        library: Box<dyn StockLibrary>,
        trimmer: Box<dyn ClipTrimmer>,
        download_dir: PathBuf,
        clip_duration: f64,
        max_clips: usize,
    ) -> Self {
        Self {
            library,
            trimmer,
            download_dir,
            clip_duration,
            max_clips,
        }
    }

    /// Collect clips for `keywords` in order until `max_clips` is reached.
    ///
    /// The quota is global: once it is hit the remaining results and keywords
    /// are left untouched. Failed searches and clips are reported through the
    /// observer and skipped, so the result may be short or empty.
    pub async fn fetch(&self, keywords: &[String], observer: &dyn Observer) -> Vec<StockClip> {
        let mut clips = Vec::new();
        if self.max_clips == 0 {
            return clips;
        }

        for keyword in keywords {
            debug!(%keyword, "searching stock footage");
            let videos = match self.library.search(keyword, RESULTS_PER_KEYWORD).await {
                Ok(videos) => videos,
                Err(e) => {
                    warn!(%keyword, error = %e, "skipping keyword");
                    observer.notice(&format!("Skipped keyword '{}': {}", keyword, e));
                    continue;
                }
            };

            for video in videos {
                match self.fetch_clip(keyword, &video).await {
                    Ok(clip) => clips.push(clip),
                    Err(e) => {
                        warn!(%keyword, video_id = video.id, error = %e, "skipping clip");
                        observer.notice(&format!("Skipped clip {}: {}", video.id, e));
                        continue;
                    }
                }

                if clips.len() >= self.max_clips {
                    return clips;
                }
            }
        }

        clips
    }

    async fn fetch_clip(&self, keyword: &str, video: &StockVideo) -> Result<StockClip> {
        let url = video
            .first_rendition()
            .ok_or_else(|| AutotubeError::DownloadFailed {
                url: video.page_url.clone(),
                reason: "no downloadable rendition".to_string(),
            })?;

        let downloaded = self.library.download(url, &self.download_dir).await?;
        let trimmed = self.trimmer.trim(&downloaded, self.clip_duration).await?;

        Ok(StockClip {
            keyword: keyword.to_string(),
            source_url: url.to_string(),
            path: trimmed,
        })
    }
}
