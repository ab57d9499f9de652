use std::{
    io::SeekFrom,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use reqwest::{StatusCode, header, redirect};
use tokio::{
    fs,
    io::{AsyncReadExt, AsyncSeekExt},
};
use tracing::debug;

use crate::{
    error::{AutotubeError, Result},
    oauth::{ClientSecret, InstalledAppFlow},
    progress::Observer,
    types::{UploadResult, VideoMetadata},
};

const UPLOAD_URL: &str = "https://www.googleapis.com/upload/youtube/v3/videos";

/// Resumable uploads require chunk sizes in multiples of 256 KiB.
pub const UPLOAD_CHUNK_SIZE: u64 = 32 * 256 * 1024;

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(
        &self,
        video: &Path,
        metadata: &VideoMetadata,
        observer: &dyn Observer,
    ) -> Result<UploadResult>;
}

/// Publishes through the YouTube Data API after an interactive OAuth consent.
pub struct YoutubePublisher {
    client_secret: PathBuf,
    upload_url: String,
    chunk_size: u64,
    client: reqwest::Client,
}

impl YoutubePublisher {
    pub fn new(client_secret: PathBuf) -> Result<Self> {
        // 308 marks an incomplete upload here, not a redirect.
        let client = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self {
            client_secret,
            upload_url: UPLOAD_URL.to_string(),
            chunk_size: UPLOAD_CHUNK_SIZE,
            client,
        })
    }

    /// Send the session-start request to `upload_url` instead of the
    /// YouTube Data API.
    pub fn with_upload_url(mut self, upload_url: impl Into<String>) -> Self {
        self.upload_url = upload_url.into();
        self
    }

    /// Chunk size in bytes, a multiple of 256 KiB.
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    async fn start_session(
        &self,
        access_token: &str,
        metadata: &VideoMetadata,
        total: u64,
    ) -> Result<String> {
        let response = self
            .client
            .post(&self.upload_url)
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .bearer_auth(access_token)
            .header("X-Upload-Content-Length", total.to_string())
            .header("X-Upload-Content-Type", "video/*")
            .json(&metadata.request_body())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AutotubeError::UploadFailed {
                reason: format!("session start returned {}: {}", status, body),
            });
        }

        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| AutotubeError::UploadFailed {
                reason: "session start response has no Location header".to_string(),
            })
    }

    /// Resumable upload of `video` with an already authorized token.
    pub async fn upload(
        &self,
        access_token: &str,
        video: &Path,
        metadata: &VideoMetadata,
        observer: &dyn Observer,
    ) -> Result<UploadResult> {
        let total = fs::metadata(video).await?.len();
        if total == 0 {
            return Err(AutotubeError::UploadFailed {
                reason: format!("{} is empty", video.display()),
            });
        }

        let session = self.start_session(access_token, metadata, total).await?;
        let mut file = fs::File::open(video).await?;
        let mut offset = 0;

        loop {
            let len = self.chunk_size.min(total - offset);
            file.seek(SeekFrom::Start(offset)).await?;
            let mut chunk = Vec::with_capacity(len as usize);
            (&mut file).take(len).read_to_end(&mut chunk).await?;

            debug!(offset, len, total, "uploading chunk");
            let response = self
                .client
                .put(&session)
                .bearer_auth(access_token)
                .header(header::CONTENT_RANGE, content_range(offset, len, total))
                .body(chunk)
                .send()
                .await?;

            match response.status() {
                StatusCode::OK | StatusCode::CREATED => {
                    let body = response.json::<serde_json::Value>().await?;
                    let video_id = body["id"].as_str().ok_or_else(|| {
                        AutotubeError::UploadFailed {
                            reason: format!("upload response has no id: {}", body),
                        }
                    })?;
                    observer.upload_progress(total, total);
                    return Ok(UploadResult::new(video_id.to_string()));
                }
                StatusCode::PERMANENT_REDIRECT => {
                    offset = response
                        .headers()
                        .get(header::RANGE)
                        .and_then(|v| v.to_str().ok())
                        .and_then(next_offset)
                        .unwrap_or(0);
                    if offset >= total {
                        return Err(AutotubeError::UploadFailed {
                            reason: format!(
                                "server acknowledged {} of {} bytes without finishing",
                                offset, total
                            ),
                        });
                    }
                    observer.upload_progress(offset, total);
                }
                status => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(AutotubeError::UploadFailed {
                        reason: format!("chunk at byte {} returned {}: {}", offset, status, body),
                    });
                }
            }
        }
    }
}

#[async_trait]
impl Publisher for YoutubePublisher {
    async fn publish(
        &self,
        video: &Path,
        metadata: &VideoMetadata,
        observer: &dyn Observer,
    ) -> Result<UploadResult> {
        let secret = ClientSecret::load(&self.client_secret)?;
        let credential = InstalledAppFlow::new(secret)
            .run_local_server(observer)
            .await?;

        self.upload(&credential.access_token, video, metadata, observer)
            .await
    }
}

/// `Content-Range` value for `len` bytes starting at `start`.
pub fn content_range(start: u64, len: u64, total: u64) -> String {
    format!("bytes {}-{}/{}", start, start + len - 1, total)
}

/// Offset to resume from, given the `Range` header of a 308 response
/// (`bytes=0-524287`).
pub fn next_offset(range: &str) -> Option<u64> {
    range
        .trim()
        .strip_prefix("bytes=")?
        .split('-')
        .nth(1)?
        .parse::<u64>()
        .ok()
        .map(|last| last + 1)
}
