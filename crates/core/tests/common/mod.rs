#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use autotube_core::{
    AutotubeError, ClipTrimmer, Composer, Narrator, Observer, Publisher, Result, ScriptWriter,
    StockLibrary, StockVideo, UploadResult, VideoMetadata, artifacts::trimmed_path,
};

pub fn video(id: u64, link: &str) -> StockVideo {
    StockVideo {
        id,
        page_url: format!("https://www.pexels.com/video/{}/", id),
        renditions: vec![link.to_string()],
    }
}

/// `count` search hits for a keyword, each with a unique link.
pub fn hits_for(keyword: &str, count: u64) -> Vec<StockVideo> {
    (0..count)
        .map(|i| video(i, &format!("https://cdn.test/{}/{}.mp4", keyword, i)))
        .collect()
}

#[derive(Default)]
pub struct FakeLibrary {
    pub results: HashMap<String, std::result::Result<Vec<StockVideo>, u16>>,
    pub broken_links: HashSet<String>,
    pub searches: Arc<Mutex<Vec<String>>>,
    pub downloads: Arc<Mutex<Vec<String>>>,
}

impl FakeLibrary {
    pub fn with_hits(mut self, keyword: &str, hits: Vec<StockVideo>) -> Self {
        self.results.insert(keyword.to_string(), Ok(hits));
        self
    }

    pub fn with_status(mut self, keyword: &str, status: u16) -> Self {
        self.results.insert(keyword.to_string(), Err(status));
        self
    }

    pub fn with_broken_link(mut self, link: &str) -> Self {
        self.broken_links.insert(link.to_string());
        self
    }
}

#[async_trait]
impl StockLibrary for FakeLibrary {
    async fn search(&self, keyword: &str, _per_page: u32) -> Result<Vec<StockVideo>> {
        self.searches.lock().unwrap().push(keyword.to_string());
        match self.results.get(keyword) {
            Some(Ok(hits)) => Ok(hits.clone()),
            Some(Err(status)) => Err(AutotubeError::SearchFailed {
                keyword: keyword.to_string(),
                status: *status,
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn download(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        if self.broken_links.contains(url) {
            return Err(AutotubeError::DownloadFailed {
                url: url.to_string(),
                reason: "connection reset".to_string(),
            });
        }
        self.downloads.lock().unwrap().push(url.to_string());
        let name = url.trim_start_matches("https://cdn.test/").replace('/', "_");
        Ok(dest_dir.join(name))
    }
}

pub struct FakeTrimmer;

#[async_trait]
impl ClipTrimmer for FakeTrimmer {
    async fn trim(&self, clip: &Path, _seconds: f64) -> Result<PathBuf> {
        Ok(trimmed_path(clip))
    }
}

#[derive(Default)]
pub struct Notices(pub Mutex<Vec<String>>);

impl Observer for Notices {
    fn notice(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

pub struct CannedWriter {
    pub script: String,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ScriptWriter for CannedWriter {
    async fn write(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.script.clone())
    }
}

#[derive(Default)]
pub struct RecordingNarrator {
    pub texts: Arc<Mutex<Vec<(String, String)>>>,
}

#[async_trait]
impl Narrator for RecordingNarrator {
    async fn synthesize(&self, text: &str, voice: &str, output: &Path) -> Result<PathBuf> {
        self.texts
            .lock()
            .unwrap()
            .push((text.to_string(), voice.to_string()));
        Ok(output.to_path_buf())
    }
}

#[derive(Default)]
pub struct RecordingComposer {
    pub calls: Arc<Mutex<Vec<(Vec<PathBuf>, PathBuf, u32)>>>,
}

#[async_trait]
impl Composer for RecordingComposer {
    async fn compose(
        &self,
        clips: &[PathBuf],
        audio: &Path,
        fps: u32,
        output: &Path,
    ) -> Result<PathBuf> {
        self.calls
            .lock()
            .unwrap()
            .push((clips.to_vec(), audio.to_path_buf(), fps));
        Ok(output.to_path_buf())
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    pub uploads: Arc<Mutex<Vec<(PathBuf, VideoMetadata)>>>,
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(
        &self,
        video: &Path,
        metadata: &VideoMetadata,
        observer: &dyn Observer,
    ) -> Result<UploadResult> {
        self.uploads
            .lock()
            .unwrap()
            .push((video.to_path_buf(), metadata.clone()));
        observer.upload_progress(100, 100);
        Ok(UploadResult::new("abc123XYZ".to_string()))
    }
}
