use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::{
    artifacts::trimmed_path,
    error::{AutotubeError, Result},
    footage::ClipTrimmer,
};

#[async_trait]
pub trait Composer: Send + Sync {
    /// Concatenate `clips` in order, lay `audio` over them and encode the
    /// result to `output`.
    async fn compose(
        &self,
        clips: &[PathBuf],
        audio: &Path,
        fps: u32,
        output: &Path,
    ) -> Result<PathBuf>;
}

/// Trimming and composition through the ffmpeg and ffprobe binaries.
pub struct Ffmpeg;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: u32,
    height: u32,
    #[serde(default)]
    sample_aspect_ratio: Option<String>,
}

impl Ffmpeg {
    /// Displayed width and height of the first video stream
    pub async fn probe_dimensions(path: &Path) -> Result<(u32, u32)> {
        let output = Command::new("ffprobe")
            .arg("-v")
            .arg("error")
            .arg("-select_streams")
            .arg("v:0")
            .arg("-show_entries")
            .arg("stream=width,height,sample_aspect_ratio")
            .arg("-of")
            .arg("json")
            .arg(path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(AutotubeError::ComposeFailed {
                reason: format!(
                    "ffprobe failed for {}: {}",
                    path.display(),
                    String::from_utf8_lossy(&output.stderr)
                ),
            });
        }

        let probe: ProbeOutput = serde_json::from_slice(&output.stdout)?;
        probe
            .streams
            .first()
            .map(|s| {
                display_size(s.width, s.height, s.sample_aspect_ratio.as_deref())
            })
            .ok_or_else(|| AutotubeError::ComposeFailed {
                reason: format!("{} has no video stream", path.display()),
            })
    }
}

#[async_trait]
impl ClipTrimmer for Ffmpeg {
    async fn trim(&self, clip: &Path, seconds: f64) -> Result<PathBuf> {
        let trimmed = trimmed_path(clip);
        let output = Command::new("ffmpeg")
            .arg("-y")
            .arg("-i")
            .arg(clip)
            .arg("-t")
            .arg(format!("{:.3}", seconds))
            .arg("-an")
            .arg("-c:v")
            .arg("libx264")
            .arg("-pix_fmt")
            .arg("yuv420p")
            .arg(&trimmed)
            .output()
            .await?;

        if !output.status.success() {
            return Err(AutotubeError::TrimFailed {
                clip_path: clip.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(trimmed)
    }
}

#[async_trait]
impl Composer for Ffmpeg {
    async fn compose(
        &self,
        clips: &[PathBuf],
        audio: &Path,
        fps: u32,
        output: &Path,
    ) -> Result<PathBuf> {
        if clips.is_empty() {
            return Err(AutotubeError::ComposeFailed {
                reason: "no clips to compose".to_string(),
            });
        }

        let mut dimensions = Vec::with_capacity(clips.len());
        for clip in clips {
            dimensions.push(Self::probe_dimensions(clip).await?);
        }
        let canvas = canvas_size(&dimensions);
        let filter = compose_filter(clips.len(), canvas, fps);
        debug!(?canvas, clips = clips.len(), "composing video");

        let mut command = Command::new("ffmpeg");
        command.arg("-y");
        for clip in clips {
            command.arg("-i").arg(clip);
        }
        let result = command
            .arg("-i")
            .arg(audio)
            .arg("-filter_complex")
            .arg(&filter)
            .arg("-map")
            .arg("[outv]")
            .arg("-map")
            .arg(format!("{}:a", clips.len()))
            .arg("-r")
            .arg(fps.to_string())
            .arg("-c:v")
            .arg("libx264")
            .arg("-pix_fmt")
            .arg("yuv420p")
            .arg("-c:a")
            .arg("aac")
            .arg(output)
            .output()
            .await?;

        if !result.status.success() {
            return Err(AutotubeError::ComposeFailed {
                reason: String::from_utf8_lossy(&result.stderr).to_string(),
            });
        }

        Ok(output.to_path_buf())
    }
}

/// Size of a frame once its pixels are made square, matching the
/// `scale=trunc(iw*sar/2)*2:ih` step of [`compose_filter`].
pub fn display_size(width: u32, height: u32, sample_aspect_ratio: Option<&str>) -> (u32, u32) {
    let ratio = sample_aspect_ratio
        .and_then(|sar| sar.split_once(':'))
        .and_then(|(num, den)| Some((num.parse::<u64>().ok()?, den.parse::<u64>().ok()?)))
        .filter(|(num, den)| *num > 0 && *den > 0);

    let (num, den) = ratio.unwrap_or((1, 1));
    let width = (u64::from(width) * num / (den * 2) * 2) as u32;
    (width, height)
}

/// Smallest canvas that fits every clip, rounded up to even sides for x264.
pub fn canvas_size(dimensions: &[(u32, u32)]) -> (u32, u32) {
    let width = dimensions.iter().map(|(w, _)| *w).max().unwrap_or(0);
    let height = dimensions.iter().map(|(_, h)| *h).max().unwrap_or(0);
    (width.div_ceil(2) * 2, height.div_ceil(2) * 2)
}

/// Filter graph squaring every input's pixels and centering it on a shared
/// black canvas before concatenating them into `[outv]`.
pub fn compose_filter(inputs: usize, canvas: (u32, u32), fps: u32) -> String {
    let (width, height) = canvas;
    let mut filter = String::new();

    for i in 0..inputs {
        filter.push_str(&format!(
            "[{i}:v]scale=trunc(iw*sar/2)*2:ih,pad={width}:{height}:(ow-iw)/2:(oh-ih)/2:color=black,setsar=1,fps={fps},format=yuv420p[v{i}];"
        ));
    }
    for i in 0..inputs {
        filter.push_str(&format!("[v{i}]"));
    }
    filter.push_str(&format!("concat=n={inputs}:v=1:a=0[outv]"));

    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_takes_largest_sides() {
        assert_eq!(canvas_size(&[(1920, 1080), (1080, 1920)]), (1920, 1920));
    }

    #[test]
    fn canvas_rounds_odd_sides_up() {
        assert_eq!(canvas_size(&[(641, 359)]), (642, 360));
    }

    #[test]
    fn filter_concatenates_inputs_in_order() {
        let filter = compose_filter(2, (1280, 720), 24);
        assert!(filter.starts_with("[0:v]scale=trunc(iw*sar/2)*2:ih,pad=1280:720"));
        assert!(filter.contains("fps=24"));
        assert!(filter.ends_with("[v0][v1]concat=n=2:v=1:a=0[outv]"));
    }

    #[test]
    fn anamorphic_clips_are_measured_at_display_width() {
        assert_eq!(display_size(1440, 1080, Some("4:3")), (1920, 1080));
        assert_eq!(display_size(1280, 720, Some("1:1")), (1280, 720));
    }

    #[test]
    fn unknown_aspect_ratio_counts_as_square() {
        assert_eq!(display_size(1280, 720, None), (1280, 720));
        assert_eq!(display_size(1280, 720, Some("0:1")), (1280, 720));
        assert_eq!(display_size(1280, 720, Some("N/A")), (1280, 720));
    }
}
