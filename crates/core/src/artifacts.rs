use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Randomly named narration file in the output directory
pub fn narration_path(output_dir: &Path) -> PathBuf {
    output_dir.join(format!("voice_{}.mp3", Uuid::new_v4().simple()))
}

/// Randomly named rendered video in the output directory
pub fn video_path(output_dir: &Path) -> PathBuf {
    output_dir.join(format!("video_{}.mp4", Uuid::new_v4().simple()))
}

/// Randomly named download target for a stock clip, keeping the extension
/// of the remote file when it has one
pub fn clip_download_path(download_dir: &Path, url: &str) -> PathBuf {
    let remote_name = url.split(['?', '#']).next().unwrap_or(url);
    let ext = Path::new(remote_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 4)
        .unwrap_or_else(|| "mp4".to_string());

    download_dir.join(format!("clip_{}.{}", Uuid::new_v4().simple(), ext))
}

/// Path of the trimmed copy of a downloaded clip
pub fn trimmed_path(clip_path: &Path) -> PathBuf {
    let stem = clip_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "clip".to_string());
    clip_path.with_file_name(format!("{}_trimmed.mp4", stem))
}
