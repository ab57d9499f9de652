use std::{sync::LazyLock, time::Duration};

use chrono::NaiveDate;
use regex::Regex;

const MAX_TAGS: usize = 5;

static TOPIC_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").unwrap());

pub fn format_title(topic: &str, date: NaiveDate) -> String {
    format!("{} | Auto-generated on {}", topic, date.format("%Y-%m-%d"))
}

pub fn format_description(script: &str) -> String {
    format!("Auto-generated demo video.\n\nSCRIPT:\n{}", script)
}

/// Lowercased words of the topic, at most five
pub fn format_tags(topic: &str) -> Vec<String> {
    TOPIC_WORD
        .find_iter(topic)
        .map(|m| m.as_str().to_lowercase())
        .take(MAX_TAGS)
        .collect()
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://youtube.com/watch?v={}", video_id)
}

/// Show only the first eight characters of a secret
pub fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(8).collect();
    format!("{}…", prefix)
}

pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let whole = d.as_secs();
        format!("{}m {}s", whole / 60, whole % 60)
    }
}

pub fn format_bytes(bytes: u64) -> String {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    format!("{:.1} MB", mb)
}
