use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use async_trait::async_trait;
use regex::Regex;
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;

use crate::error::{AutotubeError, Result};

const TTS_URL: &str = "https://translate.google.com/translate_tts";

/// The speech endpoint rejects longer requests.
pub const MAX_CHUNK_CHARS: usize = 100;

static SENTENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^.!?;:]+[.!?;:]*").unwrap());

#[async_trait]
pub trait Narrator: Send + Sync {
    /// Speak `text` in `voice` and write the audio to `output`.
    async fn synthesize(&self, text: &str, voice: &str, output: &Path) -> Result<PathBuf>;
}

/// Narration through the Google Translate speech endpoint. `voice` is the
/// language code of the speaker.
pub struct GoogleTts {
    client: reqwest::Client,
}

impl GoogleTts {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        index: usize,
        total: usize,
        voice: &str,
    ) -> Result<Vec<u8>> {
        let total_s = total.to_string();
        let index_s = index.to_string();
        let len_s = chunk.chars().count().to_string();
        let response = self
            .client
            .get(TTS_URL)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", voice),
                ("q", chunk),
                ("total", total_s.as_str()),
                ("idx", index_s.as_str()),
                ("textlen", len_s.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.bytes().await?.to_vec())
    }

    async fn speak(&self, text: &str, voice: &str, output: &Path) -> Result<()> {
        let chunks = speech_chunks(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(AutotubeError::SynthesisFailed {
                reason: "no text to speak".to_string(),
            });
        }

        let mut file = fs::File::create(output).await?;
        for (index, chunk) in chunks.iter().enumerate() {
            debug!(index, total = chunks.len(), "fetching speech chunk");
            let audio = self.fetch_chunk(chunk, index, chunks.len(), voice).await?;
            file.write_all(&audio).await?;
        }
        file.flush().await?;

        Ok(())
    }
}

impl Default for GoogleTts {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Narrator for GoogleTts {
    async fn synthesize(&self, text: &str, voice: &str, output: &Path) -> Result<PathBuf> {
        self.speak(text, voice, output)
            .await
            .map_err(|e| match e {
                AutotubeError::SynthesisFailed { .. } => e,
                other => AutotubeError::SynthesisFailed {
                    reason: other.to_string(),
                },
            })?;

        Ok(output.to_path_buf())
    }
}

/// Split text into pieces no longer than `max_chars`, preferring sentence
/// punctuation and then whitespace as break points.
pub fn speech_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();

    for sentence in SENTENCE.find_iter(text) {
        let sentence = sentence.as_str().trim();
        if sentence.is_empty() {
            continue;
        }
        if sentence.chars().count() <= max_chars {
            chunks.push(sentence.to_string());
            continue;
        }

        let mut current = String::new();
        for word in sentence.split_whitespace() {
            for piece in split_long_word(word, max_chars) {
                let needed = if current.is_empty() {
                    piece.chars().count()
                } else {
                    current.chars().count() + 1 + piece.chars().count()
                };
                if needed > max_chars && !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(&piece);
            }
        }
        if !current.is_empty() {
            chunks.push(current);
        }
    }

    chunks
}

fn split_long_word(word: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(max_chars.max(1))
        .map(|piece| piece.iter().collect())
        .collect()
}
