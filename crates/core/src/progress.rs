use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Script,
    Narration,
    Keywords,
    Footage,
    Compose,
    Publish,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Script => "Writing script",
            Stage::Narration => "Synthesizing narration",
            Stage::Keywords => "Extracting keywords",
            Stage::Footage => "Fetching stock footage",
            Stage::Compose => "Composing video",
            Stage::Publish => "Publishing to YouTube",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Receives progress from the pipeline. Every method defaults to a no-op.
pub trait Observer: Send + Sync {
    fn stage_started(&self, _stage: Stage) {}

    fn stage_finished(&self, _stage: Stage, _detail: &str) {}

    /// Non-fatal events such as a skipped keyword or clip.
    fn notice(&self, _message: &str) {}

    /// Called after every uploaded chunk.
    fn upload_progress(&self, _sent: u64, _total: u64) {}
}

pub struct Silent;

impl Observer for Silent {}
