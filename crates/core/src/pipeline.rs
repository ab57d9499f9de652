use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use tokio::fs;

use crate::{
    artifacts::{narration_path, video_path},
    config::Config,
    error::Result,
    footage::FootageFetcher,
    keywords::extract_keywords,
    media::{Composer, Ffmpeg},
    narration::{GoogleTts, Narrator},
    pexels::PexelsLibrary,
    progress::{Observer, Stage},
    script::{ChatScriptWriter, ScriptWriter, script_prompt},
    types::{UploadResult, VideoMetadata},
    youtube::{Publisher, YoutubePublisher},
};

/// External collaborators of a run.
pub struct Components {
    pub writer: Box<dyn ScriptWriter>,
    pub narrator: Box<dyn Narrator>,
    pub footage: FootageFetcher,
    pub composer: Box<dyn Composer>,
    pub publisher: Box<dyn Publisher>,
}

impl Components {
    /// Real services: chat completions, Google speech, Pexels, ffmpeg and YouTube.
    pub fn live(config: &Config, chat_api_key: String) -> Result<Self> {
        Ok(Self {
            writer: Box::new(ChatScriptWriter::new(
                &config.provider,
                config.chat_model(),
                chat_api_key,
            )),
            narrator: Box::new(GoogleTts::new()),
            footage: FootageFetcher::new(
                Box::new(PexelsLibrary::new(config.pexels_api_key.clone())),
                Box::new(Ffmpeg),
                std::env::temp_dir(),
                config.video.slide_duration,
                config.video.max_clips,
            ),
            composer: Box::new(Ffmpeg),
            publisher: Box::new(YoutubePublisher::new(
                config.youtube.client_secret.clone(),
            )?),
        })
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub script: String,
    pub narration: PathBuf,
    pub keywords: Vec<String>,
    pub clips: Vec<PathBuf>,
    pub video: PathBuf,
    pub upload: UploadResult,
}

pub struct Pipeline {
    config: Config,
    components: Components,
}

impl Pipeline {
    pub fn new(config: Config, components: Components) -> Self {
        Self { config, components }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn run(&self, topic: &str, observer: &dyn Observer) -> Result<RunSummary> {
        self.run_on(topic, Local::now().date_naive(), observer).await
    }

    /// Run every stage in order, dating the upload title with `date`.
    pub async fn run_on(
        &self,
        topic: &str,
        date: NaiveDate,
        observer: &dyn Observer,
    ) -> Result<RunSummary> {
        let c = &self.components;
        fs::create_dir_all(&self.config.output_dir).await?;

        // Step 1: Script
        observer.stage_started(Stage::Script);
        let script = c.writer.write(&script_prompt(topic)).await?;
        observer.stage_finished(
            Stage::Script,
            &format!("{} words", script.split_whitespace().count()),
        );

        // Step 2: Narration
        observer.stage_started(Stage::Narration);
        let narration = c
            .narrator
            .synthesize(
                &script,
                &self.config.voice,
                &narration_path(&self.config.output_dir),
            )
            .await?;
        observer.stage_finished(Stage::Narration, &narration.display().to_string());

        // Step 3: Keywords
        observer.stage_started(Stage::Keywords);
        let keywords = extract_keywords(&script);
        observer.stage_finished(Stage::Keywords, &keywords.join(", "));

        // Step 4: Footage
        observer.stage_started(Stage::Footage);
        let clips: Vec<PathBuf> = c
            .footage
            .fetch(&keywords, observer)
            .await
            .into_iter()
            .map(|clip| clip.path)
            .collect();
        observer.stage_finished(Stage::Footage, &format!("{} clips", clips.len()));

        // Step 5: Compose
        observer.stage_started(Stage::Compose);
        let video = c
            .composer
            .compose(
                &clips,
                &narration,
                self.config.video.fps,
                &video_path(&self.config.output_dir),
            )
            .await?;
        observer.stage_finished(Stage::Compose, &video.display().to_string());

        // Step 6: Publish
        observer.stage_started(Stage::Publish);
        let metadata = VideoMetadata::new(topic, &script, date, &self.config.youtube);
        let upload = c.publisher.publish(&video, &metadata, observer).await?;
        observer.stage_finished(Stage::Publish, &upload.url);

        Ok(RunSummary {
            script,
            narration,
            keywords,
            clips,
            video,
            upload,
        })
    }
}
