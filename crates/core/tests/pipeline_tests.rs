mod common;

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use autotube_core::{
    Components, Config, FootageFetcher, Observer, Pipeline, Silent, Stage, VideoMetadata,
};
use chrono::NaiveDate;
use common::{
    CannedWriter, FakeLibrary, FakeTrimmer, RecordingComposer, RecordingNarrator,
    RecordingPublisher, hits_for,
};
use tempfile::TempDir;

const SCRIPT: &str = "Solar power turns sunlight into electricity. \
                      Panels on rooftops feed homes while large farms feed the grid.";

fn config(output_dir: PathBuf) -> Config {
    let mut config = Config::parse(
        r#"{
            "voice": "en",
            "pexels_api_key": "pexels-key",
            "video": {"slide_duration": 4, "fps": 30, "max_clips": 3},
            "youtube": {"privacy_status": "unlisted", "category_id": "28"}
        }"#,
    )
    .unwrap();
    config.output_dir = output_dir;
    config
}

struct Harness {
    prompts: Arc<Mutex<Vec<String>>>,
    narrations: Arc<Mutex<Vec<(String, String)>>>,
    compositions: Arc<Mutex<Vec<(Vec<PathBuf>, PathBuf, u32)>>>,
    uploads: Arc<Mutex<Vec<(PathBuf, VideoMetadata)>>>,
    pipeline: Pipeline,
}

fn harness(output_dir: PathBuf) -> Harness {
    let config = config(output_dir);

    let writer = CannedWriter {
        script: SCRIPT.to_string(),
        prompts: Arc::default(),
    };
    let narrator = RecordingNarrator::default();
    let composer = RecordingComposer::default();
    let publisher = RecordingPublisher::default();

    // "Solar" yields two clips, "power" fails, "turns" fills the quota
    let library = FakeLibrary::default()
        .with_hits("Solar", hits_for("Solar", 2))
        .with_status("power", 503)
        .with_hits("turns", hits_for("turns", 5));

    let prompts = writer.prompts.clone();
    let narrations = narrator.texts.clone();
    let compositions = composer.calls.clone();
    let uploads = publisher.uploads.clone();

    let components = Components {
        writer: Box::new(writer),
        narrator: Box::new(narrator),
        footage: FootageFetcher::new(
            Box::new(library),
            Box::new(FakeTrimmer),
            PathBuf::from("/tmp/clips"),
            config.video.slide_duration,
            config.video.max_clips,
        ),
        composer: Box::new(composer),
        publisher: Box::new(publisher),
    };

    Harness {
        prompts,
        narrations,
        compositions,
        uploads,
        pipeline: Pipeline::new(config, components),
    }
}

#[tokio::test]
async fn topic_flows_through_every_stage() {
    let dir = TempDir::new().unwrap();
    let h = harness(dir.path().to_path_buf());
    let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

    let summary = h
        .pipeline
        .run_on("Solar Power", date, &Silent)
        .await
        .unwrap();

    // Script generator got the exact topic
    let prompts = h.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Solar Power"));

    // Synthesizer got the script verbatim in the configured voice
    let narrations = h.narrations.lock().unwrap();
    assert_eq!(*narrations, vec![(SCRIPT.to_string(), "en".to_string())]);

    // Composer got the fetched clips in fetch order and the one narration file
    let compositions = h.compositions.lock().unwrap();
    assert_eq!(compositions.len(), 1);
    let (clips, audio, fps) = &compositions[0];
    assert_eq!(
        *clips,
        vec![
            PathBuf::from("/tmp/clips/Solar_0_trimmed.mp4"),
            PathBuf::from("/tmp/clips/Solar_1_trimmed.mp4"),
            PathBuf::from("/tmp/clips/turns_0_trimmed.mp4"),
        ]
    );
    assert_eq!(*clips, summary.clips);
    assert_eq!(*audio, summary.narration);
    assert!(audio.starts_with(dir.path()));
    assert_eq!(*fps, 30);

    // Publisher got the rendered file and metadata derived from topic and script
    let uploads = h.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    let (video, metadata) = &uploads[0];
    assert_eq!(*video, summary.video);
    assert_eq!(metadata.title, "Solar Power | Auto-generated on 2026-10-19");
    assert!(metadata.description.contains(SCRIPT));
    assert_eq!(metadata.tags, vec!["solar", "power"]);
    assert_eq!(metadata.privacy_status, "unlisted");
    assert_eq!(metadata.category_id, "28");

    assert_eq!(summary.upload.url, "https://youtube.com/watch?v=abc123XYZ");
}

#[derive(Default)]
struct StageLog(Mutex<Vec<String>>);

impl Observer for StageLog {
    fn stage_started(&self, stage: Stage) {
        self.0.lock().unwrap().push(format!("start {:?}", stage));
    }

    fn stage_finished(&self, stage: Stage, _detail: &str) {
        self.0.lock().unwrap().push(format!("end {:?}", stage));
    }
}

#[tokio::test]
async fn stages_run_sequentially_in_order() {
    let dir = TempDir::new().unwrap();
    let h = harness(dir.path().to_path_buf());
    let log = StageLog::default();

    h.pipeline.run("Solar Power", &log).await.unwrap();

    let expected: Vec<String> = [
        Stage::Script,
        Stage::Narration,
        Stage::Keywords,
        Stage::Footage,
        Stage::Compose,
        Stage::Publish,
    ]
    .iter()
    .flat_map(|s| [format!("start {:?}", s), format!("end {:?}", s)])
    .collect();
    assert_eq!(*log.0.lock().unwrap(), expected);
}
