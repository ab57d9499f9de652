use std::{
    path::Path,
    sync::Mutex,
    time::{Duration, Instant},
};

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use autotube_core::{
    AutotubeError, Components, Config, DEFAULT_CONFIG_PATH, Observer, Pipeline, Stage,
    format_bytes, format_duration, mask_key,
};

#[derive(Parser)]
#[command(name = "autotube", version)]
#[command(about = "Generate a narrated stock-footage video about a topic and upload it to YouTube")]
struct Cli {
    /// Topic for the video
    topic: String,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn create_upload_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} Uploading [{bar:30.cyan/blue}] {percent:>3}% {msg}")
            .unwrap()
            .progress_chars("=> "),
    );
    pb
}

/// Spinner per stage, a determinate bar once the upload starts.
struct CliObserver {
    active: Mutex<Option<(ProgressBar, Instant)>>,
}

impl CliObserver {
    fn new() -> Self {
        Self {
            active: Mutex::new(None),
        }
    }
}

impl Observer for CliObserver {
    fn stage_started(&self, stage: Stage) {
        let spinner = create_spinner(&format!("{}...", stage.label()));
        *self.active.lock().unwrap() = Some((spinner, Instant::now()));
    }

    fn stage_finished(&self, stage: Stage, detail: &str) {
        if let Some((pb, started)) = self.active.lock().unwrap().take() {
            pb.finish_with_message(format!(
                "{} {}: {} {}",
                style("✓").green().bold(),
                stage.label(),
                style(detail).dim(),
                style(format!("[{}]", format_duration(started.elapsed()))).dim()
            ));
        }
    }

    fn notice(&self, message: &str) {
        let line = format!("  {} {}", style("!").yellow().bold(), message);
        match self.active.lock().unwrap().as_ref() {
            Some((pb, _)) => pb.println(line),
            None => eprintln!("{}", line),
        }
    }

    fn upload_progress(&self, sent: u64, total: u64) {
        let mut active = self.active.lock().unwrap();
        let Some((pb, _)) = active.as_mut() else {
            return;
        };

        if pb.length() != Some(total) {
            let bar = create_upload_bar(total);
            pb.finish_and_clear();
            *pb = bar;
        }
        pb.set_position(sent);
        pb.set_message(format!("{} / {}", format_bytes(sent), format_bytes(total)));
        pb.println(format!(
            "  Upload progress: {:.2}%",
            sent as f64 / total as f64 * 100.0
        ));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Fail before any network call if the configuration is missing
    let config = match Config::load(Path::new(DEFAULT_CONFIG_PATH)) {
        Ok(config) => config,
        Err(e @ AutotubeError::MissingConfig { .. }) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let api_key = match config.chat_api_key() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    println!(
        "\n{}  {}\n",
        style("autotube").cyan().bold(),
        style("Video Publisher").dim()
    );
    println!(
        "{} {} key: {}",
        style("✓").green().bold(),
        config.provider.name(),
        style(mask_key(&api_key)).dim()
    );
    println!("{}", style("─".repeat(60)).dim());

    let total_start = Instant::now();
    let components = Components::live(&config, api_key)?;
    let pipeline = Pipeline::new(config, components);
    let summary = pipeline.run(&cli.topic, &CliObserver::new()).await?;

    println!(
        "\n{} {}\n",
        style("Total time:").dim(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{} Upload finished: {}",
        style("✅").green(),
        style(&summary.upload.url).cyan()
    );

    Ok(())
}
