use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::Parser;

use faceplay_core::action::domain::action_dispatcher::ActionDispatcher;
use faceplay_core::action::domain::action_sink::ActionSink;
use faceplay_core::action::domain::media_executor::{AudioPlayer, UrlOpener};
use faceplay_core::action::infrastructure::background_dispatcher::BackgroundDispatcher;
use faceplay_core::action::infrastructure::browser_url_opener::BrowserUrlOpener;
use faceplay_core::action::infrastructure::dry_run::{DryRunAudioPlayer, DryRunUrlOpener};
use faceplay_core::action::infrastructure::process_audio_player::ProcessAudioPlayer;
use faceplay_core::config::app_config::AppConfig;
use faceplay_core::expression::domain::expression_classifier::GeometricClassifier;
use faceplay_core::landmarks::domain::landmark_source::LandmarkSource;
use faceplay_core::landmarks::infrastructure::json_lines_source::JsonLinesSource;
use faceplay_core::pipeline::expression_trigger_use_case::ExpressionTriggerUseCase;
use faceplay_core::pipeline::session_logger::LogSessionLogger;
use faceplay_core::shared::constants::DEFAULT_QUIT_KEY;
use faceplay_core::trigger::domain::hold_tracker::HoldTracker;
use faceplay_core::trigger::domain::trigger_engine::TriggerEngine;

/// Trigger media playback from facial expressions.
#[derive(Parser)]
#[command(name = "faceplay")]
struct Cli {
    /// Config file (default: ./config.json, then the user config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Landmark stream as JSON lines, or "-" for stdin.
    #[arg(long, default_value = "-")]
    landmarks: PathBuf,

    /// Seconds before the same expression can trigger again.
    #[arg(long)]
    cooldown: Option<f64>,

    /// Input line that ends the session.
    #[arg(long, default_value = DEFAULT_QUIT_KEY)]
    quit_key: String,

    /// Log actions instead of opening the browser or playing audio.
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(secs) = cli.cooldown {
        config.settings.cooldown_seconds = secs;
        config.settings.validate()?;
    }
    log_startup(&config, &cli);

    let source = open_source(&cli.landmarks, config.settings.detection_confidence, &cli.quit_key)?;
    let classifier = GeometricClassifier::new(config.settings.thresholds());
    let engine = TriggerEngine::new(config.settings.cooldown());
    let holds = HoldTracker::new(
        config.actions.held_expressions(),
        config.settings.hold_sample_interval(),
    );
    let sink = build_sink(config, cli.dry_run);

    let mut use_case = ExpressionTriggerUseCase::new(
        source,
        Box::new(classifier),
        engine,
        sink,
        Box::new(LogSessionLogger::new()),
        None,
    )
    .with_hold_tracker(holds);
    use_case.run()?;

    log::info!("Goodbye");
    Ok(())
}

fn open_source(
    landmarks: &Path,
    min_confidence: f64,
    quit_key: &str,
) -> Result<Box<dyn LandmarkSource>, Box<dyn std::error::Error>> {
    if landmarks == Path::new("-") {
        log::info!("Reading landmarks from stdin; enter '{quit_key}' to quit");
        return Ok(Box::new(JsonLinesSource::stdin(min_confidence, quit_key)));
    }
    log::info!("Replaying landmarks from {}", landmarks.display());
    Ok(Box::new(JsonLinesSource::open(
        landmarks,
        min_confidence,
        quit_key,
    )?))
}

fn build_sink(config: AppConfig, dry_run: bool) -> Box<dyn ActionSink> {
    let (opener, player): (Box<dyn UrlOpener>, Box<dyn AudioPlayer>) = if dry_run {
        (Box::new(DryRunUrlOpener), Box::new(DryRunAudioPlayer))
    } else {
        (Box::new(BrowserUrlOpener), Box::new(ProcessAudioPlayer::new()))
    };
    let dispatcher = ActionDispatcher::new(config.actions, opener, player);
    Box::new(BackgroundDispatcher::spawn(Box::new(dispatcher)))
}

fn log_startup(config: &AppConfig, cli: &Cli) {
    match &config.origin {
        Some(path) => log::info!("Using config {}", path.display()),
        None => log::info!("Using built-in configuration"),
    }
    log::info!(
        "Expression threshold {:.2}, detection confidence {:.2}{}",
        config.settings.expression_threshold,
        config.settings.detection_confidence,
        if cli.dry_run { " (dry run)" } else { "" }
    );
    if config.actions.is_empty() {
        log::warn!("No actions configured; expressions will be detected but do nothing");
    }
    for action in config.actions.iter() {
        log::info!("  {} -> {} ({})", action.expression, action.kind, action.description);
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(secs) = cli.cooldown {
        if Duration::try_from_secs_f64(secs).is_err() {
            let message = format!("Cooldown must be a non-negative number of seconds, got {secs}");
            return Err(message.into());
        }
    }
    if cli.quit_key.trim().is_empty() {
        return Err("Quit key must not be empty".into());
    }
    if cli.landmarks != Path::new("-") && !cli.landmarks.exists() {
        return Err(format!("Landmark file not found: {}", cli.landmarks.display()).into());
    }
    Ok(())
}
