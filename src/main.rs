//! Binary entrypoint for the photo slideshow.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use rust_photo_slideshow::config::{Configuration, LogLevel};
use rust_photo_slideshow::events::Action;
use rust_photo_slideshow::fonts::FontCatalog;
use rust_photo_slideshow::platform::display::{DisplaySink, TracingDisplay};
use rust_photo_slideshow::playlist::{LaunchTarget, PlaylistLoader};
use rust_photo_slideshow::slideshow::Slideshow;
use rust_photo_slideshow::state::PlaybackState;
use rust_photo_slideshow::tasks::{input, scheduler};

#[derive(Debug, Parser)]
#[command(
    name = "photo-slideshow",
    version,
    about = "Slideshow of cropped, captioned photos driven by a playlist"
)]
struct Args {
    /// Slideshow directory, or a playlist file inside it
    #[arg(value_name = "PATH")]
    path: PathBuf,
    /// Path to YAML config; built-in defaults apply when it does not exist
    #[arg(short, long, value_name = "FILE", default_value = "config.yaml")]
    config: PathBuf,
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn load_configuration(path: &Path) -> Result<Configuration> {
    let cfg = if path.exists() {
        Configuration::from_yaml_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?
    } else {
        Configuration::default()
    };
    cfg.validated().context("invalid configuration values")
}

fn init_tracing(level: LogLevel, verbosity: u8) {
    // -v raises the configured level
    let level = match verbosity {
        0 => level.as_filter(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,rust_photo_slideshow={level},photo_slideshow={level}"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        path,
        config,
        verbose,
    } = Args::parse();

    let cfg = load_configuration(&config)?;
    init_tracing(cfg.log_level, verbose);
    tracing::info!(
        config = %config.display(),
        interval = %humantime::format_duration(cfg.slide_interval),
        canvas = ?cfg.canvas,
        "configuration loaded"
    );

    let target = LaunchTarget::resolve(&path, &cfg.playlist, cfg.canvas)?;
    tracing::info!(
        directory = %target.directory.display(),
        playlist = %target.playlist.display(),
        "launch target"
    );

    let mut sink = TracingDisplay::default();
    let load = PlaylistLoader::load(&target.playlist);
    if let Some(note) = load.notification() {
        sink.notify(&note);
    }

    let font = FontCatalog::new(cfg.fonts.clone()).select(&cfg.font_request());
    let slideshow = Slideshow::new(target.directory, load.playlist, &cfg, font)?;
    let state = PlaybackState::new(&cfg);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    let (action_tx, action_rx) = mpsc::channel::<Action>(16); // Input -> Scheduler
    let mut tasks = JoinSet::new();

    tasks.spawn({
        let cancel = cancel.clone();
        async move {
            input::run(BufReader::new(io::stdin()), action_tx, cancel)
                .await
                .context("input task failed")
        }
    });

    tasks.spawn({
        let cancel = cancel.clone();
        let canvas = cfg.canvas;
        async move {
            scheduler::run(slideshow, sink, state, canvas, action_rx, cancel)
                .await
                .context("scheduler task failed")
        }
    });

    let mut outcome = Ok(());
    while let Some(joined) = tasks.join_next().await {
        let result = joined.context("task panicked").and_then(|r| r);
        if let Err(err) = result {
            tracing::error!("{err:#}");
            cancel.cancel();
            if outcome.is_ok() {
                outcome = Err(err);
            }
        }
    }
    outcome
}
