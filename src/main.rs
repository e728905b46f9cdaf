//! Headless host for the countdown overlay.
//!
//! Drives the library's engines and logs what a window would draw.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;

use countdown_overlay::config::Configuration;
use countdown_overlay::events::CountdownFinished;
use countdown_overlay::overlay::Overlay;
use countdown_overlay::platform::finish_action;
use countdown_overlay::tasks::countdown::SystemClock;

#[derive(Debug, Parser)]
#[command(
    name = "countdown-overlay",
    version,
    about = "Countdown clock over a rotating slideshow"
)]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,
    /// End time (HH:MM:SS); rolls over to tomorrow when already past
    #[arg(long = "end-time", value_name = "HH:MM:SS")]
    end_time: Option<String>,
    /// Directory of slideshow images
    #[arg(long, value_name = "DIR")]
    slides: Option<PathBuf>,
    /// Static background picture
    #[arg(long, value_name = "FILE")]
    background: Option<PathBuf>,
    /// Seconds between slides; anything but a positive integer halts rotation
    #[arg(long, value_name = "SECONDS")]
    pause: Option<String>,
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if verbosity > 0 {
        let level = if verbosity == 1 { Level::DEBUG } else { Level::TRACE };
        filter = filter.add_directive(format!("countdown_overlay={level}").parse()?);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        config,
        end_time,
        slides,
        background,
        pause,
        verbose,
    } = Args::parse();
    init_tracing(verbose)?;

    let cfg = match &config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Configuration::default(),
    }
    .validated()
    .context("invalid configuration values")?;
    debug!("configuration:\n{:#?}", cfg);

    let (finished_tx, mut finished_rx) = mpsc::channel::<CountdownFinished>(1);
    let mut overlay = Overlay::new(&cfg, Arc::new(SystemClock), Some(finished_tx));

    overlay
        .apply_end_time_text(end_time.as_deref().unwrap_or(&cfg.end_time))
        .await;
    if let Some(text) = pause.as_deref() {
        overlay.apply_pause_text(text);
    }
    if let Some(path) = background.or_else(|| cfg.slideshow.background.clone()) {
        if let Err(err) = overlay.set_background(path).await {
            warn!("{err:#}");
        }
    }
    if let Some(dir) = slides.or_else(|| cfg.slideshow.directory.clone()) {
        overlay.show_directory(dir).await;
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    let mut text_rx = overlay.countdown().subscribe();
    let mut slide_rx = overlay.slideshow().subscribe();
    let mut backdrop_rx = overlay.slideshow().subscribe_backdrop();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            Some(CountdownFinished { target }) = finished_rx.recv() => {
                info!(%target, "countdown finished");
                if let Some(command) = cfg.on_finish.command.as_deref() {
                    if let Err(err) = finish_action::run_command(command).await {
                        warn!("finish command failed: {err:#}");
                    }
                }
                if cfg.on_finish.exit {
                    break;
                }
            }

            Ok(()) = text_rx.changed() => {
                match overlay.timer_frame() {
                    Some(frame) if !frame.text.is_empty() => info!(
                        text = %frame.text,
                        x = frame.position.x,
                        y = frame.position.y,
                        "timer"
                    ),
                    _ => {}
                }
            }

            Ok(()) = slide_rx.changed() => {
                let slide = slide_rx.borrow_and_update().clone();
                match slide {
                    Some(slide) => info!(
                        index = slide.index,
                        path = %slide.path.display(),
                        placement = ?slide.placement,
                        "slide"
                    ),
                    None => debug!("slide cleared"),
                }
            }

            Ok(()) = backdrop_rx.changed() => {
                if let Some(b) = backdrop_rx.borrow_and_update().as_ref() {
                    info!(path = %b.path.display(), placement = ?b.placement, "background");
                }
            }
        }
    }

    overlay.shutdown().await;
    Ok(())
}
