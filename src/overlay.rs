//! Host-side composition of the countdown and slideshow engines.
//!
//! Raw form input arrives here as text. Malformed values never surface as
//! errors: they degrade to a stopped countdown, a halted rotation, or are
//! ignored, and a warning is logged.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDateTime;
use palette::Srgb;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Configuration;
use crate::events::CountdownFinished;
use crate::processing::layout::{Length, Padding, Size};
use crate::processing::placement::{Corner, Point, place};
use crate::schedule;
use crate::tasks::countdown::{Clock, CountdownEngine};
use crate::tasks::slideshow::{NEVER_ROTATE, SlideshowEngine, pause_from_text};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerStyle {
    pub visible: bool,
    pub font_size: u32,
    pub color: Srgb<u8>,
}

/// Everything a renderer needs to draw the timer for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerFrame {
    pub text: String,
    pub position: Point,
    pub size: Size,
    pub style: TimerStyle,
}

pub struct Overlay {
    clock: Arc<dyn Clock>,
    countdown: CountdownEngine,
    slideshow: SlideshowEngine,
    style: TimerStyle,
    corner: Corner,
    padding_x: Length,
    padding_y: Length,
    timer_size: Size,
    container: Size,
}

impl Overlay {
    pub fn new(
        cfg: &Configuration,
        clock: Arc<dyn Clock>,
        finished: Option<mpsc::Sender<CountdownFinished>>,
    ) -> Self {
        let mut countdown = CountdownEngine::new(clock.clone(), cfg.tick_mode);
        if let Some(tx) = finished {
            countdown = countdown.with_observer(tx);
        }
        let slideshow = SlideshowEngine::new(
            cfg.window.size,
            cfg.slideshow.padding,
            cfg.slideshow.pause,
        );
        Self {
            clock,
            countdown,
            slideshow,
            style: TimerStyle {
                visible: cfg.timer.visible,
                font_size: cfg.timer.font_size,
                color: cfg.timer.font_color,
            },
            corner: cfg.timer.corner,
            padding_x: cfg.timer.padding_x,
            padding_y: cfg.timer.padding_y,
            timer_size: cfg.timer.size,
            container: cfg.window.size,
        }
    }

    pub fn countdown(&self) -> &CountdownEngine {
        &self.countdown
    }

    pub fn slideshow(&self) -> &SlideshowEngine {
        &self.slideshow
    }

    pub fn style(&self) -> TimerStyle {
        self.style
    }

    pub fn corner(&self) -> Corner {
        self.corner
    }

    /// Resolves `text` as the next occurrence of that wall-clock time and
    /// restarts the countdown; unparseable text stops it instead.
    pub async fn apply_end_time_text(&mut self, text: &str) -> Option<NaiveDateTime> {
        match schedule::end_time_from_text(text, self.clock.now()) {
            Ok(target) => {
                self.countdown.start(target).await;
                Some(target)
            }
            Err(err) => {
                warn!("stopping countdown: {err:#}");
                self.countdown.stop().await;
                None
            }
        }
    }

    pub async fn start_countdown(&mut self, target: NaiveDateTime) {
        self.countdown.start(target).await;
    }

    pub async fn stop_countdown(&mut self) {
        self.countdown.stop().await;
    }

    /// Returns the pause actually applied.
    pub fn apply_pause_text(&self, text: &str) -> Duration {
        let pause = pause_from_text(text);
        if pause == NEVER_ROTATE {
            warn!(input = text, "unusable slideshow pause; rotation halted");
        }
        self.slideshow.set_pause(pause);
        pause
    }

    pub fn set_pause(&self, pause: Duration) {
        self.slideshow.set_pause(pause);
    }

    /// Ignores anything that is not a positive integer.
    pub fn apply_font_size_text(&mut self, text: &str) -> bool {
        match text.trim().parse::<u32>() {
            Ok(size) if size > 0 => {
                self.style.font_size = size;
                true
            }
            _ => {
                debug!(input = text, "ignoring font size");
                false
            }
        }
    }

    pub fn set_font_color(&mut self, color: Srgb<u8>) {
        self.style.color = color;
    }

    pub fn set_timer_visible(&mut self, visible: bool) {
        self.style.visible = visible;
    }

    pub fn set_corner(&mut self, corner: Corner) {
        self.corner = corner;
    }

    /// Keypad shortcut: digits 1-9 (except 5) move the timer.
    pub fn apply_corner_key(&mut self, key: char) -> bool {
        let corner = key
            .to_digit(10)
            .and_then(|d| Corner::try_from(d as u8).ok())
            .filter(|c| *c != Corner::Center);
        match corner {
            Some(corner) => {
                self.corner = corner;
                true
            }
            None => false,
        }
    }

    pub fn set_timer_padding(&mut self, padding_x: Length, padding_y: Length) {
        self.padding_x = padding_x;
        self.padding_y = padding_y;
    }

    /// Natural size of the rendered timer; changes with font and text.
    pub fn set_timer_size(&mut self, size: Size) {
        self.timer_size = size;
    }

    pub fn set_slide_padding(&self, padding: Padding) {
        self.slideshow.set_padding(padding);
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn set_container_size(&mut self, container: Size) {
        self.container = container;
        self.slideshow.set_container_size(container);
    }

    pub fn timer_position(&self) -> Point {
        place(
            self.corner,
            self.timer_size,
            self.container,
            self.padding_x,
            self.padding_y,
        )
    }

    /// `None` while the timer is hidden.
    pub fn timer_frame(&self) -> Option<TimerFrame> {
        self.style.visible.then(|| TimerFrame {
            text: self.countdown.text(),
            position: self.timer_position(),
            size: self.timer_size,
            style: self.style,
        })
    }

    pub async fn show_directory(&mut self, dir: impl Into<PathBuf>) -> usize {
        self.slideshow.start(dir).await
    }

    pub async fn stop_slideshow(&mut self) {
        self.slideshow.stop().await;
    }

    pub async fn set_background(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.slideshow.set_background(path).await
    }

    pub async fn shutdown(&mut self) {
        self.countdown.stop().await;
        self.slideshow.stop().await;
        info!("overlay shut down");
    }
}
