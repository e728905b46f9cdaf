use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use palette::Srgb;
use serde::de::{self, Deserializer};
use serde::Deserialize;

use crate::processing::layout::{Length, Padding, Size};
use crate::processing::placement::Corner;
use crate::tasks::countdown::TickMode;
use crate::tasks::slideshow::DEFAULT_PAUSE;

/// Startup values for the overlay. Nothing here is ever written back.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// End time as `HH:MM:SS`; resolved against today, or tomorrow once passed.
    pub end_time: String,
    pub tick_mode: TickMode,
    pub timer: TimerOptions,
    pub window: WindowOptions,
    pub slideshow: SlideshowOptions,
    pub on_finish: FinishOptions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TimerOptions {
    pub visible: bool,
    /// Font size in points.
    pub font_size: u32,
    #[serde(deserialize_with = "deserialize_color")]
    pub font_color: Srgb<u8>,
    pub corner: Corner,
    pub padding_x: Length,
    pub padding_y: Length,
    /// Natural size of the rendered timer, used for corner placement.
    pub size: Size,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct WindowOptions {
    pub size: Size,
    pub fullscreen: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SlideshowOptions {
    pub directory: Option<PathBuf>,
    #[serde(with = "humantime_serde")]
    pub pause: Duration,
    pub padding: Padding,
    pub background: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FinishOptions {
    /// Shell command run once when the countdown expires.
    pub command: Option<String>,
    /// Quit the host after expiry.
    pub exit: bool,
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<Srgb<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_color(&raw).map_err(de::Error::custom)
}

/// Parses `#rrggbb` / `#rgb` color text.
pub fn parse_color(text: &str) -> Result<Srgb<u8>> {
    text.trim()
        .parse::<Srgb<u8>>()
        .map_err(|err| anyhow::anyhow!("invalid color '{text}': {err}"))
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(self.timer.font_size > 0, "timer.font-size must be greater than zero");
        ensure!(
            !self.window.size.is_empty(),
            "window.size must be positive in both dimensions"
        );
        ensure!(
            self.timer.size.width >= 0.0 && self.timer.size.height >= 0.0,
            "timer.size must not be negative"
        );
        ensure!(
            self.slideshow.pause > Duration::ZERO,
            "slideshow.pause must be greater than zero"
        );
        self.timer
            .padding_x
            .validate()
            .context("invalid timer.padding-x")?;
        self.timer
            .padding_y
            .validate()
            .context("invalid timer.padding-y")?;
        self.slideshow
            .padding
            .validate()
            .context("invalid slideshow.padding")?;
        Ok(self)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            end_time: "10:00:00".to_string(),
            tick_mode: TickMode::default(),
            timer: TimerOptions::default(),
            window: WindowOptions::default(),
            slideshow: SlideshowOptions::default(),
            on_finish: FinishOptions::default(),
        }
    }
}

impl Default for TimerOptions {
    fn default() -> Self {
        Self {
            visible: true,
            font_size: 200,
            font_color: Srgb::new(255, 255, 255),
            corner: Corner::default(),
            padding_x: Length::ZERO,
            padding_y: Length::ZERO,
            size: Size::new(600.0, 220.0),
        }
    }
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            size: Size::new(800.0, 400.0),
            fullscreen: false,
        }
    }
}

impl Default for SlideshowOptions {
    fn default() -> Self {
        Self {
            directory: None,
            pause: DEFAULT_PAUSE,
            padding: Padding::NONE,
            background: None,
        }
    }
}

impl Default for FinishOptions {
    fn default() -> Self {
        Self {
            command: None,
            exit: true,
        }
    }
}
