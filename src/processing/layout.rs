//! Aspect-preserving fit of an image into a padded container.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde::de::{self, Deserializer};

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(from = "[f32; 2]")]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl From<[f32; 2]> for Size {
    fn from([width, height]: [f32; 2]) -> Self {
        Self { width, height }
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// True when `other` lies inside `self`, allowing `eps` of float slack.
    pub fn contains_rect(&self, other: &Rect, eps: f32) -> bool {
        other.x >= self.x - eps
            && other.y >= self.y - eps
            && other.right() <= self.right() + eps
            && other.bottom() <= self.bottom() + eps
    }
}

/// A padding or offset, either in pixels or as a percentage of the container
/// extent along the same axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f32),
    Percent(f32),
}

impl Length {
    pub const ZERO: Length = Length::Px(0.0);

    /// Absolute size in pixels against `extent`. Negative values resolve to zero.
    pub fn resolve(self, extent: f32) -> f32 {
        let px = match self {
            Length::Px(px) => px,
            Length::Percent(pct) => extent * pct / 100.0,
        };
        px.max(0.0)
    }

    pub fn validate(self) -> Result<()> {
        match self {
            Length::Px(px) if px < 0.0 || !px.is_finite() => {
                bail!("pixel length must be a non-negative number, got {px}")
            }
            Length::Percent(pct) if !(0.0..=100.0).contains(&pct) => {
                bail!("percentage must be within 0-100, got {pct}")
            }
            _ => Ok(()),
        }
    }
}

impl Default for Length {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(px) => write!(f, "{px}px"),
            Length::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

impl FromStr for Length {
    type Err = anyhow::Error;

    /// Accepts `12`, `12px` or `12%`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(pct) = s.strip_suffix('%') {
            let value = pct
                .trim()
                .parse::<f32>()
                .with_context(|| format!("invalid percentage '{s}'"))?;
            return Ok(Length::Percent(value));
        }
        let px = s.strip_suffix("px").unwrap_or(s).trim();
        let value = px
            .parse::<f32>()
            .with_context(|| format!("invalid pixel length '{s}'"))?;
        Ok(Length::Px(value))
    }
}

impl<'de> Deserialize<'de> for Length {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(px) => Ok(Length::Px(px)),
            Raw::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

/// Four-sided padding. Top and bottom resolve against the container height,
/// left and right against its width.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Padding {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl Padding {
    pub const NONE: Padding = Padding {
        top: Length::ZERO,
        right: Length::ZERO,
        bottom: Length::ZERO,
        left: Length::ZERO,
    };

    pub fn validate(&self) -> Result<()> {
        self.top.validate().context("padding.top")?;
        self.right.validate().context("padding.right")?;
        self.bottom.validate().context("padding.bottom")?;
        self.left.validate().context("padding.left")?;
        Ok(())
    }
}

/// The region left after subtracting `padding` from `container`.
///
/// Leading sides (left, top) are honoured first; trailing sides are clamped
/// so the area never has a negative size.
pub fn content_area(container: Size, padding: &Padding) -> Rect {
    let cw = container.width.max(0.0);
    let ch = container.height.max(0.0);

    let left = padding.left.resolve(cw).min(cw);
    let right = padding.right.resolve(cw).min(cw - left);
    let top = padding.top.resolve(ch).min(ch);
    let bottom = padding.bottom.resolve(ch).min(ch - top);

    Rect {
        x: left,
        y: top,
        width: cw - left - right,
        height: ch - top - bottom,
    }
}

/// Largest aspect-preserving rectangle for an `image_w` x `image_h` image,
/// centred inside the padded content area of `container`.
///
/// Returns `None` for degenerate images or an empty content area.
pub fn fit_within(container: Size, padding: &Padding, image_w: u32, image_h: u32) -> Option<Rect> {
    if image_w == 0 || image_h == 0 {
        return None;
    }
    let area = content_area(container, padding);
    if area.width <= 0.0 || area.height <= 0.0 {
        return None;
    }

    let iw = image_w as f32;
    let ih = image_h as f32;
    let scale = (area.width / iw).min(area.height / ih);
    let width = iw * scale;
    let height = ih * scale;

    Some(Rect {
        x: area.x + (area.width - width) / 2.0,
        y: area.y + (area.height - height) / 2.0,
        width,
        height,
    })
}

/// Full-container fit, used for the static background picture.
pub fn fit_full(container: Size, image_w: u32, image_h: u32) -> Option<Rect> {
    fit_within(container, &Padding::NONE, image_w, image_h)
}
