use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::Deserialize;
use serde::de::{self, Deserializer};

use crate::processing::layout::{Length, Size};

/// Screen position of the timer, numbered like a numeric keypad
/// (7 8 9 on top, 1 2 3 at the bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Corner {
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
    MiddleLeft,
    Center,
    MiddleRight,
    TopLeft,
    TopCenter,
    TopRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Start,
    Center,
    End,
}

impl Corner {
    pub const ALL: [Corner; 9] = [
        Corner::BottomLeft,
        Corner::BottomCenter,
        Corner::BottomRight,
        Corner::MiddleLeft,
        Corner::Center,
        Corner::MiddleRight,
        Corner::TopLeft,
        Corner::TopCenter,
        Corner::TopRight,
    ];

    pub fn keypad(self) -> u8 {
        match self {
            Corner::BottomLeft => 1,
            Corner::BottomCenter => 2,
            Corner::BottomRight => 3,
            Corner::MiddleLeft => 4,
            Corner::Center => 5,
            Corner::MiddleRight => 6,
            Corner::TopLeft => 7,
            Corner::TopCenter => 8,
            Corner::TopRight => 9,
        }
    }

    fn horizontal(self) -> Align {
        match self {
            Corner::BottomLeft | Corner::MiddleLeft | Corner::TopLeft => Align::Start,
            Corner::BottomCenter | Corner::Center | Corner::TopCenter => Align::Center,
            Corner::BottomRight | Corner::MiddleRight | Corner::TopRight => Align::End,
        }
    }

    fn vertical(self) -> Align {
        match self {
            Corner::TopLeft | Corner::TopCenter | Corner::TopRight => Align::Start,
            Corner::MiddleLeft | Corner::Center | Corner::MiddleRight => Align::Center,
            Corner::BottomLeft | Corner::BottomCenter | Corner::BottomRight => Align::End,
        }
    }
}

impl TryFrom<u8> for Corner {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self> {
        Corner::ALL
            .into_iter()
            .find(|c| c.keypad() == value)
            .ok_or_else(|| anyhow!("corner must be a keypad digit 1-9, got {value}"))
    }
}

impl FromStr for Corner {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let digit = s
            .trim()
            .parse::<u8>()
            .map_err(|_| anyhow!("corner must be a keypad digit 1-9, got '{s}'"))?;
        Corner::try_from(digit)
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keypad())
    }
}

impl<'de> Deserialize<'de> for Corner {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u8::deserialize(deserializer)?;
        Corner::try_from(raw).map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Absolute position of a `widget` inside `container` for `corner`.
///
/// Edge-aligned axes are offset inward by the padding (`padding_x` against
/// the container width, `padding_y` against its height); centred axes ignore
/// the padding.
pub fn place(
    corner: Corner,
    widget: Size,
    container: Size,
    padding_x: Length,
    padding_y: Length,
) -> Point {
    let x = align(
        corner.horizontal(),
        widget.width,
        container.width,
        padding_x.resolve(container.width),
    );
    let y = align(
        corner.vertical(),
        widget.height,
        container.height,
        padding_y.resolve(container.height),
    );
    Point { x, y }
}

fn align(mode: Align, inner: f32, outer: f32, pad: f32) -> f32 {
    match mode {
        Align::Start => pad,
        Align::Center => (outer - inner) / 2.0,
        Align::End => outer - inner - pad,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypad_digits_round_trip() {
        for corner in Corner::ALL {
            assert_eq!(Corner::try_from(corner.keypad()).unwrap(), corner);
        }
        assert!(Corner::try_from(0).is_err());
        assert!(Corner::try_from(10).is_err());
        assert!("x".parse::<Corner>().is_err());
        assert_eq!("7".parse::<Corner>().unwrap(), Corner::TopLeft);
    }

    #[test]
    fn bottom_right_default_matches_simple_overlay() {
        let p = place(
            Corner::default(),
            Size::new(600.0, 220.0),
            Size::new(1920.0, 1080.0),
            Length::ZERO,
            Length::ZERO,
        );
        assert_eq!(p, Point { x: 1320.0, y: 860.0 });
    }
}
