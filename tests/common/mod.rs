#![allow(dead_code)]

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use countdown_overlay::tasks::countdown::Clock;
use image::{Rgba, RgbaImage};
use tokio::time::Instant;

/// Wall clock that follows tokio's (pausable) monotonic clock.
pub struct PausedClock {
    base: NaiveDateTime,
    started: Instant,
}

impl PausedClock {
    pub fn new(base: NaiveDateTime) -> Self {
        Self {
            base,
            started: Instant::now(),
        }
    }
}

impl Clock for PausedClock {
    fn now(&self) -> NaiveDateTime {
        self.base + TimeDelta::from_std(self.started.elapsed()).unwrap()
    }
}

pub fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]))
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}
