use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDateTime;
use image::RgbaImage;

use crate::processing::layout::Rect;

/// Sent once when a countdown reaches its target on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownFinished {
    pub target: NaiveDateTime,
}

/// The slideshow image currently on display.
#[derive(Debug, Clone)]
pub struct Slide {
    pub path: PathBuf,
    /// Position in the sorted image list.
    pub index: usize,
    pub image: Arc<RgbaImage>,
    /// `None` when the image cannot be placed (degenerate size or no room).
    pub placement: Option<Rect>,
}

/// Static picture drawn underneath the slides.
#[derive(Debug, Clone)]
pub struct Backdrop {
    pub path: PathBuf,
    pub image: Arc<RgbaImage>,
    pub placement: Option<Rect>,
}
