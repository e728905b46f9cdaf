use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use image::RgbaImage;
use image::imageops;
use tracing::debug;

/// Decodes `path` to RGBA8 off the async runtime.
pub async fn load(path: PathBuf) -> Result<Arc<RgbaImage>> {
    let display = path.display().to_string();
    let img = tokio::task::spawn_blocking(move || decode_upright(&path))
        .await
        .with_context(|| format!("decoder task for {display} failed"))??;
    Ok(Arc::new(img))
}

/// Decodes an image and rotates/flips it upright according to its EXIF
/// orientation tag, when one is present.
pub fn decode_upright(path: &Path) -> Result<RgbaImage> {
    let img = image::ImageReader::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .with_guessed_format()?
        .decode()
        .with_context(|| format!("failed to decode {}", path.display()))?
        .to_rgba8();

    let orientation = exif_orientation(path).unwrap_or(1);
    Ok(orient(img, orientation))
}

fn orient(img: RgbaImage, orientation: u32) -> RgbaImage {
    match orientation {
        2 => imageops::flip_horizontal(&img),
        3 => imageops::rotate180(&img),
        4 => imageops::flip_vertical(&img),
        5 => imageops::flip_horizontal(&imageops::rotate90(&img)),
        6 => imageops::rotate90(&img),
        7 => imageops::flip_horizontal(&imageops::rotate270(&img)),
        8 => imageops::rotate270(&img),
        _ => img,
    }
}

fn exif_orientation(path: &Path) -> Option<u32> {
    let mut reader = BufReader::new(File::open(path).ok()?);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;
    let value = exif
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)?
        .value
        .get_uint(0)?;
    debug!(orientation = value, path = %path.display(), "exif orientation");
    Some(value)
}
