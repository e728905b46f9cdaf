use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

/// Extensions (lowercase, without the dot) the slideshow will pick up.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "webp", "bmp", "tif", "png"];

#[inline]
pub fn is_image(p: &Path) -> bool {
    p.extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

/// Lists the images directly inside `dir`, sorted by path.
///
/// Subdirectories are not descended into. A missing or unreadable directory
/// yields an empty list.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn snapshot_images(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        warn!("slideshow directory is missing or not a directory");
        return Vec::new();
    }

    let mut images: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!("skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_image(p))
        .collect();
    images.sort();

    info!(discovered = images.len(), "slideshow directory scanned");
    images
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(is_image(Path::new("/x/a.JPG")));
        assert!(is_image(Path::new("b.Tif")));
        assert!(is_image(Path::new("c.webp")));
        assert!(!is_image(Path::new("d.gif")));
        assert!(!is_image(Path::new("e.tiff")));
        assert!(!is_image(Path::new("png")));
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(snapshot_images(&dir.path().join("nope")).is_empty());
    }
}
