use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use image::RgbaImage;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::events::{Backdrop, Slide};
use crate::processing::layout::{Padding, Rect, Size, fit_full, fit_within};
use crate::tasks::{files, loader};

pub const DEFAULT_PAUSE: Duration = Duration::from_secs(5);

/// Pause used when the requested one is unusable; rotation effectively halts.
pub const NEVER_ROTATE: Duration = Duration::from_secs(99_999);

/// Interprets raw pause text in whole seconds. Anything that is not a positive
/// integer maps to [`NEVER_ROTATE`].
pub fn pause_from_text(text: &str) -> Duration {
    match text.trim().parse::<i64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs as u64),
        _ => NEVER_ROTATE,
    }
}

#[inline]
pub fn advance(cursor: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (cursor + 1) % len }
}

/// Where slides are laid out: the container and the padding around them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub container: Size,
    pub padding: Padding,
}

impl Geometry {
    fn place(&self, image: &RgbaImage) -> Option<Rect> {
        let (w, h) = image.dimensions();
        fit_within(self.container, &self.padding, w, h)
    }
}

struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Rotates through the images of a directory, plus an optional static
/// background picture laid out against the whole container.
pub struct SlideshowEngine {
    pause: watch::Sender<Duration>,
    geometry: watch::Sender<Geometry>,
    slide: Arc<watch::Sender<Option<Slide>>>,
    backdrop: watch::Sender<Option<Backdrop>>,
    images: Arc<[PathBuf]>,
    running: Option<Running>,
}

impl SlideshowEngine {
    pub fn new(container: Size, padding: Padding, pause: Duration) -> Self {
        let (pause, _) = watch::channel(pause);
        let (geometry, _) = watch::channel(Geometry { container, padding });
        let (slide, _) = watch::channel(None);
        let (backdrop, _) = watch::channel(None);
        Self {
            pause,
            geometry,
            slide: Arc::new(slide),
            backdrop,
            images: Arc::from(Vec::new()),
            running: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Slide>> {
        self.slide.subscribe()
    }

    pub fn subscribe_backdrop(&self) -> watch::Receiver<Option<Backdrop>> {
        self.backdrop.subscribe()
    }

    pub fn current(&self) -> Option<Slide> {
        self.slide.borrow().clone()
    }

    pub fn backdrop(&self) -> Option<Backdrop> {
        self.backdrop.borrow().clone()
    }

    /// Images found by the most recent `start`, in display order.
    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn is_active(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    pub fn pause(&self) -> Duration {
        *self.pause.borrow()
    }

    /// Applies from the next rotation on.
    pub fn set_pause(&self, pause: Duration) {
        debug!(pause = %humantime::format_duration(pause), "slideshow pause updated");
        self.pause.send_replace(pause);
    }

    pub fn geometry(&self) -> Geometry {
        *self.geometry.borrow()
    }

    pub fn set_container_size(&self, container: Size) {
        let changed = self.geometry.send_if_modified(|g| {
            let changed = g.container != container;
            g.container = container;
            changed
        });
        if changed {
            self.backdrop.send_if_modified(|backdrop| match backdrop {
                Some(b) => {
                    let (w, h) = b.image.dimensions();
                    b.placement = fit_full(container, w, h);
                    true
                }
                None => false,
            });
        }
    }

    pub fn set_padding(&self, padding: Padding) {
        self.geometry.send_if_modified(|g| {
            let changed = g.padding != padding;
            g.padding = padding;
            changed
        });
    }

    /// Snapshots `dir` and starts rotating from its first image.
    ///
    /// Returns the number of images found; with none the engine stays idle.
    pub async fn start(&mut self, dir: impl Into<PathBuf>) -> usize {
        self.stop().await;

        let dir = dir.into();
        let images = match tokio::task::spawn_blocking(move || files::snapshot_images(&dir)).await
        {
            Ok(images) => images,
            Err(err) => {
                warn!("directory scan failed: {err}");
                Vec::new()
            }
        };
        self.images = Arc::from(images);

        if self.images.is_empty() {
            info!("no images found; slideshow idle");
            return 0;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(
            self.images.clone(),
            self.pause.subscribe(),
            self.geometry.subscribe(),
            self.slide.clone(),
            cancel.clone(),
        ));
        info!(count = self.images.len(), "slideshow started");
        self.running = Some(Running { cancel, handle });
        self.images.len()
    }

    /// Halts rotation and clears the current slide. The backdrop is kept.
    pub async fn stop(&mut self) {
        if let Some(Running { cancel, handle }) = self.running.take() {
            cancel.cancel();
            if let Err(err) = handle.await {
                warn!("slideshow task ended abnormally: {err}");
            }
            info!("slideshow stopped");
        }
        self.slide.send_if_modified(|slide| slide.take().is_some());
    }

    pub async fn set_background(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let image = loader::load(path.clone())
            .await
            .with_context(|| format!("failed to load background picture {}", path.display()))?;
        let (w, h) = image.dimensions();
        let placement = fit_full(self.geometry.borrow().container, w, h);
        info!(path = %path.display(), "background picture set");
        self.backdrop.send_replace(Some(Backdrop {
            path,
            image,
            placement,
        }));
        Ok(())
    }

    pub fn clear_background(&self) {
        self.backdrop.send_if_modified(|b| b.take().is_some());
    }
}

impl Drop for SlideshowEngine {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            running.cancel.cancel();
        }
    }
}

async fn run(
    images: Arc<[PathBuf]>,
    pause: watch::Receiver<Duration>,
    mut geometry: watch::Receiver<Geometry>,
    slide: Arc<watch::Sender<Option<Slide>>>,
    cancel: CancellationToken,
) {
    let mut cursor = 0;
    loop {
        let path = images[cursor].clone();
        tokio::select! {
            _ = cancel.cancelled() => return,
            loaded = loader::load(path.clone()) => {
                match loaded {
                    Ok(image) => {
                        let placement = geometry.borrow_and_update().place(&image);
                        debug!(index = cursor, path = %path.display(), ?placement, "slide published");
                        slide.send_replace(Some(Slide {
                            path,
                            index: cursor,
                            image,
                            placement,
                        }));
                    }
                    Err(err) => warn!("skipping slide: {err:#}"),
                }
            }
        }

        // far deadlines are clamped by the timer instead of overflowing
        let rotation = sleep(*pause.borrow());
        tokio::pin!(rotation);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = &mut rotation => break,
                changed = geometry.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    let g = *geometry.borrow_and_update();
                    slide.send_modify(|current| {
                        if let Some(s) = current {
                            s.placement = g.place(&s.image);
                        }
                    });
                }
            }
        }

        cursor = advance(cursor, images.len());
    }
}
