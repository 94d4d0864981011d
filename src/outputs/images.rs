//! Thumbnail image sink.
//!
//! Each in-window row requests a thumbnail download keyed by its
//! deterministic image name. Downloads are fire-and-forget from the walker's
//! point of view: a failure is logged per record and never aborts the walk.
//!
//! The on-disk filename is the record's image name plus whatever extension
//! the source URL implies; no normalization is applied.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};
use url::Url;

/// Error type for sink implementations.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Destination for per-record thumbnail downloads.
#[allow(async_fn_in_trait)]
pub trait ImageSink {
    /// Fetch `url` and persist it under `image_name`.
    async fn download(&mut self, url: &str, image_name: &str) -> Result<(), SinkError>;
}

/// Image sink that downloads over HTTP and writes under an output directory.
pub struct FsImageSink {
    client: reqwest::Client,
    dir: PathBuf,
    base: Option<Url>,
}

impl FsImageSink {
    /// Create a sink writing into `dir`. The directory is created on the
    /// first download.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FsImageSink {
            client: reqwest::Client::new(),
            dir: dir.into(),
            base: None,
        }
    }

    /// Resolve relative image URLs against `base` (usually the page the
    /// rows came from).
    pub fn with_base(mut self, base: Url) -> Self {
        self.base = Some(base);
        self
    }

    fn resolve(&self, url: &str) -> Result<Url, url::ParseError> {
        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base {
                Some(base) => base.join(url),
                None => Err(url::ParseError::RelativeUrlWithoutBase),
            },
            Err(e) => Err(e),
        }
    }

    fn destination(&self, url: &Url, image_name: &str) -> PathBuf {
        match extension_from_path(url.path()) {
            Some(ext) => self.dir.join(format!("{image_name}.{ext}")),
            None => self.dir.join(image_name),
        }
    }
}

impl ImageSink for FsImageSink {
    #[instrument(level = "debug", skip(self))]
    async fn download(&mut self, url: &str, image_name: &str) -> Result<(), SinkError> {
        let url = self.resolve(url)?;
        fs::create_dir_all(&self.dir).await?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        let dest = self.destination(&url, image_name);
        fs::write(&dest, &bytes).await?;
        info!(path = %dest.display(), bytes = bytes.len(), "Wrote thumbnail");
        Ok(())
    }
}

/// Sink that drops every download request; used when thumbnails are not
/// wanted.
pub struct NullImageSink;

impl ImageSink for NullImageSink {
    async fn download(&mut self, url: &str, image_name: &str) -> Result<(), SinkError> {
        debug!(url, image_name, "Skipping thumbnail download");
        Ok(())
    }
}

/// Extension implied by a URL path, if any.
fn extension_from_path(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
}
