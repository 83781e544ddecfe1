use std::fmt;
use std::io;
use std::path::Path;
use std::process::ExitStatus;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::EngineConfig;

pub mod magick;
pub mod native;

pub use magick::MagickResizer;
pub use native::NativeResizer;

/// The target size of a resize as requested by the caller.
///
/// Values are kept signed and unchecked, what counts as a valid
/// size is up to the engine (or the controller's dimension policy).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Dimensions {
    pub width: i64,
    pub height: i64,
}

impl Dimensions {
    pub fn new(width: i64, height: i64) -> Self {
        Self { width, height }
    }

    /// The dimensions as unsigned pixel counts if both are positive
    /// and fit within `max`.
    pub fn checked(&self, max: u32) -> Option<(u32, u32)> {
        let width = u32::try_from(self.width).ok()?;
        let height = u32::try_from(self.height).ok()?;

        if width == 0 || height == 0 || width > max || height > max {
            return None;
        }

        Some((width, height))
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("engine cannot produce an image of {0}")]
    InvalidGeometry(Dimensions),

    #[error("failed to launch image engine {binary:?}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },

    #[error("image engine exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("failed to stage image for the engine: {0}")]
    Staging(#[from] io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("image engine worker went away before completing")]
    Cancelled,
}

/// Something that can turn an encoded image into a JPEG of an exact size.
#[async_trait]
pub trait ImageResizer: Sync + Send + 'static {
    /// Resizes the encoded image in `data` to exactly `dimensions` and
    /// returns the result JPEG encoded.
    async fn resize(&self, data: Bytes, dimensions: Dimensions) -> Result<Bytes, EngineError>;

    /// A short name for logging.
    fn name(&self) -> &'static str;
}

impl EngineConfig {
    pub fn build(&self, scratch_dir: Option<&Path>) -> Arc<dyn ImageResizer> {
        match self {
            Self::Magick { binary, args } => Arc::new(MagickResizer::new(
                binary.clone(),
                args.clone(),
                scratch_dir.map(Path::to_path_buf),
            )),
            Self::Native { filter, quality } => {
                Arc::new(NativeResizer::new((*filter).into(), *quality))
            },
        }
    }
}
