use std::io::Cursor;

use async_trait::async_trait;
use bytes::Bytes;
use futures::channel::oneshot;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{load_from_memory, ColorType};

use crate::processor::{Dimensions, EngineError, ImageResizer};

/// The largest width or height the in-process engine will allocate for.
const MAX_DIMENSION: u32 = 16_384;

/// Resizes images in-process with the `image` crate on the rayon pool.
pub struct NativeResizer {
    filter: FilterType,
    quality: u8,
}

impl NativeResizer {
    pub fn new(filter: FilterType, quality: u8) -> Self {
        Self {
            filter,
            quality: quality.clamp(1, 100),
        }
    }
}

#[async_trait]
impl ImageResizer for NativeResizer {
    async fn resize(&self, data: Bytes, dimensions: Dimensions) -> Result<Bytes, EngineError> {
        let (width, height) = dimensions
            .checked(MAX_DIMENSION)
            .ok_or(EngineError::InvalidGeometry(dimensions))?;

        let filter = self.filter;
        let quality = self.quality;
        let (tx, rx) = oneshot::channel();

        rayon::spawn(move || {
            let result = resize_to_jpeg(&data, width, height, filter, quality);
            // The caller may have gone away, nothing to do about it here.
            let _ = tx.send(result);
        });

        rx.await.map_err(|_| EngineError::Cancelled)?
    }

    fn name(&self) -> &'static str {
        "native"
    }
}

pub fn resize_to_jpeg(
    data: &[u8],
    width: u32,
    height: u32,
    filter: FilterType,
    quality: u8,
) -> Result<Bytes, EngineError> {
    let img = load_from_memory(data)?;
    let resized = img.resize_exact(width, height, filter).to_rgb8();

    let mut buff = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buff, quality).encode(
        resized.as_raw(),
        width,
        height,
        ColorType::Rgb8,
    )?;

    Ok(Bytes::from(buff.into_inner()))
}
