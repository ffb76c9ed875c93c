//! Publishers: where a finished `Post` goes.
//!
//! - `DryRunPublisher` writes the image (and a caption sidecar) to disk.
//! - `InstagramPublisher` uploads the JPEG to S3 and publishes it through the
//!   Instagram Graph API.

use std::io::Cursor;
use std::path::PathBuf;

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use thiserror::Error;

use crate::models::Post;

pub mod dry_run;
pub mod instagram;

pub use dry_run::DryRunPublisher;
pub use instagram::{InstagramPublisher, InstagramSettings};

/// JPEG quality used for every published image.
pub const JPEG_QUALITY: u8 = 87;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported output format for {0} (expected .jpg, .jpeg or .png)")]
    UnsupportedFormat(PathBuf),

    #[error("S3 upload failed: {0}")]
    Upload(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Graph API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Media container {id} not ready: {status}")]
    NotReady { id: String, status: String },
}

/// Delivers a post. Returns where it ended up (a file path or a media id).
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, post: &Post) -> Result<String, PublishError>;
}

/// JPEG has no alpha channel, so the image is flattened to RGB first.
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<Vec<u8>, PublishError> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality).encode_image(&rgb)?;
    Ok(buf)
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, PublishError> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_jpeg_has_soi_marker_and_decodes() {
        let img = RgbaImage::from_pixel(16, 16, Rgba([200, 10, 10, 255]));
        let bytes = encode_jpeg(&img, JPEG_QUALITY).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 16));
    }

    #[test]
    fn test_png_roundtrip_keeps_pixels() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        let bytes = encode_png(&img).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
            .unwrap()
            .to_rgba8();
        assert_eq!(decoded, img);
    }
}
