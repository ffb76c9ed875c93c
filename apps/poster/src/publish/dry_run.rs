use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::models::Post;
use crate::publish::{encode_jpeg, encode_png, PublishError, Publisher, JPEG_QUALITY};

/// Writes the post image to a local file instead of publishing it.
/// The caption goes to `<path>.caption.txt` next to it.
#[derive(Debug, Clone)]
pub struct DryRunPublisher {
    path: PathBuf,
}

impl DryRunPublisher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn caption_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".caption.txt");
        PathBuf::from(name)
    }

    fn encode(&self, post: &Post) -> Result<Vec<u8>, PublishError> {
        let extension = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("jpg") | Some("jpeg") => encode_jpeg(&post.image, JPEG_QUALITY),
            Some("png") => encode_png(&post.image),
            _ => Err(PublishError::UnsupportedFormat(self.path.clone())),
        }
    }
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<(), PublishError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| PublishError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[async_trait]
impl Publisher for DryRunPublisher {
    async fn publish(&self, post: &Post) -> Result<String, PublishError> {
        let bytes = self.encode(post)?;
        write_file(&self.path, &bytes).await?;

        let caption_path = self.caption_path();
        write_file(&caption_path, post.caption.as_bytes()).await?;

        info!(
            "Dry run: wrote {} ({} bytes) and {}",
            self.path.display(),
            bytes.len(),
            caption_path.display()
        );
        Ok(self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candidate;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn post() -> Post {
        Post {
            image: RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255])),
            caption: "#Quick #fox ".to_string(),
            candidate: Candidate::new("abc", "The Quick fox", "", 150),
        }
    }

    #[tokio::test]
    async fn test_writes_png_and_caption() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("card.png");
        let publisher = DryRunPublisher::new(&out);

        let location = publisher.publish(&post()).await.unwrap();
        assert_eq!(location, out.display().to_string());

        let bytes = std::fs::read(&out).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));

        let caption = std::fs::read_to_string(dir.path().join("card.png.caption.txt")).unwrap();
        assert_eq!(caption, "#Quick #fox ");
    }

    #[tokio::test]
    async fn test_writes_jpeg_for_uppercase_extension() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("card.JPG");
        DryRunPublisher::new(&out).publish(&post()).await.unwrap();

        let bytes = std::fs::read(&out).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn test_unknown_extension_is_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("card.bmp");
        let result = DryRunPublisher::new(&out).publish(&post()).await;

        assert!(matches!(result, Err(PublishError::UnsupportedFormat(_))));
        assert!(!out.exists());
    }
}
