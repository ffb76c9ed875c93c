use async_trait::async_trait;
use image::{ImageFormat, RgbaImage};
use reqwest::Client;
use tracing::debug;

use crate::feed::{get_bytes, http_client, image_format, FetchError, ImageFetcher};

/// Downloads JPEG/PNG images over HTTP and decodes them to RGBA.
#[derive(Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self {
            client: http_client()?,
        })
    }
}

/// Decodes `bytes` with the format the URL promised.
pub(crate) fn decode_image(
    bytes: &[u8],
    format: ImageFormat,
    url: &str,
) -> Result<RgbaImage, FetchError> {
    image::load_from_memory_with_format(bytes, format)
        .map(|img| img.to_rgba8())
        .map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch_image(&self, url: &str) -> Result<RgbaImage, FetchError> {
        let format =
            image_format(url).ok_or_else(|| FetchError::UnsupportedImage(url.to_string()))?;
        let body = get_bytes(self.client.get(url), url).await?;
        debug!("Downloaded {} bytes from {url}", body.len());
        decode_image(&body, format, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let decoded = decode_image(&png_bytes(), ImageFormat::Png, "https://x/a.png").unwrap();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(1, 1).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_with_wrong_format_fails() {
        let result = decode_image(&png_bytes(), ImageFormat::Jpeg, "https://x/a.jpg");
        assert!(matches!(result, Err(FetchError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_unsupported_url_fails_before_network() {
        let fetcher = HttpImageFetcher::new().unwrap();
        let result = fetcher.fetch_image("https://example.com/page.html").await;
        assert!(matches!(result, Err(FetchError::UnsupportedImage(_))));
    }
}
