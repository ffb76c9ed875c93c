//! Feed collaborators: where candidates and their images come from.
//!
//! - `FeedSource`: fetches ranked candidates for a topic (`RedditFeed`).
//! - `ImageFetcher`: downloads and decodes a candidate's image (`HttpImageFetcher`).
//!
//! Every failure here is a `FetchError`, which the pipeline treats as
//! "skip this candidate".

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, RgbaImage};
use reqwest::{Client, Url};
use thiserror::Error;

use crate::models::Candidate;

pub mod image_fetch;
pub mod reddit;

pub use image_fetch::HttpImageFetcher;
pub use reddit::{RedditFeed, RedditListing};

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const USER_AGENT: &str = concat!("poster/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Malformed feed response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid topic '{0}'")]
    InvalidTopic(String),

    #[error("Unsupported image url: {0}")]
    UnsupportedImage(String),

    #[error("Failed to decode image from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_candidates(&self, topic: &str) -> Result<Vec<Candidate>, FetchError>;
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch_image(&self, url: &str) -> Result<RgbaImage, FetchError>;
}

/// Image format implied by the URL path's extension (`.jpg`, `.jpeg`, `.png`,
/// case-insensitive). Query strings and fragments are ignored.
pub fn image_format(url: &str) -> Option<ImageFormat> {
    let parsed = Url::parse(url).ok()?;
    let extension = std::path::Path::new(parsed.path())
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "png" => Some(ImageFormat::Png),
        _ => None,
    }
}

pub fn is_image_url(url: &str) -> bool {
    image_format(url).is_some()
}

pub(crate) fn http_client() -> Result<Client, FetchError> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()?)
}

/// GET `request` and return the body, treating any non-2xx status as an error.
pub(crate) async fn get_bytes(
    request: reqwest::RequestBuilder,
    url: &str,
) -> Result<Bytes, FetchError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.bytes().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extensions_case_insensitive() {
        assert!(is_image_url("https://i.redd.it/abc.jpg"));
        assert!(is_image_url("https://i.redd.it/abc.JPEG"));
        assert!(is_image_url("https://i.imgur.com/abc.Png"));
    }

    #[test]
    fn test_query_string_is_ignored() {
        assert_eq!(
            image_format("https://example.com/pic.png?width=640&v=2"),
            Some(ImageFormat::Png)
        );
    }

    #[test]
    fn test_non_images_rejected() {
        assert!(!is_image_url("https://www.reddit.com/r/LifeProTips/comments/abc/tip/"));
        assert!(!is_image_url("https://i.imgur.com/abc.gifv"));
        assert!(!is_image_url("https://example.com/jpg"));
        assert!(!is_image_url("not a url.jpg"));
    }
}
