use async_trait::async_trait;
use clap::ValueEnum;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::feed::{get_bytes, http_client, FeedSource, FetchError};
use crate::models::Candidate;

const REDDIT_BASE_URL: &str = "https://www.reddit.com";

/// Which subreddit listing to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RedditListing {
    Hot,
    Top,
    New,
    Rising,
}

impl RedditListing {
    fn path(self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::Top => "top",
            Self::New => "new",
            Self::Rising => "rising",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Listing JSON
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: Submission,
}

#[derive(Debug, Deserialize)]
struct Submission {
    id: String,
    title: String,
    #[serde(default)]
    url: String,
    score: i64,
}

/// Parses a subreddit listing body into candidates, in listing order.
pub(crate) fn parse_listing(body: &[u8]) -> Result<Vec<Candidate>, FetchError> {
    let listing: Listing = serde_json::from_slice(body)?;
    Ok(listing
        .data
        .children
        .into_iter()
        .map(|child| child.data)
        .filter(|s| !s.id.is_empty())
        .map(|s| Candidate::new(s.id, s.title, s.url, s.score))
        .collect())
}

fn is_valid_subreddit(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ────────────────────────────────────────────────────────────────────────────
// Feed source
// ────────────────────────────────────────────────────────────────────────────

/// Reads submissions from a subreddit's public JSON listing.
#[derive(Clone)]
pub struct RedditFeed {
    client: Client,
    listing: RedditListing,
    limit: u32,
}

impl RedditFeed {
    pub fn new(listing: RedditListing, limit: u32) -> Result<Self, FetchError> {
        Ok(Self {
            client: http_client()?,
            listing,
            limit,
        })
    }
}

#[async_trait]
impl FeedSource for RedditFeed {
    async fn fetch_candidates(&self, topic: &str) -> Result<Vec<Candidate>, FetchError> {
        if !is_valid_subreddit(topic) {
            return Err(FetchError::InvalidTopic(topic.to_string()));
        }

        let url = format!("{REDDIT_BASE_URL}/r/{topic}/{}.json", self.listing.path());
        let mut request = self
            .client
            .get(&url)
            .query(&[("limit", self.limit.to_string())]);
        if self.listing == RedditListing::Top {
            request = request.query(&[("t", "day")]);
        }

        debug!("Fetching {url}");
        let body = get_bytes(request, &url).await?;
        let candidates = parse_listing(&body)?;
        info!("Fetched {} candidates from r/{topic}", candidates.len());
        Ok(candidates)
    }
}
