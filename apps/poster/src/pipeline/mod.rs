//! Selection Pipeline: picks one unused, popular candidate and turns it into a `Post`.
//!
//! Flow: rank by score → drop below-threshold and already-used → walk in order,
//!       building a post from the first candidate that succeeds → mark it used → return.
//!
//! Per-candidate failures (fetch, decode, layout, tokenizer) skip to the next
//! candidate and leave it unmarked. Store failures halt the run.

use clap::ValueEnum;
use image::RgbaImage;
use tracing::{debug, info, warn};

use crate::caption::{make_caption, CaptionOptions, Tokenizer};
use crate::errors::PosterError;
use crate::feed::{is_image_url, FetchError, ImageFetcher};
use crate::layout::TitleRenderer;
use crate::models::{Candidate, Post};
use crate::store::DedupStore;

/// What kind of post to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PostMode {
    /// Render the title onto a card; caption is extracted hashtags.
    Text,
    /// Use the candidate's linked image; caption is the title.
    Image,
}

/// How the image and caption for a candidate are produced.
pub enum PostSource<'a> {
    Text {
        renderer: &'a dyn TitleRenderer,
        tokenizer: &'a dyn Tokenizer,
        caption: CaptionOptions,
        /// Fixed caption used instead of extraction.
        caption_override: Option<String>,
    },
    Image {
        fetcher: &'a dyn ImageFetcher,
    },
}

impl PostSource<'_> {
    pub fn mode(&self) -> PostMode {
        match self {
            PostSource::Text { .. } => PostMode::Text,
            PostSource::Image { .. } => PostMode::Image,
        }
    }
}

/// Stable sort by score, highest first. Ties keep feed order.
pub fn rank_candidates(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}

pub struct Pipeline<'a> {
    store: &'a dyn DedupStore,
    source: PostSource<'a>,
    min_score: i64,
}

impl<'a> Pipeline<'a> {
    pub fn new(store: &'a dyn DedupStore, source: PostSource<'a>, min_score: i64) -> Self {
        Self {
            store,
            source,
            min_score,
        }
    }

    /// Runs one selection over `candidates`. On success the chosen candidate is
    /// already recorded in the store.
    pub async fn select_post(&self, candidates: Vec<Candidate>) -> Result<Post, PosterError> {
        let considered = candidates.len();
        let eligible = self.filter_eligible(rank_candidates(candidates)).await?;
        info!(
            "{} of {considered} candidates eligible (min score {}, mode {:?})",
            eligible.len(),
            self.min_score,
            self.source.mode()
        );

        for candidate in eligible {
            match self.build(&candidate).await {
                Ok((image, caption)) => {
                    self.store.insert(&candidate.id, &candidate.title).await?;
                    info!(
                        id = %candidate.id,
                        score = candidate.score,
                        "Selected \"{}\"",
                        candidate.title
                    );
                    return Ok(Post {
                        image,
                        caption,
                        candidate,
                    });
                }
                Err(e) if e.is_per_candidate() => {
                    warn!(id = %candidate.id, "Skipping candidate: {e}");
                }
                Err(e) => return Err(e),
            }
        }

        Err(PosterError::Exhausted { considered })
    }

    async fn filter_eligible(&self, ranked: Vec<Candidate>) -> Result<Vec<Candidate>, PosterError> {
        let mut eligible = Vec::with_capacity(ranked.len());
        for candidate in ranked {
            if candidate.score < self.min_score {
                continue;
            }
            if self.store.contains(&candidate.id).await? {
                debug!(id = %candidate.id, "Already used");
                continue;
            }
            eligible.push(candidate);
        }
        Ok(eligible)
    }

    async fn build(&self, candidate: &Candidate) -> Result<(RgbaImage, String), PosterError> {
        match &self.source {
            PostSource::Image { fetcher } => {
                if !is_image_url(&candidate.url) {
                    return Err(FetchError::UnsupportedImage(candidate.url.clone()).into());
                }
                let image = fetcher.fetch_image(&candidate.url).await?;
                Ok((image, candidate.title.clone()))
            }
            PostSource::Text {
                renderer,
                tokenizer,
                caption,
                caption_override,
            } => {
                let card = renderer.render_title(&candidate.title)?;
                debug!(
                    points = card.fit.points,
                    iterations = card.fit.iterations,
                    lines = card.fit.line_count,
                    "Fitted title"
                );
                let caption = match caption_override {
                    Some(fixed) => fixed.clone(),
                    None => make_caption(*tokenizer, &candidate.title, caption).await?,
                };
                Ok((card.image, caption))
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
