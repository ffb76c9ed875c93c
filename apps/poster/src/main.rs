mod caption;
mod config;
mod errors;
mod feed;
mod layout;
mod llm_client;
mod models;
mod pipeline;
mod publish;
mod store;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::caption::{LexiconTokenizer, LlmTokenizer, Tokenizer};
use crate::config::{Config, PublishConfig, TokenizerKind};
use crate::feed::{FeedSource, HttpImageFetcher, RedditFeed};
use crate::layout::{CardRenderer, FontFace};
use crate::llm_client::LlmClient;
use crate::pipeline::{Pipeline, PostMode, PostSource};
use crate::publish::{DryRunPublisher, InstagramPublisher, Publisher};
use crate::store::{DedupStore, FileStore, RedisStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting poster v{}", env!("CARGO_PKG_VERSION"));

    let store = build_store(&config).await?;

    // Text mode borrows the font bytes for the whole run.
    let font_bytes;
    let renderer;
    let tokenizer: Box<dyn Tokenizer>;
    let image_fetcher;
    let source = match config.mode {
        PostMode::Text => {
            font_bytes = std::fs::read(&config.font)
                .with_context(|| format!("Failed to read font {}", config.font.display()))?;
            renderer = CardRenderer::new(FontFace::parse(&font_bytes)?, config.canvas.clone());
            tokenizer = build_tokenizer(&config);
            info!("Text mode: font {}", config.font.display());
            PostSource::Text {
                renderer: &renderer,
                tokenizer: tokenizer.as_ref(),
                caption: config.caption.clone(),
                caption_override: config.caption_override.clone(),
            }
        }
        PostMode::Image => {
            image_fetcher = HttpImageFetcher::new()?;
            info!("Image mode");
            PostSource::Image {
                fetcher: &image_fetcher,
            }
        }
    };

    let feed = RedditFeed::new(config.listing, config.limit)?;
    let candidates = feed
        .fetch_candidates(&config.sub)
        .await
        .with_context(|| format!("Failed to fetch candidates from r/{}", config.sub))?;

    let pipeline = Pipeline::new(store.as_ref(), source, config.min_score);
    let post = pipeline.select_post(candidates).await?;

    println!("{} {}", post.candidate.score, post.candidate.title);

    let publisher = build_publisher(&config).await?;
    let location = publisher.publish(&post).await.with_context(|| {
        format!(
            "Failed to publish {} (it is already marked used)",
            post.candidate.id
        )
    })?;
    info!("Posted {} to {location}", post.candidate.id);

    Ok(())
}

async fn build_store(config: &Config) -> Result<Box<dyn DedupStore>> {
    Ok(match &config.redis_url {
        Some(url) => {
            let store = RedisStore::connect(url, config.redis_key.clone()).await?;
            info!("Dedup store: redis hash {}", config.redis_key);
            Box::new(store)
        }
        None => {
            let store = FileStore::open(&config.store_dir)?;
            info!("Dedup store: {}", config.store_dir.display());
            Box::new(store)
        }
    })
}

fn build_tokenizer(config: &Config) -> Box<dyn Tokenizer> {
    match (config.tokenizer, &config.anthropic_api_key) {
        (TokenizerKind::Llm, Some(key)) => {
            info!("Tokenizer: LLM (model: {})", llm_client::MODEL);
            Box::new(LlmTokenizer::new(LlmClient::new(key.clone())))
        }
        _ => Box::new(LexiconTokenizer),
    }
}

async fn build_publisher(config: &Config) -> Result<Box<dyn Publisher>> {
    if let Some(path) = &config.dry_run {
        return Ok(Box::new(DryRunPublisher::new(path)));
    }
    let publish = config
        .publish
        .as_ref()
        .context("Instagram settings are missing")?;
    let s3 = build_s3_client(publish).await;
    Ok(Box::new(InstagramPublisher::new(s3, publish.instagram.clone())?))
}

/// S3 client for MinIO (local) or AWS, addressed by explicit endpoint.
async fn build_s3_client(publish: &PublishConfig) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &publish.aws_access_key_id,
        &publish.aws_secret_access_key,
        None,
        None,
        "poster-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&publish.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
