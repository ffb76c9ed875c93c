use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};

use crate::caption::CaptionOptions;
use crate::feed::RedditListing;
use crate::layout::CanvasConfig;
use crate::pipeline::PostMode;
use crate::publish::InstagramSettings;
use crate::store::redis::DEFAULT_KEY;

/// Where caption tokens come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TokenizerKind {
    /// Offline word tables and suffix rules.
    Lexicon,
    /// Anthropic Messages API.
    Llm,
}

/// Picks the best unused post from a subreddit, renders it and publishes it to Instagram.
#[derive(Parser, Debug, Clone)]
#[command(name = "poster", version)]
pub struct Cli {
    /// Subreddit to read
    #[arg(long, env = "POSTER_SUB", default_value = "UnethicalLifeProTips")]
    pub sub: String,

    #[arg(long, env = "POSTER_LISTING", value_enum, default_value_t = RedditListing::Top)]
    pub listing: RedditListing,

    /// Candidates to request from the feed
    #[arg(long, env = "POSTER_LIMIT", default_value_t = 100,
          value_parser = clap::value_parser!(u32).range(1..=100))]
    pub limit: u32,

    /// Candidates scoring below this are never posted
    #[arg(long, env = "POSTER_MIN_SCORE", default_value_t = 100)]
    pub min_score: i64,

    #[arg(long, env = "POSTER_MODE", value_enum, default_value_t = PostMode::Text)]
    pub mode: PostMode,

    /// Directory of the file-backed dedup store
    #[arg(long, env = "POSTER_STORE", default_value = "used")]
    pub store: PathBuf,

    /// Use a Redis hash as the dedup store instead of the directory
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    #[arg(long, env = "POSTER_REDIS_KEY", default_value = DEFAULT_KEY)]
    pub redis_key: String,

    /// TrueType/OpenType font for text posts
    #[arg(long, env = "POSTER_FONT", default_value = "trade-gothic-bold-condensed-20.ttf")]
    pub font: PathBuf,

    /// Fixed caption for text posts instead of extracted hashtags
    #[arg(long, env = "POSTER_CAPTION")]
    pub caption: Option<String>,

    /// Maximum caption length in characters
    #[arg(long, env = "POSTER_CAPTION_BUDGET", default_value_t = crate::caption::MAX_CAPTION_LEN)]
    pub caption_budget: usize,

    /// Skip hashtag tokens shorter than this
    #[arg(long, env = "POSTER_MIN_TAG_LEN")]
    pub min_tag_len: Option<usize>,

    #[arg(long, env = "POSTER_TOKENIZER", value_enum, default_value_t = TokenizerKind::Lexicon)]
    pub tokenizer: TokenizerKind,

    /// Write the image to this path (.jpg/.jpeg/.png) instead of publishing
    #[arg(long, env = "POSTER_DRY_RUN", value_name = "PATH")]
    pub dry_run: Option<PathBuf>,

    #[arg(long, default_value_t = 612)]
    pub canvas_size: u32,

    #[arg(long, default_value_t = 16.0)]
    pub padding: f32,

    #[arg(long, default_value_t = 8.0)]
    pub border_width: f32,

    #[arg(long, default_value_t = 1.75)]
    pub line_height: f32,

    #[arg(long, default_value_t = 40.0)]
    pub initial_points: f32,

    /// The fit search gives up below this size
    #[arg(long, default_value_t = 4.0)]
    pub min_points: f32,
}

/// Everything the Instagram publisher needs, S3 included.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub instagram: InstagramSettings,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
}

/// Application configuration: command-line flags plus secrets from the environment.
/// Secrets are only required when the component that uses them is enabled.
#[derive(Debug, Clone)]
pub struct Config {
    pub sub: String,
    pub listing: RedditListing,
    pub limit: u32,
    pub min_score: i64,
    pub mode: PostMode,
    pub store_dir: PathBuf,
    pub redis_url: Option<String>,
    pub redis_key: String,
    pub font: PathBuf,
    pub caption_override: Option<String>,
    pub caption: CaptionOptions,
    pub tokenizer: TokenizerKind,
    pub anthropic_api_key: Option<String>,
    pub dry_run: Option<PathBuf>,
    /// `None` in dry-run mode.
    pub publish: Option<PublishConfig>,
    pub canvas: CanvasConfig,
    pub rust_log: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_cli(Cli::parse(), |key| std::env::var(key).ok())
    }

    /// Builds the config from parsed flags, reading secrets through `env`.
    pub fn from_cli(cli: Cli, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            env(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        ensure!(cli.min_points > 0.0, "--min-points must be positive");
        ensure!(
            cli.initial_points >= cli.min_points,
            "--initial-points ({}) is below --min-points ({})",
            cli.initial_points,
            cli.min_points
        );
        ensure!(cli.line_height > 0.0, "--line-height must be positive");

        let anthropic_api_key = match cli.tokenizer {
            TokenizerKind::Llm if cli.mode == PostMode::Text && cli.caption.is_none() => {
                Some(require("ANTHROPIC_API_KEY")?)
            }
            _ => None,
        };

        let publish = match cli.dry_run {
            Some(_) => None,
            None => Some(PublishConfig {
                instagram: InstagramSettings {
                    user_id: require("INSTAGRAM_USER_ID")?,
                    access_token: require("INSTAGRAM_ACCESS_TOKEN")?,
                    s3_bucket: require("S3_BUCKET")?,
                    s3_public_url: require("S3_PUBLIC_URL")?,
                },
                s3_endpoint: require("S3_ENDPOINT")?,
                aws_access_key_id: require("AWS_ACCESS_KEY_ID")?,
                aws_secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
            }),
        };

        Ok(Config {
            sub: cli.sub,
            listing: cli.listing,
            limit: cli.limit,
            min_score: cli.min_score,
            mode: cli.mode,
            store_dir: cli.store,
            redis_url: cli.redis_url,
            redis_key: cli.redis_key,
            font: cli.font,
            caption_override: cli.caption,
            caption: CaptionOptions {
                max_len: cli.caption_budget,
                min_token_len: cli.min_tag_len,
            },
            tokenizer: cli.tokenizer,
            anthropic_api_key,
            dry_run: cli.dry_run,
            publish,
            canvas: CanvasConfig {
                width: cli.canvas_size,
                height: cli.canvas_size,
                padding: cli.padding,
                border_width: cli.border_width,
                line_height: cli.line_height,
                initial_points: cli.initial_points,
                min_points: cli.min_points,
            },
            rust_log: env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["poster"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const PUBLISH_ENV: &[(&str, &str)] = &[
        ("INSTAGRAM_USER_ID", "1789"),
        ("INSTAGRAM_ACCESS_TOKEN", "token"),
        ("S3_BUCKET", "posts"),
        ("S3_PUBLIC_URL", "https://cdn.example.com/posts"),
        ("S3_ENDPOINT", "http://localhost:9000"),
        ("AWS_ACCESS_KEY_ID", "minio"),
        ("AWS_SECRET_ACCESS_KEY", "minio123"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_cli(parse(&["--dry-run", "out.png"]), env_of(&[])).unwrap();
        assert_eq!(config.sub, "UnethicalLifeProTips");
        assert_eq!(config.listing, RedditListing::Top);
        assert_eq!(config.limit, 100);
        assert_eq!(config.min_score, 100);
        assert_eq!(config.mode, PostMode::Text);
        assert_eq!(config.store_dir, PathBuf::from("used"));
        assert_eq!(config.redis_key, "poster:used");
        assert_eq!(config.caption, CaptionOptions::default());
        assert_eq!(config.canvas, CanvasConfig::default());
        assert_eq!(config.rust_log, "info");
        assert!(config.publish.is_none());
        assert!(config.anthropic_api_key.is_none());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = parse(&[
            "--sub", "LifeProTips",
            "--listing", "hot",
            "--mode", "image",
            "--min-score", "5",
            "--min-tag-len", "2",
            "--caption-budget", "300",
            "--canvas-size", "1080",
            "--dry-run", "out.jpg",
        ]);
        let config = Config::from_cli(cli, env_of(&[])).unwrap();
        assert_eq!(config.sub, "LifeProTips");
        assert_eq!(config.listing, RedditListing::Hot);
        assert_eq!(config.mode, PostMode::Image);
        assert_eq!(config.min_score, 5);
        assert_eq!(config.caption.min_token_len, Some(2));
        assert_eq!(config.caption.max_len, 300);
        assert_eq!((config.canvas.width, config.canvas.height), (1080, 1080));
    }

    #[test]
    fn test_publishing_requires_instagram_secrets() {
        let err = Config::from_cli(parse(&[]), env_of(&[])).unwrap_err();
        assert!(err.to_string().contains("INSTAGRAM_USER_ID"), "{err}");

        let config = Config::from_cli(parse(&[]), env_of(PUBLISH_ENV)).unwrap();
        let publish = config.publish.unwrap();
        assert_eq!(publish.instagram.user_id, "1789");
        assert_eq!(publish.s3_endpoint, "http://localhost:9000");
    }

    #[test]
    fn test_llm_tokenizer_requires_api_key() {
        let cli = parse(&["--tokenizer", "llm", "--dry-run", "out.png"]);
        let err = Config::from_cli(cli.clone(), env_of(&[])).unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"), "{err}");

        let config = Config::from_cli(cli, env_of(&[("ANTHROPIC_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_invalid_fit_bounds_rejected() {
        let cli = parse(&["--min-points", "50", "--dry-run", "out.png"]);
        assert!(Config::from_cli(cli, env_of(&[])).is_err());

        let cli = parse(&["--min-points", "0", "--dry-run", "out.png"]);
        assert!(Config::from_cli(cli, env_of(&[])).is_err());
    }

    #[test]
    fn test_limit_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["poster", "--limit", "0"]).is_err());
        assert!(Cli::try_parse_from(["poster", "--limit", "101"]).is_err());
    }
}
