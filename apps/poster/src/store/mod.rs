//! Dedup Store: durable record of every candidate id that has been turned into a post.
//!
//! The set only grows. An id present here is never selected again, across restarts.
//! Backends:
//! - `FileStore`: one file per id under a base directory (default).
//! - `RedisStore`: one Redis hash, field = id, value = title.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

pub mod file;
pub mod redis;

pub use self::file::FileStore;
pub use self::redis::RedisStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Invalid candidate id '{0}'")]
    InvalidId(String),

    #[error("Store worker failed: {0}")]
    Worker(String),
}

/// Persistent set of used candidate ids.
///
/// `insert` must not return `Ok` before the id is durable.
#[async_trait]
pub trait DedupStore: Send + Sync {
    async fn contains(&self, id: &str) -> Result<bool, StoreError>;

    /// Records `id` as used. The title is kept for inspection only.
    async fn insert(&self, id: &str, title: &str) -> Result<(), StoreError>;
}
