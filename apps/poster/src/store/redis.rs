use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{debug, info};

use crate::store::{DedupStore, StoreError};

pub const DEFAULT_KEY: &str = "poster:used";

/// Redis-backed store. All used ids live in a single hash at `key`.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
    key: String,
}

impl RedisStore {
    pub async fn connect(url: &str, key: impl Into<String>) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        let key = key.into();
        info!("Redis dedup store connected (hash key: {key})");
        Ok(Self { conn, key })
    }
}

#[async_trait]
impl DedupStore for RedisStore {
    async fn contains(&self, id: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.hexists(&self.key, id).await?;
        Ok(exists)
    }

    async fn insert(&self, id: &str, title: &str) -> Result<(), StoreError> {
        if id.is_empty() {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        let mut conn = self.conn.clone();
        let _: () = conn.hset(&self.key, id, title).await?;
        debug!("Recorded {id} in redis hash {}", self.key);
        Ok(())
    }
}
