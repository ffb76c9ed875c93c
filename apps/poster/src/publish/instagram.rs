use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::Post;
use crate::publish::{encode_jpeg, PublishError, Publisher, JPEG_QUALITY};

const GRAPH_API_URL: &str = "https://graph.facebook.com/v19.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Container status checks before giving up on `media_publish`.
const STATUS_ATTEMPTS: u32 = 5;
const STATUS_INTERVAL: Duration = Duration::from_secs(2);

/// Account and storage settings. The Graph API fetches the image from
/// `public_url`, so the bucket must be publicly readable there.
#[derive(Debug, Clone)]
pub struct InstagramSettings {
    pub user_id: String,
    pub access_token: String,
    pub s3_bucket: String,
    pub s3_public_url: String,
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ContainerStatus {
    #[serde(default)]
    status_code: String,
}

#[derive(Debug, Deserialize)]
struct GraphErrorEnvelope {
    error: GraphErrorBody,
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    message: String,
}

fn graph_error_message(body: String) -> String {
    serde_json::from_str::<GraphErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// `posts/YYYY/MM/DD/<candidate id>-<uuid>.jpg`
pub(crate) fn object_key(candidate_id: &str, now: DateTime<Utc>, nonce: Uuid) -> String {
    format!("posts/{}/{candidate_id}-{nonce}.jpg", now.format("%Y/%m/%d"))
}

pub(crate) fn public_object_url(base: &str, key: &str) -> String {
    format!("{}/{key}", base.trim_end_matches('/'))
}

pub struct InstagramPublisher {
    http: Client,
    s3: aws_sdk_s3::Client,
    settings: InstagramSettings,
}

impl InstagramPublisher {
    pub fn new(s3: aws_sdk_s3::Client, settings: InstagramSettings) -> Result<Self, PublishError> {
        Ok(Self {
            http: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            s3,
            settings,
        })
    }

    async fn upload(&self, key: &str, jpeg: Vec<u8>) -> Result<String, PublishError> {
        self.s3
            .put_object()
            .bucket(&self.settings.s3_bucket)
            .key(key)
            .body(ByteStream::from(jpeg))
            .content_type("image/jpeg")
            .send()
            .await
            .map_err(|e| PublishError::Upload(e.to_string()))?;

        info!("Uploaded s3://{}/{key}", self.settings.s3_bucket);
        Ok(public_object_url(&self.settings.s3_public_url, key))
    }

    /// Sends a Graph API request and decodes a successful body as `T`.
    async fn graph<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, PublishError> {
        let response = request
            .query(&[("access_token", self.settings.access_token.as_str())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = graph_error_message(response.text().await.unwrap_or_default());
            return Err(PublishError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    async fn create_container(&self, image_url: &str, caption: &str) -> Result<String, PublishError> {
        let url = format!("{GRAPH_API_URL}/{}/media", self.settings.user_id);
        let created: IdResponse = self
            .graph(
                self.http
                    .post(url)
                    .form(&[("image_url", image_url), ("caption", caption)]),
            )
            .await?;
        debug!("Created media container {}", created.id);
        Ok(created.id)
    }

    async fn wait_until_ready(&self, container_id: &str) -> Result<(), PublishError> {
        let url = format!("{GRAPH_API_URL}/{container_id}");
        let mut last = String::new();

        for attempt in 0..STATUS_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(STATUS_INTERVAL).await;
            }
            let status: ContainerStatus = self
                .graph(self.http.get(&url).query(&[("fields", "status_code")]))
                .await?;
            match status.status_code.as_str() {
                "FINISHED" | "" => return Ok(()),
                "ERROR" | "EXPIRED" => {
                    return Err(PublishError::NotReady {
                        id: container_id.to_string(),
                        status: status.status_code,
                    })
                }
                _ => {
                    debug!("Container {container_id} is {}", status.status_code);
                    last = status.status_code;
                }
            }
        }

        Err(PublishError::NotReady {
            id: container_id.to_string(),
            status: last,
        })
    }

    async fn publish_container(&self, container_id: &str) -> Result<String, PublishError> {
        let url = format!("{GRAPH_API_URL}/{}/media_publish", self.settings.user_id);
        let published: IdResponse = self
            .graph(self.http.post(url).form(&[("creation_id", container_id)]))
            .await?;
        Ok(published.id)
    }
}

#[async_trait]
impl Publisher for InstagramPublisher {
    async fn publish(&self, post: &Post) -> Result<String, PublishError> {
        let jpeg = encode_jpeg(&post.image, JPEG_QUALITY)?;
        let key = object_key(&post.candidate.id, Utc::now(), Uuid::new_v4());
        let image_url = self.upload(&key, jpeg).await?;

        let container_id = self.create_container(&image_url, &post.caption).await?;
        self.wait_until_ready(&container_id).await?;
        let media_id = self.publish_container(&container_id).await?;

        info!("Published {} as Instagram media {media_id}", post.candidate.id);
        Ok(media_id)
    }
}
