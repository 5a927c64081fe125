use super::types::{AssistantReply, AssistantRequest};
use crate::integration::AssistantConfig;
use crate::{KiranaError, Result};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A backend that answers chat requests
#[async_trait]
pub trait AssistantApi: Send + Sync {
    async fn chat(&self, request: AssistantRequest) -> Result<AssistantReply>;
}

/// Assistant reached over HTTP (`POST {base_url}/chat/`)
pub struct HttpAssistant {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpAssistant {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KiranaError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: chat_endpoint(base_url),
            client,
        })
    }

    pub fn from_config(config: &AssistantConfig) -> Result<Self> {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn chat_endpoint(base_url: &str) -> String {
    format!("{}/chat/", base_url.trim().trim_end_matches('/'))
}

#[async_trait]
impl AssistantApi for HttpAssistant {
    async fn chat(&self, request: AssistantRequest) -> Result<AssistantReply> {
        debug!(
            "POST {} ({} history turns, {} products)",
            self.endpoint,
            request.history.len(),
            request.inventory.len()
        );
        let started = Instant::now();

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Assistant returned {}: {}", status, body);
            return Err(KiranaError::AssistantError(format!(
                "Assistant returned HTTP {}",
                status
            )));
        }

        let reply: AssistantReply = response.json().await?;
        debug!(
            "Assistant replied in {}ms (action: {:?})",
            started.elapsed().as_millis(),
            reply.action
        );
        Ok(reply)
    }
}
