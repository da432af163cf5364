//! HTTP image source.

use async_trait::async_trait;

use crate::classify::ChannelAverages;
use crate::config::FetchConfig;
use crate::imaging::{decode_averages, FetchError, ImageSource};
use crate::resilience::timeouts;

/// Fetches images over HTTP(S) with reqwest.
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: reqwest::Client,
}

impl HttpImageSource {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(limit) = timeouts::from_secs(config.timeout_secs) {
            builder = builder.timeout(limit);
        }
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn channel_averages(&self, url: &str) -> Result<ChannelAverages, FetchError> {
        let started = std::time::Instant::now();
        let bytes = self.fetch_bytes(url).await?;
        tracing::debug!(
            url = %url,
            bytes = bytes.len(),
            elapsed = ?started.elapsed(),
            "Image fetched"
        );

        tokio::task::spawn_blocking(move || decode_averages(&bytes)).await?
    }
}
