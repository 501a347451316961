//! 平台 API 的 JSON 抓取

use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::{DEFAULT_TIMEOUT_SECS, GENERAL_UA};

/// 对平台公开 API 发起一次 GET 并解析 JSON
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value>;
}

/// 基于 reqwest 的实现，带浏览器 UA 和固定超时
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(GENERAL_UA)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn with_default_timeout() -> Result<Self> {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn get_json(&self, url: &str) -> Result<Value> {
        log::debug!("Fetching JSON from: {}", url);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP GET request failed: {}", response.status()));
        }

        let text = response.text().await?;
        log::trace!("Response from {}: {}", url, text);

        serde_json::from_str(&text).map_err(|e| anyhow!("Failed to parse JSON response: {}", e))
    }
}
