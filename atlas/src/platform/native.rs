use async_trait::async_trait;
use log::info;

use crate::error::AtlasError;
use crate::platform::PlatformService;

/// [`PlatformService`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct NativePlatformService {
    http_client: reqwest::Client,
}

#[async_trait]
impl PlatformService for NativePlatformService {
    fn new() -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent("atlas/0.1")
            .build()
            .unwrap_or_default();

        Self { http_client }
    }

    async fn get_text(&self, url: &str) -> Result<String, AtlasError> {
        info!("Loading {url}");
        let response = self.http_client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AtlasError::Http(response.status().as_u16()));
        }

        Ok(response.text().await?)
    }

    async fn post_text(
        &self,
        url: &str,
        body: String,
        content_type: &str,
    ) -> Result<String, AtlasError> {
        info!("Posting {} bytes to {url}", body.len());
        let response = self
            .http_client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AtlasError::Http(response.status().as_u16()));
        }

        Ok(response.text().await?)
    }
}
