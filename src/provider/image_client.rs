use crate::{
    config::ProviderConfig,
    error::{DecorError, Result},
    models::{ProviderImageRequest, ProviderImageResponse},
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/images/generations";
pub const DEFAULT_MODEL: &str = "dall-e-3";

/// Best-effort ceiling on one outgoing provider call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Clone)]
pub struct ImageClient {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl ImageClient {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DecorError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        self.config.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    fn headers(&self) -> Result<HeaderMap> {
        // A missing credential is not a startup failure; the provider
        // rejects the call and that surfaces as a ProviderError.
        let api_key = self.config.api_key.as_deref().unwrap_or_default();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| DecorError::ConfigError(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Issues one generation call and returns the hosted image URL.
    pub async fn generate(&self, request: &ProviderImageRequest) -> Result<String> {
        let url = self.config.base_url.as_deref().unwrap_or(DEFAULT_API_URL);

        log::debug!("Requesting image generation with model: {}", request.model);

        let response = self
            .client
            .post(url)
            .headers(self.headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| DecorError::ProviderError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DecorError::ProviderError(format!(
                "provider returned {}: {}",
                status, body
            )));
        }

        let parsed: ProviderImageResponse = response
            .json()
            .await
            .map_err(|e| DecorError::ProviderError(e.to_string()))?;

        // Strict shape check: exactly the field we rely on, or the call failed.
        match parsed.data.first() {
            Some(image) if !image.url.is_empty() => Ok(image.url.clone()),
            _ => Err(DecorError::ProviderError(
                "Invalid response from provider API".into(),
            )),
        }
    }
}
