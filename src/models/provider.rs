use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct ProviderImageRequest {
    pub model: String,
    pub prompt: String,
    pub n: u8,
    pub size: String,
    pub quality: String,
    pub style: String,
}

#[derive(Debug, Deserialize)]
pub struct ProviderImage {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ProviderImageResponse {
    pub data: Vec<ProviderImage>,
}
