use serde::{Deserialize, Serialize};

/// Image content types accepted at the upload boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMime {
    Jpeg,
    Png,
}

impl ImageMime {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
        }
    }

    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            "image/jpeg" | "image/jpg" => Some(ImageMime::Jpeg),
            "image/png" => Some(ImageMime::Png),
            _ => None,
        }
    }
}

/// One user submission: a prepared room photo plus the two free-text fields.
/// Built once, consumed once, never persisted.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub subject_text: String,
    pub style_text: String,
    pub image: Vec<u8>,
    pub mime_type: ImageMime,
}

/// One generated design: the provider-hosted image URL plus display metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationVariation {
    pub image: String,
    pub title: String,
    pub description: String,
}

/// The full response body for one generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariationBatch {
    pub variations: Vec<GenerationVariation>,
}

/// Explicit per-request context, passed into the orchestrator instead of
/// being read from ambient session state.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user_id: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }
}
