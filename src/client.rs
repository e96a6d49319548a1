use crate::{
    error::{DecorError, Result},
    models::VariationBatch,
    prepare::PreparedImage,
};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

/// Builds the multipart submission for a prepared image plus the two
/// free-text fields and posts it to the generation endpoint.
#[derive(Clone)]
pub struct SubmissionClient {
    client: reqwest::Client,
    base_url: String,
}

impl SubmissionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn submission_form(
        prepared: &PreparedImage,
        subject_text: &str,
        style_text: &str,
    ) -> Result<Form> {
        let image_part = Part::bytes(prepared.bytes.clone())
            .file_name("room.jpg")
            .mime_str(prepared.mime.as_str())
            .map_err(|e| DecorError::SerializationError(e.to_string()))?;

        Ok(Form::new()
            .part("image", image_part)
            .text("prompt", style_text.to_string())
            .text("textInput", subject_text.to_string()))
    }

    pub async fn submit(
        &self,
        prepared: &PreparedImage,
        subject_text: &str,
        style_text: &str,
    ) -> Result<VariationBatch> {
        let url = format!("{}/api/generate-variations", self.base_url);
        let form = Self::submission_form(prepared, subject_text, style_text)?;

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DecorError::UploadError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<VariationBatch>()
                .await
                .map_err(|e| DecorError::SerializationError(e.to_string()));
        }

        let body: Value = response.json().await.unwrap_or_default();
        let message = body
            .get("details")
            .or_else(|| body.get("error"))
            .and_then(Value::as_str)
            .unwrap_or("request failed")
            .to_string();

        if status.is_client_error() {
            Err(DecorError::ValidationError(message))
        } else {
            Err(DecorError::ProviderError(message))
        }
    }
}
