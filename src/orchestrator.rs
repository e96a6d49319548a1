use crate::{
    error::{DecorError, Result},
    logger,
    models::{GenerationRequest, GenerationVariation, ProviderImageRequest, RequestContext},
    provider::ImageClient,
};
use std::time::Duration;
use tokio::time::sleep;

/// Number of provider calls per batch.
pub const VARIATION_COUNT: usize = 5;

/// Pause between successive provider calls, as rate-limit mitigation.
pub const INTER_CALL_DELAY: Duration = Duration::from_secs(1);

pub const IMAGE_SIZE: &str = "1024x1024";
pub const IMAGE_QUALITY: &str = "standard";
pub const IMAGE_STYLE: &str = "natural";

/// Builds the single instruction string sent to the provider for every call
/// in a batch. Both fields are caller-supplied free text.
pub fn build_prompt(subject: &str, style: &str) -> String {
    format!(
        "Generate an interior design image of a {} in {} style. \
         The room should maintain the basic layout and architectural features \
         but transform the design elements according to the specified style.",
        subject, style
    )
}

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub variation_count: usize,
    pub inter_call_delay: Duration,
    pub size: String,
    pub quality: String,
    pub style: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            variation_count: VARIATION_COUNT,
            inter_call_delay: INTER_CALL_DELAY,
            size: IMAGE_SIZE.to_string(),
            quality: IMAGE_QUALITY.to_string(),
            style: IMAGE_STYLE.to_string(),
        }
    }
}

impl GenerationSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variation_count(mut self, count: usize) -> Self {
        self.variation_count = count;
        self
    }

    pub fn with_inter_call_delay(mut self, delay: Duration) -> Self {
        self.inter_call_delay = delay;
        self
    }
}

/// Turns one [`GenerationRequest`] into an ordered batch of variations by
/// driving a fixed count of sequential, independent provider calls.
///
/// The batch is all-or-nothing: the first failed call aborts the loop and
/// discards everything collected so far. There is no retry path.
#[derive(Clone)]
pub struct VariationOrchestrator {
    client: ImageClient,
    settings: GenerationSettings,
}

impl VariationOrchestrator {
    pub fn new(client: ImageClient) -> Self {
        Self {
            client,
            settings: GenerationSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub async fn generate_batch(
        &self,
        request: &GenerationRequest,
        ctx: &RequestContext,
    ) -> Result<Vec<GenerationVariation>> {
        if request.image.is_empty() {
            return Err(DecorError::ValidationError("No image provided".into()));
        }

        let prompt = build_prompt(&request.subject_text, &request.style_text);

        log::info!(
            "Generating {} variations for {}",
            self.settings.variation_count,
            ctx.user_id.as_deref().unwrap_or("anonymous user"),
        );

        let batch_timer = logger::timer("generation batch");
        let mut variations = Vec::with_capacity(self.settings.variation_count);

        for i in 0..self.settings.variation_count {
            let provider_request = ProviderImageRequest {
                model: self.client.model().to_string(),
                prompt: prompt.clone(),
                n: 1,
                size: self.settings.size.clone(),
                quality: self.settings.quality.clone(),
                style: self.settings.style.clone(),
            };

            let url = self.client.generate(&provider_request).await.map_err(|e| {
                log::error!("Provider call {} of {} failed: {}", i + 1, self.settings.variation_count, e);
                e
            })?;

            log::debug!("Variation {} ready", i + 1);

            variations.push(GenerationVariation {
                image: url,
                title: format!("Design {}", i + 1),
                description: format!("{} styled with {}", request.subject_text, request.style_text),
            });

            if i + 1 < self.settings.variation_count {
                sleep(self.settings.inter_call_delay).await;
            }
        }

        batch_timer.stop();
        Ok(variations)
    }
}
