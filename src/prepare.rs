use crate::{
    error::{DecorError, Result},
    models::ImageMime,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage};

/// Longer edge of the submitted reference image, in pixels.
pub const MAX_LONG_EDGE_PX: u32 = 128;

/// Aggressive JPEG quality on the encoder's 1-100 scale (0.1 of full quality).
pub const JPEG_QUALITY: u8 = 10;

/// Hard ceiling on the encoded submission.
pub const SIZE_CEILING_BYTES: usize = 4 * 1024 * 1024;

/// Pre-submission threshold above which one more compression pass runs.
pub const RECOMPRESS_THRESHOLD_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct PrepareSettings {
    pub max_long_edge: u32,
    pub jpeg_quality: u8,
    pub size_ceiling: usize,
    pub recompress_threshold: usize,
}

impl Default for PrepareSettings {
    fn default() -> Self {
        Self {
            max_long_edge: MAX_LONG_EDGE_PX,
            jpeg_quality: JPEG_QUALITY,
            size_ceiling: SIZE_CEILING_BYTES,
            recompress_threshold: RECOMPRESS_THRESHOLD_BYTES,
        }
    }
}

/// A submission-ready image: downscaled, re-encoded as JPEG, under the size
/// ceiling. `passes` counts compression passes applied so far.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub bytes: Vec<u8>,
    pub mime: ImageMime,
    pub width: u32,
    pub height: u32,
    pub passes: u32,
}

impl PreparedImage {
    /// Base64 data URL for on-screen preview.
    pub fn preview_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime.as_str(), BASE64.encode(&self.bytes))
    }
}

/// Produces a submission-ready image under the size ceiling while keeping
/// enough visual content for the provider to use as a style reference.
///
/// No network call happens here; output lives only in memory.
#[derive(Debug, Clone)]
pub struct ImagePreparer {
    settings: PrepareSettings,
}

impl ImagePreparer {
    pub fn new() -> Self {
        Self {
            settings: PrepareSettings::default(),
        }
    }

    pub fn with_settings(settings: PrepareSettings) -> Self {
        Self { settings }
    }

    /// New dimensions with the longer edge clamped to the pixel budget,
    /// aspect ratio preserved, shorter edge rounded to the nearest pixel.
    pub fn scaled_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let budget = self.settings.max_long_edge;
        if width.max(height) <= budget {
            return (width, height);
        }

        if width >= height {
            let scaled = (height as f64 * budget as f64 / width as f64).round() as u32;
            (budget, scaled.max(1))
        } else {
            let scaled = (width as f64 * budget as f64 / height as f64).round() as u32;
            (scaled.max(1), budget)
        }
    }

    fn encode_jpeg(&self, img: &DynamicImage) -> Result<Vec<u8>> {
        let rgb = img.to_rgb8();
        let mut out = Vec::new();
        rgb.write_with_encoder(JpegEncoder::new_with_quality(
            &mut out,
            self.settings.jpeg_quality,
        ))
        .map_err(|e| DecorError::CompressionError(format!("Failed to encode image: {}", e)))?;
        Ok(out)
    }

    /// Selection-time pass: decode, downscale, re-encode, gate on the ceiling.
    pub fn prepare(&self, input: &[u8]) -> Result<PreparedImage> {
        let img = image::load_from_memory(input)
            .map_err(|e| DecorError::CompressionError(format!("Failed to decode image: {}", e)))?;

        let (width, height) = (img.width(), img.height());
        let (target_w, target_h) = self.scaled_dimensions(width, height);

        let img = if (target_w, target_h) != (width, height) {
            img.resize_exact(target_w, target_h, FilterType::Triangle)
        } else {
            img
        };

        let bytes = self.encode_jpeg(&img)?;

        if bytes.len() > self.settings.size_ceiling {
            return Err(DecorError::SizeLimitError(
                "Image is too large even after compression. Please choose a smaller image.".into(),
            ));
        }

        Ok(PreparedImage {
            bytes,
            mime: ImageMime::Jpeg,
            width: target_w,
            height: target_h,
            passes: 1,
        })
    }

    /// Pre-submission re-check: one more compression pass when the encoded
    /// size still exceeds the secondary threshold, otherwise a no-op.
    pub fn finalize(&self, prepared: PreparedImage) -> Result<PreparedImage> {
        if prepared.bytes.len() <= self.settings.recompress_threshold {
            return Ok(prepared);
        }

        let img = image::load_from_memory(&prepared.bytes)
            .map_err(|e| DecorError::CompressionError(format!("Failed to decode image: {}", e)))?;
        let bytes = self.encode_jpeg(&img)?;

        Ok(PreparedImage {
            bytes,
            passes: prepared.passes + 1,
            ..prepared
        })
    }
}

impl Default for ImagePreparer {
    fn default() -> Self {
        Self::new()
    }
}
