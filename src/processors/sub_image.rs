// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Output processor that crops detected objects out of the original image.
//!
//! The model output is a detection list, JSON encoded in the primary payload:
//!
//! ```json
//! [{"className": "person", "probability": 0.97,
//!   "boundingBox": {"x": 0.1, "y": 0.2, "width": 0.3, "height": 0.5}}]
//! ```
//!
//! Box coordinates are normalized to `[0, 1]`. The original image is the primary
//! payload of the input the model reference received.

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use serde::Deserialize;
use std::io::Cursor;
use std::time::Instant;

use crate::config::consts::{DATA_KEY, DEFAULT_SUB_IMAGE_CLASS, INPUT_ATTACHMENT};
use crate::config::ProcessorOptions;
use crate::engine::RequestContext;
use crate::envelope::Envelope;
use crate::errors::{EnsembleError, Result};
use crate::observability::messages::processor::{
    ProcessorExecutionCompleted, ProcessorExecutionFailed,
};
use crate::observability::messages::StructuredLog;
use crate::traits::OutputProcessor;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedObject {
    pub class_name: String,
    #[serde(default)]
    pub probability: f64,
    pub bounding_box: BoundingBox,
}

/// Normalized rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Pixel rectangle `(x, y, width, height)` inside a `width` x `height` image,
    /// clamped to its bounds. `None` when nothing of the box is left.
    fn to_pixels(self, image_width: u32, image_height: u32) -> Option<(u32, u32, u32, u32)> {
        let scale = |v: f64, size: u32| ((v.max(0.0) * size as f64) as u32).min(size);

        let x = scale(self.x, image_width);
        let y = scale(self.y, image_height);
        let w = scale(self.width, image_width).min(image_width - x);
        let h = scale(self.height, image_height).min(image_height - y);

        if w == 0 || h == 0 {
            return None;
        }
        Some((x, y, w, h))
    }
}

/// Crops every detection of one class and returns them as PNG images, one
/// `"data"` entry per crop, in detection order.
#[derive(Debug, Clone)]
pub struct SubImageExtractor {
    class_filter: String,
}

impl Default for SubImageExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_SUB_IMAGE_CLASS)
    }
}

impl SubImageExtractor {
    pub fn new(class_filter: impl Into<String>) -> Self {
        Self {
            class_filter: class_filter.into(),
        }
    }

    /// Build from registry options. Recognized option: `class_filter` (string).
    pub fn from_options(options: &ProcessorOptions) -> std::result::Result<Self, String> {
        match options.get("class_filter") {
            None => Ok(Self::default()),
            Some(value) => value
                .as_str()
                .map(Self::new)
                .ok_or_else(|| format!("class_filter must be a string, got {:?}", value)),
        }
    }

    pub fn class_filter(&self) -> &str {
        &self.class_filter
    }

    fn extract(&self, ctx: &RequestContext, output: &Envelope) -> Result<Envelope> {
        let input = ctx
            .attachment(INPUT_ATTACHMENT)
            .ok_or_else(|| self.failure("no input recorded on the request context"))?;
        let image_bytes = input
            .data()
            .ok_or_else(|| self.failure("input has no image entry"))?
            .to_bytes()?;
        let image = image::load_from_memory(&image_bytes)
            .map_err(|e| self.failure(format!("failed to decode input image: {}", e)))?;

        let detection_bytes = output
            .data()
            .ok_or_else(|| self.failure("model output has no detections"))?
            .to_bytes()?;
        let detections: Vec<DetectedObject> = serde_json::from_slice(&detection_bytes)
            .map_err(|e| EnsembleError::PayloadDecode {
                reason: format!("model output is not a detection list: {}", e),
            })?;

        let mut result = Envelope::new();
        for detection in detections
            .iter()
            .filter(|d| d.class_name == self.class_filter)
        {
            let Some((x, y, w, h)) = detection
                .bounding_box
                .to_pixels(image.width(), image.height())
            else {
                continue;
            };
            result.add(DATA_KEY, self.encode(&image.crop_imm(x, y, w, h))?);
        }
        Ok(result)
    }

    fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| self.failure(format!("failed to encode crop: {}", e)))?;
        Ok(buffer.into_inner())
    }

    fn failure(&self, reason: impl Into<String>) -> EnsembleError {
        EnsembleError::ProcessorFailed {
            processor: self.name().to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl OutputProcessor for SubImageExtractor {
    async fn process_output(&self, ctx: &RequestContext, output: Envelope) -> Result<Envelope> {
        let start_time = Instant::now();

        match self.extract(ctx, &output) {
            Ok(result) => {
                ProcessorExecutionCompleted {
                    processor_id: self.name(),
                    input_entries: output.len(),
                    output_entries: result.len(),
                    duration: start_time.elapsed(),
                }
                .log();
                Ok(result)
            }
            Err(error) => {
                ProcessorExecutionFailed {
                    processor_id: self.name(),
                    error: &error,
                }
                .log();
                Err(error)
            }
        }
    }

    fn name(&self) -> &'static str {
        "sub_image"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::StubJobSubmitter;
    use crate::processors::ProcessorRegistry;
    use image::{Rgb, RgbImage};
    use std::sync::Arc;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 10, 10])));
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    fn context_with_input(image: Vec<u8>) -> RequestContext {
        let ctx = RequestContext::new(
            Arc::new(StubJobSubmitter::new()),
            Arc::new(ProcessorRegistry::new()),
        );
        ctx.set_attachment(INPUT_ATTACHMENT, Envelope::new().with_entry("data", image));
        ctx
    }

    const DETECTIONS: &str = r#"[
        {"className": "person", "probability": 0.9,
         "boundingBox": {"x": 0.25, "y": 0.25, "width": 0.5, "height": 0.5}},
        {"className": "car", "probability": 0.8,
         "boundingBox": {"x": 0.0, "y": 0.0, "width": 0.5, "height": 0.5}},
        {"className": "person", "probability": 0.7,
         "boundingBox": {"x": 0.75, "y": 0.5, "width": 0.5, "height": 1.0}}
    ]"#;

    #[tokio::test]
    async fn crops_only_matching_detections() {
        let ctx = context_with_input(png(80, 40));
        let output = Envelope::new().with_entry("data", DETECTIONS);

        let result = SubImageExtractor::default()
            .process_output(&ctx, output)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        let dims: Vec<(u32, u32)> = result
            .content()
            .iter()
            .map(|(key, payload)| {
                assert_eq!(key, "data");
                let crop = image::load_from_memory(&payload.to_bytes().unwrap()).unwrap();
                (crop.width(), crop.height())
            })
            .collect();
        // second person box runs off the right and bottom edges and is clamped
        assert_eq!(dims, vec![(40, 20), (20, 20)]);
    }

    #[tokio::test]
    async fn class_filter_is_configurable() {
        let ctx = context_with_input(png(80, 40));
        let output = Envelope::new().with_entry("data", DETECTIONS);

        let result = SubImageExtractor::new("car")
            .process_output(&ctx, output)
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn missing_input_or_bad_detections_fail() {
        let ctx = RequestContext::new(
            Arc::new(StubJobSubmitter::new()),
            Arc::new(ProcessorRegistry::new()),
        );
        let output = Envelope::new().with_entry("data", DETECTIONS);
        let err = SubImageExtractor::default()
            .process_output(&ctx, output)
            .await
            .unwrap_err();
        assert!(matches!(err, EnsembleError::ProcessorFailed { .. }));

        let ctx = context_with_input(png(10, 10));
        let output = Envelope::new().with_entry("data", "not json");
        let err = SubImageExtractor::default()
            .process_output(&ctx, output)
            .await
            .unwrap_err();
        assert!(matches!(err, EnsembleError::PayloadDecode { .. }));
    }

    #[test]
    fn degenerate_boxes_are_skipped() {
        let outside = BoundingBox {
            x: 1.5,
            y: 0.0,
            width: 0.5,
            height: 0.5,
        };
        assert_eq!(outside.to_pixels(100, 100), None);

        let flat = BoundingBox {
            x: 0.1,
            y: 0.1,
            width: 0.0,
            height: 0.5,
        };
        assert_eq!(flat.to_pixels(100, 100), None);
    }
}
