//! Single-image detection handler.

use std::collections::BTreeMap;

use axum::extract::{Multipart, State};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use serde::Serialize;
use tracing::info;

use fpulse_models::FrameObservation;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Detection result for one uploaded image.
#[derive(Debug, Serialize)]
pub struct DetectResponse {
    /// Base64-encoded JPEG of the annotated frame.
    pub image: String,
    pub total_detections: u64,
    pub per_class_counts: BTreeMap<String, u64>,
    pub classes_available: bool,
}

/// Run the detector on an uploaded image and record the result.
///
/// POST /detect, multipart form with the image under `file`.
pub async fn detect_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<DetectResponse>> {
    let mut upload: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
            upload = Some(data.to_vec());
            break;
        }
    }

    let bytes = upload.ok_or_else(|| ApiError::bad_request("No file provided"))?;

    let frame = image::load_from_memory(&bytes)
        .map_err(|e| ApiError::bad_request(format!("Could not decode image: {}", e)))?
        .to_rgb8();

    let output = state.adapter.detect(&frame).await?;
    let observation = FrameObservation::from_detections(&output.detections);

    let ordinal = state.store.append(observation.clone());

    let annotated = output.annotated.unwrap_or(frame);
    let jpeg = encode_jpeg(&annotated, state.config.jpeg_quality)?;

    info!(
        frame_ordinal = ordinal,
        total_detections = observation.total_detections,
        "Processed uploaded image"
    );

    Ok(Json(DetectResponse {
        image: BASE64.encode(&jpeg),
        total_detections: observation.total_detections,
        per_class_counts: observation.per_class_counts,
        classes_available: observation.classes_available,
    }))
}

fn encode_jpeg(frame: &RgbImage, quality: u8) -> ApiResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder
        .encode_image(frame)
        .map_err(|e| ApiError::internal(format!("JPEG encoding failed: {}", e)))?;
    Ok(out)
}
