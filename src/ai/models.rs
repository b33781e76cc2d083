use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content types the classifier accepts
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// `GET /health` on the AI service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiHealthStatus {
    pub status: String,
    pub model_loaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiseasePrediction {
    #[serde(default)]
    pub predicted_disease: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub all_probabilities: BTreeMap<String, f64>,
    #[serde(default)]
    pub is_healthy: bool,
    #[serde(default)]
    pub recommendation: String,
}

/// `POST /predict` on the AI service, relayed to the browser as-is apart
/// from `timestamp`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub success: bool,
    #[serde(default)]
    pub prediction: DiseasePrediction,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum UploadError {
    #[error("File size too large (max {0}MB)")]
    TooLarge(usize),

    #[error("Invalid image file: {0}")]
    InvalidType(String),
}

/// An image pulled out of the browser's multipart form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn validate(&self, max_bytes: usize) -> Result<(), UploadError> {
        if self.bytes.len() > max_bytes {
            return Err(UploadError::TooLarge(max_bytes / (1024 * 1024)));
        }
        if !ALLOWED_IMAGE_TYPES.contains(&self.content_type.as_str()) {
            return Err(UploadError::InvalidType(self.content_type.clone()));
        }
        Ok(())
    }
}
