use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use reqwest::multipart::{Form, Part};
use thiserror::Error;

use super::models::{AiHealthStatus, ImageUpload, PredictionResponse};
use crate::config::{AiConfig, ConfigError};

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI service request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("AI service returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to read AI service response: {0}")]
    Read(#[source] reqwest::Error),

    #[error("Failed to parse AI service response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to create form data: {0}")]
    Form(#[source] reqwest::Error),
}

impl AiError {
    /// Transport and status failures mean the service is down, the rest are
    /// problems with what it sent back
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AiError::Request(_) | AiError::Status { .. })
    }

    /// Client-facing message when the service answered but the health
    /// report was unusable
    pub fn unusable_message(&self) -> &'static str {
        match self {
            AiError::Read(_) => "Failed to read AI service response",
            _ => "Failed to parse AI service response",
        }
    }

    /// Text for the `details` field of the error body
    pub fn details(&self) -> String {
        match self {
            AiError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AiClient {
    http: reqwest::Client,
    base_url: String,
}

impl AiClient {
    pub fn new(config: &AiConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.service_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn health(&self) -> Result<AiHealthStatus, AiError> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(AiError::Request)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(AiError::Status {
                status: status.as_u16(),
                message: format!("AI service returned status {}", status.as_u16()),
            });
        }

        let body = response.bytes().await.map_err(AiError::Read)?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Forward the image as multipart field `image` and relay the verdict
    pub async fn predict(&self, upload: ImageUpload) -> Result<PredictionResponse, AiError> {
        tracing::debug!(
            "Forwarding {} ({} bytes) to AI service",
            upload.filename,
            upload.bytes.len()
        );

        let part = Part::bytes(upload.bytes)
            .file_name(upload.filename)
            .mime_str(&upload.content_type)
            .map_err(AiError::Form)?;
        let form = Form::new().part("image", part);

        let response = self
            .http
            .post(format!("{}/predict", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(AiError::Request)?;

        let status = response.status();
        let body = response.bytes().await.map_err(AiError::Read)?;

        if status != reqwest::StatusCode::OK {
            // The service reports its own reason in `error` when it can
            let message = serde_json::from_slice::<PredictionResponse>(&body)
                .ok()
                .and_then(|parsed| parsed.error)
                .unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned());
            return Err(AiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let mut prediction: PredictionResponse = serde_json::from_slice(&body)?;
        prediction.timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_unavailable_errors() {
        let status = AiError::Status {
            status: 500,
            message: "Model not loaded".to_string(),
        };
        assert!(status.is_unavailable());
        assert_eq!(
            status.to_string(),
            "AI service returned status 500: Model not loaded"
        );

        let parse = AiError::Parse(serde_json::from_str::<AiHealthStatus>("{").unwrap_err());
        assert!(!parse.is_unavailable());
    }

    #[test]
    fn read_and_parse_failures_have_distinct_messages() {
        let builder_error = reqwest::Client::new().get("not a url").build().unwrap_err();
        assert_eq!(
            AiError::Read(builder_error).unusable_message(),
            "Failed to read AI service response"
        );

        let parse = AiError::Parse(serde_json::from_str::<AiHealthStatus>("<html>").unwrap_err());
        assert_eq!(parse.unusable_message(), "Failed to parse AI service response");
    }
}
