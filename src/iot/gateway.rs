use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use thiserror::Error;

use super::crypto::{CryptoError, PayloadKey};
use super::{Device, Reading};
use crate::config::{ConfigError, IotConfig};

/// Which leg of a gateway exchange failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Plain data fetch
    Fetch,
    /// First leg of a toggle: GET the encrypted challenge
    Challenge,
    /// Second leg: POST the digest to `/verify`
    Verify,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Step::Fetch => "fetch",
            Step::Challenge => "challenge",
            Step::Verify => "verify",
        })
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{step}: request to gateway failed: {source}")]
    Request { step: Step, source: reqwest::Error },

    #[error("{step}: gateway returned status {status}")]
    Status { step: Step, status: u16 },

    #[error("{step}: failed to read gateway response: {source}")]
    Read { step: Step, source: reqwest::Error },

    #[error("{step}: failed to decrypt gateway response: {source}")]
    Decrypt { step: Step, source: CryptoError },
}

impl GatewayError {
    /// Message safe to show the farmer's browser
    pub fn client_message(&self) -> &'static str {
        match self {
            GatewayError::Request { step, .. } | GatewayError::Status { step, .. } => match step {
                Step::Fetch => "Failed to get data from IoT device",
                Step::Challenge => "Failed to toggle device",
                Step::Verify => "Failed to verify device toggle",
            },
            GatewayError::Read { step, .. } => match step {
                Step::Fetch => "Failed to read response",
                Step::Challenge => "Failed to read challenge response",
                Step::Verify => "Failed to read verification response",
            },
            GatewayError::Decrypt { .. } => "Failed to decrypt response",
        }
    }
}

/// `hex(sha256(challenge))`, the proof the gateway expects on `/verify`
pub fn challenge_response(challenge: &[u8]) -> String {
    hex::encode(Sha256::digest(challenge))
}

#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
    key: Arc<PayloadKey>,
}

impl GatewayClient {
    pub fn new(config: &IotConfig, key: PayloadKey) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.gateway_url.trim_end_matches('/').to_string(),
            key: Arc::new(key),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a sensor endpoint and return the decrypted payload
    pub async fn fetch(&self, reading: Reading) -> Result<Vec<u8>, GatewayError> {
        let url = format!("{}{}", self.base_url, reading.endpoint());
        tracing::debug!("Fetching {}", url);

        let request = self.http.get(&url);
        let body = self.exchange(Step::Fetch, request).await?;
        self.open(Step::Fetch, &body)
    }

    /// Run the challenge-response toggle and return the decrypted new state.
    ///
    /// No retries: the first failing leg is reported.
    pub async fn toggle(&self, device: Device) -> Result<Vec<u8>, GatewayError> {
        let url = format!("{}{}", self.base_url, device.endpoint());
        tracing::debug!("Requesting toggle challenge from {}", url);

        let body = self.exchange(Step::Challenge, self.http.get(&url)).await?;
        let challenge = self.open(Step::Challenge, &body)?;
        let proof = challenge_response(&challenge);

        let request = self
            .http
            .post(format!("{}/verify", url))
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(proof);
        let body = self.exchange(Step::Verify, request).await?;
        self.open(Step::Verify, &body)
    }

    async fn exchange(
        &self,
        step: Step,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<u8>, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|source| GatewayError::Request { step, source })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(GatewayError::Status {
                step,
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| GatewayError::Read { step, source })?;
        Ok(bytes.to_vec())
    }

    fn open(&self, step: Step, body: &[u8]) -> Result<Vec<u8>, GatewayError> {
        self.key
            .open(body)
            .map_err(|source| GatewayError::Decrypt { step, source })
    }
}
