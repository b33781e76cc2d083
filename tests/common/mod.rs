#![allow(dead_code)]

use std::sync::Once;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::Multipart,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use reqwest::header::SET_COOKIE;
use serde_json::json;
use tokio::net::TcpListener;

use tokkatot_middleware::iot::{challenge_response, PayloadKey};
use tokkatot_middleware::{app, AppConfig, AppState, Database};

pub const JWT_SECRET: &str = "0123456789abcdef0123456789abcdef";
pub const REG_KEY: &str = "farm-key";
pub const PASSWORD: &str = "password123";

pub const CURRENT_DATA: &str = r#"{"temperature":31.5,"humidity":62}"#;
pub const INITIAL_STATE: &str = r#"{"fan":"off","bulb":"on"}"#;
pub const CHALLENGE: &[u8] = b"challenge-7f3a9c";

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = JWT_SECRET.to_string();
    config.security.registration_key = REG_KEY.to_string();
    config.security.bcrypt_cost = 4;
    config.iot.timeout_secs = 5;
    config.ai.timeout_secs = 5;
    config
}

/// The gateway is provisioned with the JWT secret as its AES key
pub fn gateway_key() -> PayloadKey {
    let mut key = [0u8; 32];
    key.copy_from_slice(JWT_SECRET.as_bytes());
    PayloadKey::new(key)
}

pub async fn serve(router: Router) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{}", addr))
}

pub struct TestApp {
    pub base_url: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    /// Start the middleware against a fake gateway and fake AI service.
    /// `configure` runs last, so it can point either one somewhere else.
    pub async fn spawn_with(configure: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        init_tracing();

        let mut config = test_config();
        config.iot.gateway_url = serve(fake_gateway()).await?;
        config.ai.service_url = serve(fake_ai_service()).await?;
        configure(&mut config);

        let db = Database::in_memory().await?;
        let state = AppState::build(config, db)?;
        let base_url = serve(app(state.clone())).await?;

        // Redirects are part of what we assert on
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            base_url,
            state,
            client,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn ws_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.replacen("http", "ws", 1), path)
    }

    pub async fn register(&self, username: &str, password: &str, key: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/register"))
            .form(&[("username", username), ("password", password), ("key", key)])
            .send()
            .await?)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?)
    }

    /// Register `username` and return the `token=...` cookie pair
    pub async fn signup(&self, username: &str) -> Result<String> {
        let res = self.register(username, PASSWORD, REG_KEY).await?;
        anyhow::ensure!(
            res.status() == reqwest::StatusCode::SEE_OTHER,
            "registration failed with {}",
            res.status()
        );
        session_cookie(&res).context("registration did not set a session cookie")
    }

    pub async fn get_with_cookie(&self, path: &str, cookie: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(self.url(path))
            .header(reqwest::header::COOKIE, cookie)
            .send()
            .await?)
    }
}

/// `token=<jwt>` from the response's Set-Cookie headers
pub fn session_cookie(res: &reqwest::Response) -> Option<String> {
    raw_session_cookie(res)
        .and_then(|raw| raw.split(';').next().map(str::to_string))
        .filter(|pair| pair != "token=")
}

/// Full Set-Cookie value for the session cookie, attributes included
pub fn raw_session_cookie(res: &reqwest::Response) -> Option<String> {
    res.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("token="))
        .map(str::to_string)
}

fn sealed(plaintext: &[u8]) -> Response {
    match gateway_key().seal(plaintext) {
        Ok(envelope) => Json(envelope).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Stand-in for the ESP32 gateway.
///
/// * `/get-historical-data` fails with 500
/// * `/toggle-bulb` answers with something that is not an envelope
/// * `/toggle-water` has no `/verify` leg
pub fn fake_gateway() -> Router {
    Router::new()
        .route("/get-initial-state", get(|| async { sealed(INITIAL_STATE.as_bytes()) }))
        .route("/get-current-data", get(|| async { sealed(CURRENT_DATA.as_bytes()) }))
        .route(
            "/get-historical-data",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route("/toggle-fan", get(|| async { sealed(CHALLENGE) }))
        .route("/toggle-fan/verify", post(verify_fan))
        .route("/toggle-bulb", get(|| async { "<html>gateway rebooting</html>" }))
        .route("/toggle-water", get(|| async { sealed(CHALLENGE) }))
}

async fn verify_fan(headers: HeaderMap, body: String) -> Response {
    let is_text = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("text/plain"))
        .unwrap_or(false);
    if !is_text {
        return StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response();
    }
    if body != challenge_response(CHALLENGE) {
        return StatusCode::FORBIDDEN.into_response();
    }
    sealed(b"on")
}

/// Stand-in for the Python classifier
pub fn fake_ai_service() -> Router {
    Router::new()
        .route(
            "/health",
            get(|| async { Json(json!({"status": "healthy", "model_loaded": true, "version": "2.1"})) }),
        )
        .route("/predict", post(fake_predict))
}

async fn fake_predict(mut multipart: Multipart) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("image") {
            continue;
        }
        let filename = field.file_name().unwrap_or("").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();
        let bytes: Bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(_) => break,
        };

        return Json(json!({
            "success": true,
            "prediction": {
                "predicted_disease": "coccidiosis",
                "confidence": 0.93,
                "all_probabilities": {
                    "coccidiosis": 0.93,
                    "healthy": 0.05,
                    "salmonella": 0.02
                },
                "is_healthy": false,
                "recommendation": format!("{} {} {}", filename, content_type, bytes.len())
            },
            "timestamp": "upstream"
        }))
        .into_response();
    }

    (
        StatusCode::BAD_REQUEST,
        Json(json!({"success": false, "error": "No image in request"})),
    )
        .into_response()
}

/// AI service with the model missing: health answers 500, predictions fail
/// with the service's own reason
pub fn broken_ai_service() -> Router {
    Router::new()
        .route("/health", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route(
            "/predict",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"success": false, "error": "Model not loaded"})),
                )
            }),
        )
}

/// AI service that answers health checks with a web page
pub fn garbled_ai_service() -> Router {
    Router::new().route("/health", get(|| async { "<html>starting up</html>" }))
}
