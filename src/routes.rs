use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{from_fn_with_state, map_response_with_state},
    response::{IntoResponse, Response},
    routing::{get, post},
    BoxError, Extension, Router,
};
use axum::body::{Bytes, HttpBody};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::ai::UploadError;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::iot::{Device, Reading};
use crate::middleware::{require_auth, AuthUser};
use crate::state::AppState;
use crate::ws::ws_handler;

/// Multipart framing on top of the largest accepted image
const UPLOAD_SLACK_BYTES: usize = 1024 * 1024;

pub fn app(state: AppState) -> Router {
    let max_upload = state.config.ai.max_upload_bytes;
    let body_limit = max_upload + UPLOAD_SLACK_BYTES;
    let cors = cors_layer(&state.config.security.cors_origins);

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(map_response_with_state(max_upload, payload_too_large))
                .layer(RequestBodyLimitLayer::new(body_limit))
                .layer(DefaultBodyLimit::disable()),
        )
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::{health, login, logout, register, root};

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{ai_health, disease_info, get_profile, iot, predict_disease, update_profile};

    let mut router = Router::new()
        .route("/api/profile", get(get_profile).post(update_profile))
        .route("/api/ai/predict-disease", post(predict_disease))
        .route("/api/ai/health", get(ai_health))
        .route("/api/ai/disease-info", get(disease_info))
        .route("/ws", get(ws_handler));

    for reading in Reading::ALL {
        router = router.route(
            &reading.api_path(),
            get(move |State(state): State<AppState>| iot::reading(state, reading)),
        );
    }

    for device in Device::ALL {
        router = router.route(
            &device.api_path(),
            get(
                move |State(state): State<AppState>, Extension(user): Extension<AuthUser>| {
                    iot::toggle(state, user, device)
                },
            ),
        );
    }

    router.route_layer(from_fn_with_state(state, require_auth))
}

/// The body limit layer answers 413 in plain text; reshape it into the JSON
/// error body every other endpoint uses
async fn payload_too_large<B>(State(max_upload): State<usize>, response: Response<B>) -> Response
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return response.into_response();
    }
    ApiError::payload_too_large(UploadError::TooLarge(max_upload / (1024 * 1024)).to_string())
        .into_response()
}

/// Permissive when no origins are configured; otherwise an allow-list with
/// credentials so the session cookie crosses origins
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}
