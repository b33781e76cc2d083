use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::{token_from_jar, TokenSigner};
use crate::error::ApiError;
use crate::state::AppState;

pub const UNAUTHORIZED_MESSAGE: &str = "Token is not set or invalid";

/// Farmer identified by the session cookie
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub username: String,
}

/// Resolve the `token` cookie to a user, if it carries a valid token
pub fn authenticate(tokens: &TokenSigner, jar: &CookieJar) -> Option<AuthUser> {
    let token = token_from_jar(jar)?;
    match tokens.verify(token) {
        Ok(claims) => Some(AuthUser {
            username: claims.client_id,
        }),
        Err(e) => {
            tracing::debug!("Rejected session cookie: {}", e);
            None
        }
    }
}

/// Cookie authentication middleware for the protected route group
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(user) = authenticate(&state.tokens, &jar) else {
        tracing::warn!("Unauthorized request to {}", request.uri().path());
        return Err(ApiError::unauthorized(UNAUTHORIZED_MESSAGE));
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
