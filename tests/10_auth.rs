mod common;

use anyhow::Result;
use reqwest::{header, StatusCode};
use serde_json::Value;

use common::{raw_session_cookie, session_cookie, TestApp, PASSWORD, REG_KEY};

#[tokio::test]
async fn health_endpoint_reports_database() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.client.get(app.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn register_sets_cookie_and_redirects_home() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.register("sok_dara", PASSWORD, REG_KEY).await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[header::LOCATION], "/");

    let raw = raw_session_cookie(&res).expect("session cookie");
    assert!(raw.contains("HttpOnly"), "{}", raw);
    assert!(raw.contains("SameSite=Lax"), "{}", raw);
    assert!(raw.contains("Path=/"), "{}", raw);

    let cookie = session_cookie(&res).expect("token value");
    let token = cookie.trim_start_matches("token=");
    let claims = app.state.tokens.verify(token)?;
    assert_eq!(claims.client_id, "sok_dara");

    assert!(app.state.db.users().exists("sok_dara").await?);
    Ok(())
}

#[tokio::test]
async fn register_accepts_multipart_form_data() -> Result<()> {
    let app = TestApp::spawn().await?;

    let form = reqwest::multipart::Form::new()
        .text("username", "សុខ ដារ៉ា")
        .text("password", PASSWORD)
        .text("key", REG_KEY);
    let res = app.client.post(app.url("/register")).multipart(form).send().await?;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(session_cookie(&res).is_some());
    assert!(app.state.db.users().exists("សុខ ដារ៉ា").await?);
    Ok(())
}

#[tokio::test]
async fn register_rejects_short_password() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.register("dara", "short", REG_KEY).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(session_cookie(&res).is_none());

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Password must be at least 8 characters");
    assert!(!app.state.db.users().exists("dara").await?);
    Ok(())
}

#[tokio::test]
async fn register_rejects_wrong_key_and_bad_username() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.register("dara", PASSWORD, "guess").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "Invalid registration key");

    let res = app.register("dara<script>", PASSWORD, REG_KEY).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "Invalid username format");
    Ok(())
}

#[tokio::test]
async fn register_rejects_duplicate_username() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.signup("dara").await?;

    let res = app.register("dara", "another-password", REG_KEY).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "Username already taken");
    Ok(())
}

#[tokio::test]
async fn login_with_correct_password() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.signup("dara").await?;

    let res = app.login("dara", PASSWORD).await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[header::LOCATION], "/");
    assert!(session_cookie(&res).is_some());
    Ok(())
}

#[tokio::test]
async fn login_rejects_wrong_credentials() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.signup("dara").await?;

    let res = app.login("dara", "wrong-password").await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&res).is_none());
    assert_eq!(res.json::<Value>().await?["error"], "Invalid username or password");

    let res = app.login("nobody", PASSWORD).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>().await?["error"], "Invalid username or password");
    Ok(())
}

#[tokio::test]
async fn signed_in_users_are_redirected_away_from_auth_forms() -> Result<()> {
    let app = TestApp::spawn().await?;
    let cookie = app.signup("dara").await?;

    let res = app
        .client
        .post(app.url("/register"))
        .header(header::COOKIE, &cookie)
        .form(&[("username", "second"), ("password", PASSWORD), ("key", REG_KEY)])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(!app.state.db.users().exists("second").await?);

    let res = app
        .client
        .post(app.url("/login"))
        .header(header::COOKIE, &cookie)
        .form(&[("username", "dara"), ("password", "wrong-password")])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    Ok(())
}

#[tokio::test]
async fn logout_expires_the_cookie() -> Result<()> {
    let app = TestApp::spawn().await?;
    let cookie = app.signup("dara").await?;

    let res = app
        .client
        .post(app.url("/logout"))
        .header(header::COOKIE, &cookie)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let raw = raw_session_cookie(&res).expect("clearing cookie");
    assert!(raw.starts_with("token=;"), "{}", raw);
    assert!(raw.contains("Max-Age=0"), "{}", raw);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Logged out");
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_valid_cookie() -> Result<()> {
    let app = TestApp::spawn().await?;

    for path in ["/api/profile", "/api/get-current-data", "/api/toggle-fan", "/api/ai/health", "/ws"] {
        let res = app.client.get(app.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{}", path);
        let body = res.json::<Value>().await?;
        assert_eq!(body["error"], "Token is not set or invalid", "{}", path);
    }

    let res = app.get_with_cookie("/api/profile", "token=not-a-jwt").await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let cookie = app.signup("dara").await?;
    let res = app.get_with_cookie("/api/profile", &cookie).await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn websocket_route_accepts_authenticated_callers() -> Result<()> {
    let app = TestApp::spawn().await?;
    let cookie = app.signup("dara").await?;

    // Plain GET is not an upgrade, but it must get past authentication
    let res = app.get_with_cookie("/ws", &cookie).await?;
    assert_ne!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.status().is_client_error());
    Ok(())
}
