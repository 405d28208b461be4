//! Page server integration tests: the route filter runs before every page.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use dashgate::config::GateConfig;
use dashgate::server::{router, AppState};

async fn get(path: &str, cookie: Option<&str>) -> axum::response::Response {
    let mut req = Request::builder().uri(path);
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    router(AppState::new(GateConfig::default()))
        .oneshot(req.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn location(resp: &axum::response::Response) -> Option<&str> {
    resp.headers().get(header::LOCATION).and_then(|v| v.to_str().ok())
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn protected_pages_redirect_to_login_without_cookie() {
    for path in ["/dashboard", "/drag-drop", "/infinite-scroll"] {
        let resp = get(path, None).await;
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT, "{}", path);
        assert_eq!(location(&resp), Some("/login"), "{}", path);
    }
}

#[tokio::test]
async fn auth_pages_redirect_to_dashboard_with_cookie() {
    for path in ["/login", "/register", "/forgot-password"] {
        let resp = get(path, Some("accessToken=anything")).await;
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT, "{}", path);
        assert_eq!(location(&resp), Some("/dashboard"), "{}", path);
    }
}

#[tokio::test]
async fn forgot_password_without_cookie_is_served() {
    let resp = get("/forgot-password", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Reset Password"));
}

#[tokio::test]
async fn presence_alone_admits_protected_pages() {
    // not a JWT and certainly not valid; the filter does not look
    let resp = get("/drag-drop", Some("accessToken=garbage")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn empty_cookie_counts_as_absent() {
    let resp = get("/dashboard", Some("accessToken=; refreshToken=r")).await;
    assert_eq!(location(&resp), Some("/login"));
}

#[tokio::test]
async fn public_pages_ignore_cookie() {
    assert_eq!(get("/", None).await.status(), StatusCode::OK);
    assert_eq!(get("/", Some("accessToken=t")).await.status(), StatusCode::OK);
    assert_eq!(get("/healthz", None).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn dashboard_greets_identity_from_live_token() {
    use base64::Engine;
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let exp = chrono::Utc::now().timestamp() + 3600;
    let payload = serde_json::json!({"sub": "1", "email": "x@y.com", "iat": 0, "exp": exp});
    let token = format!("{}.{}.sig", engine.encode(b"{}"), engine.encode(payload.to_string()));

    let resp = get("/dashboard", Some(&format!("accessToken={}", token))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Signed in as x@y.com"));
}
