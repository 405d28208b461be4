//!
//! dashgate page server
//! --------------------
//! Axum server delivering the dashboard pages. The route filter runs in front of
//! every page; the pages themselves are placeholders for the view layer, which is
//! out of scope here.
//!
//! Responsibilities:
//! - Mount the public, auth-only and protected pages behind `route_filter`.
//! - Greet the user on the dashboard from the (unverified) access-token cookie.
//! - Health endpoint for process supervision.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{middleware, Router};
use tracing::info;

use crate::config::GateConfig;
use crate::credentials::ACCESS_TOKEN_COOKIE;
use crate::identity::identity_from_token;
use crate::routes::{parse_cookie, route_filter, RouteTable};

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GateConfig>,
    pub routes: Arc<RouteTable>,
}

impl AppState {
    pub fn new(config: GateConfig) -> Self {
        Self { config: Arc::new(config), routes: Arc::new(RouteTable::default()) }
    }
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{title}</title></head><body><main><h1>{title}</h1>{body}</main></body></html>"
    ))
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

async fn home() -> impl IntoResponse {
    page("Welcome to the Home Page", "<p>Please login or register to access the dashboard.</p><a href=\"/login\">Login</a> <a href=\"/register\">Register</a>")
}

async fn login_page() -> impl IntoResponse { page("Welcome Back", "<form method=\"post\" action=\"/api/auth/login\"></form>") }

async fn register_page() -> impl IntoResponse { page("Create an Account", "<form method=\"post\" action=\"/api/auth/register\"></form>") }

async fn forgot_password_page() -> impl IntoResponse { page("Reset Password", "<form method=\"post\" action=\"/api/auth/forgot-password\"></form>") }

async fn dashboard(headers: HeaderMap) -> impl IntoResponse {
    let greeting = parse_cookie(&headers, ACCESS_TOKEN_COOKIE)
        .and_then(|t| identity_from_token(&t, chrono::Utc::now()))
        .map(|u| format!("<p>Signed in as {}</p>", escape(&u.display_name())))
        .unwrap_or_else(|| "<p>Signed in</p>".to_string());
    page("Dashboard", &greeting)
}

async fn drag_drop() -> impl IntoResponse { page("Drag and Drop", "<section id=\"board\"></section>") }

async fn infinite_scroll() -> impl IntoResponse { page("Infinite Scroll", "<section id=\"gallery\"></section>") }

async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(serde_json::json!({"status": "ok", "production": state.config.environment.is_production()}))
}

pub fn router(state: AppState) -> Router {
    let routes = state.routes.clone();
    Router::new()
        .route("/", get(home))
        .route("/login", get(login_page))
        .route("/register", get(register_page))
        .route("/forgot-password", get(forgot_password_page))
        .route("/dashboard", get(dashboard))
        .route("/drag-drop", get(drag_drop))
        .route("/infinite-scroll", get(infinite_scroll))
        .route("/healthz", get(healthz))
        .layer(middleware::from_fn_with_state(routes, route_filter))
        .with_state(state)
}

/// Bind `0.0.0.0:<http_port>` and serve until the process stops.
pub async fn run(config: GateConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let state = AppState::new(config);
    info!(addr = %addr, production = state.config.environment.is_production(), "Starting page server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}
