//!
//! Route filter
//! ------------
//! Runs before any page handler. Classifies the requested path and redirects on
//! the presence or absence of the `accessToken` cookie alone; token validity is
//! never inspected here. An expired-but-present token passes and is caught later by
//! the request gateway or the session mount check.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use once_cell::sync::Lazy;
use tracing::debug;

use crate::credentials::ACCESS_TOKEN_COOKIE;
use crate::navigation::{DASHBOARD_PATH, LOGIN_PATH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Protected,
    AuthOnly,
    Public,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    RedirectLogin,
    RedirectDashboard,
}

impl RouteDecision {
    /// Redirect target, or None for `Allow`.
    pub fn target(&self) -> Option<&'static str> {
        match self {
            RouteDecision::Allow => None,
            RouteDecision::RedirectLogin => Some(LOGIN_PATH),
            RouteDecision::RedirectDashboard => Some(DASHBOARD_PATH),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    /// Matched exactly or as a path prefix followed by '/'.
    pub protected: Vec<String>,
    /// Matched exactly.
    pub auth_only: Vec<String>,
    /// Prefixes the filter never runs on (API calls, static assets).
    pub bypass: Vec<String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            protected: vec!["/dashboard".into(), "/drag-drop".into(), "/infinite-scroll".into()],
            auth_only: vec!["/login".into(), "/register".into(), "/forgot-password".into()],
            bypass: vec!["/api".into(), "/assets".into(), "/favicon.ico".into()],
        }
    }
}

static DEFAULT_TABLE: Lazy<RouteTable> = Lazy::new(RouteTable::default);

fn is_under(path: &str, prefix: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).map(|rest| rest.starts_with('/')).unwrap_or(false)
}

impl RouteTable {
    pub fn classify(&self, path: &str) -> RouteClass {
        if self.protected.iter().any(|r| is_under(path, r)) {
            RouteClass::Protected
        } else if self.auth_only.iter().any(|r| r == path) {
            RouteClass::AuthOnly
        } else {
            RouteClass::Public
        }
    }

    pub fn decide(&self, path: &str, has_token: bool) -> RouteDecision {
        match (self.classify(path), has_token) {
            (RouteClass::Protected, false) => RouteDecision::RedirectLogin,
            (RouteClass::AuthOnly, true) => RouteDecision::RedirectDashboard,
            _ => RouteDecision::Allow,
        }
    }

    pub fn bypasses(&self, path: &str) -> bool {
        self.bypass.iter().any(|b| is_under(path, b))
    }
}

/// Classify against the default route table.
pub fn classify(path: &str) -> RouteClass { DEFAULT_TABLE.classify(path) }

/// Decide against the default route table.
pub fn decide(path: &str, has_token: bool) -> RouteDecision { DEFAULT_TABLE.decide(path, has_token) }

/// Read a cookie value from the request headers. Empty values count as absent.
pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for cookie in headers.get_all(axum::http::header::COOKIE).iter() {
        let Ok(s) = cookie.to_str() else { continue; };
        for part in s.split(';') {
            if let Some((k, v)) = part.trim().split_once('=') {
                if k.trim() == name && !v.trim().is_empty() { return Some(v.trim().to_string()); }
            }
        }
    }
    None
}

/// axum middleware applying the route table before any page handler runs.
pub async fn route_filter(State(table): State<Arc<RouteTable>>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if table.bypasses(&path) {
        return next.run(req).await;
    }
    let has_token = parse_cookie(req.headers(), ACCESS_TOKEN_COOKIE).is_some();
    let decision = table.decide(&path, has_token);
    match decision.target() {
        Some(target) => {
            debug!(path = %path, has_token, to = target, "route_filter.redirect");
            Redirect::temporary(target).into_response()
        }
        None => next.run(req).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn protected_without_token_goes_to_login() {
        for p in ["/dashboard", "/drag-drop", "/infinite-scroll", "/dashboard/settings", "/drag-drop/a/b"] {
            assert_eq!(decide(p, false), RouteDecision::RedirectLogin, "{}", p);
            assert_eq!(decide(p, true), RouteDecision::Allow, "{}", p);
        }
    }

    #[test]
    fn auth_only_with_token_goes_to_dashboard() {
        for p in ["/login", "/register", "/forgot-password"] {
            assert_eq!(decide(p, true), RouteDecision::RedirectDashboard, "{}", p);
            assert_eq!(decide(p, false), RouteDecision::Allow, "{}", p);
        }
    }

    #[test]
    fn prefix_lookalikes_are_public() {
        assert_eq!(classify("/dashboards"), RouteClass::Public);
        assert_eq!(classify("/login/extra"), RouteClass::Public);
        assert_eq!(classify("/"), RouteClass::Public);
        assert_eq!(decide("/", true), RouteDecision::Allow);
        assert_eq!(decide("/about", false), RouteDecision::Allow);
    }

    #[test]
    fn targets() {
        assert_eq!(RouteDecision::RedirectLogin.target(), Some("/login"));
        assert_eq!(RouteDecision::RedirectDashboard.target(), Some("/dashboard"));
        assert_eq!(RouteDecision::Allow.target(), None);
    }

    #[test]
    fn cookie_parsing() {
        let mut h = HeaderMap::new();
        h.insert("cookie", HeaderValue::from_static("theme=dark; accessToken=abc.def; refreshToken=r"));
        assert_eq!(parse_cookie(&h, "accessToken").as_deref(), Some("abc.def"));
        assert_eq!(parse_cookie(&h, "missing"), None);

        let mut empty = HeaderMap::new();
        empty.insert("cookie", HeaderValue::from_static("accessToken="));
        assert_eq!(parse_cookie(&empty, "accessToken"), None);
    }

    #[test]
    fn bypass_prefixes() {
        let t = RouteTable::default();
        assert!(t.bypasses("/api/auth/login"));
        assert!(t.bypasses("/favicon.ico"));
        assert!(!t.bypasses("/apiary"));
    }
}
