//!
//! Request gateway
//! ---------------
//! Every outbound API call goes through `RequestGateway::send`. The gateway attaches
//! the stored access token as a bearer header, dispatches once, and on failure runs
//! its side effects (credential clearing and redirect on 401, a toast in every case)
//! before re-raising the error to the caller.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::activity::{Activity, RequestKind};
use crate::credentials::CredentialStore;
use crate::error::GatewayError;
use crate::navigation::{Navigator, LOGIN_PATH};
use crate::notify::{Notifier, Toast};

pub const SESSION_EXPIRED_TITLE: &str = "Session expired";
pub const SESSION_EXPIRED_DESCRIPTION: &str = "Please login again to continue";
pub const ERROR_TITLE: &str = "Error";

/// One outbound request as the caller describes it.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    /// Absolute URL, or a path resolved against the gateway's API base.
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
    pub kind: RequestKind,
    /// When false a 401 is an ordinary failure: the session is left alone.
    pub session_bound: bool,
}

impl RequestSpec {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        let kind = if method == Method::GET { RequestKind::Query } else { RequestKind::Mutation };
        Self { method, url: url.into(), headers: HeaderMap::new(), body: None, kind, session_bound: true }
    }

    pub fn get(url: impl Into<String>) -> Self { Self::new(Method::GET, url) }

    pub fn post(url: impl Into<String>) -> Self { Self::new(Method::POST, url) }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn kind(mut self, kind: RequestKind) -> Self {
        self.kind = kind;
        self
    }

    /// Credential exchanges (login, register) where a 401 means bad input, not an expired session.
    pub fn sessionless(mut self) -> Self {
        self.session_bound = false;
        self
    }
}

#[derive(Clone)]
pub struct RequestGateway {
    client: reqwest::Client,
    api_base: Url,
    credentials: CredentialStore,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    activity: Arc<Activity>,
}

impl RequestGateway {
    pub fn new(
        client: reqwest::Client,
        api_base: Url,
        credentials: CredentialStore,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        activity: Arc<Activity>,
    ) -> Self {
        Self { client, api_base, credentials, navigator, notifier, activity }
    }

    pub fn api_base(&self) -> &Url { &self.api_base }

    pub fn activity(&self) -> &Arc<Activity> { &self.activity }

    pub fn credentials(&self) -> &CredentialStore { &self.credentials }

    fn resolve(&self, url: &str) -> Result<Url, GatewayError> {
        if let Ok(abs) = Url::parse(url) {
            return Ok(abs);
        }
        self.api_base
            .join(url.trim_start_matches('/'))
            .map_err(|e| GatewayError::InvalidRequest { message: format!("invalid request url '{}': {}", url, e) })
    }

    /// Headers for the outbound request: the caller's, with the bearer token on top.
    fn outbound_headers(&self, mut headers: HeaderMap) -> Result<HeaderMap, GatewayError> {
        if let Some(token) = self.credentials.access_token() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| GatewayError::InvalidRequest { message: "access token is not a valid header value".into() })?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Dispatch `spec` once and decode a successful body as `T`.
    pub async fn send<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T, GatewayError> {
        let session_bound = spec.session_bound;
        match self.dispatch(spec).await {
            Ok(v) => Ok(v),
            Err(e) => Err(self.fail(e, session_bound)),
        }
    }

    /// Caller-level retry: up to `retry` extra attempts, never after a 401.
    pub async fn send_with_retry<T: DeserializeOwned>(&self, spec: RequestSpec, retry: u32) -> Result<T, GatewayError> {
        let mut attempt = 0u32;
        loop {
            match self.send::<T>(spec.clone()).await {
                Ok(v) => return Ok(v),
                Err(e) if e.is_unauthorized() || attempt >= retry => return Err(e),
                Err(e) => {
                    attempt += 1;
                    debug!(attempt, error = %e, "gateway.retry");
                }
            }
        }
    }

    async fn dispatch<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T, GatewayError> {
        let url = self.resolve(&spec.url)?;
        let headers = self.outbound_headers(spec.headers)?;
        let _in_flight = self.activity.begin(spec.kind);

        let mut req = self.client.request(spec.method.clone(), url.clone()).headers(headers);
        if let Some(body) = &spec.body {
            req = req.json(body);
        }
        debug!(method = %spec.method, url = %url, "gateway.send");
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return resp.json::<T>().await.map_err(|e| GatewayError::Decode { message: e.to_string() });
        }

        // Prefer the server's own message when the body carries one.
        let body = resp.text().await.unwrap_or_default();
        let message = server_message(&body).unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
        if status == StatusCode::UNAUTHORIZED {
            Err(GatewayError::Unauthorized { message })
        } else {
            Err(GatewayError::Status { status: status.as_u16(), message })
        }
    }

    /// Failure side effects, run once per failing call before the error propagates.
    fn fail(&self, err: GatewayError, session_bound: bool) -> GatewayError {
        warn!(status = ?err.status(), error = %err, session_bound, "gateway.failure");
        if session_bound && err.is_unauthorized() {
            if let Err(e) = self.credentials.clear() {
                warn!(error = %e, "gateway.failure could not clear credentials");
            }
            self.notifier.notify(Toast::destructive(SESSION_EXPIRED_TITLE, SESSION_EXPIRED_DESCRIPTION));
            self.navigator.push(LOGIN_PATH);
        }
        self.notifier.notify(Toast::destructive(ERROR_TITLE, err.user_message()));
        err
    }
}

fn server_message(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    v.get("message")
        .and_then(|m| m.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
