//! Unified application error model and mapping helpers.
//! `AppError` covers local failures (storage, token decoding) across the crate;
//! `GatewayError` is what the request gateway re-raises to its callers after it has
//! run its failure side effects.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    UserInput { code: String, message: String },
    Auth { code: String, message: String },
    Transport { code: String, message: String },
    Server { code: String, message: String },
    Storage { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::UserInput { code, .. }
            | AppError::Auth { code, .. }
            | AppError::Transport { code, .. }
            | AppError::Server { code, .. }
            | AppError::Storage { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::UserInput { message, .. }
            | AppError::Auth { message, .. }
            | AppError::Transport { message, .. }
            | AppError::Server { message, .. }
            | AppError::Storage { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn user<S: Into<String>>(code: S, msg: S) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn auth<S: Into<String>>(code: S, msg: S) -> Self { AppError::Auth { code: code.into(), message: msg.into() } }
    pub fn transport<S: Into<String>>(code: S, msg: S) -> Self { AppError::Transport { code: code.into(), message: msg.into() } }
    pub fn server<S: Into<String>>(code: S, msg: S) -> Self { AppError::Server { code: code.into(), message: msg.into() } }
    pub fn storage<S: Into<String>>(code: S, msg: S) -> Self { AppError::Storage { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::UserInput { .. } => 400,
            AppError::Auth { .. } => 401,
            AppError::Transport { .. } => 502,
            AppError::Server { .. } => 500,
            AppError::Storage { .. } => 503,
            AppError::Internal { .. } => 500,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Default mapping: treat as Internal unless downcasted elsewhere
        AppError::Internal { code: "internal_error".into(), message: err.to_string() }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage { code: "storage_io".into(), message: err.to_string() }
    }
}

/// Fallback text shown when neither the server nor the transport supplied a message.
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong";

/// Rejection raised by the request gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("decode error: {message}")]
    Decode { message: String },
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Unauthorized { .. } => Some(401),
            GatewayError::Status { status, .. } => Some(*status),
            GatewayError::Transport(e) => e.status().map(|s| s.as_u16()),
            GatewayError::Decode { .. } | GatewayError::InvalidRequest { .. } => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, GatewayError::Unauthorized { .. })
    }

    /// Text suitable for a user-visible notification.
    pub fn user_message(&self) -> String {
        let msg = match self {
            GatewayError::Unauthorized { message }
            | GatewayError::Status { message, .. }
            | GatewayError::Decode { message }
            | GatewayError::InvalidRequest { message } => message.clone(),
            GatewayError::Transport(e) => e.to_string(),
        };
        if msg.trim().is_empty() { FALLBACK_ERROR_MESSAGE.to_string() } else { msg }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match &err {
            GatewayError::Unauthorized { .. } => AppError::auth("unauthorized".to_string(), err.user_message()),
            GatewayError::Status { .. } => AppError::server("remote_error".to_string(), err.user_message()),
            GatewayError::Transport(_) => AppError::transport("transport_error".to_string(), err.user_message()),
            GatewayError::Decode { .. } => AppError::server("decode_error".to_string(), err.user_message()),
            GatewayError::InvalidRequest { .. } => AppError::user("invalid_request".to_string(), err.user_message()),
        }
    }
}
