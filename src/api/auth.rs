use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AppError, AppResult, GatewayError};
use crate::gateway::{RequestGateway, RequestSpec};
use crate::identity::{SessionContext, UserIdentity};

pub const LOGIN_ENDPOINT: &str = "auth/login";
pub const REGISTER_ENDPOINT: &str = "auth/register";
pub const FORGOT_PASSWORD_ENDPOINT: &str = "auth/forgot-password";

#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForgotPasswordData {
    pub email: String,
}

/// Body of a successful login or registration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserIdentity,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

fn to_body<S: Serialize>(v: &S) -> Result<serde_json::Value, GatewayError> {
    serde_json::to_value(v).map_err(|e| GatewayError::InvalidRequest { message: e.to_string() })
}

#[derive(Clone)]
pub struct AuthService {
    gateway: RequestGateway,
}

impl AuthService {
    pub fn new(gateway: RequestGateway) -> Self { Self { gateway } }

    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse, GatewayError> {
        self.gateway.send(RequestSpec::post(LOGIN_ENDPOINT).sessionless().json(to_body(credentials)?)).await
    }

    pub async fn register(&self, data: &RegisterData) -> Result<AuthResponse, GatewayError> {
        self.gateway.send(RequestSpec::post(REGISTER_ENDPOINT).sessionless().json(to_body(data)?)).await
    }

    pub async fn forgot_password(&self, data: &ForgotPasswordData) -> Result<MessageResponse, GatewayError> {
        self.gateway.send(RequestSpec::post(FORGOT_PASSWORD_ENDPOINT).sessionless().json(to_body(data)?)).await
    }

    /// Log in remotely, then hand the tokens and user to the session.
    pub async fn sign_in(&self, session: &SessionContext, credentials: &LoginCredentials) -> AppResult<UserIdentity> {
        let resp = self.login(credentials).await.map_err(AppError::from)?;
        info!(email = %credentials.email, "auth.sign_in");
        Self::adopt(session, resp)
    }

    /// Register remotely, then hand the tokens and user to the session.
    pub async fn sign_up(&self, session: &SessionContext, data: &RegisterData) -> AppResult<UserIdentity> {
        let resp = self.register(data).await.map_err(AppError::from)?;
        info!(email = %data.email, "auth.sign_up");
        Self::adopt(session, resp)
    }

    fn adopt(session: &SessionContext, resp: AuthResponse) -> AppResult<UserIdentity> {
        let user = resp.user.clone();
        session.login(&resp.access_token, &resp.refresh_token, resp.user)?;
        Ok(user)
    }
}
