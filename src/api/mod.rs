//! Typed clients for the remote API, all routed through the request gateway.

pub mod auth;
pub mod images;

pub use auth::{AuthService, AuthResponse, LoginCredentials, RegisterData, ForgotPasswordData, MessageResponse};
pub use images::{ImageService, ImagesResponse};
