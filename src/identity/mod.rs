//! Client-side identity and session state for the dashboard.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod session;
mod provider;
pub mod token;

pub use principal::UserIdentity;
pub use session::{SessionContext, SessionState};
pub use provider::{SessionProvider, ProviderGuard, use_session, try_use_session};
pub use token::{TokenPayload, decode_payload, is_token_expired, identity_from_token};
