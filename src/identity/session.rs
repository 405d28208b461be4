use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use super::principal::UserIdentity;
use crate::credentials::{CredentialPair, CredentialStore};
use crate::error::AppResult;
use crate::navigation::{Navigator, DASHBOARD_PATH, LOGIN_PATH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// Page-lifetime holder of the signed-in identity.
///
/// The identity is never persisted; only the token pair is, through the credential
/// store. A page load therefore always starts Anonymous.
pub struct SessionContext {
    identity: RwLock<Option<UserIdentity>>,
    credentials: CredentialStore,
    navigator: Arc<dyn Navigator>,
}

impl SessionContext {
    pub fn new(credentials: CredentialStore, navigator: Arc<dyn Navigator>) -> Self {
        Self { identity: RwLock::new(None), credentials, navigator }
    }

    pub fn credentials(&self) -> &CredentialStore { &self.credentials }

    pub fn identity(&self) -> Option<UserIdentity> { self.identity.read().clone() }

    pub fn state(&self) -> SessionState {
        if self.identity.read().is_some() { SessionState::Authenticated } else { SessionState::Anonymous }
    }

    pub fn is_authenticated(&self) -> bool { self.state() == SessionState::Authenticated }

    /// Persist the pair, adopt `identity`, then navigate to the dashboard.
    /// The tokens are trusted as given.
    pub fn login(&self, access_token: &str, refresh_token: &str, identity: UserIdentity) -> AppResult<()> {
        self.credentials.set(&CredentialPair::new(access_token, refresh_token))?;
        info!(user_id = %identity.id, email = %identity.email, "session.login");
        *self.identity.write() = Some(identity);
        self.navigator.push(DASHBOARD_PATH);
        Ok(())
    }

    /// Clear the pair, drop the identity, navigate to login. Valid from any state.
    pub fn logout(&self) {
        if let Err(e) = self.credentials.clear() {
            warn!(error = %e, "session.logout failed to clear credentials");
        }
        let previous = self.identity.write().take();
        info!(user_id = previous.as_ref().map(|u| u.id.as_str()).unwrap_or("<anonymous>"), "session.logout");
        self.navigator.push(LOGIN_PATH);
    }

    /// Mount-time check: a persisted access token with no identity in memory is
    /// treated as stale and purged. Identity is not rehydrated from the token.
    pub fn mount(&self) {
        let has_token = self.credentials.access_token().is_some();
        if has_token && self.identity.read().is_none() {
            info!("session.mount stale token without identity, logging out");
            self.logout();
        }
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("identity", &*self.identity.read())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
