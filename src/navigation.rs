//! Client-side navigation target used by the session context and the request gateway.

use parking_lot::Mutex;
use tracing::debug;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

pub trait Navigator: Send + Sync {
    fn push(&self, path: &str);
    fn current(&self) -> Option<String>;
}

/// In-memory navigation history. Pushing the current path again is a no-op.
#[derive(Debug, Default)]
pub struct History {
    entries: Mutex<Vec<String>>,
}

impl History {
    pub fn new() -> Self { Self::default() }

    pub fn starting_at(path: &str) -> Self {
        Self { entries: Mutex::new(vec![path.to_string()]) }
    }

    pub fn entries(&self) -> Vec<String> { self.entries.lock().clone() }
}

impl Navigator for History {
    fn push(&self, path: &str) {
        let mut e = self.entries.lock();
        if e.last().map(|p| p == path).unwrap_or(false) { return; }
        debug!(to = path, "navigate");
        e.push(path.to_string());
    }

    fn current(&self) -> Option<String> { self.entries.lock().last().cloned() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_push_is_noop() {
        let h = History::starting_at("/");
        h.push(LOGIN_PATH);
        h.push(LOGIN_PATH);
        h.push(DASHBOARD_PATH);
        assert_eq!(h.entries(), vec!["/", "/login", "/dashboard"]);
        assert_eq!(h.current().as_deref(), Some(DASHBOARD_PATH));
    }
}
