//!
//! Credential store
//! ----------------
//! Persists the access/refresh token pair as two cookies. The tokens are opaque to
//! this module: nothing here inspects or validates their contents.
//!
//! The storage layer is a `CookieJar`. `MemoryCookieJar` lives for the page/process,
//! `FileCookieJar` survives restarts by persisting the jar as JSON.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub max_age: Duration,
    pub path: String,
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self { max_age: Duration::days(7), path: "/".to_string(), secure: false, same_site: SameSite::Strict }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredCookie {
    pub value: String,
    pub path: String,
    pub secure: bool,
    pub same_site: SameSite,
    pub expires_at: DateTime<Utc>,
}

impl StoredCookie {
    fn new(value: &str, opts: &CookieOptions, now: DateTime<Utc>) -> Self {
        Self {
            value: value.to_string(),
            path: opts.path.clone(),
            secure: opts.secure,
            same_site: opts.same_site,
            expires_at: now + opts.max_age,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool { self.expires_at <= now }
}

/// Storage layer under the credential store. Entries are keyed by (name, path).
pub trait CookieJar: Send + Sync {
    fn set(&self, name: &str, value: &str, opts: &CookieOptions) -> AppResult<()>;
    /// Returns None when absent or expired.
    fn get(&self, name: &str) -> Option<String>;
    /// Removing an absent cookie is not an error.
    fn remove(&self, name: &str, path: &str) -> AppResult<()>;
}

type CookieKey = (String, String);

fn live_value(map: &HashMap<CookieKey, StoredCookie>, name: &str, now: DateTime<Utc>) -> (Option<String>, Vec<CookieKey>) {
    let mut found = None;
    let mut expired = Vec::new();
    for ((n, p), c) in map.iter() {
        if n != name { continue; }
        if c.is_expired(now) {
            expired.push((n.clone(), p.clone()));
        } else if found.is_none() {
            found = Some(c.value.clone());
        }
    }
    (found, expired)
}

#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: RwLock<HashMap<CookieKey, StoredCookie>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.cookies.read().len() }

    pub fn is_empty(&self) -> bool { self.cookies.read().is_empty() }
}

impl CookieJar for MemoryCookieJar {
    fn set(&self, name: &str, value: &str, opts: &CookieOptions) -> AppResult<()> {
        let cookie = StoredCookie::new(value, opts, Utc::now());
        self.cookies.write().insert((name.to_string(), opts.path.clone()), cookie);
        Ok(())
    }

    fn get(&self, name: &str) -> Option<String> {
        let (found, expired) = live_value(&self.cookies.read(), name, Utc::now());
        if !expired.is_empty() {
            let mut m = self.cookies.write();
            for k in expired { m.remove(&k); }
        }
        found
    }

    fn remove(&self, name: &str, path: &str) -> AppResult<()> {
        self.cookies.write().remove(&(name.to_string(), path.to_string()));
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct JarFile {
    cookies: Vec<JarEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JarEntry {
    name: String,
    #[serde(flatten)]
    cookie: StoredCookie,
}

/// Cookie jar persisted as a JSON file. Every mutation rewrites the file.
#[derive(Debug)]
pub struct FileCookieJar {
    path: PathBuf,
    cookies: RwLock<HashMap<CookieKey, StoredCookie>>,
}

impl FileCookieJar {
    /// Open the jar at `path`, loading existing entries. A missing file is an empty jar.
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut cookies = HashMap::new();
        if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            if !text.trim().is_empty() {
                let file: JarFile = serde_json::from_str(&text)
                    .map_err(|e| AppError::storage("cookie_jar_corrupt".to_string(), format!("{}: {}", path.display(), e)))?;
                for entry in file.cookies {
                    cookies.insert((entry.name, entry.cookie.path.clone()), entry.cookie);
                }
            }
        }
        debug!(path = %path.display(), entries = cookies.len(), "cookie_jar.open");
        Ok(Self { path, cookies: RwLock::new(cookies) })
    }

    pub fn path(&self) -> &Path { &self.path }

    fn persist(&self, map: &HashMap<CookieKey, StoredCookie>) -> AppResult<()> {
        let file = JarFile {
            cookies: map.iter().map(|((n, _), c)| JarEntry { name: n.clone(), cookie: c.clone() }).collect(),
        };
        let text = serde_json::to_string_pretty(&file)
            .map_err(|e| AppError::storage("cookie_jar_encode".to_string(), e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() { std::fs::create_dir_all(parent)?; }
        }
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

impl CookieJar for FileCookieJar {
    fn set(&self, name: &str, value: &str, opts: &CookieOptions) -> AppResult<()> {
        let mut m = self.cookies.write();
        let key = (name.to_string(), opts.path.clone());
        let previous = m.insert(key.clone(), StoredCookie::new(value, opts, Utc::now()));
        if let Err(e) = self.persist(&m) {
            // keep memory consistent with disk
            match previous {
                Some(p) => { m.insert(key, p); }
                None => { m.remove(&key); }
            }
            return Err(e);
        }
        Ok(())
    }

    fn get(&self, name: &str) -> Option<String> {
        let (found, expired) = live_value(&self.cookies.read(), name, Utc::now());
        if !expired.is_empty() {
            let mut m = self.cookies.write();
            for k in expired { m.remove(&k); }
            if let Err(e) = self.persist(&m) {
                warn!(error = %e, "cookie_jar.prune_persist_failed");
            }
        }
        found
    }

    fn remove(&self, name: &str, path: &str) -> AppResult<()> {
        let mut m = self.cookies.write();
        if m.remove(&(name.to_string(), path.to_string())).is_none() {
            return Ok(());
        }
        self.persist(&m)
    }
}

/// The token pair written at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into() }
    }
}

/// What `CredentialStore::get` returns; either half may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredCredentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl StoredCredentials {
    pub fn is_empty(&self) -> bool { self.access_token.is_none() && self.refresh_token.is_none() }
}

#[derive(Clone)]
pub struct CredentialStore {
    jar: Arc<dyn CookieJar>,
    options: CookieOptions,
}

impl CredentialStore {
    pub fn new(jar: Arc<dyn CookieJar>, options: CookieOptions) -> Self { Self { jar, options } }

    /// In-memory store with default cookie options.
    pub fn in_memory() -> Self { Self::new(Arc::new(MemoryCookieJar::new()), CookieOptions::default()) }

    pub fn options(&self) -> &CookieOptions { &self.options }

    /// Write both tokens. If the refresh write fails the access write is rolled back.
    pub fn set(&self, pair: &CredentialPair) -> AppResult<()> {
        self.jar.set(ACCESS_TOKEN_COOKIE, &pair.access_token, &self.options)?;
        if let Err(e) = self.jar.set(REFRESH_TOKEN_COOKIE, &pair.refresh_token, &self.options) {
            warn!(error = %e, "credentials.set refresh write failed, rolling back access token");
            if let Err(rb) = self.jar.remove(ACCESS_TOKEN_COOKIE, &self.options.path) {
                warn!(error = %rb, "credentials.set rollback failed");
            }
            return Err(e);
        }
        debug!("credentials.set");
        Ok(())
    }

    pub fn get(&self) -> StoredCredentials {
        StoredCredentials {
            access_token: self.jar.get(ACCESS_TOKEN_COOKIE),
            refresh_token: self.jar.get(REFRESH_TOKEN_COOKIE),
        }
    }

    pub fn access_token(&self) -> Option<String> { self.jar.get(ACCESS_TOKEN_COOKIE) }

    /// Remove both tokens at path "/". Both removals are attempted; the first error wins.
    pub fn clear(&self) -> AppResult<()> {
        let a = self.jar.remove(ACCESS_TOKEN_COOKIE, "/");
        let r = self.jar.remove(REFRESH_TOKEN_COOKIE, "/");
        debug!("credentials.clear");
        a.and(r)
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").field("options", &self.options).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RefuseRefreshJar {
        inner: MemoryCookieJar,
    }

    impl CookieJar for RefuseRefreshJar {
        fn set(&self, name: &str, value: &str, opts: &CookieOptions) -> AppResult<()> {
            if name == REFRESH_TOKEN_COOKIE {
                return Err(AppError::storage("quota", "storage full"));
            }
            self.inner.set(name, value, opts)
        }
        fn get(&self, name: &str) -> Option<String> { self.inner.get(name) }
        fn remove(&self, name: &str, path: &str) -> AppResult<()> { self.inner.remove(name, path) }
    }

    #[test]
    fn set_then_get_returns_both_tokens_unmodified() {
        let store = CredentialStore::in_memory();
        store.set(&CredentialPair::new("a.b.c", "r-123")).unwrap();
        let got = store.get();
        assert_eq!(got.access_token.as_deref(), Some("a.b.c"));
        assert_eq!(got.refresh_token.as_deref(), Some("r-123"));
    }

    #[test]
    fn clear_is_idempotent() {
        let store = CredentialStore::in_memory();
        store.clear().unwrap();
        store.set(&CredentialPair::new("a", "b")).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.get().is_empty());
    }

    #[test]
    fn expired_entries_read_as_absent() {
        let jar = Arc::new(MemoryCookieJar::new());
        let opts = CookieOptions { max_age: Duration::seconds(-1), ..CookieOptions::default() };
        let store = CredentialStore::new(jar.clone(), opts);
        store.set(&CredentialPair::new("a", "b")).unwrap();
        assert!(store.get().is_empty());
        assert!(jar.is_empty());
    }

    #[test]
    fn failed_refresh_write_rolls_back_access_token() {
        let jar = Arc::new(RefuseRefreshJar { inner: MemoryCookieJar::new() });
        let store = CredentialStore::new(jar, CookieOptions::default());
        let err = store.set(&CredentialPair::new("a", "b")).unwrap_err();
        assert_eq!(err.code_str(), "quota");
        assert!(store.get().is_empty());
    }

    #[test]
    fn file_jar_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("jar").join("cookies.json");
        {
            let store = CredentialStore::new(Arc::new(FileCookieJar::open(&path).unwrap()), CookieOptions::default());
            store.set(&CredentialPair::new("acc", "ref")).unwrap();
        }
        let store = CredentialStore::new(Arc::new(FileCookieJar::open(&path).unwrap()), CookieOptions::default());
        assert_eq!(store.access_token().as_deref(), Some("acc"));
        store.clear().unwrap();

        let reopened = FileCookieJar::open(&path).unwrap();
        assert_eq!(reopened.get(ACCESS_TOKEN_COOKIE), None);
        assert_eq!(reopened.get(REFRESH_TOKEN_COOKIE), None);
    }

    #[test]
    fn file_jar_rejects_corrupt_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("cookies.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = FileCookieJar::open(&path).unwrap_err();
        assert_eq!(err.code_str(), "cookie_jar_corrupt");
    }
}
