//! Runtime configuration read from the environment.

use anyhow::{Context, Result};
use reqwest::Url;

use crate::credentials::{CookieOptions, SameSite};

pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8080/api/";
pub const DEFAULT_IMAGES_URL: &str = "https://dog.ceo/api/breeds/image/random/5";
pub const DEFAULT_COOKIE_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool { matches!(self, Environment::Production) }
}

#[derive(Debug, Clone)]
pub struct GateConfig {
    pub environment: Environment,
    pub http_port: u16,
    /// Base URL relative API paths resolve against; keep the trailing slash.
    pub api_base: Url,
    pub images_url: Url,
    pub cookie_ttl_days: i64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            http_port: DEFAULT_HTTP_PORT,
            api_base: Url::parse(DEFAULT_API_BASE).expect("default api base is a valid URL"),
            images_url: Url::parse(DEFAULT_IMAGES_URL).expect("default images url is a valid URL"),
            cookie_ttl_days: DEFAULT_COOKIE_TTL_DAYS,
        }
    }
}

impl GateConfig {
    /// Build configuration from `DASHGATE_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as `from_env` but with an injectable lookup, used by tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = GateConfig::default();
        if let Some(env) = lookup("DASHGATE_ENV") {
            cfg.environment = Environment::parse(&env);
        }
        if let Some(port) = lookup("DASHGATE_HTTP_PORT") {
            cfg.http_port = port.trim().parse::<u16>()
                .with_context(|| format!("invalid DASHGATE_HTTP_PORT: {}", port))?;
        }
        if let Some(base) = lookup("DASHGATE_API_BASE") {
            let mut base = base.trim().to_string();
            if !base.ends_with('/') { base.push('/'); }
            cfg.api_base = Url::parse(&base)
                .with_context(|| format!("invalid DASHGATE_API_BASE: {}", base))?;
        }
        if let Some(images) = lookup("DASHGATE_IMAGES_URL") {
            cfg.images_url = Url::parse(images.trim())
                .with_context(|| format!("invalid DASHGATE_IMAGES_URL: {}", images))?;
        }
        Ok(cfg)
    }

    /// Attributes applied to both credential cookies.
    pub fn cookie_options(&self) -> CookieOptions {
        CookieOptions {
            max_age: chrono::Duration::days(self.cookie_ttl_days),
            path: "/".to_string(),
            secure: self.environment.is_production(),
            same_site: SameSite::Strict,
        }
    }
}
