// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{Error, Result};

pub const DEFAULT_AUTH_URL: &str = "http://localhost:8084/api/v1";
pub const DEFAULT_API_URL: &str = "http://localhost:8083/api/v1";
pub const DEFAULT_RATES_URL: &str = "https://api.exchangerate-api.com/v4/latest";

const ENV_AUTH_URL: &str = "EXPENSEDESK_AUTH_URL";
const ENV_API_URL: &str = "EXPENSEDESK_API_URL";
const ENV_RATES_URL: &str = "EXPENSEDESK_RATES_URL";
const ENV_DB: &str = "EXPENSEDESK_DB";

/// Endpoints and limits for one client instance.
///
/// Resolution order is defaults, then environment, then CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub auth_url: String,
    pub api_url: String,
    pub rates_url: String,
    pub db_path: Option<PathBuf>,
    pub timeout: Duration,
    pub import_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            rates_url: DEFAULT_RATES_URL.to_string(),
            db_path: None,
            timeout: Duration::from_secs(15),
            import_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Same as `from_env` but reads variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Config::default();
        if let Some(v) = lookup(ENV_AUTH_URL) {
            cfg.auth_url = v;
        }
        if let Some(v) = lookup(ENV_API_URL) {
            cfg.api_url = v;
        }
        if let Some(v) = lookup(ENV_RATES_URL) {
            cfg.rates_url = v;
        }
        if let Some(v) = lookup(ENV_DB).filter(|v| !v.trim().is_empty()) {
            cfg.db_path = Some(PathBuf::from(v));
        }
        cfg.normalize()
    }

    pub fn with_overrides(mut self, auth_url: Option<&str>, api_url: Option<&str>) -> Result<Self> {
        if let Some(u) = auth_url {
            self.auth_url = u.to_string();
        }
        if let Some(u) = api_url {
            self.api_url = u.to_string();
        }
        self.normalize()
    }

    fn normalize(mut self) -> Result<Self> {
        for (name, url) in [
            ("auth url", &mut self.auth_url),
            ("api url", &mut self.api_url),
            ("rates url", &mut self.rates_url),
        ] {
            let trimmed = url.trim().trim_end_matches('/').to_string();
            if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                return Err(Error::Config(format!("{} '{}' must be http(s)", name, url)));
            }
            *url = trimmed;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_values_override_defaults_and_lose_trailing_slash() {
        let cfg = Config::from_lookup(|k| match k {
            "EXPENSEDESK_API_URL" => Some("https://api.example.test/v1/".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.api_url, "https://api.example.test/v1");
        assert_eq!(cfg.auth_url, DEFAULT_AUTH_URL);
    }

    #[test]
    fn rejects_non_http_urls() {
        let err = Config::default()
            .with_overrides(Some("ftp://nope"), None)
            .unwrap_err();
        assert!(err.to_string().contains("auth url"));
    }
}
