//! # Runtime Configuration Module
//!
//! Environment variable based configuration for a router instance.
//!
//! ## Environment Variables
//!
//! ### `ROUTEWISE_BASE_PATH`
//!
//! Literal prefix applied to every endpoint pattern, e.g. `/api/v1`.
//! A missing leading slash is added and a trailing slash is dropped, so
//! `api/v1/` and `/api/v1` are equivalent. Empty or `/` means no prefix.
//!
//! Default: no prefix
//!
//! Logging is configured separately, see [`crate::logging::LogConfig::from_env`].
//!
//! ## Usage
//!
//! ```rust
//! use routewise::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Base path: {:?}", config.base_path);
//! ```
//!
//! ```bash
//! export ROUTEWISE_BASE_PATH=/api/auth
//! ```

use std::env;

pub const BASE_PATH_ENV: &str = "ROUTEWISE_BASE_PATH";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Normalized base path, `""` when unset
    pub base_path: String,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        RuntimeConfig {
            base_path: lookup(BASE_PATH_ENV)
                .map(|v| normalize_base_path(&v))
                .unwrap_or_default(),
        }
    }
}

/// Canonical base path: leading slash, no trailing slash, `""` for none.
#[must_use]
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
