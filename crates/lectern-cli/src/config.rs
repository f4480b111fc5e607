//! Configuration for the Lectern CLI.
//!
//! Provides the [`LecternConfig`] struct that loads from a TOML file,
//! environment variables, and defaults using the `config` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `LECTERN_CONFIG` environment variable
//! 3. XDG default: `~/.config/lectern/config.toml`
//! 4. Built-in defaults
//!
//! Environment variables named `LECTERN_<SECTION>__<KEY>` override file
//! values, e.g. `LECTERN_API__BASE_URL` or `LECTERN_SEARCH__MAX_LIMIT`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use lectern_core::{Error, Result};
use lectern_router::{MAX_COMPREHENSIVE_FANOUT, OrchestratorSettings};
use serde::{Deserialize, Serialize};

/// Env var naming the config file.
pub const CONFIG_ENV_VAR: &str = "LECTERN_CONFIG";

const ENV_PREFIX: &str = "LECTERN";
const ENV_SEPARATOR: &str = "__";

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for Lectern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LecternConfig {
    /// Document API connection settings.
    pub api: ApiConfig,

    /// Search limits.
    pub search: SearchConfig,
}

/// Document API connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API root URL.
    pub base_url: String,

    /// User agent sent with every request.
    pub user_agent: String,

    /// Transport timeout per HTTP request, in seconds.
    pub timeout_secs: u64,
}

/// Search limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Records requested when the caller gives no limit.
    pub default_limit: usize,

    /// Upper bound on any requested limit.
    pub max_limit: usize,

    /// Bound on each endpoint call, in seconds. Zero disables it.
    pub call_timeout_secs: u64,

    /// Fallbacks queried alongside the primary in comprehensive mode, at most 2.
    pub comprehensive_fanout: usize,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            user_agent: format!("lectern/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 20,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        let settings = OrchestratorSettings::default();
        Self {
            default_limit: settings.default_limit,
            max_limit: settings.max_limit,
            call_timeout_secs: settings.call_timeout.map_or(0, |d| d.as_secs()),
            comprehensive_fanout: settings.comprehensive_fanout,
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl LecternConfig {
    /// Load configuration from file, environment, and defaults.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = Self::resolve_config_path(config_path);
        Self::load_with(path.as_deref(), None)
    }

    /// Load from `path` (if it exists) and an environment overlay.
    ///
    /// `env` replaces the process environment when given.
    pub fn load_with(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path.filter(|p| p.exists()) {
            builder = builder.add_source(
                File::new(&path.to_string_lossy(), FileFormat::Toml).required(true),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(env.map(|vars| vars.into_iter().collect())),
        );

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?
            .try_deserialize()
            .map_err(|e| Error::config(format!("config decode: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        Self::resolve_config_path_with(explicit, std::env::var(CONFIG_ENV_VAR).ok())
    }

    fn resolve_config_path_with(
        explicit: Option<&str>,
        env_path: Option<String>,
    ) -> Option<PathBuf> {
        explicit
            .map(PathBuf::from)
            .or_else(|| env_path.filter(|p| !p.is_empty()).map(PathBuf::from))
            .or_else(Self::default_config_path)
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("lectern").join("config.toml"))
    }

    /// Reject values that would make every search fail.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(Error::config("api.base_url must not be empty"));
        }
        if self.search.max_limit == 0 {
            return Err(Error::config("search.max_limit must be at least 1"));
        }
        if self.search.comprehensive_fanout > MAX_COMPREHENSIVE_FANOUT {
            return Err(Error::config(format!(
                "search.comprehensive_fanout must be at most {MAX_COMPREHENSIVE_FANOUT}"
            )));
        }
        Ok(())
    }

    /// Transport timeout for the HTTP client.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Orchestrator limits from the `[search]` section.
    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            default_limit: self.search.default_limit,
            max_limit: self.search.max_limit,
            call_timeout: (self.search.call_timeout_secs > 0)
                .then(|| Duration::from_secs(self.search.call_timeout_secs)),
            comprehensive_fanout: self.search.comprehensive_fanout,
        }
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flatten this config into the environment variables that would
    /// reproduce it, e.g. `LECTERN_API__BASE_URL`.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value = toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        if let toml::Value::Table(table) = &value {
            for (key, val) in table {
                let env_key = format!("{ENV_PREFIX}_{}", key.to_uppercase());
                flatten_toml_value(val, &env_key, &mut vars);
            }
        }
        Ok(vars)
    }
}

// ============================================================================
// Helper: flatten TOML to env vars
// ============================================================================

/// Recursively flatten a TOML value into `KEY=value` pairs.
fn flatten_toml_value(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let env_key = format!("{prefix}{ENV_SEPARATOR}{}", key.to_uppercase());
                flatten_toml_value(val, &env_key, out);
            }
        }
        toml::Value::Array(arr) => {
            if let Ok(json) = serde_json::to_string(arr) {
                out.push((prefix.to_string(), json));
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        toml::Value::Integer(i) => out.push((prefix.to_string(), i.to_string())),
        toml::Value::Float(f) => out.push((prefix.to_string(), f.to_string())),
        toml::Value::Boolean(b) => out.push((prefix.to_string(), b.to_string())),
        toml::Value::Datetime(dt) => out.push((prefix.to_string(), dt.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================
