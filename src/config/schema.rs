//! Configuration schema.
//!
//! Every field has a serde default so a partial TOML file, or no file at
//! all, yields a usable configuration. Range and consistency checks live in
//! `validation.rs`, not here.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level site configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub dev: DevConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Build-pipeline locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Directory scanned for route files.
    #[serde(default = "default_routes_dir")]
    pub routes_dir: PathBuf,

    /// Directory receiving build artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            routes_dir: default_routes_dir(),
            output_dir: default_output_dir(),
        }
    }
}

/// Dispatch-server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Listener address, `host:port`.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Per-request timeout enforced by the middleware stack.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Dev-mode watcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DevConfig {
    /// Minimum quiet period between filesystem events and a rebuild.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservabilityConfig {
    /// Default log level when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_routes_dir() -> PathBuf {
    PathBuf::from("routes")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.build.routes_dir, PathBuf::from("routes"));
        assert_eq!(config.build.output_dir, PathBuf::from("build"));
        assert_eq!(config.server.bind_address, "127.0.0.1:8080");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.dev.debounce_ms, 500);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: SiteConfig = toml::from_str(
            r#"
            [server]
            bind_address = "0.0.0.0:3000"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind_address, "0.0.0.0:3000");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.build.routes_dir, PathBuf::from("routes"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str(
            r#"
            [server]
            bind_adress = "typo:1234"
            "#,
        );
        assert!(result.is_err());
    }
}
