//! Configuration subsystem.
//!
//! # Responsibilities
//! - Define the TOML schema with per-field defaults (`schema.rs`)
//! - Load and parse the config file (`loader.rs`)
//! - Validate ranges and consistency, reporting all errors (`validation.rs`)

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{BuildConfig, DevConfig, ObservabilityConfig, ServerConfig, SiteConfig};
pub use validation::{validate_config, ValidationError};
