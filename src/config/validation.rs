//! Configuration validation.
//!
//! Collects every violation instead of stopping at the first, so a broken
//! config file is fixed in one edit instead of several round trips.

use std::fmt;
use std::net::SocketAddr;

use crate::config::SiteConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyRoutesDir,
    EmptyOutputDir,
    OutputInsideRoutes,
    InvalidBindAddress(String),
    ZeroRequestTimeout,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyRoutesDir => write!(f, "build.routes_dir must not be empty"),
            ValidationError::EmptyOutputDir => write!(f, "build.output_dir must not be empty"),
            ValidationError::OutputInsideRoutes => write!(
                f,
                "build.output_dir must not be inside build.routes_dir; \
                 the walker would pick up generated artifacts as routes"
            ),
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "server.bind_address {addr:?} is not a valid socket address")
            }
            ValidationError::ZeroRequestTimeout => {
                write!(f, "server.request_timeout_secs must be greater than zero")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a loaded configuration, returning all violations at once.
pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.build.routes_dir.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyRoutesDir);
    }
    if config.build.output_dir.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyOutputDir);
    }
    if !config.build.routes_dir.as_os_str().is_empty()
        && config.build.output_dir.starts_with(&config.build.routes_dir)
    {
        errors.push(ValidationError::OutputInsideRoutes);
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.server.bind_address.clone(),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
