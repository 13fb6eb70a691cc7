//! Error types for the build and serve phases.
//!
//! # Design Decisions
//! - Build errors abort the whole build; no partial artifacts are written
//! - Serve errors only occur at startup (artifact load); once the dispatch
//!   table is built, request-level failures never surface here
//! - Request-level handler failures are `pages::PageError`, caught per
//!   request by the dispatcher

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a build invocation.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A directory or entry could not be read during the route walk.
    #[error("failed to read {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A route file exists on disk but no page module was registered for it.
    /// Equivalent to a module import failure: the compiler cannot discover
    /// its methods.
    #[error("no page module registered for {path}")]
    UnregisteredModule { path: PathBuf },

    /// A page name produced an invalid matcher pattern.
    #[error("invalid route pattern for `{literal}`: {source}")]
    Pattern {
        literal: String,
        #[source]
        source: regex::Error,
    },

    /// Writing a build artifact failed.
    #[error("failed to write artifact {path}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing the route-tree snapshot or endpoint manifest failed.
    #[error("failed to serialize build output: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Errors raised while loading the dispatch module at server startup.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The endpoint manifest could not be read from disk.
    #[error("failed to read dispatch manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The endpoint manifest could not be parsed.
    #[error("failed to parse dispatch manifest: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint references an import identifier missing from the table.
    #[error("endpoint references unknown import identifier `{ident}`")]
    UnknownImport { ident: String },

    /// An import-table path has no registered page module in this process.
    #[error("no page module registered for {path}")]
    UnresolvedModule { path: PathBuf },

    /// A persisted matcher failed to recompile.
    #[error("invalid matcher `{matcher}`: {source}")]
    Pattern {
        matcher: String,
        #[source]
        source: regex::Error,
    },

    /// Binding the listener or serving connections failed.
    #[error("server I/O failure: {0}")]
    Io(#[from] std::io::Error),
}
