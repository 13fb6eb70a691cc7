//! Corridor: a file-system route compiler and dispatch server.
//!
//! Routes are files. A directory tree of page modules is walked and
//! compiled into a dispatch module ahead of time; at serve time a single
//! wildcard handler scans the compiled endpoints first-match-wins.
//!
//! # Architecture
//! ```text
//! build phase
//!   routes/ directory ──walk──▶ RouteNode tree ──compile──▶ Endpoint list
//!                                                   │
//!                              import table ◀───────┤
//!                                   │               ▼
//!                                   └──serialize──▶ dispatch.rs
//!                                                   endpoints.json
//!                                                   routes.json
//! serve phase
//!   endpoints.json + ModuleRegistry ──load──▶ DispatchTable
//!                                                   │
//!   HTTP request ──axum wildcard──▶ method bucket ──scan──▶ handler
//!                                                   │
//!                              layouts + error rendering ──▶ response
//! dev mode
//!   routes/ change ──notify──▶ rebuild ──▶ ArcSwap table swap
//! ```
//!
//! Page modules implement [`PageModule`] and are registered in a
//! [`ModuleRegistry`] under their route-file paths; a walked file without a
//! registered module fails the build.

pub mod cli;
pub mod compiler;
pub mod config;
pub mod error;
pub mod pages;
pub mod routing;
pub mod server;
pub mod ui;

pub use compiler::{run_build, BuildArtifacts, DispatchManifest, Endpoint};
pub use config::{load_config, SiteConfig};
pub use error::{BuildError, ServeError};
pub use pages::{
    EndpointReply, Method, ModuleManifest, ModuleRegistry, PageError, PageModule, RequestParams,
};
pub use routing::{walk, PathPattern, RouteNode};
pub use server::{DispatchTable, EndpointRecord, HttpServer};
pub use ui::{render_document, Node, RenderContext};
