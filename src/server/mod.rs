//! Serve subsystem.
//!
//! # Data Flow
//! ```text
//! endpoints.json + ModuleRegistry
//!     → dispatch.rs (DispatchTable: method buckets, first-match-wins)
//!     → http.rs (Axum wildcard handler, middleware, graceful shutdown)
//!
//! dev mode:
//!     watch.rs (routes-dir events)
//!     → rebuild → new DispatchTable → ArcSwap store
//! ```

pub mod dispatch;
pub mod http;
pub mod watch;

pub use dispatch::{DispatchResponse, DispatchTable, EndpointRecord};
pub use http::{AppState, HttpServer};
pub use watch::{reload, RouteWatcher};

use tokio::net::TcpListener;

use crate::compiler::MANIFEST_FILE;
use crate::config::SiteConfig;
use crate::error::ServeError;
use crate::pages::ModuleRegistry;

/// Load the persisted manifest and serve it until shutdown.
pub async fn start(config: &SiteConfig, registry: &ModuleRegistry) -> Result<(), ServeError> {
    let manifest_path = config.build.output_dir.join(MANIFEST_FILE);
    let table = DispatchTable::load_file(&manifest_path, registry)?;

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    HttpServer::new(&config.server, table).run(listener).await
}
