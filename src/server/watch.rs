//! Routes-directory watcher for dev-mode rebuilds.
//!
//! # Design Decisions
//! - The watcher only reports that something changed; rebuilding and table
//!   swapping are a separate step ([`reload`]) driven by the dev loop
//! - A failed rebuild keeps the previous dispatch table serving

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::compiler;
use crate::config::SiteConfig;
use crate::pages::ModuleRegistry;
use crate::server::dispatch::DispatchTable;

/// Rebuild the routes and swap the serving table through `handle`.
///
/// Every failure path leaves the previous table in place: a broken route
/// tree in dev mode degrades to stale routes, never to a dead server.
pub async fn reload(
    config: &SiteConfig,
    registry: &ModuleRegistry,
    handle: &ArcSwap<DispatchTable>,
) {
    match compiler::run_build(config, registry).await {
        Ok(artifacts) => match DispatchTable::load(&artifacts.manifest, registry) {
            Ok(table) => {
                handle.store(Arc::new(table));
                tracing::info!(
                    endpoints = artifacts.manifest.endpoints.len(),
                    "routes reloaded"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "table load failed, keeping previous routes");
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "rebuild failed, keeping previous routes");
        }
    }
}

/// Watches the routes directory and signals on any relevant change.
pub struct RouteWatcher {
    path: PathBuf,
    change_tx: mpsc::UnboundedSender<()>,
}

impl RouteWatcher {
    /// Create a watcher for the given routes directory.
    ///
    /// Returns the watcher and a receiver that fires once per change batch.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (change_tx, change_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                change_tx,
            },
            change_rx,
        )
    }

    /// Start watching recursively. The returned watcher must stay alive for
    /// events to keep flowing.
    pub fn run(self, debounce_ms: u64) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.change_tx.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove() {
                        let _ = tx.send(());
                    }
                }
                Err(e) => tracing::error!("watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_millis(debounce_ms)),
        )?;

        watcher.watch(&self.path, RecursiveMode::Recursive)?;

        tracing::info!(path = ?self.path, "route watcher started");
        Ok(watcher)
    }
}
