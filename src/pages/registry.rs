//! Page module registry.
//!
//! # Responsibilities
//! - Map absolute route-file paths to their `PageModule` implementations
//! - Serve manifest lookups to the endpoint compiler
//! - Resolve import-table paths back to modules at dispatch-table load
//!
//! # Design Decisions
//! - Owned by the host application, passed by reference into build/serve;
//!   never global state
//! - A walked file without a registered module is a build-fatal error, the
//!   moral equivalent of a failed dynamic import

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::BuildError;
use crate::pages::{ModuleManifest, PageModule};

/// Registry of page modules keyed by route-file path.
#[derive(Default, Clone)]
pub struct ModuleRegistry {
    modules: HashMap<PathBuf, Arc<dyn PageModule>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// Register a module under its route-file path. Re-registering a path
    /// replaces the previous module.
    pub fn register(&mut self, path: impl Into<PathBuf>, module: Arc<dyn PageModule>) {
        self.modules.insert(path.into(), module);
    }

    /// Builder-style registration for test and embedding ergonomics.
    pub fn with(mut self, path: impl Into<PathBuf>, module: Arc<dyn PageModule>) -> Self {
        self.register(path, module);
        self
    }

    pub fn get(&self, path: &Path) -> Option<Arc<dyn PageModule>> {
        self.modules.get(path).cloned()
    }

    /// Manifest lookup for the compiler; missing registration aborts the
    /// build.
    pub fn manifest_for(&self, path: &Path) -> Result<ModuleManifest, BuildError> {
        self.modules
            .get(path)
            .map(|module| module.manifest())
            .ok_or_else(|| BuildError::UnregisteredModule {
                path: path.to_path_buf(),
            })
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
