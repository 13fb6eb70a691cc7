//! Route tree definitions.
//!
//! One `RouteNode` per filesystem entry, built once per build invocation by
//! the walker, immutable afterwards, consumed by the endpoint compiler.
//! The whole tree serializes to JSON for the diagnostic snapshot artifact.

use std::path::PathBuf;

use serde::Serialize;

/// Reference to a page module's source file. Modules are referenced, never
/// duplicated; the import table later maps each distinct path to exactly
/// one generated identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleRef {
    /// Absolute filesystem location of the module.
    pub path: PathBuf,
}

impl ModuleRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// How a directory's layout composes with inherited layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Append to the inherited chain (outer-to-inner accumulation).
    Nested,
    /// Discard the inherited chain and start over at this node.
    Override,
}

/// A directory's layout module plus its composition mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutRef {
    pub module: ModuleRef,
    pub mode: LayoutMode,
}

/// One filesystem entry in the pre-compilation route tree.
#[derive(Debug, Clone, Serialize)]
pub struct RouteNode {
    /// URL path this node contributes; the root is `/`.
    pub name: String,

    /// Absolute filesystem location.
    pub path: PathBuf,

    /// Whether this node is a directory with subroutes.
    pub is_directory: bool,

    /// The directory's `index` module, when present.
    pub default: Option<ModuleRef>,

    /// The directory's `__layout` / `__layout.override` module.
    pub layout: Option<LayoutRef>,

    /// The directory's `__error` module for local error rendering.
    pub error: Option<ModuleRef>,

    /// Child routes in deterministic walk order.
    pub subroutes: Vec<RouteNode>,
}

impl RouteNode {
    /// A leaf route for a plain page file.
    pub fn leaf(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_directory: false,
            default: None,
            layout: None,
            error: None,
            subroutes: Vec::new(),
        }
    }

    /// An empty directory node; the walker fills in the rest.
    pub fn directory(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            is_directory: true,
            ..Self::leaf(name, path)
        }
    }

    /// A single matchable endpoint: a non-directory leaf with no subroutes.
    pub fn is_endpoint_leaf(&self) -> bool {
        !self.is_directory && self.subroutes.is_empty()
    }
}
