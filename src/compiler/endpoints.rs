//! Endpoint compilation.
//!
//! # Responsibilities
//! - Walk the route tree depth-first, pre-order
//! - Resolve layout inheritance (nested appends, override resets)
//! - Discover each module's capabilities through its registered manifest
//! - Emit the flat, ordered endpoint list
//!
//! # Design Decisions
//! - The import table lives in a `BuildContext` owned by one build
//!   invocation; it is never process-global, so concurrent builds cannot
//!   corrupt the path↔identifier bijection
//! - Leaf endpoints inherit their parent's resolved chain; only
//!   directories contribute layouts
//! - A module declaring neither a method nor a default render is a
//!   warning, not an error: the endpoint is still compiled
//! - The compiler never reorders endpoints; ordering is fixed by the walk

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::pages::{Method, ModuleRegistry};
use crate::routing::matcher::PathPattern;
use crate::routing::tree::{LayoutMode, RouteNode};

/// One import-table entry: a distinct module file and its generated
/// identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEntry {
    pub ident: String,
    pub path: PathBuf,
}

/// Per-build compilation state: the path → identifier import table.
///
/// Insertion-ordered so serialization is deterministic. The table is a
/// bijection: each distinct path gets exactly one identifier, generated on
/// first sight and memoized.
#[derive(Debug, Default)]
pub struct BuildContext {
    imports: Vec<ImportEntry>,
    by_path: HashMap<PathBuf, usize>,
}

impl BuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the identifier for `path`, minting one with the given prefix
    /// on first sight. Repeated references reuse the first identifier
    /// regardless of prefix.
    pub fn intern(&mut self, path: &Path, prefix: &str) -> String {
        if let Some(&index) = self.by_path.get(path) {
            return self.imports[index].ident.clone();
        }

        let ident = format!("__{prefix}_{}", self.imports.len());
        self.by_path.insert(path.to_path_buf(), self.imports.len());
        self.imports.push(ImportEntry {
            ident: ident.clone(),
            path: path.to_path_buf(),
        });
        ident
    }

    /// Import entries in insertion order.
    pub fn imports(&self) -> &[ImportEntry] {
        &self.imports
    }

    pub fn into_imports(self) -> Vec<ImportEntry> {
        self.imports
    }
}

/// One compiled, servable endpoint. This is both the in-memory compiler
/// output and the persisted record inside the dispatch manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    /// Anchored regex source for path matching.
    pub matcher: String,

    /// Parameter names, one per capture group, in order.
    pub parameters: Vec<String>,

    /// The uncompiled page-name token; diagnostic only.
    pub literal: String,

    /// Layout identifiers, outermost first.
    pub layouts: Vec<String>,

    /// Declared HTTP methods.
    pub methods: Vec<Method>,

    /// Whether the module has a default page-render function.
    pub has_default: bool,

    /// Generated import identifier of the page module.
    pub module: String,

    /// Identifier of the module whose error renderer covers this endpoint;
    /// `None` falls back to the built-in error paragraph at serve time.
    pub error: Option<String>,
}

/// Compile a route tree into the flat endpoint list.
///
/// `inherited_layouts` and `inherited_error` thread the enclosing
/// directories' resolved layout chain and nearest `__error` module down the
/// recursion; pass empty/`None` at the root.
pub fn compile(
    node: &RouteNode,
    inherited_layouts: &[String],
    inherited_error: Option<&str>,
    ctx: &mut BuildContext,
    registry: &ModuleRegistry,
) -> Result<Vec<Endpoint>, BuildError> {
    // Resolve this node's effective layout chain before anything is
    // emitted; both the index endpoint and every subroute see it.
    let mut chain = inherited_layouts.to_vec();
    if let Some(layout) = &node.layout {
        let ident = ctx.intern(&layout.module.path, "layout");
        match layout.mode {
            LayoutMode::Nested => chain.push(ident),
            LayoutMode::Override => chain = vec![ident],
        }
    }

    let error_ident = match &node.error {
        Some(module) => Some(ctx.intern(&module.path, "error")),
        None => inherited_error.map(str::to_string),
    };

    if node.is_endpoint_leaf() {
        // A leaf inherits the chain resolved at its parent; it cannot carry
        // a layout of its own, so `chain` equals `inherited_layouts` here.
        return Ok(vec![emit(
            node,
            &node.path,
            &chain,
            error_ident.as_deref(),
            ctx,
            registry,
        )?]);
    }

    let mut endpoints = Vec::new();

    if let Some(default) = &node.default {
        endpoints.push(emit(
            node,
            &default.path,
            &chain,
            error_ident.as_deref(),
            ctx,
            registry,
        )?);
    }

    for subroute in &node.subroutes {
        endpoints.extend(compile(
            subroute,
            &chain,
            error_ident.as_deref(),
            ctx,
            registry,
        )?);
    }

    Ok(endpoints)
}

fn emit(
    node: &RouteNode,
    module_path: &Path,
    chain: &[String],
    error_ident: Option<&str>,
    ctx: &mut BuildContext,
    registry: &ModuleRegistry,
) -> Result<Endpoint, BuildError> {
    let pattern = PathPattern::compile(&node.name)?;
    let manifest = registry.manifest_for(module_path)?;
    let module_ident = ctx.intern(module_path, "page");

    if manifest.is_empty() {
        tracing::warn!(
            route = %node.name,
            module = %module_path.display(),
            "expected at least one declared method or a default render"
        );
    }

    // The module's own error capability wins over the nearest __error file.
    let error = if manifest.has_error {
        Some(module_ident.clone())
    } else {
        error_ident.map(str::to_string)
    };

    Ok(Endpoint {
        matcher: pattern.source,
        parameters: pattern.params,
        literal: node.name.clone(),
        layouts: chain.to_vec(),
        methods: manifest.methods,
        has_default: manifest.has_default,
        module: module_ident,
        error,
    })
}
