//! Build pipeline.
//!
//! # Data Flow
//! ```text
//! routes directory
//!     → routing::walk (RouteNode tree)
//!     → endpoints::compile (flat Endpoint list + import table)
//!     → serializer (dispatch source text + DispatchManifest)
//!     → output directory (routes.json, dispatch.rs, endpoints.json)
//! ```
//!
//! # Design Decisions
//! - Artifacts are written only after every stage has succeeded, staged
//!   under temporary names and renamed into place, so a failed build or a
//!   failed write never leaves a fresh artifact beside a stale one
//! - The route-tree snapshot is diagnostic output, not a runtime input

pub mod endpoints;
pub mod serializer;

pub use endpoints::{BuildContext, Endpoint, ImportEntry};
pub use serializer::{serialize, DispatchManifest};

use std::path::Path;
use std::time::Instant;

use crate::config::SiteConfig;
use crate::error::BuildError;
use crate::pages::ModuleRegistry;
use crate::routing::{self, RouteNode};

/// Diagnostic snapshot of the walked route tree.
pub const SNAPSHOT_FILE: &str = "routes.json";

/// Generated dispatch module source, for `include!` in a host crate.
pub const DISPATCH_SOURCE_FILE: &str = "dispatch.rs";

/// JSON manifest loaded by the runtime dispatcher.
pub const MANIFEST_FILE: &str = "endpoints.json";

/// Everything one build invocation produced, before and after persistence.
#[derive(Debug)]
pub struct BuildArtifacts {
    pub tree: RouteNode,
    pub manifest: DispatchManifest,
    pub dispatch_source: String,
}

/// Run the full build: walk, compile, serialize, persist.
pub async fn run_build(
    config: &SiteConfig,
    registry: &ModuleRegistry,
) -> Result<BuildArtifacts, BuildError> {
    let started = Instant::now();

    let tree = routing::walk(&config.build.routes_dir, "/").await?;

    let mut ctx = BuildContext::new();
    let compiled = endpoints::compile(&tree, &[], None, &mut ctx, registry)?;

    let imports = ctx.into_imports();
    let dispatch_source = serializer::serialize(&compiled, &imports);
    let manifest = DispatchManifest {
        imports,
        endpoints: compiled,
    };

    persist(&config.build.output_dir, &tree, &manifest, &dispatch_source).await?;

    tracing::info!(
        endpoints = manifest.endpoints.len(),
        modules = manifest.imports.len(),
        output = %config.build.output_dir.display(),
        duration_ms = started.elapsed().as_millis() as u64,
        "build complete"
    );

    Ok(BuildArtifacts {
        tree,
        manifest,
        dispatch_source,
    })
}

async fn persist(
    output_dir: &Path,
    tree: &RouteNode,
    manifest: &DispatchManifest,
    dispatch_source: &str,
) -> Result<(), BuildError> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|source| BuildError::Artifact {
            path: output_dir.to_path_buf(),
            source,
        })?;

    let snapshot = serde_json::to_string_pretty(tree)?;
    let manifest_json = serde_json::to_string_pretty(manifest)?;

    // Stage every artifact before renaming any of them; a write failure
    // leaves the previous build's files untouched.
    let artifacts = [
        (SNAPSHOT_FILE, snapshot.as_str()),
        (DISPATCH_SOURCE_FILE, dispatch_source),
        (MANIFEST_FILE, manifest_json.as_str()),
    ];
    for (name, contents) in &artifacts {
        write_artifact(&output_dir.join(format!("{name}.tmp")), contents).await?;
    }
    for (name, _) in &artifacts {
        let path = output_dir.join(name);
        tokio::fs::rename(output_dir.join(format!("{name}.tmp")), &path)
            .await
            .map_err(|source| BuildError::Artifact { path, source })?;
    }
    Ok(())
}

async fn write_artifact(path: &Path, contents: &str) -> Result<(), BuildError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| BuildError::Artifact {
            path: path.to_path_buf(),
            source,
        })
}
