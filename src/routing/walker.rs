//! Recursive route-directory walker.
//!
//! # Responsibilities
//! - Scan the routes directory tree with `tokio::fs`
//! - Classify entries by reserved filename (extension-agnostic)
//! - Produce the immutable `RouteNode` tree
//!
//! # Design Decisions
//! - Children are awaited sequentially: sibling order is significant for
//!   first-match-wins dispatch and must survive the walk intact
//! - Entries are sorted (static before dynamic, then by name) so the tree
//!   and everything downstream of it is platform-independent
//! - Any I/O failure aborts the walk; the build caller sees `BuildError`

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use crate::error::BuildError;
use crate::routing::tree::{LayoutMode, LayoutRef, ModuleRef, RouteNode};

/// Reserved entry names, matched against the full filename and against the
/// filename with its final extension stripped.
const RESERVED_INDEX: &str = "index";
const RESERVED_LAYOUT: &str = "__layout";
const RESERVED_LAYOUT_OVERRIDE: &str = "__layout.override";
const RESERVED_ERROR: &str = "__error";

/// Walk a routes directory into a route tree.
///
/// `url_prefix` is the URL path this directory contributes; the build
/// pipeline passes `/` for the root.
pub async fn walk(root: &Path, url_prefix: &str) -> Result<RouteNode, BuildError> {
    walk_dir(root.to_path_buf(), url_prefix.to_string()).await
}

// Async recursion needs an explicitly boxed future.
fn walk_dir(
    dir: PathBuf,
    url_prefix: String,
) -> Pin<Box<dyn Future<Output = Result<RouteNode, BuildError>> + Send>> {
    Box::pin(async move {
        let mut node = RouteNode::directory(url_prefix.clone(), dir.clone());

        let mut entries = Vec::new();
        let mut reader = tokio::fs::read_dir(&dir)
            .await
            .map_err(|source| BuildError::Walk {
                path: dir.clone(),
                source,
            })?;

        loop {
            let entry = reader
                .next_entry()
                .await
                .map_err(|source| BuildError::Walk {
                    path: dir.clone(),
                    source,
                })?;
            let Some(entry) = entry else { break };

            let file_type = entry
                .file_type()
                .await
                .map_err(|source| BuildError::Walk {
                    path: entry.path(),
                    source,
                })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            entries.push((name, entry.path(), file_type.is_dir()));
        }

        // Deterministic sibling order: static names first, then dynamic
        // ones, lexicographic within each group. First-match-wins dispatch
        // reads the endpoint list in exactly this order.
        entries.sort_by(|a, b| {
            (a.0.contains('['), &a.0).cmp(&(b.0.contains('['), &b.0))
        });

        for (name, path, is_dir) in entries {
            if is_dir {
                let child = walk_dir(path, join_url(&url_prefix, &name)).await?;
                node.subroutes.push(child);
                continue;
            }

            match classify(&name) {
                Entry::Index => {
                    node.default = Some(ModuleRef::new(path));
                }
                Entry::Layout(mode) => {
                    node.layout = Some(LayoutRef {
                        module: ModuleRef::new(path),
                        mode,
                    });
                }
                Entry::Error => {
                    node.error = Some(ModuleRef::new(path));
                }
                Entry::Page(base) => {
                    node.subroutes
                        .push(RouteNode::leaf(join_url(&url_prefix, &base), path));
                }
            }
        }

        Ok(node)
    })
}

enum Entry {
    Index,
    Layout(LayoutMode),
    Error,
    Page(String),
}

fn classify(file_name: &str) -> Entry {
    // The full name takes precedence so an extension-less
    // `__layout.override` is not mistaken for `__layout` with an
    // `.override` extension.
    match reserved(file_name).or_else(|| reserved(stem(file_name))) {
        Some(entry) => entry,
        None => Entry::Page(stem(file_name).to_string()),
    }
}

fn reserved(name: &str) -> Option<Entry> {
    match name {
        RESERVED_INDEX => Some(Entry::Index),
        RESERVED_LAYOUT => Some(Entry::Layout(LayoutMode::Nested)),
        RESERVED_LAYOUT_OVERRIDE => Some(Entry::Layout(LayoutMode::Override)),
        RESERVED_ERROR => Some(Entry::Error),
        _ => None,
    }
}

/// Filename with its final extension stripped; hidden-file style names
/// (leading dot only) are left whole.
fn stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(i) if i > 0 => &file_name[..i],
        _ => file_name,
    }
}

fn join_url(prefix: &str, segment: &str) -> String {
    if prefix.ends_with('/') {
        format!("{prefix}{segment}")
    } else {
        format!("{prefix}/{segment}")
    }
}
