//! Runtime dispatch table.
//!
//! # Responsibilities
//! - Load the persisted dispatch manifest and resolve modules through the
//!   registry, or adopt a statically linked endpoint table
//! - Bucket endpoints by HTTP method, preserving compile order
//! - Match incoming paths first-match-wins and run the endpoint's handler,
//!   page render, layout chain, and error rendering
//!
//! # Design Decisions
//! - Buckets are built once at load; per-request work is a linear regex
//!   scan over one bucket plus the handler itself
//! - A page with a `get` handler registers a single GET entry that runs
//!   both steps; it never shadows itself with a second API entry
//! - Handler and render failures become an error rendering with status
//!   400; the scan does not fall through to later endpoints once a path
//!   has matched

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;

use crate::compiler::serializer::DispatchManifest;
use crate::error::ServeError;
use crate::pages::{
    EndpointReply, Method, ModuleManifest, ModuleRegistry, PageError, PageModule, RequestParams,
};
use crate::routing::matcher::PathPattern;
use crate::ui::{render_document, Node};

/// One endpoint of a statically linked dispatch module, as emitted by the
/// generated `dispatch.rs` source.
pub struct EndpointRecord {
    pub matcher: &'static str,
    pub parameters: &'static [&'static str],
    pub methods: &'static [Method],
    pub has_default: bool,
    pub module: &'static dyn PageModule,
    pub layout: fn(Node) -> Node,
    pub error: Option<&'static dyn PageModule>,
    pub literal: &'static str,
}

/// How a matched endpoint serves one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandlerKind {
    /// Run the method handler, serialize the reply body as JSON.
    Api,
    /// Run the `get` handler, then render the page with the reply as props.
    PageWithData,
    /// Render the page with null props.
    PageOnly,
}

enum LayoutChain {
    Modules(Vec<Arc<dyn PageModule>>),
    Static(fn(Node) -> Node),
}

impl LayoutChain {
    /// Apply outermost-first: the chain `[A, B]` yields `A.wrap(B.wrap(slot))`.
    fn apply(&self, slot: Node) -> Node {
        match self {
            LayoutChain::Modules(layouts) => {
                layouts.iter().rev().fold(slot, |node, layout| layout.wrap(node))
            }
            LayoutChain::Static(wrap) => wrap(slot),
        }
    }
}

struct CompiledEndpoint {
    pattern: PathPattern,
    literal: String,
    module: Arc<dyn PageModule>,
    layouts: LayoutChain,
    error: Option<Arc<dyn PageModule>>,
}

struct BucketEntry {
    endpoint: Arc<CompiledEndpoint>,
    kind: HandlerKind,
}

/// The response shape the HTTP layer turns into a real response.
#[derive(Debug, Clone)]
pub struct DispatchResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl DispatchResponse {
    pub fn not_found() -> Self {
        Self {
            status: 404,
            content_type: "text/plain; charset=utf-8",
            headers: Vec::new(),
            body: "404: no route matched".to_string(),
        }
    }
}

/// Method-bucketed endpoint table, immutable once loaded. Dev mode swaps
/// whole tables rather than mutating one.
#[derive(Default)]
pub struct DispatchTable {
    buckets: HashMap<Method, Vec<BucketEntry>>,
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchTable").finish_non_exhaustive()
    }
}

impl DispatchTable {
    /// Build a table from a persisted manifest, resolving every import
    /// identifier through the registry.
    pub fn load(manifest: &DispatchManifest, registry: &ModuleRegistry) -> Result<Self, ServeError> {
        let mut paths: HashMap<&str, &PathBuf> = HashMap::new();
        for entry in &manifest.imports {
            paths.insert(entry.ident.as_str(), &entry.path);
        }

        let resolve = |ident: &str| -> Result<Arc<dyn PageModule>, ServeError> {
            let path = paths.get(ident).ok_or_else(|| ServeError::UnknownImport {
                ident: ident.to_string(),
            })?;
            registry
                .get(path)
                .ok_or_else(|| ServeError::UnresolvedModule {
                    path: path.to_path_buf(),
                })
        };

        let mut table = DispatchTable::default();
        for endpoint in &manifest.endpoints {
            let pattern = recompile(&endpoint.matcher, &endpoint.parameters)?;
            let layouts = endpoint
                .layouts
                .iter()
                .map(|ident| resolve(ident))
                .collect::<Result<Vec<_>, _>>()?;
            let error = match &endpoint.error {
                Some(ident) => Some(resolve(ident)?),
                None => None,
            };

            let compiled = Arc::new(CompiledEndpoint {
                pattern,
                literal: endpoint.literal.clone(),
                module: resolve(&endpoint.module)?,
                layouts: LayoutChain::Modules(layouts),
                error,
            });

            table.bucket(
                compiled,
                endpoint.has_default,
                endpoint.methods.iter().copied(),
            );
        }
        Ok(table)
    }

    /// Read and parse a manifest file, then [`load`](DispatchTable::load) it.
    pub fn load_file(path: &Path, registry: &ModuleRegistry) -> Result<Self, ServeError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ServeError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: DispatchManifest = serde_json::from_str(&contents)?;
        Self::load(&manifest, registry)
    }

    /// Build a table from a statically linked endpoint slice, as produced
    /// by the generated dispatch source.
    pub fn from_records(records: &[EndpointRecord]) -> Result<Self, ServeError> {
        let mut table = DispatchTable::default();
        for record in records {
            let pattern = recompile(record.matcher, record.parameters)?;
            let compiled = Arc::new(CompiledEndpoint {
                pattern,
                literal: record.literal.to_string(),
                module: Arc::new(StaticModule(record.module)),
                layouts: LayoutChain::Static(record.layout),
                error: record
                    .error
                    .map(|m| Arc::new(StaticModule(m)) as Arc<dyn PageModule>),
            });
            table.bucket(compiled, record.has_default, record.methods.iter().copied());
        }
        Ok(table)
    }

    /// Insert one endpoint into the buckets its capabilities call for.
    fn bucket(
        &mut self,
        endpoint: Arc<CompiledEndpoint>,
        has_default: bool,
        methods: impl Iterator<Item = Method>,
    ) {
        let mut get_taken = false;
        if has_default {
            // The page owns GET: with a get handler it serves data-backed
            // renders, without one it renders null props.
            let manifest = endpoint.module.manifest();
            let kind = if manifest.methods.contains(&Method::Get) {
                HandlerKind::PageWithData
            } else {
                HandlerKind::PageOnly
            };
            self.push(Method::Get, endpoint.clone(), kind);
            get_taken = true;
        }

        for method in methods {
            if method == Method::Get && get_taken {
                continue;
            }
            self.push(method, endpoint.clone(), HandlerKind::Api);
        }
    }

    fn push(&mut self, method: Method, endpoint: Arc<CompiledEndpoint>, kind: HandlerKind) {
        self.buckets
            .entry(method)
            .or_default()
            .push(BucketEntry { endpoint, kind });
    }

    /// Serve one request: scan the method's bucket in order and run the
    /// first endpoint whose matcher accepts the path.
    pub fn dispatch(
        &self,
        method: Method,
        path: &str,
        headers: HashMap<String, String>,
        query: HashMap<String, String>,
    ) -> DispatchResponse {
        let Some(bucket) = self.buckets.get(&method) else {
            return DispatchResponse::not_found();
        };

        for entry in bucket {
            let Some(params) = entry.endpoint.pattern.captures(path) else {
                continue;
            };

            let request = RequestParams {
                params,
                headers,
                path: path.to_string(),
                query,
            };

            return match run(entry, method, &request) {
                Ok(response) => response,
                Err(err) => {
                    tracing::error!(
                        route = %entry.endpoint.literal,
                        %method,
                        error = %err,
                        "endpoint failed, serving error rendering"
                    );
                    render_error(&entry.endpoint, &err)
                }
            };
        }

        DispatchResponse::not_found()
    }
}

fn run(
    entry: &BucketEntry,
    method: Method,
    request: &RequestParams,
) -> Result<DispatchResponse, PageError> {
    let endpoint = &entry.endpoint;
    match entry.kind {
        HandlerKind::Api => {
            let reply = endpoint.module.handle(method, request)?;
            Ok(api_response(reply)?)
        }
        HandlerKind::PageWithData => {
            let reply = endpoint.module.handle(Method::Get, request)?;
            let node = endpoint.module.render(&reply.body)?;
            Ok(page_response(
                endpoint,
                node,
                reply.status.unwrap_or(200),
                reply.headers,
            ))
        }
        HandlerKind::PageOnly => {
            let node = endpoint.module.render(&serde_json::Value::Null)?;
            Ok(page_response(endpoint, node, 200, Vec::new()))
        }
    }
}

fn api_response(reply: EndpointReply) -> Result<DispatchResponse, PageError> {
    let body = serde_json::to_string(&reply.body)
        .map_err(|err| PageError::msg(format!("reply serialization failed: {err}")))?;
    Ok(DispatchResponse {
        status: reply.status.unwrap_or(200),
        content_type: "application/json",
        headers: reply.headers,
        body,
    })
}

fn page_response(
    endpoint: &CompiledEndpoint,
    node: Node,
    status: u16,
    headers: Vec<(String, String)>,
) -> DispatchResponse {
    let wrapped = endpoint.layouts.apply(node);
    DispatchResponse {
        status,
        content_type: "text/html; charset=utf-8",
        headers,
        body: render_document(&wrapped),
    }
}

fn render_error(endpoint: &CompiledEndpoint, err: &PageError) -> DispatchResponse {
    // Error pages render standalone, outside the layout chain.
    let node = match &endpoint.error {
        Some(module) => module.render_error(err),
        None => Node::paragraph(format!("Error: {err}")),
    };
    DispatchResponse {
        status: 400,
        content_type: "text/html; charset=utf-8",
        headers: Vec::new(),
        body: render_document(&node),
    }
}

fn recompile<S: AsRef<str>>(matcher: &str, parameters: &[S]) -> Result<PathPattern, ServeError> {
    let regex = Regex::new(matcher).map_err(|source| ServeError::Pattern {
        matcher: matcher.to_string(),
        source,
    })?;
    Ok(PathPattern {
        regex,
        source: matcher.to_string(),
        params: parameters.iter().map(|p| p.as_ref().to_string()).collect(),
    })
}

/// Adapter letting `&'static dyn PageModule` references from generated code
/// live in the `Arc`-based table.
struct StaticModule(&'static dyn PageModule);

impl PageModule for StaticModule {
    fn manifest(&self) -> ModuleManifest {
        self.0.manifest()
    }

    fn handle(&self, method: Method, params: &RequestParams) -> Result<EndpointReply, PageError> {
        self.0.handle(method, params)
    }

    fn render(&self, props: &serde_json::Value) -> Result<Node, PageError> {
        self.0.render(props)
    }

    fn wrap(&self, slot: Node) -> Node {
        self.0.wrap(slot)
    }

    fn render_error(&self, error: &PageError) -> Node {
        self.0.render_error(error)
    }
}
