//! Page module contract.
//!
//! # Data Flow
//! ```text
//! host application
//!     → implements PageModule per route file
//!     → registers each under its file path (registry.rs)
//!
//! build phase:
//!     compiler reads ModuleManifest (explicit capability declaration)
//!
//! serve phase:
//!     dispatcher invokes handle() / render() / wrap() / render_error()
//! ```
//!
//! # Design Decisions
//! - Capabilities are declared through an explicit manifest, not discovered
//!   by reflecting over exports; the compiler only ever reads the manifest
//! - Handlers are synchronous and return `Result`; the dispatcher converts
//!   every `Err` into the route's error rendering, never a crash
//! - Trait objects (`Arc<dyn PageModule>`) keep the registry homogeneous

pub mod registry;

pub use registry::ModuleRegistry;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ui::Node;

/// HTTP methods a page module can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
}

impl Method {
    /// All recognized methods, used when partitioning manifest entries.
    pub const ALL: [Method; 9] = [
        Method::Get,
        Method::Head,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Connect,
        Method::Options,
        Method::Trace,
        Method::Patch,
    ];

    /// Parse a method token, case-insensitively. Unknown tokens yield `None`.
    pub fn parse(token: &str) -> Option<Method> {
        match token.to_ascii_uppercase().as_str() {
            "GET" => Some(Method::Get),
            "HEAD" => Some(Method::Head),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "DELETE" => Some(Method::Delete),
            "CONNECT" => Some(Method::Connect),
            "OPTIONS" => Some(Method::Options),
            "TRACE" => Some(Method::Trace),
            "PATCH" => Some(Method::Patch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Connect => "CONNECT",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability declaration for one page module.
///
/// This replaces export reflection: the compiler partitions capabilities
/// into the method set, the default render flag, and the error render flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleManifest {
    /// HTTP methods this module handles.
    pub methods: Vec<Method>,

    /// Whether the module has a default page-render function.
    pub has_default: bool,

    /// Whether the module has its own error renderer.
    pub has_error: bool,
}

impl ModuleManifest {
    /// A module that only serves data for the given methods.
    pub fn api(methods: &[Method]) -> Self {
        Self {
            methods: methods.to_vec(),
            has_default: false,
            has_error: false,
        }
    }

    /// A module that only renders a page.
    pub fn page() -> Self {
        Self {
            methods: Vec::new(),
            has_default: true,
            has_error: false,
        }
    }

    /// A page that fetches its props through `get`.
    pub fn page_with_data() -> Self {
        Self {
            methods: vec![Method::Get],
            has_default: true,
            has_error: false,
        }
    }

    pub fn with_error(mut self) -> Self {
        self.has_error = true;
        self
    }

    /// True when the module declares neither a method nor a default render.
    /// Compiled anyway, but flagged as a configuration-hygiene warning.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty() && !self.has_default
    }
}

/// The parameter bundle handed to method handlers.
///
/// Merges the named path captures with request headers and the parsed URL.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    /// Named path parameters, zipped from the matcher's capture groups.
    pub params: HashMap<String, String>,

    /// Request headers (lossy for non-UTF-8 values).
    pub headers: HashMap<String, String>,

    /// The request path as matched.
    pub path: String,

    /// Decoded query pairs, empty when the URL carries no query string.
    pub query: HashMap<String, String>,
}

impl RequestParams {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// What a method handler returns.
#[derive(Debug, Clone, Default)]
pub struct EndpointReply {
    /// Response status; `None` means 200.
    pub status: Option<u16>,

    /// Extra response headers, appended after Content-Type.
    pub headers: Vec<(String, String)>,

    /// Payload. Serialized as JSON for API endpoints; passed to the page's
    /// render function as props for page endpoints.
    pub body: serde_json::Value,
}

impl EndpointReply {
    pub fn json(body: serde_json::Value) -> Self {
        Self {
            status: None,
            headers: Vec::new(),
            body,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Failures surfaced by handlers and render functions.
///
/// Always caught by the dispatcher and converted to an error rendering;
/// never propagates out of a request.
#[derive(Debug, Clone, Error)]
pub enum PageError {
    /// The module was invoked for a method its manifest does not declare.
    #[error("method {0} not handled by this module")]
    Unsupported(Method),

    /// The handler or render function failed.
    #[error("{0}")]
    Failed(String),
}

impl PageError {
    pub fn msg(message: impl Into<String>) -> Self {
        PageError::Failed(message.into())
    }
}

/// The contract every route file's module implements.
///
/// Only the capabilities declared in [`manifest`](PageModule::manifest) are
/// ever invoked; the default bodies exist so a module implements exactly
/// what it declares.
pub trait PageModule: Send + Sync {
    /// Declared capabilities; read once at build time by the compiler.
    fn manifest(&self) -> ModuleManifest;

    /// Method handler for every declared method.
    fn handle(&self, method: Method, params: &RequestParams) -> Result<EndpointReply, PageError> {
        let _ = params;
        Err(PageError::Unsupported(method))
    }

    /// Default page render. Props are the `get` handler's body for pages
    /// with data, `Value::Null` otherwise.
    fn render(&self, props: &serde_json::Value) -> Result<Node, PageError> {
        let _ = props;
        Ok(Node::text(""))
    }

    /// Layout composition: wrap the already-rendered slot. Only meaningful
    /// for `__layout` modules.
    fn wrap(&self, slot: Node) -> Node {
        slot
    }

    /// Error rendering for this module (page-local `error` capability) or
    /// for a `__error` module covering a directory.
    fn render_error(&self, error: &PageError) -> Node {
        Node::paragraph(format!("Error: {error}"))
    }
}
