//! Shared fixtures: a sample site on disk plus its registered page modules.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use corridor::{
    EndpointReply, Method, ModuleManifest, ModuleRegistry, Node, PageError, PageModule,
    RequestParams, SiteConfig,
};

/// Home page: fetches its props through `get`, then renders them.
pub struct Home;

impl PageModule for Home {
    fn manifest(&self) -> ModuleManifest {
        ModuleManifest::page_with_data()
    }

    fn handle(&self, _: Method, _: &RequestParams) -> Result<EndpointReply, PageError> {
        Ok(EndpointReply::json(json!({ "title": "welcome home" })))
    }

    fn render(&self, props: &serde_json::Value) -> Result<Node, PageError> {
        Ok(Node::paragraph(
            props["title"].as_str().unwrap_or("untitled").to_string(),
        ))
    }
}

/// Static page without a data handler.
pub struct About;

impl PageModule for About {
    fn manifest(&self) -> ModuleManifest {
        ModuleManifest::page()
    }

    fn render(&self, _: &serde_json::Value) -> Result<Node, PageError> {
        Ok(Node::paragraph("about page"))
    }
}

/// JSON collection endpoint.
pub struct UsersIndex;

impl PageModule for UsersIndex {
    fn manifest(&self) -> ModuleManifest {
        ModuleManifest::api(&[Method::Get])
    }

    fn handle(&self, _: Method, _: &RequestParams) -> Result<EndpointReply, PageError> {
        Ok(EndpointReply::json(json!({ "users": ["ada", "grace"] })))
    }
}

/// Parameterized JSON endpoint.
pub struct UserById;

impl PageModule for UserById {
    fn manifest(&self) -> ModuleManifest {
        ModuleManifest::api(&[Method::Get, Method::Post])
    }

    fn handle(&self, method: Method, params: &RequestParams) -> Result<EndpointReply, PageError> {
        Ok(EndpointReply::json(json!({
            "method": method.as_str(),
            "id": params.param("id"),
        })))
    }
}

/// Static sibling that must win over `[id]` for its exact path.
pub struct Profile;

impl PageModule for Profile {
    fn manifest(&self) -> ModuleManifest {
        ModuleManifest::api(&[Method::Get])
    }

    fn handle(&self, _: Method, _: &RequestParams) -> Result<EndpointReply, PageError> {
        Ok(EndpointReply::json(json!({ "fixed": "profile" })))
    }
}

/// Always-failing endpoint for error-path coverage.
pub struct Fragile;

impl PageModule for Fragile {
    fn manifest(&self) -> ModuleManifest {
        ModuleManifest::api(&[Method::Get])
    }

    fn handle(&self, _: Method, _: &RequestParams) -> Result<EndpointReply, PageError> {
        Err(PageError::msg("backing store unavailable"))
    }
}

/// Root layout, marks its wrapping in the output.
pub struct Shell;

impl PageModule for Shell {
    fn manifest(&self) -> ModuleManifest {
        ModuleManifest::default()
    }

    fn wrap(&self, slot: Node) -> Node {
        Node::container(vec![Node::text("site shell"), slot])
    }
}

/// Override layout for the admin subtree.
pub struct AdminShell;

impl PageModule for AdminShell {
    fn manifest(&self) -> ModuleManifest {
        ModuleManifest::default()
    }

    fn wrap(&self, slot: Node) -> Node {
        Node::container(vec![Node::text("admin shell"), slot])
    }
}

/// Admin page inside the override layout.
pub struct AdminPanel;

impl PageModule for AdminPanel {
    fn manifest(&self) -> ModuleManifest {
        ModuleManifest::page()
    }

    fn render(&self, _: &serde_json::Value) -> Result<Node, PageError> {
        Ok(Node::paragraph("panel"))
    }
}

/// Directory-level error boundary.
pub struct Boundary;

impl PageModule for Boundary {
    fn manifest(&self) -> ModuleManifest {
        ModuleManifest::default()
    }

    fn render_error(&self, error: &PageError) -> Node {
        Node::paragraph(format!("boundary: {error}"))
    }
}

/// A sample site on disk plus the registry covering every route file.
pub struct Site {
    pub dir: TempDir,
    pub config: SiteConfig,
    pub registry: ModuleRegistry,
}

/// Lay out the fixture tree:
///
/// ```text
/// routes/
///   __error.rs   __layout.rs   about.rs   fragile.rs   index.rs
///   admin/   __layout.override.rs   panel.rs
///   users/   index.rs   profile.rs   [id].rs
/// ```
pub fn sample_site() -> Site {
    let dir = TempDir::new().expect("tempdir");
    let routes = dir.path().join("routes");

    for sub in ["admin", "users"] {
        fs::create_dir_all(routes.join(sub)).expect("mkdir");
    }
    for file in [
        "__error.rs",
        "__layout.rs",
        "about.rs",
        "fragile.rs",
        "index.rs",
        "admin/__layout.override.rs",
        "admin/panel.rs",
        "users/index.rs",
        "users/profile.rs",
        "users/[id].rs",
    ] {
        touch(&routes.join(file));
    }

    let registry = ModuleRegistry::new()
        .with(routes.join("__error.rs"), Arc::new(Boundary))
        .with(routes.join("__layout.rs"), Arc::new(Shell))
        .with(routes.join("about.rs"), Arc::new(About))
        .with(routes.join("fragile.rs"), Arc::new(Fragile))
        .with(routes.join("index.rs"), Arc::new(Home))
        .with(routes.join("admin/__layout.override.rs"), Arc::new(AdminShell))
        .with(routes.join("admin/panel.rs"), Arc::new(AdminPanel))
        .with(routes.join("users/index.rs"), Arc::new(UsersIndex))
        .with(routes.join("users/profile.rs"), Arc::new(Profile))
        .with(routes.join("users/[id].rs"), Arc::new(UserById));

    let mut config = SiteConfig::default();
    config.build.routes_dir = routes;
    config.build.output_dir = dir.path().join("build");
    config.server.bind_address = "127.0.0.1:0".to_string();

    Site {
        dir,
        config,
        registry,
    }
}

fn touch(path: &Path) {
    fs::write(path, b"").expect("touch route file");
}
