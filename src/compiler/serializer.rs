//! Dispatch-module serialization.
//!
//! # Responsibilities
//! - Render the compiled endpoint list as Rust source: one import item per
//!   distinct module file, then a literal endpoint table
//! - Produce the JSON manifest the runtime dispatcher loads
//!
//! # Design Decisions
//! - Pure text construction; nothing here touches the filesystem
//! - The generated source is valid standalone Rust meant for `include!` in
//!   a host crate; the manifest carries the same information for runtimes
//!   that resolve modules through the registry instead
//! - Output is byte-for-byte deterministic for identical input

use serde::{Deserialize, Serialize};

use crate::compiler::endpoints::{BuildContext, Endpoint, ImportEntry};

/// Everything the runtime dispatcher needs, as persisted JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchManifest {
    /// Identifier → module path table, in first-sight order.
    pub imports: Vec<ImportEntry>,

    /// Compiled endpoints in walk order; dispatch scans them first-match-wins.
    pub endpoints: Vec<Endpoint>,
}

impl DispatchManifest {
    pub fn new(ctx: BuildContext, endpoints: Vec<Endpoint>) -> Self {
        Self {
            imports: ctx.into_imports(),
            endpoints,
        }
    }
}

/// Render the endpoint list as the generated dispatch module's source.
pub fn serialize(endpoints: &[Endpoint], imports: &[ImportEntry]) -> String {
    let mut out = String::new();
    out.push_str("// @generated dispatch module; do not edit.\n");
    out.push_str("//\n");
    out.push_str("// One import per distinct route file, then the endpoint table in\n");
    out.push_str("// first-match-wins order.\n\n");

    for entry in imports {
        out.push_str(&format!(
            "#[path = {}]\nmod {};\n",
            quoted(&entry.path.to_string_lossy()),
            entry.ident
        ));
    }

    out.push_str("\npub fn endpoints() -> Vec<corridor::server::EndpointRecord> {\n");
    out.push_str("    vec![\n");
    for endpoint in endpoints {
        push_record(&mut out, endpoint);
    }
    out.push_str("    ]\n");
    out.push_str("}\n");
    out
}

fn push_record(out: &mut String, endpoint: &Endpoint) {
    out.push_str("        corridor::server::EndpointRecord {\n");
    out.push_str(&format!(
        "            matcher: {},\n",
        quoted(&endpoint.matcher)
    ));
    out.push_str(&format!(
        "            parameters: &[{}],\n",
        endpoint
            .parameters
            .iter()
            .map(|p| quoted(p))
            .collect::<Vec<_>>()
            .join(", ")
    ));
    out.push_str(&format!(
        "            methods: &[{}],\n",
        endpoint
            .methods
            .iter()
            .map(|m| format!("corridor::pages::Method::{m:?}"))
            .collect::<Vec<_>>()
            .join(", ")
    ));
    out.push_str(&format!(
        "            has_default: {},\n",
        endpoint.has_default
    ));
    out.push_str(&format!(
        "            module: &{}::MODULE,\n",
        endpoint.module
    ));
    out.push_str(&format!(
        "            layout: {},\n",
        layout_expr(&endpoint.layouts)
    ));
    out.push_str(&format!(
        "            error: {},\n",
        match &endpoint.error {
            Some(ident) => format!("Some(&{ident}::MODULE)"),
            None => "None".to_string(),
        }
    ));
    out.push_str(&format!(
        "            literal: {},\n",
        quoted(&endpoint.literal)
    ));
    out.push_str("        },\n");
}

/// Compose the layout chain as nested `wrap` calls, outermost first:
/// `[A, B]` becomes `A.wrap(B.wrap(slot))`.
fn layout_expr(layouts: &[String]) -> String {
    let mut expr = String::from("slot");
    for ident in layouts.iter().rev() {
        expr = format!("{ident}::MODULE.wrap({expr})");
    }
    format!("|slot| {expr}")
}

fn quoted(s: &str) -> String {
    format!("{s:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::Method;
    use std::path::PathBuf;

    fn sample() -> (Vec<Endpoint>, Vec<ImportEntry>) {
        let imports = vec![
            ImportEntry {
                ident: "__layout_0".into(),
                path: PathBuf::from("/r/__layout.rs"),
            },
            ImportEntry {
                ident: "__page_1".into(),
                path: PathBuf::from("/r/posts/[slug].rs"),
            },
        ];
        let endpoints = vec![Endpoint {
            matcher: "^/posts/([^/]+)$".into(),
            parameters: vec!["slug".into()],
            literal: "/posts/[slug]".into(),
            layouts: vec!["__layout_0".into()],
            methods: vec![Method::Get],
            has_default: true,
            module: "__page_1".into(),
            error: None,
        }];
        (endpoints, imports)
    }

    #[test]
    fn one_import_item_per_distinct_module() {
        let (endpoints, imports) = sample();
        let source = serialize(&endpoints, &imports);

        assert_eq!(source.matches("#[path = ").count(), 2);
        assert!(source.contains("mod __layout_0;"));
        assert!(source.contains("mod __page_1;"));
    }

    #[test]
    fn record_carries_matcher_and_capabilities() {
        let (endpoints, imports) = sample();
        let source = serialize(&endpoints, &imports);

        assert!(source.contains(r#"matcher: "^/posts/([^/]+)$""#));
        assert!(source.contains(r#"parameters: &["slug"]"#));
        assert!(source.contains("methods: &[corridor::pages::Method::Get]"));
        assert!(source.contains("has_default: true"));
    }

    #[test]
    fn layout_chain_nests_outermost_first() {
        assert_eq!(
            layout_expr(&["__layout_0".into(), "__layout_2".into()]),
            "|slot| __layout_0::MODULE.wrap(__layout_2::MODULE.wrap(slot))"
        );
        assert_eq!(layout_expr(&[]), "|slot| slot");
    }

    #[test]
    fn output_is_deterministic() {
        let (endpoints, imports) = sample();
        assert_eq!(
            serialize(&endpoints, &imports),
            serialize(&endpoints, &imports)
        );
    }

    #[test]
    fn manifest_round_trips_through_json() {
        let (endpoints, imports) = sample();
        let manifest = DispatchManifest {
            imports,
            endpoints,
        };

        let json = serde_json::to_string(&manifest).unwrap();
        let back: DispatchManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.imports.len(), 2);
        assert_eq!(back.endpoints[0].matcher, "^/posts/([^/]+)$");
        assert_eq!(back.endpoints[0].methods, vec![Method::Get]);
    }
}
