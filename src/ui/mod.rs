//! Renderable node tree consumed at the dispatch boundary.
//!
//! # Responsibilities
//! - Represent page output as a closed set of node variants
//! - Emit HTML for a node tree through a single rendering function
//! - Scope per-node styles via an explicit rendering context
//!
//! # Design Decisions
//! - Closed enum dispatched by pattern matching, no subclassing
//! - Node ids are assigned by the context during emission, not stored as
//!   hidden per-node identity
//! - Styles collected by the context and emitted once in the document head
//! - Text content is escaped at emission; markup comes only from the node
//!   structure, never from handler-supplied strings

/// One renderable node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Raw text, emitted as-is.
    Text(String),

    /// A paragraph with optional scoped style.
    Paragraph { text: String, style: Option<String> },

    /// A sequence of sibling nodes emitted in order.
    List(Vec<Node>),

    /// A div container with optional scoped style.
    Container {
        children: Vec<Node>,
        style: Option<String>,
    },
}

impl Node {
    pub fn text(text: impl Into<String>) -> Node {
        Node::Text(text.into())
    }

    pub fn paragraph(text: impl Into<String>) -> Node {
        Node::Paragraph {
            text: text.into(),
            style: None,
        }
    }

    pub fn styled_paragraph(text: impl Into<String>, style: impl Into<String>) -> Node {
        Node::Paragraph {
            text: text.into(),
            style: Some(style.into()),
        }
    }

    pub fn list(items: Vec<Node>) -> Node {
        Node::List(items)
    }

    pub fn container(children: Vec<Node>) -> Node {
        Node::Container {
            children,
            style: None,
        }
    }

    pub fn styled_container(children: Vec<Node>, style: impl Into<String>) -> Node {
        Node::Container {
            children,
            style: Some(style.into()),
        }
    }
}

/// Rendering state threaded explicitly through emission.
#[derive(Debug, Default)]
pub struct RenderContext {
    styles: Vec<String>,
    next_id: usize,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next node id and, if a style is present, rewrite its
    /// selectors into the id's scope and collect it for the document head.
    fn scope(&mut self, style: Option<&str>) -> String {
        let id = format!("n{}", self.next_id);
        self.next_id += 1;

        if let Some(style) = style {
            if !style.is_empty() {
                self.styles.push(format!("#{id} {{ {style} }}"));
            }
        }
        id
    }
}

/// Emit one node tree as an HTML fragment.
pub fn emit(node: &Node, ctx: &mut RenderContext) -> String {
    match node {
        Node::Text(text) => escape_text(text),
        Node::Paragraph { text, style } => {
            let id = ctx.scope(style.as_deref());
            format!("<p id=\"{id}\">{}</p>", escape_text(text))
        }
        Node::List(items) => items
            .iter()
            .map(|item| emit(item, ctx))
            .collect::<Vec<_>>()
            .join(" "),
        Node::Container { children, style } => {
            let id = ctx.scope(style.as_deref());
            let body = children
                .iter()
                .map(|child| emit(child, ctx))
                .collect::<Vec<_>>()
                .join(" ");
            format!("<div id=\"{id}\">{body}</div>")
        }
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Emit a full HTML document: body from the node tree, collected styles in
/// the head.
pub fn render_document(root: &Node) -> String {
    let mut ctx = RenderContext::new();
    let body = emit(root, &mut ctx);
    let styles = ctx.styles.join("\n");

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<style>\n{styles}\n</style>\n</head>\n<body>\n{body}\n</body>\n</html>"
    )
}
