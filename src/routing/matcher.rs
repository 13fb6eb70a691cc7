//! Page-name to matcher compilation.
//!
//! # Responsibilities
//! - Translate a path template (`/users/[id]`) into an anchored regex
//! - Record parameter names positionally, one per capture group
//!
//! # Design Decisions
//! - A dynamic segment is a bracketed word token; it compiles to `([^/]+)`
//!   so a parameter never spans a `/`
//! - Every dynamic segment in the template is captured, not just the first
//! - Literal text is regex-escaped and the whole pattern anchored `^…$`;
//!   no implicit case-insensitivity
//! - Malformed bracket tokens (empty or non-word content, unclosed `[`)
//!   are treated as literal text rather than rejected

use std::collections::HashMap;

use regex::Regex;

use crate::error::BuildError;

/// A compiled path matcher with its positional parameter names.
#[derive(Debug, Clone)]
pub struct PathPattern {
    /// Compiled regex, anchored at both ends.
    pub regex: Regex,

    /// The regex source, persisted into the dispatch module.
    pub source: String,

    /// Parameter names in capture-group order.
    pub params: Vec<String>,
}

impl PathPattern {
    /// Compile a path template into a matcher.
    pub fn compile(route_path: &str) -> Result<PathPattern, BuildError> {
        let mut source = String::from("^");
        let mut params = Vec::new();
        let mut rest = route_path;

        while let Some(open) = rest.find('[') {
            let (literal, bracketed) = rest.split_at(open);

            match bracketed[1..].find(']') {
                Some(close) => {
                    let inner = &bracketed[1..1 + close];
                    if !inner.is_empty() && inner.chars().all(is_word) {
                        source.push_str(&regex::escape(literal));
                        source.push_str("([^/]+)");
                        params.push(inner.to_string());
                        rest = &bracketed[close + 2..];
                    } else {
                        // Not a parameter token; consume through the `[`
                        // as literal text and keep scanning.
                        source.push_str(&regex::escape(&rest[..open + 1]));
                        rest = &bracketed[1..];
                    }
                }
                None => {
                    source.push_str(&regex::escape(rest));
                    rest = "";
                }
            }
        }
        source.push_str(&regex::escape(rest));
        source.push('$');

        let regex = Regex::new(&source).map_err(|err| BuildError::Pattern {
            literal: route_path.to_string(),
            source: err,
        })?;

        Ok(PathPattern {
            regex,
            source,
            params,
        })
    }

    /// Match a request path; on success, zip the positional captures with
    /// the parameter names.
    pub fn captures(&self, path: &str) -> Option<HashMap<String, String>> {
        let caps = self.regex.captures(path)?;

        let mut named = HashMap::with_capacity(self.params.len());
        for (i, name) in self.params.iter().enumerate() {
            let value = caps.get(i + 1)?.as_str().to_string();
            named.insert(name.clone(), value);
        }
        Some(named)
    }
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
