//! Route discovery subsystem.
//!
//! # Data Flow
//! ```text
//! routes directory on disk
//!     → walker.rs (recursive scan, reserved-name classification)
//!     → tree.rs (RouteNode tree, immutable once built)
//!     → compiler subsystem (endpoint emission)
//!
//! Page names:
//!     "/users/[id]"
//!     → matcher.rs (regex compilation + parameter names)
//! ```
//!
//! # Design Decisions
//! - The walker is pure structure discovery; capability lookup happens
//!   later, centrally, in the compiler
//! - Directory entries are sorted deterministically (static names before
//!   dynamic ones, then lexicographic) so first-match-wins dispatch does
//!   not depend on platform enumeration order
//! - Any unreadable entry fails the whole walk; no best-effort trees

pub mod matcher;
pub mod tree;
pub mod walker;

pub use matcher::PathPattern;
pub use tree::{LayoutMode, LayoutRef, ModuleRef, RouteNode};
pub use walker::walk;
