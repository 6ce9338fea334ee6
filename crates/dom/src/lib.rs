//! In-memory document tree
//!
//! A small, arena-backed HTML tree that provides the primitives a DOM
//! wrapper needs: selector queries, attribute / class / style access, node
//! creation and removal, markup serialization, event listeners and the
//! document load signal.
//!
//! ```text
//! JSON description → DomArena (owned) → Document (Rc handle) → queries / mutations
//!                        ↓
//!                  NodeId (u32)
//! ```

pub mod arena;
pub mod document;
pub mod error;
pub mod loader;
pub mod selector;
pub mod serializer;
pub mod types;
pub mod utils;

pub use arena::DomArena;
pub use document::{Document, DocumentConfig, DomEvent, EventListener};
pub use error::{DomError, Result};
pub use selector::SelectorList;
pub use types::*;
