//! Chainable element collections over a document tree
//!
//! ```
//! use negative::{select, Collection};
//! use negative::dom::Document;
//!
//! let doc = Document::from_json_str(r#"{"root": [{"tag": "ul", "attributes": {"id": "menu"}}]}"#)?;
//! let menu: Collection = select(&doc, "#menu")?.one().unwrap();
//! menu.append_element("<li>", [("class", "item")]).write_text("Home");
//! assert_eq!(menu.html_content(), "<li class=\"item\">Home</li>");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod collection;
pub mod error;
pub mod factory;
pub mod host;
pub mod input;
pub mod ready;
#[cfg(feature = "web")]
pub mod web;

#[cfg(test)]
mod testing;

pub use collection::ElementCollection;
pub use error::{Error, Result};
pub use factory::{select, Query, Selected};
pub use host::{Host, Listener};
pub use input::{ClassNames, Entry, SelectorInput};
pub use negative_dom as dom;
pub use ready::dom_ready;

/// Collection over the in-memory [`dom::Document`]
pub type Collection = ElementCollection<negative_dom::Document>;
