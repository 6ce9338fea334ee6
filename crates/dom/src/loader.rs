//! Tree import from a JSON description
//!
//! Input format:
//! ```json
//! {
//!   "root": [
//!     {
//!       "tag": "ul",
//!       "attributes": { "id": "menu" },
//!       "children": [
//!         { "tag": "li", "children": ["A"] },
//!         { "comment": "separator" },
//!         { "tag": "li", "children": [{ "text": "B" }] }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! `root` may also be a single node object. Attribute order follows the
//! JSON object's key order as `serde_json` yields it.

use serde_json::{Map, Value};

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::NodeId;

/// Append every node described under `root` to the arena's document root
pub fn load_tree(arena: &mut DomArena, description: &Value) -> Result<()> {
    let root = description
        .get("root")
        .ok_or_else(|| DomError::Parse("Missing 'root' in tree description".to_string()))?;

    let parent = arena.root_id();
    match root {
        Value::Array(nodes) => {
            for node in nodes {
                load_node(arena, node, parent)?;
            }
        }
        node => {
            load_node(arena, node, parent)?;
        }
    }
    Ok(())
}

/// Recursively build a node and append it to `parent`
fn load_node(arena: &mut DomArena, value: &Value, parent: NodeId) -> Result<NodeId> {
    let node_id = match value {
        Value::String(text) => arena.create_text(text),
        Value::Object(fields) => {
            let kinds = ["tag", "text", "comment"]
                .into_iter()
                .filter(|kind| fields.contains_key(*kind))
                .collect::<Vec<_>>();
            if kinds.len() > 1 {
                return Err(DomError::Parse(format!(
                    "Node mixes '{}' keys; pick one of tag, text or comment",
                    kinds.join("', '")
                )));
            }

            if let Some(text) = fields.get("text") {
                arena.create_text(expect_str(text, "text")?)
            } else if let Some(data) = fields.get("comment") {
                arena.create_comment(expect_str(data, "comment")?)
            } else {
                return load_element(arena, fields, parent);
            }
        }
        other => {
            return Err(DomError::Parse(format!(
                "Unexpected value in tree description: {other}"
            )))
        }
    };

    arena.append_child(parent, node_id)?;
    Ok(node_id)
}

fn load_element(arena: &mut DomArena, fields: &Map<String, Value>, parent: NodeId) -> Result<NodeId> {
    let tag = fields
        .get("tag")
        .ok_or_else(|| DomError::Parse("Missing 'tag' on element".to_string()))?;
    let node_id = arena.create_element(expect_str(tag, "tag")?)?;

    if let Some(attributes) = fields.get("attributes") {
        let attributes = attributes
            .as_object()
            .ok_or_else(|| DomError::Parse("'attributes' must be an object".to_string()))?;
        for (name, value) in attributes {
            arena.set_attribute(node_id, name, expect_str(value, name)?)?;
        }
    }

    arena.append_child(parent, node_id)?;

    if let Some(children) = fields.get("children") {
        let children = children
            .as_array()
            .ok_or_else(|| DomError::Parse("'children' must be an array".to_string()))?;
        for child in children {
            load_node(arena, child, node_id)?;
        }
    }

    Ok(node_id)
}

fn expect_str<'v>(value: &'v Value, field: &str) -> Result<&'v str> {
    value
        .as_str()
        .ok_or_else(|| DomError::Parse(format!("'{field}' must be a string")))
}
