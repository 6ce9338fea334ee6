//! HTML serializer - `innerHTML` / `outerHTML` for arena nodes
//!
//! Text escapes `& < >`, attribute values escape `& "`. Void elements get no
//! end tag.

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::{NodeId, NodeType};
use crate::utils;

/// Markup of the node's children, concatenated
pub fn inner_html(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let mut output = String::new();
    for &child_id in arena.children(node_id)? {
        serialize_node(arena, child_id, &mut output)?;
    }
    Ok(output)
}

/// Markup of the node itself, children included
pub fn outer_html(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let mut output = String::new();
    serialize_node(arena, node_id, &mut output)?;
    Ok(output)
}

fn serialize_node(arena: &DomArena, node_id: NodeId, output: &mut String) -> Result<()> {
    let node = arena.get(node_id)?;

    match node.node_type {
        NodeType::Element => {
            output.push('<');
            output.push_str(&node.node_name);
            for attr in &node.attributes {
                output.push(' ');
                output.push_str(&attr.name);
                output.push_str("=\"");
                utils::escape_attribute(&attr.value, output);
                output.push('"');
            }
            output.push('>');

            if utils::is_void_element(&node.node_name) {
                return Ok(());
            }

            for &child_id in &node.children_ids {
                serialize_node(arena, child_id, output)?;
            }

            output.push_str("</");
            output.push_str(&node.node_name);
            output.push('>');
        }
        NodeType::Text => utils::escape_text(&node.node_value, output),
        NodeType::Comment => {
            output.push_str("<!--");
            output.push_str(&node.node_value);
            output.push_str("-->");
        }
        NodeType::Document => {
            for &child_id in &node.children_ids {
                serialize_node(arena, child_id, output)?;
            }
        }
    }

    Ok(())
}
