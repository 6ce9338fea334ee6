//! Arena-based DOM tree storage
//!
//! All nodes live in one `Vec<DomNode>` and refer to each other by
//! [`NodeId`]. Node 0 is always the document root. Detached nodes stay in the
//! arena with `parent_id == None`, so a handle never dangles. Nothing is
//! ever freed either: replaced text and removed subtrees keep their slots
//! until the arena is dropped, which suits short-lived fixture documents.
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [#document][html][body][#text]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```

use crate::error::{DomError, Result};
use crate::selector::SelectorList;
use crate::types::{DomNode, NodeId, NodeType};
use crate::utils;

const DEFAULT_CAPACITY: usize = 256;

/// Arena allocator for DOM nodes
#[derive(Debug, Clone)]
pub struct DomArena {
    nodes: Vec<DomNode>,
    root_id: NodeId,
}

/// Where a child lands inside its new parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    First,
    Last,
    Before(NodeId),
}

impl DomArena {
    /// Create an arena holding only the document root
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(DomNode::new(0, NodeType::Document, "#document".to_string()));
        Self { nodes, root_id: 0 }
    }

    fn add_node(&mut self, mut node: DomNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        node.node_id = node_id;
        self.nodes.push(node);
        node_id
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    fn element(&self, node_id: NodeId) -> Result<&DomNode> {
        let node = self.get(node_id)?;
        if node.is_element() {
            Ok(node)
        } else {
            Err(DomError::InvalidNodeType {
                expected: NodeType::Element.as_str().to_string(),
                actual: node.node_type.as_str().to_string(),
            })
        }
    }

    fn element_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.element(node_id)?;
        self.get_mut(node_id)
    }

    /// Get the document root ID
    pub fn root_id(&self) -> NodeId {
        self.root_id
    }

    /// Total number of allocated nodes, detached ones and the root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing but the document root has been allocated
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterator over all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| i as NodeId)
    }

    /// Create a detached element; the tag is validated and lowercased
    pub fn create_element(&mut self, tag: &str) -> Result<NodeId> {
        if !utils::is_valid_name(tag) {
            return Err(DomError::InvalidCharacter(tag.to_string()));
        }
        let node = DomNode::new(0, NodeType::Element, tag.to_ascii_lowercase());
        Ok(self.add_node(node))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        let mut node = DomNode::new(0, NodeType::Text, "#text".to_string());
        node.node_value = text.to_string();
        self.add_node(node)
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, data: &str) -> NodeId {
        let mut node = DomNode::new(0, NodeType::Comment, "#comment".to_string());
        node.node_value = data.to_string();
        self.add_node(node)
    }

    /// Get parent of a node
    pub fn parent(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(node_id)?.parent_id)
    }

    /// Parent, but only when it is an element (the document root is skipped)
    pub fn parent_element(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        match self.parent(node_id)? {
            Some(parent) if self.get(parent)?.is_element() => Ok(Some(parent)),
            _ => Ok(None),
        }
    }

    /// Get children of a node
    pub fn children(&self, node_id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.get(node_id)?.children_ids)
    }

    /// Whether `node_id` sits somewhere below `ancestor`
    pub fn is_descendant_of(&self, node_id: NodeId, ancestor: NodeId) -> Result<bool> {
        let mut cursor = self.parent(node_id)?;
        while let Some(current) = cursor {
            if current == ancestor {
                return Ok(true);
            }
            cursor = self.parent(current)?;
        }
        Ok(false)
    }

    /// Whether the node is reachable from the document root
    pub fn is_connected(&self, node_id: NodeId) -> Result<bool> {
        Ok(node_id == self.root_id || self.is_descendant_of(node_id, self.root_id)?)
    }

    /// Move `child` to the end of `parent`'s children
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert(parent, child, Position::Last)
    }

    /// Move `child` to the front of `parent`'s children
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert(parent, child, Position::First)
    }

    /// Move `child` right before `reference`, a child of `parent`
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> Result<()> {
        if self.parent(reference)? != Some(parent) {
            return Err(DomError::HierarchyRequest(format!(
                "node {reference} is not a child of {parent}"
            )));
        }
        if child == reference {
            return Ok(());
        }
        self.insert(parent, child, Position::Before(reference))
    }

    fn insert(&mut self, parent: NodeId, child: NodeId, position: Position) -> Result<()> {
        if !self.get(parent)?.can_have_children() {
            return Err(DomError::HierarchyRequest(format!(
                "node {parent} cannot have children"
            )));
        }
        self.get(child)?;
        if child == self.root_id {
            return Err(DomError::HierarchyRequest(
                "the document root cannot be inserted".to_string(),
            ));
        }
        // parent must not be inside child's subtree
        if child == parent || self.is_descendant_of(parent, child)? {
            return Err(DomError::HierarchyRequest(format!(
                "inserting {child} under {parent} would create a cycle"
            )));
        }

        self.detach(child)?;

        let siblings = &mut self.get_mut(parent)?.children_ids;
        match position {
            Position::First => siblings.insert(0, child),
            Position::Last => siblings.push(child),
            Position::Before(reference) => {
                let index = siblings
                    .iter()
                    .position(|&id| id == reference)
                    .ok_or_else(|| {
                        DomError::HierarchyRequest(format!("node {reference} is not a child"))
                    })?;
                siblings.insert(index, child);
            }
        }
        self.get_mut(child)?.parent_id = Some(parent);
        Ok(())
    }

    /// Remove a node from its parent. Detached nodes are left untouched.
    pub fn detach(&mut self, node_id: NodeId) -> Result<()> {
        if node_id == self.root_id {
            return Err(DomError::HierarchyRequest(
                "the document root cannot be removed".to_string(),
            ));
        }
        let Some(parent) = self.get_mut(node_id)?.parent_id.take() else {
            return Ok(());
        };
        self.get_mut(parent)?.children_ids.retain(|id| *id != node_id);
        Ok(())
    }

    /// Traverse tree depth-first (iterative, no recursion)
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// All nodes below `node_id` in document order, `node_id` itself excluded
    pub fn descendants(&self, node_id: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        self.traverse_df(node_id, |node| {
            if node.node_id != node_id {
                out.push(node.node_id);
            }
            Ok(())
        })?;
        Ok(out)
    }

    /// Elements below `scope` (or the whole document) matching `selector`,
    /// in document order
    pub fn query_selector_all(
        &self,
        scope: Option<NodeId>,
        selector: &SelectorList,
    ) -> Result<Vec<NodeId>> {
        let scope = scope.unwrap_or(self.root_id);
        Ok(self
            .descendants(scope)?
            .into_iter()
            .filter(|&id| selector.matches(self, id))
            .collect())
    }

    /// Concatenated text of the node and its descendants
    pub fn text_content(&self, node_id: NodeId) -> Result<String> {
        let mut text = String::new();
        self.traverse_df(node_id, |node| {
            if node.is_text() {
                text.push_str(&node.node_value);
            }
            Ok(())
        })?;
        Ok(text)
    }

    /// Replace all children with a single text node (none for empty text).
    /// On text and comment nodes the character data is replaced instead.
    pub fn set_text_content(&mut self, node_id: NodeId, text: &str) -> Result<()> {
        let node = self.get_mut(node_id)?;
        if !node.can_have_children() {
            node.node_value = text.to_string();
            return Ok(());
        }

        let old_children = std::mem::take(&mut node.children_ids);
        for child in old_children {
            self.get_mut(child)?.parent_id = None;
        }
        if !text.is_empty() {
            let text_id = self.create_text(text);
            self.append_child(node_id, text_id)?;
        }
        Ok(())
    }

    /// Get an attribute value (name is case-insensitive)
    pub fn get_attribute(&self, node_id: NodeId, name: &str) -> Result<Option<&str>> {
        Ok(self.element(node_id)?.attr(name))
    }

    /// Set or overwrite an attribute on an element
    pub fn set_attribute(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        if !utils::is_valid_name(name) {
            return Err(DomError::InvalidCharacter(name.to_string()));
        }
        self.element_mut(node_id)?.set_attr(name, value);
        Ok(())
    }

    /// Remove an attribute; returns whether it was present
    pub fn remove_attribute(&mut self, node_id: NodeId, name: &str) -> Result<bool> {
        Ok(self.element_mut(node_id)?.remove_attr(name))
    }

    /// Whether the class list contains `class_name`
    pub fn has_class(&self, node_id: NodeId, class_name: &str) -> Result<bool> {
        Ok(self
            .element(node_id)?
            .attr("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class_name))
            .unwrap_or(false))
    }

    /// Add class tokens, skipping ones already present. Nothing is written
    /// when any token is invalid.
    pub fn add_class(&mut self, node_id: NodeId, class_names: &[&str]) -> Result<()> {
        if let Some(bad) = class_names.iter().find(|t| !utils::is_valid_token(t)) {
            return Err(DomError::InvalidCharacter((*bad).to_string()));
        }
        let element = self.element_mut(node_id)?;
        if class_names.is_empty() {
            return Ok(());
        }
        let mut classes = utils::class_tokens(element.attr("class"));
        for name in class_names {
            if !classes.iter().any(|c| c == name) {
                classes.push((*name).to_string());
            }
        }
        element.set_attr("class", &classes.join(" "));
        Ok(())
    }

    /// Remove one token from the class list
    pub fn remove_class(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        if !utils::is_valid_token(class_name) {
            return Err(DomError::InvalidCharacter(class_name.to_string()));
        }
        let element = self.element_mut(node_id)?;
        if element.attr("class").is_none() {
            return Ok(());
        }
        let mut classes = utils::class_tokens(element.attr("class"));
        classes.retain(|c| c != class_name);
        element.set_attr("class", &classes.join(" "));
        Ok(())
    }

    /// Get one inline style declaration
    pub fn style_property(&self, node_id: NodeId, property: &str) -> Result<Option<String>> {
        let name = utils::css_property_name(property);
        let decls = utils::parse_style_declarations(self.element(node_id)?.attr("style"));
        Ok(decls
            .into_iter()
            .find(|(prop, _)| *prop == name)
            .map(|(_, value)| value))
    }

    /// Set one style declaration; an empty value removes it. A value that
    /// would spill into further declarations is ignored.
    pub fn set_style_property(&mut self, node_id: NodeId, property: &str, value: &str) -> Result<()> {
        let name = utils::css_property_name(property);
        let element = self.element_mut(node_id)?;
        if name.is_empty() || !utils::is_single_style_value(value) {
            return Ok(());
        }
        let mut decls = utils::parse_style_declarations(element.attr("style"));
        let value = value.trim();

        match decls.iter().position(|(prop, _)| *prop == name) {
            Some(pos) if value.is_empty() => {
                decls.remove(pos);
            }
            Some(pos) => decls[pos].1 = value.to_string(),
            None if value.is_empty() => {}
            None => decls.push((name, value.to_string())),
        }

        if decls.is_empty() {
            element.remove_attr("style");
        } else {
            element.set_attr("style", &utils::serialize_style_declarations(&decls));
        }
        Ok(())
    }

    /// First connected element with the given `id`, in document order
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root_id)
            .ok()?
            .into_iter()
            .find(|&node_id| {
                self.get(node_id)
                    .map(|node| node.is_element() && node.attr("id") == Some(id))
                    .unwrap_or(false)
            })
    }

    /// All connected elements with the given tag, in document order
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.descendants(self.root_id)
            .unwrap_or_default()
            .into_iter()
            .filter(|&node_id| {
                self.get(node_id)
                    .ok()
                    .and_then(DomNode::tag_name)
                    .is_some_and(|name| name.eq_ignore_ascii_case(tag))
            })
            .collect()
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root -> ul -> [li "A", li "B"]
    fn list_fixture() -> (DomArena, NodeId, NodeId, NodeId) {
        let mut arena = DomArena::new();
        let ul = arena.create_element("ul").unwrap();
        let a = arena.create_element("li").unwrap();
        let b = arena.create_element("li").unwrap();
        arena.append_child(arena.root_id(), ul).unwrap();
        arena.append_child(ul, a).unwrap();
        arena.append_child(ul, b).unwrap();
        arena.set_text_content(a, "A").unwrap();
        arena.set_text_content(b, "B").unwrap();
        (arena, ul, a, b)
    }

    #[test]
    fn test_arena_basic() {
        let mut arena = DomArena::new();
        assert!(arena.is_empty());

        let id = arena.create_element("DIV").unwrap();
        assert_eq!(id, 1);
        assert!(!arena.is_empty());

        let node = arena.get(id).unwrap();
        assert_eq!(node.node_name, "div");
        assert_eq!(node.parent_id, None);
        assert!(matches!(arena.get(99), Err(DomError::NodeNotFound(99))));
    }

    #[test]
    fn test_create_element_rejects_bad_names() {
        let mut arena = DomArena::new();
        assert!(matches!(
            arena.create_element("<div>"),
            Err(DomError::InvalidCharacter(_))
        ));
        assert!(arena.create_element("").is_err());
    }

    #[test]
    fn test_append_and_prepend_order() {
        let (mut arena, ul, a, b) = list_fixture();
        let first = arena.create_element("li").unwrap();
        arena.prepend_child(ul, first).unwrap();
        assert_eq!(arena.children(ul).unwrap(), &[first, a, b]);

        // moving an existing child relocates it
        arena.append_child(ul, first).unwrap();
        assert_eq!(arena.children(ul).unwrap(), &[a, b, first]);
        assert_eq!(arena.parent(first).unwrap(), Some(ul));
    }

    #[test]
    fn test_insert_before() {
        let (mut arena, ul, a, b) = list_fixture();
        let mid = arena.create_element("li").unwrap();
        arena.insert_before(ul, mid, b).unwrap();
        assert_eq!(arena.children(ul).unwrap(), &[a, mid, b]);

        let stranger = arena.create_element("p").unwrap();
        assert!(arena.insert_before(ul, mid, stranger).is_err());
    }

    #[test]
    fn test_cycles_are_rejected() {
        let (mut arena, ul, a, _) = list_fixture();
        assert!(matches!(
            arena.append_child(a, ul),
            Err(DomError::HierarchyRequest(_))
        ));
        assert!(arena.append_child(ul, ul).is_err());
        assert!(arena.append_child(a, arena.root_id()).is_err());
    }

    #[test]
    fn test_text_nodes_cannot_have_children() {
        let (mut arena, _, a, _) = list_fixture();
        let text = arena.children(a).unwrap()[0];
        let span = arena.create_element("span").unwrap();
        assert!(arena.append_child(text, span).is_err());
    }

    #[test]
    fn test_detach_keeps_node_alive() {
        let (mut arena, ul, a, b) = list_fixture();
        arena.detach(a).unwrap();
        assert_eq!(arena.children(ul).unwrap(), &[b]);
        assert_eq!(arena.parent(a).unwrap(), None);
        assert_eq!(arena.text_content(a).unwrap(), "A");
        assert!(!arena.is_connected(a).unwrap());

        // detaching twice is a no-op
        arena.detach(a).unwrap();
        assert!(arena.detach(arena.root_id()).is_err());
    }

    #[test]
    fn test_parent_element_skips_document() {
        let (arena, ul, a, _) = list_fixture();
        assert_eq!(arena.parent_element(a).unwrap(), Some(ul));
        assert_eq!(arena.parent_element(ul).unwrap(), None);
        assert_eq!(arena.parent(ul).unwrap(), Some(arena.root_id()));
    }

    #[test]
    fn test_descendants_document_order() {
        let (arena, ul, a, b) = list_fixture();
        let a_text = arena.children(a).unwrap()[0];
        let b_text = arena.children(b).unwrap()[0];
        assert_eq!(arena.descendants(ul).unwrap(), vec![a, a_text, b, b_text]);
    }

    #[test]
    fn test_set_text_content_replaces_children() {
        let (mut arena, ul, a, _) = list_fixture();
        arena.set_text_content(ul, "flat").unwrap();
        assert_eq!(arena.children(ul).unwrap().len(), 1);
        assert_eq!(arena.text_content(ul).unwrap(), "flat");
        assert_eq!(arena.parent(a).unwrap(), None);

        arena.set_text_content(ul, "").unwrap();
        assert!(arena.children(ul).unwrap().is_empty());
    }

    #[test]
    fn test_class_list() {
        let (mut arena, ul, a, _) = list_fixture();
        arena.add_class(ul, &["menu", "open", "menu"]).unwrap();
        assert_eq!(arena.get_attribute(ul, "class").unwrap(), Some("menu open"));
        assert!(arena.has_class(ul, "open").unwrap());

        arena.remove_class(ul, "open").unwrap();
        assert_eq!(arena.get_attribute(ul, "class").unwrap(), Some("menu"));

        // removing from an element without a class attribute adds nothing
        arena.remove_class(a, "menu").unwrap();
        assert_eq!(arena.get_attribute(a, "class").unwrap(), None);

        assert!(arena.add_class(ul, &["ok", "not ok"]).is_err());
        assert_eq!(arena.get_attribute(ul, "class").unwrap(), Some("menu"));
    }

    #[test]
    fn test_add_no_classes_leaves_attribute_absent() {
        let (mut arena, ul, a, _) = list_fixture();
        arena.add_class(a, &[]).unwrap();
        assert_eq!(arena.get_attribute(a, "class").unwrap(), None);

        arena.add_class(ul, &["menu"]).unwrap();
        arena.add_class(ul, &[]).unwrap();
        assert_eq!(arena.get_attribute(ul, "class").unwrap(), Some("menu"));

        // the node is still checked
        assert!(arena.add_class(99, &[]).is_err());
    }

    #[test]
    fn test_style_properties() {
        let (mut arena, ul, _, _) = list_fixture();
        arena.set_style_property(ul, "color", "red").unwrap();
        arena.set_style_property(ul, "backgroundColor", "blue").unwrap();
        assert_eq!(
            arena.get_attribute(ul, "style").unwrap(),
            Some("color: red; background-color: blue;")
        );
        assert_eq!(
            arena.style_property(ul, "background-color").unwrap().as_deref(),
            Some("blue")
        );

        arena.set_style_property(ul, "color", "").unwrap();
        arena.set_style_property(ul, "background-color", "").unwrap();
        assert_eq!(arena.get_attribute(ul, "style").unwrap(), None);
    }

    #[test]
    fn test_style_value_cannot_inject_declarations() {
        let (mut arena, ul, _, _) = list_fixture();
        arena.set_style_property(ul, "color", "red").unwrap();
        arena.set_style_property(ul, "margin", "0").unwrap();

        arena.set_style_property(ul, "color", "blue; display: none").unwrap();
        arena.set_style_property(ul, "width", "1px;").unwrap();

        assert_eq!(arena.style_property(ul, "display").unwrap(), None);
        assert_eq!(arena.style_property(ul, "width").unwrap(), None);
        assert_eq!(
            arena.get_attribute(ul, "style").unwrap(),
            Some("color: red; margin: 0;")
        );

        // semicolons inside quotes or parentheses are part of the value
        arena
            .set_style_property(ul, "backgroundImage", "url(\"a;b.png\")")
            .unwrap();
        assert_eq!(
            arena.style_property(ul, "background-image").unwrap().as_deref(),
            Some("url(\"a;b.png\")")
        );
    }

    #[test]
    fn test_attributes_on_text_nodes_fail() {
        let (mut arena, _, a, _) = list_fixture();
        let text = arena.children(a).unwrap()[0];
        assert!(matches!(
            arena.set_attribute(text, "id", "x"),
            Err(DomError::InvalidNodeType { .. })
        ));
        assert!(arena.set_attribute(a, "bad name", "x").is_err());
    }

    #[test]
    fn test_find_by_id_and_tag() {
        let (mut arena, ul, a, b) = list_fixture();
        arena.set_attribute(b, "id", "second").unwrap();
        assert_eq!(arena.find_by_id("second"), Some(b));
        assert_eq!(arena.find_by_tag("LI"), vec![a, b]);

        arena.detach(ul).unwrap();
        assert_eq!(arena.find_by_id("second"), None);
        assert!(arena.find_by_tag("li").is_empty());
    }

    #[test]
    fn test_traverse_df() {
        let (arena, ..) = list_fixture();
        let mut visited = Vec::new();
        arena
            .traverse_df(arena.root_id(), |node| {
                visited.push(node.node_name.clone());
                Ok(())
            })
            .unwrap();

        assert_eq!(
            visited,
            vec!["#document", "ul", "li", "#text", "li", "#text"]
        );
    }
}
