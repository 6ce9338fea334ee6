//! ElementCollection - ordered, chainable view over elements of one host
//!
//! A collection holds handles, never copies of nodes: every mutation goes
//! straight to the host tree. Operations never fail to the caller. A bad
//! selector matches nothing (logged at `warn`), a rejected mutation is logged
//! at `error` and the remaining elements are still processed.

use std::fmt;
use std::rc::Rc;

use crate::host::{Host, Listener};
use crate::input::{strip_markup, ClassNames, Entry, SelectorInput};

/// Ordered sequence of element handles bound to a host
pub struct ElementCollection<H: Host> {
    host: H,
    nodes: Vec<H::Node>,
}

impl<H: Host> ElementCollection<H> {
    /// Build a collection from a selector, a node, a node sequence or a
    /// selector list
    pub fn new(host: &H, input: impl Into<SelectorInput<H::Node>>) -> Self {
        let nodes = match input.into() {
            SelectorInput::Selector(selector) => query(host, None, &selector),
            SelectorInput::Node(node) => vec![node],
            SelectorInput::Nodes(nodes) => nodes,
            SelectorInput::List(entries) => entries
                .into_iter()
                .flat_map(|entry| match entry {
                    Entry::Selector(selector) => query(host, None, &selector),
                    Entry::Node(_) => Vec::new(),
                })
                .collect(),
            SelectorInput::Unsupported => Vec::new(),
        };
        Self::from_nodes(host, nodes)
    }

    pub fn from_nodes(host: &H, nodes: Vec<H::Node>) -> Self {
        Self {
            host: host.clone(),
            nodes,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn nodes(&self) -> &[H::Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn first(&self) -> Option<&H::Node> {
        self.nodes.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, H::Node> {
        self.nodes.iter()
    }

    /// Concatenated inner markup of every element
    pub fn html_content(&self) -> String {
        self.nodes
            .iter()
            .filter_map(|node| report("innerHTML", self.host.inner_html(node)))
            .collect()
    }

    /// Replace each element's children with a single text node
    pub fn write_text(&self, text: &str) -> &Self {
        for node in &self.nodes {
            report("textContent", self.host.set_text_content(node, text));
        }
        self
    }

    /// Set an inline style property (`backgroundColor` or `background-color`)
    pub fn set_css(&self, property: &str, value: &str) -> &Self {
        for node in &self.nodes {
            report("style", self.host.set_style_property(node, property, value));
        }
        self
    }

    pub fn add_class_name(&self, class_names: impl Into<ClassNames>) -> &Self {
        let class_names = class_names.into();
        let class_names = class_names.as_refs();
        for node in &self.nodes {
            report("classList.add", self.host.add_classes(node, &class_names));
        }
        self
    }

    pub fn remove_class_name(&self, class_name: &str) -> &Self {
        for node in &self.nodes {
            report("classList.remove", self.host.remove_class(node, class_name));
        }
        self
    }

    /// Attribute value per element, `None` where absent
    pub fn get_attribute(&self, name: &str) -> Vec<Option<String>> {
        self.nodes
            .iter()
            .map(|node| report("getAttribute", self.host.get_attribute(node, name)).flatten())
            .collect()
    }

    /// `Some(class_name)` when the first element's class list contains it
    pub fn get_class(&self, class_name: &str) -> Option<String> {
        let first = self.nodes.first()?;
        let classes = report("getAttribute", self.host.get_attribute(first, "class")).flatten()?;
        classes
            .split_whitespace()
            .find(|token| *token == class_name)
            .map(str::to_string)
    }

    /// Descendants of every element matching `selector`, grouped per element
    pub fn find(&self, selector: &str) -> Self {
        let nodes = self
            .nodes
            .iter()
            .flat_map(|node| query(&self.host, Some(node), selector))
            .collect();
        self.wrap(nodes)
    }

    /// Create `<tag>` with `attributes` and append it to the last element.
    /// `tag` may be written as markup (`"<li>"`). Returns the new element.
    pub fn append_element<I, K, V>(&self, tag: &str, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let Some(element) = self.create_with_attributes(strip_markup(tag), attributes) else {
            return self.wrap(Vec::new());
        };

        match self.nodes.last() {
            Some(parent) => {
                report("appendChild", self.host.append_child(parent, &element));
            }
            None => tracing::error!("No elements to append to."),
        }
        self.wrap(vec![element])
    }

    /// Create `<tag>` with `attributes` and insert it as first child of each
    /// element in turn. There is a single new element, so it ends up under
    /// the last element only.
    pub fn prepend_element<I, K, V>(&self, tag: &str, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let Some(element) = self.create_with_attributes(tag, attributes) else {
            return self.wrap(Vec::new());
        };

        for node in &self.nodes {
            report("prepend", self.host.prepend_child(node, &element));
        }
        self.wrap(vec![element])
    }

    /// Detach every element from its parent
    pub fn remove_element(&self) -> &Self {
        for node in &self.nodes {
            report("remove", self.host.remove(node));
        }
        self
    }

    /// Detach the descendants of every element that match `selector`
    pub fn remove_element_by_selector(&self, selector: &str) -> &Self {
        for node in &self.nodes {
            for matched in query(&self.host, Some(node), selector) {
                report("remove", self.host.remove(&matched));
            }
        }
        self
    }

    /// Ancestor `levels` steps above the first element. `0` returns a copy of
    /// this collection; `None` when the walk runs out of parent elements or
    /// the collection is empty.
    pub fn get_parent(&self, levels: usize) -> Option<Self> {
        if levels == 0 {
            return Some(self.clone());
        }

        let mut current = self.nodes.first()?.clone();
        for _ in 0..levels {
            current = report("parentElement", self.host.parent_element(&current)).flatten()?;
        }
        Some(self.wrap(vec![current]))
    }

    /// One single-element collection per element, in order
    pub fn element_exist(&self) -> Vec<Self> {
        self.nodes
            .iter()
            .map(|node| self.wrap(vec![node.clone()]))
            .collect()
    }

    /// Attach `handler` for `event` on every element
    pub fn on(&self, event: &str, handler: impl Fn(&H::Event) + 'static) -> &Self {
        let listener: Listener<H::Event> = Rc::new(handler);
        for node in &self.nodes {
            report(
                "addEventListener",
                self.host.add_event_listener(node, event, Rc::clone(&listener)),
            );
        }
        self
    }

    fn wrap(&self, nodes: Vec<H::Node>) -> Self {
        Self::from_nodes(&self.host, nodes)
    }

    fn create_with_attributes<I, K, V>(&self, tag: &str, attributes: I) -> Option<H::Node>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let element = report("createElement", self.host.create_element(tag))?;
        for (name, value) in attributes {
            report(
                "setAttribute",
                self.host.set_attribute(&element, name.as_ref(), value.as_ref()),
            );
        }
        Some(element)
    }
}

impl<H: Host> Clone for ElementCollection<H> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            nodes: self.nodes.clone(),
        }
    }
}

/// Collections are equal when they hold the same elements in the same order
impl<H: Host> PartialEq for ElementCollection<H> {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl<H: Host> fmt::Debug for ElementCollection<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementCollection")
            .field("nodes", &self.nodes)
            .finish()
    }
}

impl<'a, H: Host> IntoIterator for &'a ElementCollection<H> {
    type Item = &'a H::Node;
    type IntoIter = std::slice::Iter<'a, H::Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

fn query<H: Host>(host: &H, scope: Option<&H::Node>, selector: &str) -> Vec<H::Node> {
    match host.query_selector_all(scope, selector) {
        Ok(nodes) => nodes,
        Err(err) => {
            tracing::warn!(selector, error = %err, "selector matched nothing");
            Vec::new()
        }
    }
}

fn report<T, E: fmt::Display>(operation: &'static str, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::error!(operation, error = %err, "host operation failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use negative_dom::{Document, NodeId};

    use super::*;
    use crate::testing::{capture_logs, fixture};

    type Collection = ElementCollection<Document>;

    const NO_ATTRIBUTES: [(&str, &str); 0] = [];

    fn by_id(doc: &Document, id: &str) -> NodeId {
        doc.element_by_id(id).unwrap()
    }

    #[test]
    fn test_selector_construction_in_document_order() {
        let doc = fixture();
        let items = Collection::new(&doc, "li");
        assert_eq!(items.len(), 3);

        let texts: Vec<String> = items
            .iter()
            .map(|&li| doc.text_content(li).unwrap())
            .collect();
        assert_eq!(texts, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_node_and_sequence_construction() {
        let doc = fixture();
        let first = by_id(&doc, "first");
        let second = by_id(&doc, "second");

        let single = Collection::new(&doc, SelectorInput::Node(first));
        assert_eq!(single.nodes(), &[first]);

        // order and duplicates are preserved
        let many = Collection::new(&doc, SelectorInput::Nodes(vec![second, first, second]));
        assert_eq!(many.nodes(), &[second, first, second]);
    }

    #[test]
    fn test_selector_list_construction() {
        let doc = fixture();
        let first = by_id(&doc, "first");
        let list = Collection::new(
            &doc,
            vec![
                Entry::Selector("#second".to_string()),
                Entry::Node(first),
                Entry::Selector("ul".to_string()),
            ],
        );
        assert_eq!(list.nodes(), &[by_id(&doc, "second"), first, by_id(&doc, "second")]);

        let empty = Collection::new(&doc, SelectorInput::<NodeId>::Unsupported);
        assert!(empty.is_empty());
        assert_eq!(empty.html_content(), "");
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let doc = fixture();
        let (items, logs) = capture_logs(|| Collection::new(&doc, "li["));
        assert!(items.is_empty());
        assert!(logs.contains("WARN"), "logs: {logs}");
    }

    #[test]
    fn test_html_content_concatenates() {
        let doc = fixture();
        assert_eq!(
            Collection::new(&doc, "ul").html_content(),
            "<li>A</li><li>B</li><li class=\"x\">C</li>"
        );
        assert_eq!(Collection::new(&doc, "li").html_content(), "ABC");
        assert_eq!(Collection::new(&doc, "table").html_content(), "");
    }

    #[test]
    fn test_write_text_replaces_children() {
        let doc = fixture();
        let lists = Collection::new(&doc, "ul");
        lists.write_text("a < b");

        assert_eq!(lists.html_content(), "a &lt; ba &lt; b");
        assert!(Collection::new(&doc, "li").is_empty());
    }

    #[test]
    fn test_set_css_chains() {
        let doc = fixture();
        let app = Collection::new(&doc, "#app");
        app.set_css("color", "red").set_css("backgroundColor", "blue");

        let node = by_id(&doc, "app");
        assert_eq!(doc.style_property(node, "color").unwrap().as_deref(), Some("red"));
        assert_eq!(
            doc.get_attribute(node, "style").unwrap().as_deref(),
            Some("color: red; background-color: blue;")
        );
    }

    #[test]
    fn test_set_css_rejects_extra_declarations() {
        let doc = fixture();
        let app = Collection::new(&doc, "#app");
        app.set_css("color", "red")
            .set_css("color", "blue; display: none");

        let node = by_id(&doc, "app");
        assert_eq!(doc.style_property(node, "display").unwrap(), None);
        assert_eq!(app.get_attribute("style"), vec![Some("color: red;".to_string())]);
    }

    #[test]
    fn test_add_no_class_names_writes_nothing() {
        let doc = fixture();
        let first = Collection::new(&doc, "#first");
        first.add_class_name(Vec::<String>::new());

        assert_eq!(first.get_attribute("class"), vec![None]);
        assert_eq!(
            doc.outer_html(by_id(&doc, "first")).unwrap(),
            "<ul id=\"first\"><li>A</li><li>B</li></ul>"
        );
    }

    #[test]
    fn test_class_round_trip() {
        let doc = fixture();
        let items = Collection::new(&doc, "li");
        items.add_class_name(["active", "done"]);
        for &li in &items {
            assert!(doc.has_class(li, "active").unwrap());
            assert!(doc.has_class(li, "done").unwrap());
        }

        items.remove_class_name("active");
        for &li in &items {
            assert!(!doc.has_class(li, "active").unwrap());
            assert!(doc.has_class(li, "done").unwrap());
        }
        // unrelated class untouched
        assert!(doc.has_class(items.nodes()[2], "x").unwrap());
    }

    #[test]
    fn test_rejected_class_is_logged_and_skipped() {
        let doc = fixture();
        let items = Collection::new(&doc, "li");
        let (_, logs) = capture_logs(|| {
            items.add_class_name("two words");
        });
        assert!(logs.contains("classList.add"), "logs: {logs}");
        assert_eq!(items.get_attribute("class"), vec![None, None, Some("x".to_string())]);
    }

    #[test]
    fn test_get_attribute_per_element() {
        let doc = fixture();
        assert_eq!(
            Collection::new(&doc, "ul").get_attribute("id"),
            vec![Some("first".to_string()), Some("second".to_string())]
        );
        assert_eq!(Collection::new(&doc, "ul").get_attribute("title"), vec![None, None]);
    }

    #[test]
    fn test_get_class_checks_first_element_only() {
        let doc = fixture();
        let app = Collection::new(&doc, "#app");
        assert_eq!(app.get_class("main"), Some("main".to_string()));
        assert_eq!(app.get_class("mai"), None);

        // "x" sits on the third li only
        assert_eq!(Collection::new(&doc, "li").get_class("x"), None);
        assert_eq!(Collection::new(&doc, "table").get_class("x"), None);
    }

    #[test]
    fn test_find_groups_by_element() {
        let doc = fixture();
        let lists = Collection::new(
            &doc,
            SelectorInput::Nodes(vec![by_id(&doc, "second"), by_id(&doc, "first")]),
        );
        let found = lists.find("li");

        let texts: Vec<String> = found
            .iter()
            .map(|&li| doc.text_content(li).unwrap())
            .collect();
        assert_eq!(texts, vec!["C", "A", "B"]);
        assert_eq!(lists.len(), 2);
    }

    #[test]
    fn test_append_element_targets_last_node() {
        let doc = fixture();
        let lists = Collection::new(&doc, "ul");
        let created = lists.append_element("<li>", [("id", "new"), ("data-x", "1")]);

        assert_eq!(created.len(), 1);
        let node = created.nodes()[0];
        assert_eq!(doc.element_by_id("new"), Some(node));
        assert_eq!(doc.parent_element(node).unwrap(), Some(by_id(&doc, "second")));
        assert_eq!(doc.children(by_id(&doc, "first")).unwrap().len(), 2);
        assert_eq!(doc.children(by_id(&doc, "second")).unwrap().len(), 2);
        assert_eq!(created.get_attribute("data-x"), vec![Some("1".to_string())]);

        created.write_text("D");
        assert_eq!(
            Collection::new(&doc, "#second").html_content(),
            "<li class=\"x\">C</li><li id=\"new\" data-x=\"1\">D</li>"
        );
    }

    #[test]
    fn test_append_element_without_target() {
        let doc = fixture();
        let before = doc.outer_html(doc.root()).unwrap();
        let empty = Collection::new(&doc, "table");

        let (created, logs) = capture_logs(|| empty.append_element("p", NO_ATTRIBUTES));

        assert!(logs.contains("No elements to append to."), "logs: {logs}");
        assert_eq!(doc.outer_html(doc.root()).unwrap(), before);
        assert_eq!(created.len(), 1);
        assert_eq!(doc.parent_element(created.nodes()[0]).unwrap(), None);
    }

    #[test]
    fn test_append_element_invalid_tag() {
        let doc = fixture();
        let (created, logs) =
            capture_logs(|| Collection::new(&doc, "ul").append_element("bad tag", NO_ATTRIBUTES));
        assert!(created.is_empty());
        assert!(logs.contains("createElement"), "logs: {logs}");
    }

    #[test]
    fn test_prepend_element_relocates_single_node() {
        let doc = fixture();
        let lists = Collection::new(&doc, "ul");
        let created = lists.prepend_element("li", [("class", "head")]);

        let node = created.nodes()[0];
        assert_eq!(doc.children(by_id(&doc, "second")).unwrap()[0], node);
        assert_eq!(doc.children(by_id(&doc, "first")).unwrap().len(), 2);
        assert_eq!(Collection::new(&doc, "li.head").len(), 1);
    }

    #[test]
    fn test_prepend_element_single_target() {
        let doc = fixture();
        let first = Collection::new(&doc, "#first");
        let created = first.prepend_element("li", NO_ATTRIBUTES);
        created.write_text("Z");
        assert_eq!(first.html_content(), "<li>Z</li><li>A</li><li>B</li>");
    }

    #[test]
    fn test_remove_element_detaches() {
        let doc = fixture();
        let second = Collection::new(&doc, "#second");
        second.remove_element();

        assert!(Collection::new(&doc, "#second").is_empty());
        assert_eq!(Collection::new(&doc, "li").len(), 2);
        // the handle still reaches the detached subtree
        assert_eq!(second.html_content(), "<li class=\"x\">C</li>");
        assert_eq!(second.get_parent(1), None);
    }

    #[test]
    fn test_remove_element_by_selector() {
        let doc = fixture();
        Collection::new(&doc, "#first").remove_element_by_selector("li");
        assert_eq!(Collection::new(&doc, "#first").html_content(), "");
        assert_eq!(Collection::new(&doc, "li").len(), 1);
    }

    #[test]
    fn test_get_parent_walks_up() {
        let doc = fixture();
        let items = Collection::new(&doc, "li");

        assert_eq!(items.get_parent(0), Some(items.clone()));
        assert_eq!(
            items.get_parent(1).unwrap().nodes(),
            &[by_id(&doc, "first")]
        );
        assert_eq!(items.get_parent(2).unwrap().nodes(), &[by_id(&doc, "app")]);
        // the document node is not an element
        assert_eq!(items.get_parent(3), None);
        assert_eq!(Collection::new(&doc, "table").get_parent(1), None);
    }

    #[test]
    fn test_element_exist_decomposes() {
        let doc = fixture();
        let items = Collection::new(&doc, "li");
        let singles = items.element_exist();

        assert_eq!(singles.len(), 3);
        for (single, &node) in singles.iter().zip(items.nodes()) {
            assert_eq!(single.nodes(), &[node]);
        }
        assert!(Collection::new(&doc, "table").element_exist().is_empty());
    }

    #[test]
    fn test_on_registers_on_every_element() {
        let doc = fixture();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let items = Collection::new(&doc, "li");
        items
            .on("click", move |event| sink.borrow_mut().push(event.target))
            .add_class_name("clickable");

        for &li in items.nodes().iter().rev() {
            assert_eq!(doc.dispatch_event(li, "click"), 1);
        }
        assert_eq!(doc.dispatch_event(items.nodes()[0], "keyup"), 0);

        let expected: Vec<NodeId> = items.nodes().iter().rev().copied().collect();
        assert_eq!(*seen.borrow(), expected);
    }

    #[test]
    fn test_listener_may_mutate_tree() {
        let doc = fixture();
        let host = doc.clone();
        Collection::new(&doc, "#first").on("click", move |_| {
            Collection::new(&host, "#first").append_element("li", NO_ATTRIBUTES);
        });

        doc.dispatch_event(by_id(&doc, "first"), "click");
        assert_eq!(Collection::new(&doc, "#first li").len(), 3);
    }
}
