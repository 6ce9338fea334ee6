//! Host trait - the tree primitives the wrapper forwards to
//!
//! The document is injected instead of being an implicit global, so the same
//! wrapper code runs against the in-memory [`Document`] in tests and against
//! the browser DOM (feature `web`) in production.

use std::fmt;
use std::rc::Rc;

use negative_dom::{Document, DomError, DomEvent, EventListener, NodeId};

/// Event handler as stored by a host
pub type Listener<E> = Rc<dyn Fn(&E)>;

/// Tree context a collection operates on
///
/// Implementations are cheap handles: cloning one must yield another handle
/// to the same document.
pub trait Host: Clone {
    /// Opaque, comparable reference to one element
    type Node: Clone + PartialEq + fmt::Debug + 'static;
    /// Value handed to event listeners
    type Event: 'static;
    type Error: std::error::Error;

    /// Elements matching `selector` below `scope` (or in the whole document),
    /// in document order
    fn query_selector_all(
        &self,
        scope: Option<&Self::Node>,
        selector: &str,
    ) -> Result<Vec<Self::Node>, Self::Error>;

    /// New detached element
    fn create_element(&self, tag: &str) -> Result<Self::Node, Self::Error>;

    /// Parent, when it is an element
    fn parent_element(&self, node: &Self::Node) -> Result<Option<Self::Node>, Self::Error>;

    /// Serialized markup of the node's children
    fn inner_html(&self, node: &Self::Node) -> Result<String, Self::Error>;

    /// Replace the node's children with one text node
    fn set_text_content(&self, node: &Self::Node, text: &str) -> Result<(), Self::Error>;

    /// Set one inline style property (camelCase or kebab-case name)
    fn set_style_property(
        &self,
        node: &Self::Node,
        property: &str,
        value: &str,
    ) -> Result<(), Self::Error>;

    /// Add every token to the class list
    fn add_classes(&self, node: &Self::Node, class_names: &[&str]) -> Result<(), Self::Error>;

    /// Remove one token from the class list
    fn remove_class(&self, node: &Self::Node, class_name: &str) -> Result<(), Self::Error>;

    /// Get an attribute value, `None` when absent
    fn get_attribute(&self, node: &Self::Node, name: &str) -> Result<Option<String>, Self::Error>;

    /// Set or overwrite an attribute
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) -> Result<(), Self::Error>;

    /// Move `child` to the end of `parent`'s children
    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error>;

    /// Move `child` to the front of `parent`'s children
    fn prepend_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error>;

    /// Detach from the parent; the handle stays usable
    fn remove(&self, node: &Self::Node) -> Result<(), Self::Error>;

    /// Register `listener` for `event` on the node
    fn add_event_listener(
        &self,
        node: &Self::Node,
        event: &str,
        listener: Listener<Self::Event>,
    ) -> Result<(), Self::Error>;

    /// Whether the document is still parsing
    fn is_loading(&self) -> bool;

    /// Run `callback` once when the document has been parsed
    fn on_content_loaded(&self, callback: Box<dyn FnOnce()>);
}

impl Host for Document {
    type Node = NodeId;
    type Event = DomEvent;
    type Error = DomError;

    fn query_selector_all(
        &self,
        scope: Option<&NodeId>,
        selector: &str,
    ) -> Result<Vec<NodeId>, DomError> {
        Document::query_selector_all(self, scope.copied(), selector)
    }

    fn create_element(&self, tag: &str) -> Result<NodeId, DomError> {
        Document::create_element(self, tag)
    }

    fn parent_element(&self, node: &NodeId) -> Result<Option<NodeId>, DomError> {
        Document::parent_element(self, *node)
    }

    fn inner_html(&self, node: &NodeId) -> Result<String, DomError> {
        Document::inner_html(self, *node)
    }

    fn set_text_content(&self, node: &NodeId, text: &str) -> Result<(), DomError> {
        Document::set_text_content(self, *node, text)
    }

    fn set_style_property(&self, node: &NodeId, property: &str, value: &str) -> Result<(), DomError> {
        Document::set_style_property(self, *node, property, value)
    }

    fn add_classes(&self, node: &NodeId, class_names: &[&str]) -> Result<(), DomError> {
        Document::add_class(self, *node, class_names)
    }

    fn remove_class(&self, node: &NodeId, class_name: &str) -> Result<(), DomError> {
        Document::remove_class(self, *node, class_name)
    }

    fn get_attribute(&self, node: &NodeId, name: &str) -> Result<Option<String>, DomError> {
        Document::get_attribute(self, *node, name)
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) -> Result<(), DomError> {
        Document::set_attribute(self, *node, name, value)
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        Document::append_child(self, *parent, *child)
    }

    fn prepend_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        Document::prepend_child(self, *parent, *child)
    }

    fn remove(&self, node: &NodeId) -> Result<(), DomError> {
        Document::remove(self, *node)
    }

    fn add_event_listener(
        &self,
        node: &NodeId,
        event: &str,
        listener: EventListener,
    ) -> Result<(), DomError> {
        Document::add_event_listener(self, *node, event, listener)
    }

    fn is_loading(&self) -> bool {
        self.ready_state() == negative_dom::ReadyState::Loading
    }

    fn on_content_loaded(&self, callback: Box<dyn FnOnce()>) {
        Document::on_content_loaded(self, callback)
    }
}
