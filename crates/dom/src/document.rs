//! Document - shared handle over the arena, listeners and load state
//!
//! A `Document` is a cheap `Rc` clone; every clone sees the same tree. The
//! model is single-threaded: borrows of the arena are always released before
//! user callbacks run, so a callback may freely query or mutate the tree.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::arena::DomArena;
use crate::error::Result;
use crate::loader;
use crate::selector::SelectorList;
use crate::serializer;
use crate::types::{NodeId, ReadyState};

/// Event handler registered on a node
pub type EventListener = Rc<dyn Fn(&DomEvent)>;

type LoadCallback = Box<dyn FnOnce()>;

/// Event delivered to listeners
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    pub name: String,
    pub target: NodeId,
}

/// Document configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub url: String,
    pub ready_state: ReadyState,
    /// Arena pre-allocation (nodes)
    pub capacity: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            url: "about:blank".to_string(),
            ready_state: ReadyState::Complete,
            capacity: 256,
        }
    }
}

struct Registration {
    name: String,
    listener: EventListener,
}

struct DocumentState {
    url: String,
    arena: RefCell<DomArena>,
    /// Only grows: there is no removal, and detached nodes keep theirs
    listeners: RefCell<AHashMap<NodeId, Vec<Registration>>>,
    ready_state: Cell<ReadyState>,
    content_loaded: RefCell<Vec<LoadCallback>>,
}

/// In-memory HTML document
#[derive(Clone)]
pub struct Document {
    state: Rc<DocumentState>,
}

impl Document {
    /// Create an empty, fully loaded document
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    pub fn with_config(config: DocumentConfig) -> Self {
        Self {
            state: Rc::new(DocumentState {
                url: config.url,
                arena: RefCell::new(DomArena::with_capacity(config.capacity)),
                listeners: RefCell::new(AHashMap::new()),
                ready_state: Cell::new(config.ready_state),
                content_loaded: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Build a loaded document from a JSON tree description (see [`loader`])
    pub fn from_json(description: &Value) -> Result<Self> {
        let document = Self::new();
        loader::load_tree(&mut document.arena_mut(), description)?;
        Ok(document)
    }

    pub fn from_json_str(description: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(description)?;
        Self::from_json(&value)
    }

    pub fn url(&self) -> &str {
        &self.state.url
    }

    pub fn ready_state(&self) -> ReadyState {
        self.state.ready_state.get()
    }

    pub fn root(&self) -> NodeId {
        self.arena().root_id()
    }

    /// Whether both handles point at the same document
    pub fn same_document(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Get reference to internal arena
    ///
    /// Panics if the arena is mutably borrowed, i.e. when called from inside
    /// an [`arena_mut`](Self::arena_mut) guard.
    pub fn arena(&self) -> Ref<'_, DomArena> {
        self.state.arena.borrow()
    }

    /// Get mutable reference to internal arena
    pub fn arena_mut(&self) -> RefMut<'_, DomArena> {
        self.state.arena.borrow_mut()
    }

    pub fn create_element(&self, tag: &str) -> Result<NodeId> {
        self.arena_mut().create_element(tag)
    }

    pub fn create_text(&self, text: &str) -> NodeId {
        self.arena_mut().create_text(text)
    }

    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.arena_mut().append_child(parent, child)
    }

    pub fn prepend_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.arena_mut().prepend_child(parent, child)
    }

    /// Detach the node from its parent
    pub fn remove(&self, node: NodeId) -> Result<()> {
        self.arena_mut().detach(node)
    }

    pub fn query_selector_all(&self, scope: Option<NodeId>, selector: &str) -> Result<Vec<NodeId>> {
        let selector = SelectorList::parse(selector)?;
        self.arena().query_selector_all(scope, &selector)
    }

    pub fn query_selector(&self, scope: Option<NodeId>, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(scope, selector)?.into_iter().next())
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.arena().find_by_id(id)
    }

    pub fn parent_element(&self, node: NodeId) -> Result<Option<NodeId>> {
        self.arena().parent_element(node)
    }

    pub fn children(&self, node: NodeId) -> Result<Vec<NodeId>> {
        Ok(self.arena().children(node)?.to_vec())
    }

    pub fn inner_html(&self, node: NodeId) -> Result<String> {
        serializer::inner_html(&self.arena(), node)
    }

    pub fn outer_html(&self, node: NodeId) -> Result<String> {
        serializer::outer_html(&self.arena(), node)
    }

    pub fn text_content(&self, node: NodeId) -> Result<String> {
        self.arena().text_content(node)
    }

    pub fn set_text_content(&self, node: NodeId, text: &str) -> Result<()> {
        self.arena_mut().set_text_content(node, text)
    }

    pub fn get_attribute(&self, node: NodeId, name: &str) -> Result<Option<String>> {
        Ok(self.arena().get_attribute(node, name)?.map(str::to_string))
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.arena_mut().set_attribute(node, name, value)
    }

    pub fn has_class(&self, node: NodeId, class_name: &str) -> Result<bool> {
        self.arena().has_class(node, class_name)
    }

    pub fn add_class(&self, node: NodeId, class_names: &[&str]) -> Result<()> {
        self.arena_mut().add_class(node, class_names)
    }

    pub fn remove_class(&self, node: NodeId, class_name: &str) -> Result<()> {
        self.arena_mut().remove_class(node, class_name)
    }

    pub fn style_property(&self, node: NodeId, property: &str) -> Result<Option<String>> {
        self.arena().style_property(node, property)
    }

    pub fn set_style_property(&self, node: NodeId, property: &str, value: &str) -> Result<()> {
        self.arena_mut().set_style_property(node, property, value)
    }

    /// Register a listener; the same listener may be added more than once
    pub fn add_event_listener(&self, node: NodeId, name: &str, listener: EventListener) -> Result<()> {
        self.arena().get(node)?;
        self.state
            .listeners
            .borrow_mut()
            .entry(node)
            .or_default()
            .push(Registration {
                name: name.to_string(),
                listener,
            });
        tracing::debug!(node, event = name, "listener registered");
        Ok(())
    }

    /// Fire `name` at `node`, running its listeners in registration order.
    /// No bubbling. Returns the number of listeners invoked.
    pub fn dispatch_event(&self, node: NodeId, name: &str) -> usize {
        // snapshot first: listeners may register more listeners
        let listeners: Vec<EventListener> = self
            .state
            .listeners
            .borrow()
            .get(&node)
            .map(|registrations| {
                registrations
                    .iter()
                    .filter(|r| r.name == name)
                    .map(|r| Rc::clone(&r.listener))
                    .collect()
            })
            .unwrap_or_default();

        tracing::trace!(node, event = name, listeners = listeners.len(), "dispatching event");

        let event = DomEvent {
            name: name.to_string(),
            target: node,
        };
        for listener in &listeners {
            listener(&event);
        }
        listeners.len()
    }

    /// Run `callback` once when parsing finishes. Registrations made after
    /// the signal has fired are dropped, like a late `DOMContentLoaded`
    /// listener in a browser.
    pub fn on_content_loaded(&self, callback: impl FnOnce() + 'static) {
        if self.ready_state() != ReadyState::Loading {
            tracing::debug!(url = %self.state.url, "content already loaded, callback dropped");
            return;
        }
        self.state.content_loaded.borrow_mut().push(Box::new(callback));
    }

    /// `Loading` -> `Interactive`, firing the content-loaded callbacks
    pub fn finish_parsing(&self) {
        if self.ready_state() != ReadyState::Loading {
            return;
        }
        self.state.ready_state.set(ReadyState::Interactive);

        let callbacks = std::mem::take(&mut *self.state.content_loaded.borrow_mut());
        tracing::debug!(url = %self.state.url, callbacks = callbacks.len(), "DOMContentLoaded");
        for callback in callbacks {
            callback();
        }
    }

    /// Move to `Complete`, finishing parsing first if still loading
    pub fn finish_loading(&self) {
        self.finish_parsing();
        if self.ready_state() != ReadyState::Complete {
            self.state.ready_state.set(ReadyState::Complete);
            tracing::debug!(url = %self.state.url, "load complete");
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("url", &self.state.url)
            .field("ready_state", &self.ready_state())
            .field("nodes", &self.state.arena.try_borrow().map(|a| a.len()).ok())
            .finish()
    }
}
