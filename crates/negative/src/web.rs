//! Host backed by the browser DOM through `web-sys`
//!
//! Listeners are leaked into JS with `Closure::forget`; the page owns them
//! from then on.

use negative_dom::utils::css_property_name;
use thiserror::Error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::host::{Host, Listener};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct WebError(String);

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        Self(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

/// Handle to the page's `document`
#[derive(Debug, Clone)]
pub struct WebHost {
    document: Document,
}

impl WebHost {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// `window.document`, when running in a browser window
    pub fn from_window() -> Option<Self> {
        web_sys::window()?.document().map(Self::new)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl Host for WebHost {
    type Node = Element;
    type Event = web_sys::Event;
    type Error = WebError;

    fn query_selector_all(
        &self,
        scope: Option<&Element>,
        selector: &str,
    ) -> Result<Vec<Element>, WebError> {
        let list = match scope {
            Some(element) => element.query_selector_all(selector)?,
            None => self.document.query_selector_all(selector)?,
        };
        Ok((0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect())
    }

    fn create_element(&self, tag: &str) -> Result<Element, WebError> {
        Ok(self.document.create_element(tag)?)
    }

    fn parent_element(&self, node: &Element) -> Result<Option<Element>, WebError> {
        Ok(node.parent_element())
    }

    fn inner_html(&self, node: &Element) -> Result<String, WebError> {
        Ok(node.inner_html())
    }

    fn set_text_content(&self, node: &Element, text: &str) -> Result<(), WebError> {
        node.set_text_content(Some(text));
        Ok(())
    }

    fn set_style_property(&self, node: &Element, property: &str, value: &str) -> Result<(), WebError> {
        let element = node
            .dyn_ref::<HtmlElement>()
            .ok_or_else(|| WebError(format!("<{}> has no inline style", node.tag_name())))?;
        element
            .style()
            .set_property(&css_property_name(property), value)?;
        Ok(())
    }

    fn add_classes(&self, node: &Element, class_names: &[&str]) -> Result<(), WebError> {
        let class_list = node.class_list();
        for name in class_names {
            class_list.add_1(name)?;
        }
        Ok(())
    }

    fn remove_class(&self, node: &Element, class_name: &str) -> Result<(), WebError> {
        Ok(node.class_list().remove_1(class_name)?)
    }

    fn get_attribute(&self, node: &Element, name: &str) -> Result<Option<String>, WebError> {
        Ok(node.get_attribute(name))
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) -> Result<(), WebError> {
        Ok(node.set_attribute(name, value)?)
    }

    fn append_child(&self, parent: &Element, child: &Element) -> Result<(), WebError> {
        parent.append_child(child)?;
        Ok(())
    }

    fn prepend_child(&self, parent: &Element, child: &Element) -> Result<(), WebError> {
        Ok(parent.prepend_with_node_1(child)?)
    }

    fn remove(&self, node: &Element) -> Result<(), WebError> {
        node.remove();
        Ok(())
    }

    fn add_event_listener(
        &self,
        node: &Element,
        event: &str,
        listener: Listener<web_sys::Event>,
    ) -> Result<(), WebError> {
        let closure = Closure::wrap(Box::new(move |event: web_sys::Event| listener(&event))
            as Box<dyn FnMut(web_sys::Event)>);
        node.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn is_loading(&self) -> bool {
        self.document.ready_state() == "loading"
    }

    fn on_content_loaded(&self, callback: Box<dyn FnOnce()>) {
        let closure = Closure::once_into_js(callback);
        if let Err(err) = self
            .document
            .add_event_listener_with_callback("DOMContentLoaded", closure.unchecked_ref())
        {
            tracing::error!(error = %WebError::from(err), "DOMContentLoaded listener rejected");
        }
    }
}
