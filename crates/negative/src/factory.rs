//! `select` - the entry point
//!
//! A single selector (or markup-looking string such as `"<div>"`) gives one
//! collection, a selector list gives one collection per selector, an existing
//! collection is passed through untouched.

use std::fmt;

use crate::collection::ElementCollection;
use crate::error::{Error, Result};
use crate::host::Host;
use crate::input::{strip_markup, Entry, SelectorInput};

/// Argument to [`select`]
pub enum Query<H: Host> {
    Input(SelectorInput<H::Node>),
    Collection(ElementCollection<H>),
}

/// Result of [`select`]
pub enum Selected<H: Host> {
    One(ElementCollection<H>),
    Many(Vec<ElementCollection<H>>),
}

impl<H: Host> Selected<H> {
    pub fn one(self) -> Option<ElementCollection<H>> {
        match self {
            Selected::One(collection) => Some(collection),
            Selected::Many(_) => None,
        }
    }

    /// Every collection, a single one included
    pub fn into_vec(self) -> Vec<ElementCollection<H>> {
        match self {
            Selected::One(collection) => vec![collection],
            Selected::Many(collections) => collections,
        }
    }
}

impl<H: Host> PartialEq for Selected<H> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Selected::One(a), Selected::One(b)) => a == b,
            (Selected::Many(a), Selected::Many(b)) => a == b,
            _ => false,
        }
    }
}

impl<H: Host> fmt::Debug for Selected<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selected::One(collection) => f.debug_tuple("One").field(collection).finish(),
            Selected::Many(collections) => f.debug_tuple("Many").field(collections).finish(),
        }
    }
}

pub fn select<H: Host>(host: &H, query: impl Into<Query<H>>) -> Result<Selected<H>> {
    match query.into() {
        Query::Collection(collection) => Ok(Selected::One(collection)),
        Query::Input(SelectorInput::Selector(text)) => Ok(Selected::One(ElementCollection::new(
            host,
            strip_markup(&text),
        ))),
        Query::Input(SelectorInput::List(entries)) => {
            if entries.is_empty() {
                return Err(Error::EmptySelectorList);
            }
            entries
                .into_iter()
                .enumerate()
                .map(|(index, entry)| match entry {
                    Entry::Selector(selector) => Ok(ElementCollection::new(host, selector)),
                    Entry::Node(_) => Err(Error::InvalidSelector { index }),
                })
                .collect::<Result<Vec<_>>>()
                .map(Selected::Many)
        }
        // a sequence of nodes is a list without a single selector in it
        Query::Input(SelectorInput::Nodes(nodes)) if nodes.is_empty() => {
            Err(Error::EmptySelectorList)
        }
        Query::Input(SelectorInput::Nodes(_)) => Err(Error::InvalidSelector { index: 0 }),
        Query::Input(input) => Ok(Selected::One(ElementCollection::new(host, input))),
    }
}

impl<H: Host> From<ElementCollection<H>> for Query<H> {
    fn from(collection: ElementCollection<H>) -> Self {
        Query::Collection(collection)
    }
}

impl<H: Host> From<SelectorInput<H::Node>> for Query<H> {
    fn from(input: SelectorInput<H::Node>) -> Self {
        Query::Input(input)
    }
}

impl<H: Host> From<&str> for Query<H> {
    fn from(selector: &str) -> Self {
        Query::Input(selector.into())
    }
}

impl<H: Host> From<String> for Query<H> {
    fn from(selector: String) -> Self {
        Query::Input(selector.into())
    }
}

impl<H: Host> From<Vec<Entry<H::Node>>> for Query<H> {
    fn from(entries: Vec<Entry<H::Node>>) -> Self {
        Query::Input(SelectorInput::List(entries))
    }
}
