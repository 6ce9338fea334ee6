//! Inputs accepted when building a collection

/// One entry of a selector list
#[derive(Debug, Clone, PartialEq)]
pub enum Entry<N> {
    Selector(String),
    Node(N),
}

/// What a collection can be built from
///
/// Anything else a caller might hand over is [`SelectorInput::Unsupported`]
/// and produces an empty collection.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorInput<N> {
    /// CSS selector, evaluated against the whole document
    Selector(String),
    /// A single element
    Node(N),
    /// An existing sequence of elements, copied in order
    Nodes(Vec<N>),
    /// Mixed list: each selector's matches are concatenated in entry order,
    /// node entries are skipped
    List(Vec<Entry<N>>),
    Unsupported,
}

impl<N> SelectorInput<N> {
    /// List made only of selectors
    pub fn selectors<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(
            selectors
                .into_iter()
                .map(|s| Entry::Selector(s.into()))
                .collect(),
        )
    }
}

impl<N> From<&str> for SelectorInput<N> {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl<N> From<String> for SelectorInput<N> {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl<N> From<&String> for SelectorInput<N> {
    fn from(selector: &String) -> Self {
        Self::Selector(selector.clone())
    }
}

impl<N> From<Vec<Entry<N>>> for SelectorInput<N> {
    fn from(entries: Vec<Entry<N>>) -> Self {
        Self::List(entries)
    }
}

/// One or more class names for `add_class_name`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassNames(Vec<String>);

impl ClassNames {
    pub fn as_refs(&self) -> Vec<&str> {
        self.0.iter().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for ClassNames {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for ClassNames {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<String>> for ClassNames {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<Vec<&str>> for ClassNames {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for ClassNames {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|name| name.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ClassNames {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|name| name.to_string()).collect())
    }
}

/// `"<div>"` -> `"div"`; anything not wrapped in angle brackets is returned
/// unchanged
pub(crate) fn strip_markup(text: &str) -> &str {
    text.strip_prefix('<')
        .and_then(|inner| inner.strip_suffix('>'))
        .unwrap_or(text)
}
