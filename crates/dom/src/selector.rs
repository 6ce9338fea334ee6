//! Selector subset used by `query_selector_all`
//!
//! Supported grammar:
//!
//! ```text
//! list      := complex ("," complex)*
//! complex   := compound ((" " | ">") compound)*
//! compound  := (tag | "*")? ("#" id | "." class | "[" attr "]")*
//! attr      := name (("=" | "~=" | "^=" | "$=" | "*=") value)?
//! ```
//!
//! Matching runs right to left against the whole document, so a scoped query
//! may match ancestors that live outside the scope, as in the browser.

use std::str::FromStr;

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId};

/// A parsed, comma-separated selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ComplexSelector {
    /// Left to right; `parts[0].combinator` is always `None`
    parts: Vec<SelectorPart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectorPart {
    compound: CompoundSelector,
    /// Relation to the part on the left
    combinator: Option<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CompoundSelector {
    tag: Option<String>,
    universal: bool,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Includes,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrCondition {
    name: String,
    op: AttrOp,
    value: String,
}

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self> {
        Parser::new(input).parse_list()
    }

    /// Whether the node is an element matched by any selector in the list
    pub fn matches(&self, arena: &DomArena, node_id: NodeId) -> bool {
        self.selectors.iter().any(|selector| {
            let last = selector.parts.len() - 1;
            selector.matches_at(arena, node_id, last)
        })
    }
}

impl FromStr for SelectorList {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl ComplexSelector {
    fn matches_at(&self, arena: &DomArena, node_id: NodeId, idx: usize) -> bool {
        let part = &self.parts[idx];
        let Ok(node) = arena.get(node_id) else {
            return false;
        };
        if !part.compound.matches(node) {
            return false;
        }
        if idx == 0 {
            return true;
        }

        let parent_of = |id: NodeId| arena.parent_element(id).ok().flatten();
        match part.combinator.unwrap_or(Combinator::Descendant) {
            Combinator::Child => {
                parent_of(node_id).is_some_and(|parent| self.matches_at(arena, parent, idx - 1))
            }
            Combinator::Descendant => {
                let mut cursor = parent_of(node_id);
                while let Some(ancestor) = cursor {
                    if self.matches_at(arena, ancestor, idx - 1) {
                        return true;
                    }
                    cursor = parent_of(ancestor);
                }
                false
            }
        }
    }
}

impl CompoundSelector {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && !self.universal
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
    }

    fn matches(&self, node: &DomNode) -> bool {
        let Some(tag) = node.tag_name() else {
            return false;
        };
        if let Some(expected) = &self.tag {
            if !tag.eq_ignore_ascii_case(expected) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_attr = node.attr("class").unwrap_or("");
            if !self
                .classes
                .iter()
                .all(|class| class_attr.split_whitespace().any(|c| c == class))
            {
                return false;
            }
        }
        self.attrs.iter().all(|cond| cond.matches(node))
    }
}

impl AttrCondition {
    fn matches(&self, node: &DomNode) -> bool {
        let Some(actual) = node.attr(&self.name) else {
            return false;
        };
        let expected = self.value.as_str();
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => actual == expected,
            AttrOp::Includes => actual.split_whitespace().any(|token| token == expected),
            AttrOp::Prefix => !expected.is_empty() && actual.starts_with(expected),
            AttrOp::Suffix => !expected.is_empty() && actual.ends_with(expected),
            AttrOp::Substring => !expected.is_empty() && actual.contains(expected),
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self) -> DomError {
        DomError::InvalidSelector(self.source.to_string())
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn parse_list(mut self) -> Result<SelectorList> {
        let mut selectors = Vec::new();
        loop {
            selectors.push(self.parse_complex()?);
            match self.bump() {
                None => break,
                Some(',') => continue,
                Some(_) => return Err(self.error()),
            }
        }
        Ok(SelectorList { selectors })
    }

    /// Stops before a top-level `,` or at the end of input
    fn parse_complex(&mut self) -> Result<ComplexSelector> {
        let mut parts: Vec<SelectorPart> = Vec::new();
        let mut pending: Option<Combinator> = None;

        loop {
            self.skip_whitespace();
            match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    if parts.is_empty() || pending.is_some() {
                        return Err(self.error());
                    }
                    self.pos += 1;
                    pending = Some(Combinator::Child);
                }
                Some(_) => {
                    let compound = self.parse_compound()?;
                    let combinator = if parts.is_empty() {
                        None
                    } else {
                        Some(pending.take().unwrap_or(Combinator::Descendant))
                    };
                    parts.push(SelectorPart {
                        compound,
                        combinator,
                    });
                }
            }
        }

        if parts.is_empty() || pending.is_some() {
            return Err(self.error());
        }
        Ok(ComplexSelector { parts })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector> {
        let mut compound = CompoundSelector::default();

        while let Some(c) = self.peek() {
            match c {
                c if c.is_whitespace() || c == '>' || c == ',' => break,
                '*' => {
                    if !compound.is_empty() {
                        return Err(self.error());
                    }
                    self.pos += 1;
                    compound.universal = true;
                }
                '#' => {
                    self.pos += 1;
                    let id = self.parse_ident()?;
                    if compound.id.replace(id).is_some() {
                        return Err(self.error());
                    }
                }
                '.' => {
                    self.pos += 1;
                    let class = self.parse_ident()?;
                    compound.classes.push(class);
                }
                '[' => {
                    self.pos += 1;
                    let cond = self.parse_attr()?;
                    compound.attrs.push(cond);
                }
                c if is_ident_char(c) => {
                    if !compound.is_empty() {
                        return Err(self.error());
                    }
                    compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
                }
                _ => return Err(self.error()),
            }
        }

        if compound.is_empty() {
            return Err(self.error());
        }
        Ok(compound)
    }

    fn parse_ident(&mut self) -> Result<String> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error());
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    /// After the opening `[`, through the closing `]`
    fn parse_attr(&mut self) -> Result<AttrCondition> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let op = match self.bump() {
            Some(']') => {
                return Ok(AttrCondition {
                    name,
                    op: AttrOp::Exists,
                    value: String::new(),
                })
            }
            Some('=') => AttrOp::Equals,
            Some(c @ ('~' | '^' | '$' | '*')) => {
                if self.bump() != Some('=') {
                    return Err(self.error());
                }
                match c {
                    '~' => AttrOp::Includes,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    _ => AttrOp::Substring,
                }
            }
            _ => return Err(self.error()),
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return Err(self.error());
                }
                let value: String = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                value
            }
            _ => self.parse_ident()?,
        };

        self.skip_whitespace();
        if self.bump() != Some(']') {
            return Err(self.error());
        }
        Ok(AttrCondition { name, op, value })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}
