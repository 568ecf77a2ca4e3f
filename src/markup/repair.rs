//! # Lenient Markup Repair
//!
//! Builds a well-formed element tree from markup that may have overlapping or
//! unterminated tags. Nothing is rejected.
//!
//! ## Two Stacks
//!
//! - **open**: elements currently open, innermost last
//! - **pending**: inline elements that were interrupted and must be
//!   re-opened before the next text or inline element
//!
//! Opening a block element closes any inline elements open above the
//! current block and moves copies of them to *pending*; they reopen inside
//! the new block when content arrives:
//!
//! ```text
//! <b>hello<p>world</p>
//!
//! #document
//! ├── b
//! │   └── "hello"
//! └── p
//!     └── b
//!         └── "world"
//! ```
//!
//! A closing tag pops everything opened after its match; inline elements
//! popped on the way are moved to *pending*. A closing tag with no match is
//! ignored and reported.
//!
//! Nesting stops at [`MAX_DEPTH`]: deeper opening tags are dropped and their
//! content lands in the innermost open element, so every tree walk stays
//! within a fixed stack depth.

use tracing::warn;

use super::tokenizer::{Token, Tokenizer, escape};
use crate::error::TagprintError;

/// Elements that structure the document. Everything else is inline.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "body", "caption", "center", "colgroup", "dd", "div",
    "dl", "dt", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "html", "li", "ol", "p",
    "pre", "section", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Deepest element nesting kept in the tree.
pub const MAX_DEPTH: usize = 256;

/// Elements that never have children.
const VOID_ELEMENTS: &[&str] = &["br", "col", "hr", "img", "input", "meta", "link"];

pub fn is_block(name: &str) -> bool {
    BLOCK_ELEMENTS.contains(&name)
}

pub fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Element tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Attribute value by (lower-case) name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Concatenated text of the subtree.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) if e.name == "br" => out.push('\n'),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    /// A childless copy (name and attributes) for re-opening.
    fn shallow(&self) -> Self {
        Self {
            name: self.name.clone(),
            attrs: self.attrs.clone(),
            children: Vec::new(),
        }
    }

    /// Serialize the children as well-formed HTML.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            write_node(child, &mut out);
        }
        out
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) => out.push_str(&escape(t)),
        Node::Element(e) => {
            out.push('<');
            out.push_str(&e.name);
            for (k, v) in &e.attrs {
                out.push_str(&format!(" {}=\"{}\"", k, escape(v)));
            }
            if is_void(&e.name) {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in &e.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&e.name);
            out.push('>');
        }
    }
}

/// Repaired tree plus the closing tags that had to be ignored.
#[derive(Debug)]
pub struct RepairedMarkup {
    pub root: Element,
    pub issues: Vec<TagprintError>,
}

impl RepairedMarkup {
    pub fn to_html(&self) -> String {
        self.root.inner_html()
    }
}

/// Parse and repair `input`.
pub fn repair(input: &str) -> RepairedMarkup {
    let mut builder = TreeBuilder::new();
    let mut tokens = Tokenizer::new(input).peekable();

    while let Some(token) = tokens.next() {
        match token {
            Token::Text(text) => builder.text(text),
            Token::OpeningTagStart => {
                let Some(Token::Name(name)) = tokens.next() else {
                    continue;
                };
                let mut element = Element::new(name);
                let mut self_closing = false;
                while let Some(t) = tokens.next() {
                    match t {
                        Token::Name(attr) => {
                            let value = match tokens.peek() {
                                Some(Token::Atom(_)) => match tokens.next() {
                                    Some(Token::Atom(v)) => v,
                                    _ => String::new(),
                                },
                                _ => String::new(),
                            };
                            element.attrs.push((attr, value));
                        }
                        Token::EmptyTagEnd => {
                            self_closing = true;
                            break;
                        }
                        Token::TagEnd | Token::Eof => break,
                        _ => {}
                    }
                }
                builder.open(element, self_closing);
            }
            Token::ClosingTagStart => {
                let Some(Token::Name(name)) = tokens.next() else {
                    continue;
                };
                // Skip to the end of the closing tag
                for t in tokens.by_ref() {
                    if matches!(t, Token::TagEnd | Token::EmptyTagEnd | Token::Eof) {
                        break;
                    }
                }
                builder.close(&name);
            }
            Token::Comment(_) | Token::TagEnd | Token::EmptyTagEnd => {}
            Token::Name(_) | Token::Atom(_) => {}
            Token::Eof => break,
        }
    }

    builder.finish()
}

struct TreeBuilder {
    open: Vec<Element>,
    pending: Vec<Element>,
    issues: Vec<TagprintError>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            open: vec![Element::new("#document")],
            pending: Vec::new(),
            issues: Vec::new(),
        }
    }

    fn top(&mut self) -> &mut Element {
        let last = self.open.len() - 1;
        &mut self.open[last]
    }

    /// Close the innermost open element into its parent and return a
    /// childless copy of it.
    fn pop(&mut self) -> Element {
        let element = match self.open.pop() {
            Some(e) => e,
            None => Element::new("#document"),
        };
        if self.open.is_empty() {
            self.open.push(Element::new("#document"));
        }
        let copy = element.shallow();
        self.top().children.push(Node::Element(element));
        copy
    }

    /// Like [`Self::pop`], but an element interrupted before it got any
    /// content is dropped instead of left behind empty.
    fn interrupt(&mut self) -> Element {
        let empty = self.open.last().is_some_and(|e| e.children.is_empty());
        if empty
            && self.open.len() > 1
            && let Some(element) = self.open.pop()
        {
            return element;
        }
        self.pop()
    }

    fn open_pending(&mut self) {
        for element in std::mem::take(&mut self.pending) {
            if self.open.len() > MAX_DEPTH {
                break;
            }
            self.open.push(element);
        }
    }

    fn text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        if !text.trim().is_empty() {
            self.open_pending();
        }
        let top = self.top();
        match top.children.last_mut() {
            Some(Node::Text(prev)) => prev.push_str(&text),
            _ => top.children.push(Node::Text(text)),
        }
    }

    fn open(&mut self, element: Element, self_closing: bool) {
        if is_block(&element.name) {
            // Interrupt inline elements open above the nearest block
            let mut interrupted = Vec::new();
            while self.open.len() > 1 && !is_block(&self.top().name) {
                interrupted.push(self.interrupt());
            }
            interrupted.reverse();
            interrupted.append(&mut self.pending);
            self.pending = interrupted;
        } else {
            self.open_pending();
        }

        if self_closing || is_void(&element.name) {
            self.top().children.push(Node::Element(element));
        } else if self.open.len() > MAX_DEPTH {
            warn!(tag = %element.name, depth = MAX_DEPTH, "nesting too deep, tag dropped");
        } else {
            self.open.push(element);
        }
    }

    fn close(&mut self, name: &str) {
        if is_void(name) {
            return;
        }
        if let Some(i) = self.pending.iter().rposition(|e| e.name == name) {
            self.pending.remove(i);
            return;
        }
        let Some(index) = self.open.iter().skip(1).rposition(|e| e.name == name) else {
            warn!(tag = %name, "unmatched closing tag ignored");
            self.issues.push(TagprintError::MarkupUnbalanced {
                tag: name.to_string(),
            });
            return;
        };
        let index = index + 1;

        let mut reopen = Vec::new();
        while self.open.len() > index + 1 {
            let popped = self.pop();
            if !is_block(&popped.name) {
                reopen.push(popped);
            }
        }
        self.pop();
        reopen.reverse();
        self.pending.extend(reopen);
    }

    fn finish(mut self) -> RepairedMarkup {
        while self.open.len() > 1 {
            self.pop();
        }
        let root = match self.open.pop() {
            Some(root) => root,
            None => Element::new("#document"),
        };
        RepairedMarkup {
            root,
            issues: self.issues,
        }
    }
}
