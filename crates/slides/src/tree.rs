//! Owned slide tree.
//!
//! The mdast produced by markdown-rs is lowered once into this tree (see
//! [`crate::lower`]); every pass after that rewrites the tree in place and the
//! serializer in [`crate::render`] turns it into markup.

use serde::Serialize;
use slidemd_core::{AttrValue, Attributes};

/// One node of the slide tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An HTML element.
    Element(Element),
    /// Text, escaped on output.
    Text(String),
    /// Trusted markup, written verbatim.
    Raw(String),
    /// An HTML comment; holds the body between `<!--` and `-->`.
    Comment(String),
    /// A Markdown image not yet classified by the image pass.
    Image(Image),
    /// A fenced or indented code block not yet wrapped by the code pass.
    Code(Code),
    /// Placeholder for highlighted markup, replaced once highlighting finishes.
    Highlight(HighlightHandle),
}

/// An HTML element with ordered attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Tag name.
    pub tag: String,
    /// Attributes in output order.
    pub attrs: Attributes,
    /// Child nodes.
    pub children: Vec<Node>,
    /// Renders only its children (paragraphs of tight lists).
    pub transparent: bool,
}

/// A Markdown image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Raw alt text, including any annotation tokens.
    pub alt: String,
    /// Optional title.
    pub title: Option<String>,
}

/// A code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    /// Source text.
    pub value: String,
    /// Language tag.
    pub lang: Option<String>,
    /// Fence meta string after the language tag.
    pub meta: Option<String>,
}

/// Stable identity of a pending highlight request within one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HighlightHandle(pub usize);

impl Element {
    /// Creates an element without attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Sets an attribute.
    pub fn with_attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(key, AttrValue::text(value));
        self
    }

    /// Sets a flag attribute.
    pub fn with_flag(mut self, key: &str) -> Self {
        self.attrs.insert(key, AttrValue::Bool(true));
        self
    }

    /// Appends class names.
    pub fn with_class(mut self, class: &str) -> Self {
        self.attrs.add_class(class);
        self
    }

    /// Replaces the children.
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Marks the element transparent.
    pub fn transparent(mut self) -> Self {
        self.transparent = true;
        self
    }

    /// Wraps the element in a [`Node`].
    pub fn into_node(self) -> Node {
        Node::Element(self)
    }
}

impl Node {
    /// Text node shorthand.
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    /// Raw markup shorthand.
    pub fn raw(value: impl Into<String>) -> Self {
        Node::Raw(value.into())
    }

    /// Returns the element, if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// True for text made only of whitespace.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(text) if text.trim().is_empty())
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut buffer = String::new();
        collect_text(self, &mut buffer);
        buffer
    }
}

fn collect_text(node: &Node, buffer: &mut String) {
    match node {
        Node::Text(text) => buffer.push_str(text),
        Node::Element(element) => {
            for child in &element.children {
                collect_text(child, buffer);
            }
        }
        Node::Code(code) => buffer.push_str(&code.value),
        _ => {}
    }
}

/// Visits every element in `nodes`, parents before children.
pub fn walk_elements_mut(nodes: &mut [Node], visit: &mut impl FnMut(&mut Element)) {
    for node in nodes {
        if let Node::Element(element) = node {
            visit(element);
            walk_elements_mut(&mut element.children, visit);
        }
    }
}

/// Finds the first element with `tag`, depth first.
pub fn find_element<'a>(nodes: &'a [Node], tag: &str) -> Option<&'a Element> {
    nodes.iter().find_map(|node| {
        let element = node.as_element()?;
        if element.tag == tag {
            Some(element)
        } else {
            find_element(&element.children, tag)
        }
    })
}
