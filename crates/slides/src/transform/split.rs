//! Split-layout pass.
//!
//! `<!-- split[:SIZE][ vertical] -->` at the page root closes the partition
//! above it and gives that partition its grid size. The content after the last
//! marker forms a final `1fr` partition.
//!
//! `<!-- @split bgColor:red .x -->` styles the partition it is written in. These
//! directives never reach the page and never carry over.

use crate::page::PageFrame;
use crate::tree::{Element, Node};
use slidemd_core::{
    AttributeBag, DirectiveMap, PageDirectives, Token, parse_annotation, tokenize,
};

/// Grid size of a partition without an explicit size.
pub const DEFAULT_SIZE: &str = "1fr";

/// Leading token of a partition directive comment.
pub const PARTITION_SIGIL: &str = "@split";

/// A parsed split marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitMarker {
    /// Grid size of the partition the marker closes.
    pub size: String,
    /// Stack partitions vertically.
    pub vertical: bool,
}

/// Parses a comment body as a split marker.
pub fn parse_split_marker(body: &str) -> Option<SplitMarker> {
    let mut tokens = tokenize(body).into_iter();
    let size = match tokens.next()? {
        Token::Pair { key: "split", value } => value.unwrap_or(DEFAULT_SIZE).to_string(),
        _ => return None,
    };
    let vertical = tokens.any(|token| matches!(token, Token::Pair { key: "vertical", .. }));
    Some(SplitMarker { size, vertical })
}

/// Parses a comment body as a partition directive.
pub fn parse_partition_directive(body: &str) -> Option<AttributeBag> {
    let rest = body.trim_start().strip_prefix(PARTITION_SIGIL)?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(parse_annotation(rest))
}

/// True for root comments consumed by this pass.
pub fn is_layout_comment(body: &str) -> bool {
    parse_split_marker(body).is_some() || parse_partition_directive(body).is_some()
}

/// Content between two split markers.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// Grid size token.
    pub size: String,
    /// Top-level nodes of the partition.
    pub children: Vec<Node>,
    /// Directives from `@split` comments inside the partition.
    pub directives: DirectiveMap,
}

impl Partition {
    fn close(size: String, children: Vec<Node>, bags: Vec<AttributeBag>) -> Self {
        let mut directives = PageDirectives::new(DirectiveMap::new());
        for bag in &bags {
            directives.apply_bag(bag);
        }
        Self {
            size,
            children,
            directives: directives.resolved(),
        }
    }

    fn into_section(self) -> Node {
        let frame = PageFrame::for_partition(&self.directives);
        let mut section = Element::new("section").with_attr("class", frame.class_name);
        if let Some(id) = frame.id {
            section = section.with_attr("id", id);
        }
        section = section.with_attr("data-size", self.size);
        if let Some(style) = frame.style {
            section = section.with_attr("style", style);
        }
        section.with_children(self.children).into_node()
    }
}

/// Partitions of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitLayout {
    /// Ordered partitions; a single implicit one when the page has no marker.
    pub partitions: Vec<Partition>,
    /// True when at least one marker was found.
    pub enabled: bool,
    /// True when any marker asked for vertical stacking.
    pub vertical: bool,
}

impl SplitLayout {
    /// Splits top-level nodes at root split markers. Marker and partition
    /// directive nodes are dropped.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let mut layout = SplitLayout {
            partitions: Vec::new(),
            enabled: false,
            vertical: false,
        };
        let mut current = Vec::new();
        let mut bags = Vec::new();

        for node in nodes {
            if let Node::Comment(body) = &node {
                if let Some(marker) = parse_split_marker(body) {
                    layout.enabled = true;
                    layout.vertical |= marker.vertical;
                    layout.partitions.push(Partition::close(
                        marker.size,
                        std::mem::take(&mut current),
                        std::mem::take(&mut bags),
                    ));
                    continue;
                }
                if let Some(bag) = parse_partition_directive(body) {
                    bags.push(bag);
                    continue;
                }
            }
            current.push(node);
        }

        if !layout.enabled && !bags.is_empty() {
            log::debug!(
                "ignoring {} partition directive(s) on a page without split markers",
                bags.len()
            );
        }
        layout
            .partitions
            .push(Partition::close(DEFAULT_SIZE.to_string(), current, bags));
        layout
    }

    /// Space-separated size tokens, one per partition.
    pub fn size_string(&self) -> String {
        self.partitions
            .iter()
            .map(|partition| partition.size.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Flattens the layout back into page nodes: one `section.split-contents`
    /// per partition when enabled, the bare content otherwise.
    pub fn into_nodes(self) -> Vec<Node> {
        if !self.enabled {
            return self
                .partitions
                .into_iter()
                .flat_map(|partition| partition.children)
                .collect();
        }
        self.partitions
            .into_iter()
            .map(Partition::into_section)
            .collect()
    }
}
