//! Page assembly: the `<section class="slide">` wrapper of a finished page.

use crate::tree::{Element, Node};
use crate::types::SplitInfo;
use slidemd_core::DirectiveMap;

/// Directive keys mapped onto CSS variables of the page section.
const BACKGROUND_VARIABLES: &[(&str, &str)] = &[
    ("bgImg", "--bg-img"),
    ("bgColor", "--bg-color"),
    ("bgSize", "--bg-size"),
    ("bgPosition", "--bg-pos"),
    ("bgRepeat", "--bg-repeat"),
    ("bgOpacity", "--bg-opacity"),
];

/// Leading class of a page section.
const PAGE_CLASS: &str = "slide";

/// Leading class of a partition section.
const PARTITION_CLASS: &str = "split-contents";

/// Class and style of a page section or of one of its partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFrame {
    /// Space-separated class list, starting with `slide` (`split-contents` for
    /// a partition).
    pub class_name: String,
    /// Inline style, absent when nothing contributes to it.
    pub style: Option<String>,
    /// Value of the `id` directive.
    pub id: Option<String>,
}

impl PageFrame {
    /// Derives the frame of a page from its resolved directives.
    pub fn from_directives(directives: &DirectiveMap, split: &SplitInfo) -> Self {
        Self::build(PAGE_CLASS, directives, split)
    }

    /// Derives the frame of a `section.split-contents` from its `@split`
    /// directives. Partitions carry no split variables.
    pub fn for_partition(directives: &DirectiveMap) -> Self {
        Self::build(PARTITION_CLASS, directives, &SplitInfo::default())
    }

    fn build(base: &str, directives: &DirectiveMap, split: &SplitInfo) -> Self {
        let mut classes = vec![base];
        if let Some(class) = directives.get_str("class") {
            classes.extend(class.split_whitespace());
        }
        if split.enabled {
            classes.push("split");
        }
        if has_background(directives) {
            classes.push("bg");
        }

        Self {
            class_name: classes.join(" "),
            style: page_style(directives, split),
            id: directives
                .get_str("id")
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        }
    }

    /// Wraps page content in its section.
    pub fn wrap(&self, page: usize, children: Vec<Node>) -> Node {
        let mut section = Element::new("section").with_attr("class", self.class_name.as_str());
        if let Some(id) = &self.id {
            section = section.with_attr("id", id.as_str());
        }
        section = section.with_attr("data-page", page.to_string());
        if let Some(style) = &self.style {
            section = section.with_attr("style", style.as_str());
        }
        section.with_children(children).into_node()
    }
}

fn has_background(directives: &DirectiveMap) -> bool {
    directives.is_enabled("bgImg") || directives.is_enabled("bgColor")
}

fn page_style(directives: &DirectiveMap, split: &SplitInfo) -> Option<String> {
    let mut parts = Vec::new();

    if let Some(style) = directives.get_str("style") {
        let style = style.trim().trim_end_matches(';').trim_end();
        if !style.is_empty() {
            parts.push(style.to_string());
        }
    }
    if let Some(color) = non_empty(directives, "color") {
        parts.push(format!("color: {color}"));
    }
    for (key, variable) in BACKGROUND_VARIABLES {
        if let Some(value) = non_empty(directives, key) {
            parts.push(format!("{variable}: {value}"));
        }
    }
    if split.enabled
        && let Some(size) = &split.size
    {
        let variable = if split.vertical { "--split-row" } else { "--split-col" };
        parts.push(format!("{variable}: {size}"));
    }

    (!parts.is_empty()).then(|| parts.join("; "))
}

fn non_empty<'a>(directives: &'a DirectiveMap, key: &str) -> Option<&'a str> {
    directives.get_str(key).filter(|value| !value.is_empty())
}

/// Speaker note of a page.
pub fn page_note(directives: &DirectiveMap) -> Option<String> {
    non_empty(directives, "note").map(str::to_string)
}
