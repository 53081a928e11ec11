//! markdown-rs adapter for page bodies.

use crate::{SlideError, SourceLocation};
use markdown::mdast::Node;
use markdown::message::{Message, Place};

/// Parser options for building markdown-rs parse options.
#[derive(Clone, Copy, Debug)]
pub struct ParseOptions {
    /// Enable GitHub Flavored Markdown constructs.
    pub gfm: bool,
    /// Enable indented code blocks.
    pub code_indented: bool,
    /// Keep raw HTML (and therefore annotation comments) as `Html` nodes.
    pub raw_html: bool,
}

impl ParseOptions {
    /// Slide defaults: GFM on, raw HTML kept so comments survive parsing.
    pub const fn slides() -> Self {
        Self {
            gfm: true,
            code_indented: true,
            raw_html: true,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        // Frontmatter is split off before pages are parsed; a `---` block in a
        // page body must not turn into yaml.
        let mut constructs = markdown::Constructs {
            frontmatter: false,
            code_indented: self.code_indented,
            html_flow: self.raw_html,
            html_text: self.raw_html,
            ..Default::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_footnote_definition = true;
            constructs.gfm_label_start_footnote = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        markdown::ParseOptions {
            constructs,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::slides()
    }
}

/// Parse one page body into an MDAST root.
pub fn parse_page(input: &str, options: &ParseOptions) -> Result<Node, SlideError> {
    parse_mdast_with_options(input, &options.to_markdown())
}

/// Parse markdown into an MDAST tree using markdown-rs `ParseOptions`.
pub fn parse_mdast_with_options(
    input: &str,
    options: &markdown::ParseOptions,
) -> Result<Node, SlideError> {
    markdown::to_mdast(input, options)
        .map_err(|err| SlideError::markdown(err.to_string(), message_location(&err)))
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_children(input: &str) -> Vec<Node> {
        let root = parse_page(input, &ParseOptions::default()).expect("parse");
        root.children().cloned().unwrap_or_default()
    }

    #[test]
    fn comments_are_html_nodes() {
        let children = root_children("<!-- color:red -->\n\n# Title");
        assert!(matches!(&children[0], Node::Html(html) if html.value == "<!-- color:red -->"));
        assert!(matches!(&children[1], Node::Heading(h) if h.depth == 1));
    }

    #[test]
    fn inline_comment_stays_in_paragraph() {
        let children = root_children("Text <!-- .big -->");
        let Node::Paragraph(p) = &children[0] else {
            panic!("expected paragraph, got {:?}", children[0]);
        };
        assert!(matches!(p.children.last(), Some(Node::Html(_))));
    }

    #[test]
    fn dashes_do_not_become_frontmatter() {
        let children = root_children("---\ntitle: x\n---");
        assert!(!children.iter().any(|n| matches!(n, Node::Yaml(_))));
    }

    #[test]
    fn gfm_tables_parse() {
        let children = root_children("| a | b |\n| - | - |\n| 1 | 2 |");
        assert!(matches!(&children[0], Node::Table(_)));
    }
}
