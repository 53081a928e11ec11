//! Comment-directive pass.
//!
//! Root-level comments feed the page's [`PageDirectives`]; a comment that is the
//! last child of an element annotates that element. Split markers and `@split`
//! partition directives at the root are left in place for the split pass. Every
//! other comment is dropped.

use super::split::is_layout_comment;
use crate::tree::{Element, Node};
use slidemd_core::{AttributeBag, PageDirectives, parse_annotation};

/// Applies the comments of a page root.
pub fn apply_comments(children: &mut Vec<Node>, directives: &mut PageDirectives) {
    children.retain_mut(|node| match node {
        Node::Comment(body) => {
            if is_layout_comment(body) {
                return true;
            }
            directives.apply_bag(&parse_annotation(body));
            false
        }
        Node::Element(element) => {
            for bag in annotate(element) {
                log::debug!("dropping annotation without a target at page root: {bag:?}");
            }
            true
        }
        _ => true,
    });
}

/// Attaches trailing comments inside `element`.
///
/// Returns the bags a transparent element could not keep; the caller merges
/// them into itself.
fn annotate(element: &mut Element) -> Vec<AttributeBag> {
    let mut pending = Vec::new();
    for child in element.children.iter_mut() {
        if let Node::Element(child) = child {
            pending.extend(annotate(child));
        }
    }

    if let Some(bag) = take_trailing_comment(&mut element.children) {
        pending.push(bag);
    }
    element.children.retain(|node| match node {
        Node::Comment(body) => {
            log::debug!("dropping comment <!--{body}--> inside <{}>", element.tag);
            false
        }
        _ => true,
    });

    if element.transparent {
        return pending;
    }
    for bag in &pending {
        element.attrs.merge_bag(bag);
    }
    Vec::new()
}

/// Removes the last child when it is a comment (trailing whitespace ignored)
/// and returns its parsed annotation.
fn take_trailing_comment(children: &mut Vec<Node>) -> Option<AttributeBag> {
    let last = children.iter().rposition(|node| !node.is_blank_text())?;
    let Node::Comment(body) = &children[last] else {
        return None;
    };
    let bag = parse_annotation(body);
    children.truncate(last);

    if let Some(Node::Text(text)) = children.last_mut() {
        let trimmed = text.trim_end().len();
        text.truncate(trimmed);
        if text.is_empty() {
            children.pop();
        }
    }
    Some(bag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lower::lower;
    use crate::render::render_nodes;
    use slidemd_core::{DirectiveMap, ParseOptions, parse_page};

    fn run(input: &str) -> (String, DirectiveMap) {
        let root = parse_page(input, &ParseOptions::default()).expect("parse");
        let mut nodes = lower(&root);
        let mut directives = PageDirectives::new(DirectiveMap::new());
        apply_comments(&mut nodes, &mut directives);
        (render_nodes(&nodes), directives.resolved())
    }

    #[test]
    fn root_comments_become_directives() {
        let (html, directives) = run("<!-- color:red .lead -->\n\n# Title");
        assert_eq!(html, "<h1>Title</h1>");
        assert_eq!(directives.get_str("color"), Some("red"));
        assert_eq!(directives.get_str("class"), Some("lead"));
    }

    #[test]
    fn trailing_comment_annotates_its_block() {
        let (html, directives) = run("# Title <!-- .big #main data-x=1 -->");
        assert_eq!(html, r#"<h1 data-x="1" class="big" id="main">Title</h1>"#);
        assert!(directives.is_empty());
    }

    #[test]
    fn trailing_comment_in_tight_list_targets_the_item() {
        let (html, _) = run("- one <!-- .a -->\n- two");
        assert_eq!(html, r#"<ul><li class="a">one</li><li>two</li></ul>"#);
    }

    #[test]
    fn class_lists_concatenate_on_merge() {
        let (html, _) = run("> quote <!-- class:x .y -->");
        assert_eq!(html, "<blockquote><p class=\"x y\">quote</p></blockquote>");
    }

    #[test]
    fn inner_comments_are_dropped() {
        let (html, _) = run("a <!-- .x --> b");
        assert_eq!(html, "<p>a  b</p>");
    }

    #[test]
    fn split_markers_stay_for_the_split_pass() {
        let root = parse_page("a\n\n<!-- split:30% -->\n\nb", &ParseOptions::default())
            .expect("parse");
        let mut nodes = lower(&root);
        let mut directives = PageDirectives::new(DirectiveMap::new());
        apply_comments(&mut nodes, &mut directives);
        assert!(matches!(&nodes[1], Node::Comment(body) if body.contains("split")));
        assert!(directives.resolved().get("split").is_none());
    }

    #[test]
    fn partition_directives_do_not_touch_the_page() {
        let root = parse_page("<!-- @split bgColor:red -->\n\na", &ParseOptions::default())
            .expect("parse");
        let mut nodes = lower(&root);
        let mut directives = PageDirectives::new(DirectiveMap::new());
        apply_comments(&mut nodes, &mut directives);
        assert!(matches!(&nodes[0], Node::Comment(body) if body.contains("@split")));
        assert!(directives.resolved().is_empty());
    }
}
