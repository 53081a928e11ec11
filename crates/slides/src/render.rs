//! HTML serializer for the slide tree.

use crate::tree::{Element, Node};
use slidemd_core::AttrValue;

const VOID_ELEMENTS: &[&str] = &["img", "br", "hr", "input"];

/// Serializes nodes into markup.
pub fn render_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        render_node(node, &mut out);
    }
    out
}

/// Serializes one node into `out`.
pub fn render_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(element) => render_element(element, out),
        Node::Text(text) => push_escaped(out, text),
        Node::Raw(raw) => out.push_str(raw),
        Node::Comment(body) => {
            log::debug!("dropping unprocessed comment <!--{body}-->");
        }
        Node::Image(image) => {
            out.push_str("<img src=\"");
            push_escaped(out, &image.url);
            out.push_str("\" alt=\"");
            push_escaped(out, &image.alt);
            out.push('"');
            if let Some(title) = &image.title {
                out.push_str(" title=\"");
                push_escaped(out, title);
                out.push('"');
            }
            out.push_str(" />");
        }
        Node::Code(code) => {
            out.push_str("<pre><code");
            if let Some(lang) = &code.lang {
                out.push_str(" class=\"language-");
                push_escaped(out, lang);
                out.push('"');
            }
            out.push('>');
            push_escaped(out, &code.value);
            out.push_str("</code></pre>");
        }
        Node::Highlight(handle) => {
            log::warn!("highlight placeholder {:?} was never resolved", handle);
        }
    }
}

fn render_element(element: &Element, out: &mut String) {
    if element.transparent {
        for child in &element.children {
            render_node(child, out);
        }
        return;
    }

    out.push('<');
    out.push_str(&element.tag);
    for (key, value) in element.attrs.iter() {
        if !is_valid_attr_name(key) {
            log::debug!("skipping invalid attribute name '{key}' on <{}>", element.tag);
            continue;
        }
        match value {
            AttrValue::Text(text) => {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                push_escaped(out, text);
                out.push('"');
            }
            AttrValue::Bool(true) => {
                out.push(' ');
                out.push_str(key);
            }
            AttrValue::Bool(false) => {}
        }
    }

    if VOID_ELEMENTS.contains(&element.tag.as_str()) {
        out.push_str(" />");
        return;
    }
    out.push('>');
    for child in &element.children {
        render_node(child, out);
    }
    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

/// Escapes `& < > " '` and template braces.
pub fn push_escaped(out: &mut String, value: &str) {
    let mut rest = value;
    while let Some(pos) = rest.find(['{', '}']) {
        html_escape::encode_quoted_attribute_to_string(&rest[..pos], out);
        out.push_str(if rest.as_bytes()[pos] == b'{' {
            "&#123;"
        } else {
            "&#125;"
        });
        rest = &rest[pos + 1..];
    }
    html_escape::encode_quoted_attribute_to_string(rest, out);
}

fn is_valid_attr_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| {
            !c.is_whitespace() && !c.is_control() && !matches!(c, '"' | '\'' | '>' | '/' | '=' | '<')
        })
}
