//! Code pass: diagram containers and highlight placeholders.

use crate::highlight::{HighlightRequest, PLAINTEXT};
use crate::tree::{Code, Element, HighlightHandle, Node};
use slidemd_core::parse_annotation;

/// Wraps code blocks and queues highlight requests for one page.
#[derive(Debug)]
pub struct CodePass<'a> {
    diagram_languages: &'a [String],
    requests: Vec<HighlightRequest>,
}

impl<'a> CodePass<'a> {
    /// New pass; blocks tagged with one of `diagram_languages` skip highlighting.
    pub fn new(diagram_languages: &'a [String]) -> Self {
        Self {
            diagram_languages,
            requests: Vec::new(),
        }
    }

    /// Rewrites every code block under `nodes`.
    pub fn apply(&mut self, nodes: &mut [Node]) {
        for node in nodes {
            match node {
                Node::Code(code) => {
                    let code = std::mem::replace(code, empty_code());
                    *node = self.wrap(code);
                }
                Node::Element(element) => self.apply(&mut element.children),
                _ => {}
            }
        }
    }

    /// Queued requests, in document order.
    pub fn into_requests(self) -> Vec<HighlightRequest> {
        self.requests
    }

    fn wrap(&mut self, code: Code) -> Node {
        let meta = code.meta.as_deref().unwrap_or_default();
        let annotation = parse_annotation(meta);
        let lang = code
            .lang
            .filter(|lang| !lang.is_empty())
            .unwrap_or_else(|| PLAINTEXT.to_string());

        if self.diagram_languages.iter().any(|diagram| *diagram == lang) {
            log::debug!("{lang} block rendered as diagram");
            let mut pre = Element::new("pre").with_class(&lang);
            pre.attrs.merge_bag(&annotation);
            return pre.with_children(vec![Node::Text(code.value)]).into_node();
        }

        let handle = HighlightHandle(self.requests.len());
        let mut container = Element::new("div")
            .with_class("code-container")
            .with_class(&format!("language-{lang}"));
        container.attrs.merge_bag(&annotation);
        let container = container.with_children(vec![
            Node::raw(r#"<button class="copy"></button>"#),
            Element::new("span")
                .with_class("lang")
                .with_children(vec![Node::text(lang.as_str())])
                .into_node(),
            Node::Highlight(handle),
        ]);

        self.requests.push(HighlightRequest {
            handle,
            code: code.value,
            lang,
        });
        container.into_node()
    }
}

fn empty_code() -> Code {
    Code {
        value: String::new(),
        lang: None,
        meta: None,
    }
}
