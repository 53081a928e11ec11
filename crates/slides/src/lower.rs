//! Lowers a markdown-rs mdast into the slide tree.

use crate::tree::{Code, Element, Image, Node};
use markdown::mdast;
use std::collections::HashMap;

/// Lowers a parsed page root into slide nodes.
///
/// Link and image references are resolved through the page's definitions;
/// referenced footnotes are collected into a trailing `section.footnotes`.
pub fn lower(root: &mdast::Node) -> Vec<Node> {
    let mut ctx = Lowering::default();
    ctx.collect_definitions(root);

    let mut nodes = match root {
        mdast::Node::Root(root) => ctx.lower_children(&root.children),
        other => ctx.lower_children(std::slice::from_ref(other)),
    };
    if let Some(footnotes) = ctx.finish_footnotes() {
        nodes.push(footnotes);
    }
    nodes
}

#[derive(Default)]
struct Lowering {
    definitions: HashMap<String, (String, Option<String>)>,
    footnote_defs: HashMap<String, Vec<mdast::Node>>,
    footnote_order: Vec<String>,
    /// One entry per enclosing list: true when the list is tight.
    tight_lists: Vec<bool>,
}

impl Lowering {
    fn collect_definitions(&mut self, node: &mdast::Node) {
        match node {
            mdast::Node::Definition(def) => {
                self.definitions
                    .entry(def.identifier.clone())
                    .or_insert_with(|| (def.url.clone(), def.title.clone()));
            }
            mdast::Node::FootnoteDefinition(def) => {
                self.footnote_defs
                    .entry(def.identifier.clone())
                    .or_insert_with(|| def.children.clone());
            }
            _ => {
                if let Some(children) = node.children() {
                    for child in children {
                        self.collect_definitions(child);
                    }
                }
            }
        }
    }

    fn lower_children(&mut self, children: &[mdast::Node]) -> Vec<Node> {
        let mut nodes = Vec::with_capacity(children.len());
        for child in children {
            match child {
                mdast::Node::Html(html) => lower_html(&html.value, &mut nodes),
                _ => nodes.extend(self.lower_node(child)),
            }
        }
        nodes
    }

    fn element(&mut self, tag: &str, children: &[mdast::Node]) -> Node {
        Element::new(tag)
            .with_children(self.lower_children(children))
            .into_node()
    }

    fn in_tight_list(&self) -> bool {
        self.tight_lists.last().copied().unwrap_or(false)
    }

    fn lower_node(&mut self, node: &mdast::Node) -> Option<Node> {
        let lowered = match node {
            mdast::Node::Root(root) => Element::new("div")
                .with_children(self.lower_children(&root.children))
                .into_node(),
            mdast::Node::Paragraph(para) => {
                let mut element =
                    Element::new("p").with_children(self.lower_children(&para.children));
                element.transparent = self.in_tight_list();
                element.into_node()
            }
            mdast::Node::Heading(heading) => {
                self.element(&format!("h{}", heading.depth), &heading.children)
            }
            mdast::Node::Text(text) => Node::text(text.value.as_str()),
            mdast::Node::Emphasis(em) => self.element("em", &em.children),
            mdast::Node::Strong(strong) => self.element("strong", &strong.children),
            mdast::Node::Delete(del) => self.element("del", &del.children),
            mdast::Node::InlineCode(code) => Element::new("code")
                .with_children(vec![Node::text(code.value.as_str())])
                .into_node(),
            mdast::Node::Break(_) => Element::new("br").into_node(),
            mdast::Node::Link(link) => self.link(&link.url, link.title.as_deref(), &link.children),
            mdast::Node::LinkReference(reference) => {
                match self.definitions.get(&reference.identifier).cloned() {
                    Some((url, title)) => self.link(&url, title.as_deref(), &reference.children),
                    None => {
                        let mut children = vec![Node::text("[")];
                        children.extend(self.lower_children(&reference.children));
                        children.push(Node::text(format!(
                            "]{}",
                            reference_suffix(
                                &reference.reference_kind,
                                reference.label.as_deref(),
                                &reference.identifier
                            )
                        )));
                        Element::new("span")
                            .with_children(children)
                            .transparent()
                            .into_node()
                    }
                }
            }
            mdast::Node::Image(image) => Node::Image(Image {
                url: image.url.clone(),
                alt: image.alt.clone(),
                title: image.title.clone(),
            }),
            mdast::Node::ImageReference(reference) => {
                match self.definitions.get(&reference.identifier).cloned() {
                    Some((url, title)) => Node::Image(Image {
                        url,
                        alt: reference.alt.clone(),
                        title,
                    }),
                    None => Node::text(format!(
                        "![{}]{}",
                        reference.alt,
                        reference_suffix(
                            &reference.reference_kind,
                            reference.label.as_deref(),
                            &reference.identifier
                        )
                    )),
                }
            }
            mdast::Node::Definition(_) | mdast::Node::FootnoteDefinition(_) => return None,
            mdast::Node::List(list) => self.list(list),
            mdast::Node::ListItem(item) => self.list_item(item),
            mdast::Node::Blockquote(quote) => self.element("blockquote", &quote.children),
            mdast::Node::ThematicBreak(_) => Element::new("hr").into_node(),
            mdast::Node::Code(code) => Node::Code(Code {
                value: code.value.clone(),
                lang: code.lang.clone(),
                meta: code.meta.clone(),
            }),
            mdast::Node::Table(table) => self.table(table),
            mdast::Node::FootnoteReference(reference) => {
                self.footnote_reference(&reference.identifier)
            }
            _ => {
                log::warn!("Unhandled markdown node type: {:?}", node);
                return None;
            }
        };
        Some(lowered)
    }

    fn link(&mut self, url: &str, title: Option<&str>, children: &[mdast::Node]) -> Node {
        let mut element = Element::new("a").with_attr("href", url);
        if let Some(title) = title {
            element = element.with_attr("title", title);
        }
        element
            .with_children(self.lower_children(children))
            .into_node()
    }

    fn list(&mut self, list: &mdast::List) -> Node {
        let tight = !list.spread
            && !list
                .children
                .iter()
                .any(|item| matches!(item, mdast::Node::ListItem(li) if li.spread));

        let mut element = Element::new(if list.ordered { "ol" } else { "ul" });
        if list.ordered
            && let Some(start) = list.start
            && start != 1
        {
            element = element.with_attr("start", start.to_string());
        }

        self.tight_lists.push(tight);
        let children = self.lower_children(&list.children);
        self.tight_lists.pop();

        element.with_children(children).into_node()
    }

    fn list_item(&mut self, item: &mdast::ListItem) -> Node {
        let mut element = Element::new("li");
        let mut children = Vec::with_capacity(item.children.len() + 1);
        if let Some(checked) = item.checked {
            element = element.with_class("task-list-item");
            let mut checkbox = Element::new("input")
                .with_attr("type", "checkbox")
                .with_flag("disabled");
            if checked {
                checkbox = checkbox.with_flag("checked");
            }
            children.push(checkbox.into_node());
            children.push(Node::text(" "));
        }
        children.extend(self.lower_children(&item.children));
        element.with_children(children).into_node()
    }

    fn table(&mut self, table: &mdast::Table) -> Node {
        let mut rows = table.children.iter().filter_map(|row| match row {
            mdast::Node::TableRow(row) => Some(row),
            _ => None,
        });

        let mut sections = Vec::new();
        if let Some(head) = rows.next() {
            let row = self.table_row(head, "th", &table.align);
            sections.push(Element::new("thead").with_children(vec![row]).into_node());
        }
        let body: Vec<Node> = rows
            .map(|row| self.table_row(row, "td", &table.align))
            .collect();
        if !body.is_empty() {
            sections.push(Element::new("tbody").with_children(body).into_node());
        }

        Element::new("table").with_children(sections).into_node()
    }

    fn table_row(&mut self, row: &mdast::TableRow, tag: &str, aligns: &[mdast::AlignKind]) -> Node {
        let cells = row
            .children
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| {
                let mdast::Node::TableCell(cell) = cell else {
                    return None;
                };
                let mut element = Element::new(tag);
                let align = match aligns.get(i) {
                    Some(mdast::AlignKind::Left) => Some("left"),
                    Some(mdast::AlignKind::Right) => Some("right"),
                    Some(mdast::AlignKind::Center) => Some("center"),
                    _ => None,
                };
                if let Some(align) = align {
                    element = element.with_attr("align", align);
                }
                Some(
                    element
                        .with_children(self.lower_children(&cell.children))
                        .into_node(),
                )
            })
            .collect();
        Element::new("tr").with_children(cells).into_node()
    }

    fn footnote_reference(&mut self, identifier: &str) -> Node {
        let ordinal = match self.footnote_order.iter().position(|id| id == identifier) {
            Some(pos) => pos + 1,
            None => {
                self.footnote_order.push(identifier.to_string());
                self.footnote_order.len()
            }
        };
        let anchor = Element::new("a")
            .with_attr("href", format!("#fn-{identifier}"))
            .with_attr("id", format!("fnref-{identifier}"))
            .with_flag("data-footnote-ref")
            .with_children(vec![Node::text(ordinal.to_string())]);
        Element::new("sup")
            .with_children(vec![anchor.into_node()])
            .into_node()
    }

    fn finish_footnotes(&mut self) -> Option<Node> {
        let order = std::mem::take(&mut self.footnote_order);
        let items: Vec<Node> = order
            .iter()
            .filter_map(|id| {
                let children = self.footnote_defs.get(id)?.clone();
                let mut content = self.lower_children(&children);
                content.push(
                    Element::new("a")
                        .with_attr("href", format!("#fnref-{id}"))
                        .with_class("footnote-backref")
                        .with_children(vec![Node::text("↩")])
                        .into_node(),
                );
                Some(
                    Element::new("li")
                        .with_attr("id", format!("fn-{id}"))
                        .with_children(content)
                        .into_node(),
                )
            })
            .collect();

        if items.is_empty() {
            return None;
        }
        Some(
            Element::new("section")
                .with_class("footnotes")
                .with_children(vec![Element::new("ol").with_children(items).into_node()])
                .into_node(),
        )
    }
}

/// Source text of an unresolved reference after its `[text]` part.
fn reference_suffix(kind: &mdast::ReferenceKind, label: Option<&str>, identifier: &str) -> String {
    match kind {
        mdast::ReferenceKind::Full => format!("[{}]", label.unwrap_or(identifier)),
        mdast::ReferenceKind::Collapsed => "[]".to_string(),
        mdast::ReferenceKind::Shortcut => String::new(),
    }
}

/// A value made only of HTML comments and whitespace becomes one
/// [`Node::Comment`] per comment; anything else stays raw markup.
fn lower_html(value: &str, out: &mut Vec<Node>) {
    match comment_bodies(value) {
        Some(bodies) => out.extend(
            bodies
                .into_iter()
                .map(|body| Node::Comment(body.to_string())),
        ),
        None => out.push(Node::raw(value)),
    }
}

fn comment_bodies(value: &str) -> Option<Vec<&str>> {
    let mut bodies = Vec::new();
    let mut rest = value.trim_start();
    while !rest.is_empty() {
        let body = rest.strip_prefix("<!--")?;
        let end = body.find("-->")?;
        bodies.push(&body[..end]);
        rest = body[end + 3..].trim_start();
    }
    (!bodies.is_empty()).then_some(bodies)
}
