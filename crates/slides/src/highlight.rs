//! Highlighter seam and parallel resolution of highlight requests.
//!
//! The code pass replaces each code block with a container holding a
//! [`HighlightHandle`] placeholder and queues a [`HighlightRequest`]. Once the
//! page's structural passes are done, [`resolve_all`] runs every request on the
//! rayon pool and [`splice`] swaps the placeholders for the results.

use crate::tree::{Element, HighlightHandle, Node};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Language used when no tag is given or the requested one is unavailable.
pub const PLAINTEXT: &str = "plaintext";

/// Errors reported by a [`Highlighter`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HighlightError {
    /// The highlighter has no grammar for the language.
    #[error("unknown language '{0}'")]
    UnknownLanguage(String),
    /// The grammar exists but highlighting failed.
    #[error("failed to highlight {lang}: {message}")]
    Failed {
        /// Language tag.
        lang: String,
        /// Highlighter message.
        message: String,
    },
}

/// Syntax highlighter collaborator.
pub trait Highlighter: Send + Sync {
    /// Loads the grammar for `lang`. Called at most once per language per
    /// [`LanguageTable`].
    fn load_language(&self, lang: &str) -> Result<(), HighlightError>;

    /// Highlights `code` with a previously loaded language.
    fn highlight(&self, code: &str, lang: &str) -> Result<Vec<Node>, HighlightError>;
}

/// Load outcome per language, filled lazily and shared across pages.
#[derive(Debug, Default)]
pub struct LanguageTable {
    loaded: RwLock<HashMap<String, bool>>,
}

static SHARED_TABLE: Lazy<Arc<LanguageTable>> = Lazy::new(|| Arc::new(LanguageTable::default()));

impl LanguageTable {
    /// Process-wide table used with the built-in [`PlainHighlighter`].
    pub fn shared() -> Arc<LanguageTable> {
        Arc::clone(&SHARED_TABLE)
    }

    /// Returns whether `lang` is available, loading it on first use.
    pub fn ensure(&self, lang: &str, highlighter: &dyn Highlighter) -> bool {
        if let Some(available) = self
            .loaded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(lang)
        {
            return *available;
        }

        let mut loaded = self.loaded.write().unwrap_or_else(PoisonError::into_inner);
        // Another worker may have loaded it while we waited for the write lock.
        if let Some(available) = loaded.get(lang) {
            return *available;
        }
        let available = match highlighter.load_language(lang) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("{err}; falling back to {PLAINTEXT}");
                false
            }
        };
        loaded.insert(lang.to_string(), available);
        available
    }
}

/// One queued code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightRequest {
    /// Placeholder to replace.
    pub handle: HighlightHandle,
    /// Source text.
    pub code: String,
    /// Requested language.
    pub lang: String,
}

/// Result of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Highlighted {
    /// Placeholder to replace.
    pub handle: HighlightHandle,
    /// Highlighted markup.
    pub nodes: Vec<Node>,
    /// Requested language when it had to fall back to plaintext.
    pub unknown_language: Option<String>,
}

/// Resolves all requests of a page concurrently. Output order follows input
/// order.
pub fn resolve_all(
    requests: Vec<HighlightRequest>,
    highlighter: &dyn Highlighter,
    languages: &LanguageTable,
) -> Vec<Highlighted> {
    requests
        .into_par_iter()
        .map(|request| resolve_one(request, highlighter, languages))
        .collect()
}

fn resolve_one(
    request: HighlightRequest,
    highlighter: &dyn Highlighter,
    languages: &LanguageTable,
) -> Highlighted {
    let HighlightRequest { handle, code, lang } = request;

    let (lang, unknown_language) =
        if lang == PLAINTEXT || languages.ensure(&lang, highlighter) {
            (lang, None)
        } else {
            (PLAINTEXT.to_string(), Some(lang))
        };

    let nodes = match highlighter.highlight(&code, &lang) {
        Ok(nodes) => nodes,
        Err(err) => {
            log::warn!("{err}; rendering as {PLAINTEXT}");
            plain_lines(&code, PLAINTEXT)
        }
    };

    Highlighted {
        handle,
        nodes,
        unknown_language,
    }
}

/// Replaces placeholders in `nodes` by their highlighted markup.
pub fn splice(nodes: &mut Vec<Node>, results: Vec<Highlighted>) {
    let mut by_handle: HashMap<HighlightHandle, Vec<Node>> = results
        .into_iter()
        .map(|result| (result.handle, result.nodes))
        .collect();
    splice_into(nodes, &mut by_handle);
    for handle in by_handle.keys() {
        log::warn!("highlight result {:?} has no placeholder", handle);
    }
}

fn splice_into(nodes: &mut Vec<Node>, results: &mut HashMap<HighlightHandle, Vec<Node>>) {
    let mut i = 0;
    while i < nodes.len() {
        match &mut nodes[i] {
            Node::Highlight(handle) => {
                let handle = *handle;
                let replacement = results.remove(&handle).unwrap_or_default();
                let len = replacement.len();
                nodes.splice(i..=i, replacement);
                i += len;
            }
            Node::Element(element) => {
                splice_into(&mut element.children, results);
                i += 1;
            }
            _ => i += 1,
        }
    }
}

/// `<pre class="shiki" data-language=…><code>` with one `span.line` per line.
pub fn plain_lines(code: &str, lang: &str) -> Vec<Node> {
    let mut lines = Vec::new();
    for (i, line) in code.split('\n').enumerate() {
        if i > 0 {
            lines.push(Node::text("\n"));
        }
        lines.push(
            Element::new("span")
                .with_class("line")
                .with_children(vec![Node::text(line)])
                .into_node(),
        );
    }
    let code = Element::new("code").with_children(lines);
    vec![
        Element::new("pre")
            .with_class("shiki")
            .with_attr("data-language", lang)
            .with_children(vec![code.into_node()])
            .into_node(),
    ]
}

/// Built-in highlighter: line structure only, no colouring.
#[derive(Debug, Clone)]
pub struct PlainHighlighter {
    languages: Vec<String>,
}

const DEFAULT_LANGUAGES: &[&str] = &[
    "plaintext", "text", "txt", "bash", "sh", "shell", "c", "cpp", "css", "diff", "go", "html",
    "java", "javascript", "js", "json", "jsx", "markdown", "md", "python", "py", "rust", "rs",
    "scss", "sql", "svelte", "toml", "ts", "tsx", "typescript", "xml", "yaml", "yml",
];

impl PlainHighlighter {
    /// Highlighter knowing `languages`.
    pub fn new<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            languages: languages.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for PlainHighlighter {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGES.iter().copied())
    }
}

impl Highlighter for PlainHighlighter {
    fn load_language(&self, lang: &str) -> Result<(), HighlightError> {
        if self.languages.iter().any(|known| known == lang) {
            Ok(())
        } else {
            Err(HighlightError::UnknownLanguage(lang.to_string()))
        }
    }

    fn highlight(&self, code: &str, lang: &str) -> Result<Vec<Node>, HighlightError> {
        Ok(plain_lines(code, lang))
    }
}
