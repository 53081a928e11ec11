//! NAPI-exposed data structures.

use napi_derive::napi;
use serde_json::Value as JsonValue;
use slidemd_slides::CompileOptions;

/// Parsed frontmatter document plus any parser errors.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct FrontmatterResult {
    /// Structured frontmatter data represented as JSON.
    pub frontmatter: JsonValue,
    /// Any syntax or parsing errors surfaced by the extractor.
    pub errors: Vec<String>,
}

/// Options accepted by `compileSlides` and `compileBatch`.
#[napi(object)]
#[derive(Debug, Clone, Default)]
pub struct SlideOptions {
    /// Adds `loading="lazy"` to inline images. Defaults to true.
    pub lazy_images: Option<bool>,
    /// Code languages rendered as diagrams. Defaults to `["mermaid"]`.
    pub diagram_languages: Option<Vec<String>>,
    /// Title used when the deck has neither a frontmatter title nor a heading.
    pub default_title: Option<String>,
    /// Size of a dedicated highlighting thread pool.
    pub highlight_threads: Option<u32>,
}

impl From<SlideOptions> for CompileOptions {
    fn from(value: SlideOptions) -> Self {
        let defaults = CompileOptions::default();
        CompileOptions {
            lazy_images: value.lazy_images.unwrap_or(defaults.lazy_images),
            diagram_languages: value
                .diagram_languages
                .unwrap_or(defaults.diagram_languages),
            default_title: value.default_title.unwrap_or(defaults.default_title),
            highlight_threads: value.highlight_threads.map(|n| n as usize),
        }
    }
}

/// Split metadata of a page.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct SplitMeta {
    /// True when the page has split markers.
    pub enabled: bool,
    /// Space-separated partition sizes.
    pub size: Option<String>,
    /// Partitions stack vertically.
    pub vertical: bool,
}

/// One compiled page.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct SlidePage {
    /// 1-based page index.
    pub index: u32,
    /// Rendered `<section>` markup.
    pub content: String,
    /// Class list of the page section.
    pub class_name: String,
    /// Inline style of the page section.
    pub style: Option<String>,
    /// Resolved directives as a JSON object.
    pub directives: JsonValue,
    /// Split metadata.
    pub split: SplitMeta,
    /// Greatest reveal step on the page.
    pub max_step: u32,
    /// Stepped elements as JSON (`[{ id, steps }]`).
    pub steps: JsonValue,
    /// Speaker note.
    pub note: Option<String>,
}

/// Warning returned with a compiled deck.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct SlideWarning {
    /// Warning kind (e.g. `unclosedCodeFence`).
    pub kind: String,
    /// Page the warning belongs to, when known.
    pub page: Option<u32>,
    /// Human-readable message.
    pub message: String,
}

/// Result of `compileSlides`.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct CompileResult {
    /// Deck title.
    pub title: String,
    /// Frontmatter as JSON.
    pub frontmatter: JsonValue,
    /// Pages in order.
    pub pages: Vec<SlidePage>,
    /// Non-fatal warnings.
    pub warnings: Vec<SlideWarning>,
}
