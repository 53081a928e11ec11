//! Compiler options and output records.

use crate::transform::steps::StepRegistry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use slidemd_core::{Diagnostics, DirectiveMap};

/// Options for [`crate::SlideCompiler`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    /// Whether to add loading="lazy" to inline images.
    #[serde(default = "default_lazy_images")]
    pub lazy_images: bool,
    /// Code languages rendered as diagram containers instead of highlighted.
    #[serde(default = "default_diagram_languages")]
    pub diagram_languages: Vec<String>,
    /// Title used when neither frontmatter nor the first page provides one.
    #[serde(default = "default_title")]
    pub default_title: String,
    /// Size of a dedicated highlighting thread pool; the global rayon pool is
    /// used when unset.
    #[serde(default)]
    pub highlight_threads: Option<usize>,
}

fn default_lazy_images() -> bool {
    true
}

fn default_diagram_languages() -> Vec<String> {
    vec!["mermaid".to_string()]
}

fn default_title() -> String {
    "SlideMD".to_string()
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            lazy_images: default_lazy_images(),
            diagram_languages: default_diagram_languages(),
            default_title: default_title(),
            highlight_threads: None,
        }
    }
}

/// Split metadata of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SplitInfo {
    /// True when the page has at least one split marker.
    pub enabled: bool,
    /// Space-separated partition sizes.
    pub size: Option<String>,
    /// Partitions stack vertically.
    pub vertical: bool,
}

/// One finished page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    /// 1-based page index.
    pub index: usize,
    /// Rendered `<section class="slide">` markup.
    pub content: String,
    /// Resolved directives (global and local, local wins).
    pub directives: DirectiveMap,
    /// Class list of the page section.
    pub class_name: String,
    /// Inline style of the page section.
    pub style: Option<String>,
    /// Split metadata.
    pub split: SplitInfo,
    /// Greatest reveal step on the page.
    pub max_step: u32,
    /// Stepped elements.
    pub steps: StepRegistry,
    /// Speaker note.
    pub note: Option<String>,
    /// Text of the first level-1 heading.
    pub heading: Option<String>,
}

/// A compiled slide deck.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideDocument {
    /// Deck title.
    pub title: String,
    /// Frontmatter as parsed.
    pub frontmatter: Map<String, JsonValue>,
    /// Pages in order.
    pub pages: Vec<PageRecord>,
    /// Non-fatal findings.
    pub diagnostics: Diagnostics,
}
