#![deny(missing_docs)]
//! SlideMD slide compiler: slide tree passes, highlighting seam, page
//! assembly and HTML rendering.

/// Document compilation.
pub mod compile;
/// Highlighter seam.
pub mod highlight;
/// mdast lowering.
pub mod lower;
/// Page section assembly.
pub mod page;
/// HTML serializer.
pub mod render;
/// Slide tree passes.
pub mod transform;
/// Slide tree model.
pub mod tree;
/// Options and output records.
pub mod types;

pub use compile::{SlideCompiler, compile_document};
pub use highlight::{HighlightError, Highlighter, LanguageTable, PlainHighlighter};
pub use render::render_nodes;
pub use transform::steps::{StepEntry, StepRegistry};
pub use tree::{Element, HighlightHandle, Node};
pub use types::{CompileOptions, PageRecord, SlideDocument, SplitInfo};

pub use slidemd_core::{Diagnostics, DirectiveMap, SlideError, Warning};
