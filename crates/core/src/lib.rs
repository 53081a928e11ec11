#![deny(missing_docs)]
//! SlideMD core: frontmatter, page splitting, annotation comments and
//! directive inheritance.

/// Annotation comment parsing and ordered attributes.
pub mod attrs;
/// Page directives and their inheritance across pages.
pub mod directives;
/// Core error and diagnostic types.
pub mod error;
/// YAML frontmatter extraction helpers.
pub mod frontmatter;
/// Page splitting.
pub mod pages;
/// Markdown parsing adapter.
pub mod parse;

pub use attrs::{AttrValue, AttributeBag, Attributes, Token, parse_annotation, tokenize};
pub use directives::{DirectiveMap, PageDirectives, Scope};
pub use error::{Diagnostics, SlideError, SourceLocation, Warning};
pub use frontmatter::{Frontmatter, FrontmatterError, extract_frontmatter};
pub use pages::{PageSplit, RawPage, split_pages};
pub use parse::{ParseOptions, parse_mdast_with_options, parse_page};
