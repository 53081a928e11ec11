use crate::frontmatter::FrontmatterError;
use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SourceLocation {
    /// 1-based page index, when the location is inside a page body.
    pub page: Option<usize>,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            page: None,
            line,
            column,
        }
    }

    /// Create a source location attributed to a page
    pub fn in_page(page: usize, line: usize, column: usize) -> Self {
        Self {
            page: Some(page),
            line,
            column,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(page) = self.page {
            write!(f, "page {} {}:{}", page, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Fatal errors raised while compiling a slide document.
#[derive(Debug, Error)]
pub enum SlideError {
    /// The YAML header could not be extracted or parsed.
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),
    /// markdown-rs parser error surfaced through the adapter.
    #[error("Parse error at {location}: {message}")]
    Markdown {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// Internal logic error (unexpected state).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SlideError {
    /// Create a markdown parse error with location
    pub fn markdown(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::Markdown {
            message: message.into(),
            location,
        }
    }

    /// Attach a page index to the error location, if it carries one.
    pub fn on_page(self, page: usize) -> Self {
        match self {
            Self::Markdown {
                message,
                mut location,
            } => {
                location.page = Some(page);
                Self::Markdown { message, location }
            }
            other => other,
        }
    }
}

/// Non-fatal warnings that don't prevent compilation
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Warning {
    /// Code fence opened but never closed before the end of the body.
    UnclosedCodeFence {
        /// Where the fence was opened.
        location: SourceLocation,
        /// Fence marker character (backtick or tilde)
        marker: char,
    },
    /// A fenced block named a language the highlighter could not load.
    UnknownLanguage {
        /// 1-based page index
        page: usize,
        /// Requested language tag
        language: String,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::UnclosedCodeFence { location, marker } => {
                write!(f, "Unclosed code fence ({}) opened at {}", marker, location)
            }
            Warning::UnknownLanguage { page, language } => {
                write!(
                    f,
                    "page {}: unknown language '{}', rendered as plaintext",
                    page, language
                )
            }
        }
    }
}

/// Collection of compile diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Diagnostics {
    /// List of non-fatal warnings
    pub warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the diagnostics collection
    pub fn add_warning(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
