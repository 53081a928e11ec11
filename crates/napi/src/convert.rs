//! Conversions from compiler output to NAPI objects.

use crate::types::{CompileResult, SlidePage, SlideWarning, SplitMeta};
use napi::{Error, Status};
use serde_json::Value as JsonValue;
use slidemd_slides::{PageRecord, SlideDocument, SlideError, Warning};

/// Converts a compiled deck.
pub fn convert_document(document: SlideDocument) -> CompileResult {
    CompileResult {
        title: document.title,
        frontmatter: JsonValue::Object(document.frontmatter),
        pages: document.pages.into_iter().map(convert_page).collect(),
        warnings: document
            .diagnostics
            .warnings
            .iter()
            .map(convert_warning)
            .collect(),
    }
}

fn convert_page(page: PageRecord) -> SlidePage {
    SlidePage {
        index: page.index as u32,
        directives: to_json(&page.directives),
        steps: to_json(&page.steps.entries),
        content: page.content,
        class_name: page.class_name,
        style: page.style,
        split: SplitMeta {
            enabled: page.split.enabled,
            size: page.split.size,
            vertical: page.split.vertical,
        },
        max_step: page.max_step,
        note: page.note,
    }
}

fn convert_warning(warning: &Warning) -> SlideWarning {
    let (kind, page) = match warning {
        Warning::UnclosedCodeFence { location, .. } => {
            ("unclosedCodeFence", location.page.map(|p| p as u32))
        }
        Warning::UnknownLanguage { page, .. } => ("unknownLanguage", Some(*page as u32)),
    };
    SlideWarning {
        kind: kind.to_string(),
        page,
        message: warning.to_string(),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> JsonValue {
    serde_json::to_value(value).unwrap_or_else(|_| empty_object())
}

/// Empty JSON object.
pub fn empty_object() -> JsonValue {
    JsonValue::Object(serde_json::Map::new())
}

/// Maps compiler errors onto NAPI statuses.
pub fn convert_error(err: SlideError) -> Error {
    match err {
        SlideError::Frontmatter(e) => Error::new(Status::InvalidArg, e.to_string()),
        SlideError::Markdown { message, location } => Error::new(
            Status::InvalidArg,
            format!("Markdown parser error at {}: {}", location, message),
        ),
        SlideError::Internal(msg) => Error::from_reason(format!("Internal error: {}", msg)),
    }
}
