//! Batch processing types for parallel deck compilation.

use crate::types::{CompileResult, SlideOptions};
use napi_derive::napi;

/// Input for batch processing: one deck to compile.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct BatchInput {
    /// Deck identifier (typically the file path).
    pub id: String,
    /// Markdown source.
    pub source: String,
}

/// Result for a single deck in a batch.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Deck identifier matching the input.
    pub id: String,
    /// Compilation result (present on success).
    pub result: Option<CompileResult>,
    /// Error message (present on failure).
    pub error: Option<String>,
}

/// Statistics for batch processing.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct BatchStats {
    /// Total number of decks submitted.
    pub total: u32,
    /// Number of successfully compiled decks.
    pub succeeded: u32,
    /// Number of failed compilations.
    pub failed: u32,
    /// Total processing time in milliseconds.
    pub processing_time_ms: f64,
}

/// Options for batch processing.
#[napi(object)]
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Size of the pool compiling decks in parallel. Defaults to the global
    /// pool. Unused when `continue_on_error` is false, since decks then compile
    /// one by one.
    pub max_threads: Option<u32>,
    /// Whether to continue processing after an error. Defaults to true.
    pub continue_on_error: Option<bool>,
    /// Compiler options used for every deck.
    pub options: Option<SlideOptions>,
}

/// Result of batch processing containing all results and statistics.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct BatchProcessingResult {
    /// Individual results, in input order.
    pub results: Vec<BatchResult>,
    /// Processing statistics.
    pub stats: BatchStats,
}
