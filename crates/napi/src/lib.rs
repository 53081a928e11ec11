#![deny(missing_docs)]
//! Node.js bindings that surface the slidemd compiler.

use napi_derive::napi;
use slidemd_core::extract_frontmatter;
use slidemd_slides::SlideCompiler;

/// Batch processing types.
pub mod batch;
/// Compiler output conversions.
mod convert;
/// NAPI-exposed data structures.
pub mod types;

pub use batch::*;
use convert::{convert_document, convert_error, empty_object};
pub use types::*;

/// Extracts YAML frontmatter without compiling the deck.
#[napi]
pub fn parse_frontmatter(content: String) -> napi::Result<FrontmatterResult> {
    match extract_frontmatter(&content) {
        Ok(result) => Ok(FrontmatterResult {
            frontmatter: serde_json::Value::Object(result.metadata),
            errors: Vec::new(),
        }),
        Err(err) => Ok(FrontmatterResult {
            frontmatter: empty_object(),
            errors: vec![err.to_string()],
        }),
    }
}

/// Compiles a Markdown deck into slide pages.
///
/// # Example (JavaScript)
///
/// ```javascript
/// const { compileSlides } = require('slidemd-napi');
///
/// const deck = compileSlides('# Hello\n\n---\n\n<!-- _class: lead -->\n\n# World');
/// console.log(deck.pages[1].className); // "slide lead"
/// ```
#[napi(js_name = "compileSlides")]
pub fn compile_slides(
    source: String,
    options: Option<SlideOptions>,
) -> napi::Result<CompileResult> {
    let compiler = SlideCompiler::new(options.unwrap_or_default().into()).map_err(convert_error)?;
    let document = compiler.compile(&source).map_err(convert_error)?;
    Ok(convert_document(document))
}

/// Compiles multiple decks in parallel using Rayon.
///
/// Pages inside one deck are still compiled in order; parallelism is across
/// decks.
///
/// # Example (JavaScript)
///
/// ```javascript
/// const { compileBatch } = require('slidemd-napi');
///
/// const result = compileBatch(
///   [{ id: 'intro.md', source: '# Intro' }, { id: 'talk.md', source: '# Talk' }],
///   { continueOnError: true },
/// );
/// console.log(`Processed ${result.stats.total} decks in ${result.stats.processingTimeMs}ms`);
/// ```
#[napi(js_name = "compileBatch")]
pub fn compile_batch(
    inputs: Vec<BatchInput>,
    options: Option<BatchOptions>,
) -> napi::Result<BatchProcessingResult> {
    use rayon::prelude::*;

    let start = std::time::Instant::now();
    let opts = options.unwrap_or_default();
    let compiler = SlideCompiler::new(opts.options.unwrap_or_default().into())
        .map_err(convert_error)?;
    let total = inputs.len() as u32;

    let results = if opts.continue_on_error.unwrap_or(true) {
        let compile_all = || -> Vec<BatchResult> {
            inputs
                .into_par_iter()
                .map(|input| compile_input(&compiler, input))
                .collect()
        };
        match opts.max_threads {
            Some(threads) => deck_pool(threads)?.install(compile_all),
            None => compile_all(),
        }
    } else {
        compile_until_error(&compiler, inputs)
    };

    let failed = results.iter().filter(|result| result.error.is_some()).count() as u32;
    Ok(BatchProcessingResult {
        stats: BatchStats {
            total,
            succeeded: results.len() as u32 - failed,
            failed,
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        },
        results,
    })
}

fn deck_pool(threads: u32) -> napi::Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads as usize)
        .thread_name(|i| format!("slidemd-deck-{i}"))
        .build()
        .map_err(|err| napi::Error::from_reason(format!("deck pool: {err}")))
}

fn compile_input(compiler: &SlideCompiler, input: BatchInput) -> BatchResult {
    let (result, error) = match compiler.compile(&input.source) {
        Ok(document) => (Some(convert_document(document)), None),
        Err(err) => (None, Some(err.to_string())),
    };
    BatchResult {
        id: input.id,
        result,
        error,
    }
}

/// Compiles decks one by one and stops after the first failure.
fn compile_until_error(compiler: &SlideCompiler, inputs: Vec<BatchInput>) -> Vec<BatchResult> {
    let mut results = Vec::with_capacity(inputs.len());
    for input in inputs {
        let result = compile_input(compiler, input);
        let stop = result.error.is_some();
        results.push(result);
        if stop {
            break;
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value as JsonValue;

    #[test]
    fn parses_yaml_frontmatter_block() {
        let input = "---\ntitle: Test\n---\nBody".to_string();
        let result = parse_frontmatter(input).unwrap();
        assert!(result.errors.is_empty());
        let title = result
            .frontmatter
            .get("title")
            .and_then(JsonValue::as_str)
            .unwrap();
        assert_eq!(title, "Test");
    }

    #[test]
    fn returns_empty_object_when_no_frontmatter() {
        let result = parse_frontmatter("# Heading".to_string()).unwrap();
        assert!(result.errors.is_empty());
        assert_eq!(result.frontmatter, empty_object());
    }

    #[test]
    fn reports_frontmatter_errors_instead_of_failing() {
        let result = parse_frontmatter("---\ntitle: x\n".to_string()).unwrap();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.frontmatter, empty_object());
    }

    #[test]
    fn compile_slides_returns_pages() {
        let deck = compile_slides(
            "# Hello\n\n---\n\n<!-- _class: lead -->\n\n![a w:10px](a.png)".to_string(),
            Some(SlideOptions {
                lazy_images: Some(false),
                ..SlideOptions::default()
            }),
        )
        .unwrap();
        assert_eq!(deck.title, "Hello");
        assert_eq!(deck.pages.len(), 2);
        assert_eq!(deck.pages[1].class_name, "slide lead");
        assert_eq!(deck.pages[1].index, 2);
        assert!(!deck.pages[1].content.contains("loading"));
        assert_eq!(deck.pages[1].directives["class"], "lead");
    }

    #[test]
    fn compile_slides_reports_warnings() {
        let deck = compile_slides("```nope\nx\n```".to_string(), None).unwrap();
        assert_eq!(deck.warnings.len(), 1);
        assert_eq!(deck.warnings[0].kind, "unknownLanguage");
        assert_eq!(deck.warnings[0].page, Some(1));
    }

    #[test]
    fn compile_slides_attributes_unclosed_fences_to_a_page() {
        let deck = compile_slides("one\n\n---\n\n~~~\nopen".to_string(), None).unwrap();
        assert_eq!(deck.warnings.len(), 1);
        assert_eq!(deck.warnings[0].kind, "unclosedCodeFence");
        assert_eq!(deck.warnings[0].page, Some(2));
    }

    #[test]
    fn batch_keeps_input_order_and_counts() {
        let inputs = vec![
            BatchInput {
                id: "a".into(),
                source: "# A".into(),
            },
            BatchInput {
                id: "broken".into(),
                source: "---\ntitle: [x\n---\n".into(),
            },
            BatchInput {
                id: "c".into(),
                source: "# C <!-- click-3 -->".into(),
            },
        ];
        let result = compile_batch(
            inputs,
            Some(BatchOptions {
                max_threads: Some(2),
                ..BatchOptions::default()
            }),
        )
        .unwrap();

        let ids: Vec<_> = result.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "broken", "c"]);
        assert_eq!(result.stats.total, 3);
        assert_eq!(result.stats.succeeded, 2);
        assert_eq!(result.stats.failed, 1);
        assert!(result.results[1].error.is_some());
        let deck = result.results[2].result.as_ref().unwrap();
        assert_eq!(deck.pages[0].max_step, 3);
    }

    #[test]
    fn batch_stops_on_first_error_when_asked() {
        let inputs = vec![
            BatchInput {
                id: "broken".into(),
                source: "---\n".into(),
            },
            BatchInput {
                id: "ok".into(),
                source: "fine".into(),
            },
        ];
        let result = compile_batch(
            inputs,
            Some(BatchOptions {
                max_threads: Some(1),
                continue_on_error: Some(false),
                ..BatchOptions::default()
            }),
        )
        .unwrap();
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.stats.failed, 1);
        assert_eq!(result.stats.succeeded, 0);
    }
}
