//! Document compilation: a left-to-right fold over pages.
//!
//! ```text
//! (baseline, page) -> parse -> lower -> comments -> split
//!                  -> images per partition -> code -> highlight (rayon)
//!                  -> splice -> steps -> assemble -> (next baseline, record)
//! ```

use crate::highlight::{
    Highlighted, Highlighter, LanguageTable, PlainHighlighter, resolve_all, splice,
};
use crate::lower::lower;
use crate::page::{PageFrame, page_note};
use crate::render::render_node;
use crate::transform::code::CodePass;
use crate::transform::comments::apply_comments;
use crate::transform::image::{ImageOptions, apply_images};
use crate::transform::split::SplitLayout;
use crate::transform::steps::collect_steps;
use crate::tree::{Node, find_element};
use crate::types::{CompileOptions, PageRecord, SlideDocument, SplitInfo};
use slidemd_core::{
    AttrValue, Diagnostics, DirectiveMap, PageDirectives, ParseOptions, RawPage, Scope,
    SlideError, Warning, extract_frontmatter, parse_page, split_pages,
};
use std::sync::Arc;

/// Compiles slide documents with a fixed configuration and highlighter.
pub struct SlideCompiler {
    options: CompileOptions,
    highlighter: Arc<dyn Highlighter>,
    languages: Arc<LanguageTable>,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl SlideCompiler {
    /// Compiler using the built-in [`PlainHighlighter`] and the process-wide
    /// language table.
    pub fn new(options: CompileOptions) -> Result<Self, SlideError> {
        let pool = build_pool(options.highlight_threads)?;
        Ok(Self {
            options,
            highlighter: Arc::new(PlainHighlighter::default()),
            languages: LanguageTable::shared(),
            pool,
        })
    }

    /// Compiler using a custom highlighter. Language load outcomes are cached
    /// per compiler since they depend on the highlighter.
    pub fn with_highlighter(
        options: CompileOptions,
        highlighter: Arc<dyn Highlighter>,
    ) -> Result<Self, SlideError> {
        let pool = build_pool(options.highlight_threads)?;
        Ok(Self {
            options,
            highlighter,
            languages: Arc::new(LanguageTable::default()),
            pool,
        })
    }

    /// Compiles a whole document.
    pub fn compile(&self, source: &str) -> Result<SlideDocument, SlideError> {
        let frontmatter = extract_frontmatter(source)?;
        let split = split_pages(frontmatter.body(source), frontmatter.body_line(source));
        let mut diagnostics = split.diagnostics;

        let mut baseline = DirectiveMap::from_frontmatter(&frontmatter.metadata);
        let mut pages = Vec::with_capacity(split.pages.len());
        for page in &split.pages {
            let (next, record) = self.compile_page(baseline, page, &mut diagnostics)?;
            baseline = next;
            pages.push(record);
        }

        let title = frontmatter
            .title()
            .map(str::to_string)
            .or_else(|| pages.first().and_then(|page| page.heading.clone()))
            .unwrap_or_else(|| self.options.default_title.clone());

        log::debug!("compiled {} pages titled {title:?}", pages.len());
        Ok(SlideDocument {
            title,
            frontmatter: frontmatter.metadata,
            pages,
            diagnostics,
        })
    }

    /// Compiles one page against the baseline left by the previous page.
    ///
    /// Returns the baseline for the next page together with the page record.
    pub fn compile_page(
        &self,
        baseline: DirectiveMap,
        page: &RawPage<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<(DirectiveMap, PageRecord), SlideError> {
        let root = parse_page(page.text, &ParseOptions::slides())
            .map_err(|err| err.on_page(page.index))?;
        let mut nodes = lower(&root);

        let mut directives = PageDirectives::new(baseline);
        apply_comments(&mut nodes, &mut directives);
        let heading = first_heading(&nodes);

        let mut layout = SplitLayout::from_nodes(nodes);
        let image_options = ImageOptions {
            lazy: self.options.lazy_images,
            vertical: layout.vertical,
        };
        let mut code = CodePass::new(&self.options.diagram_languages);
        for partition in &mut layout.partitions {
            apply_images(&mut partition.children, image_options);
            code.apply(&mut partition.children);
        }

        let split = SplitInfo {
            enabled: layout.enabled,
            size: layout.enabled.then(|| layout.size_string()),
            vertical: layout.vertical,
        };
        if let Some(size) = &split.size {
            directives.assign_scoped(Scope::Local, "splitSize", AttrValue::text(size.as_str()));
        }

        let results = self.highlight(code);
        let mut nodes = layout.into_nodes();
        for result in &results {
            if let Some(language) = &result.unknown_language {
                diagnostics.add_warning(Warning::UnknownLanguage {
                    page: page.index,
                    language: language.clone(),
                });
            }
        }
        splice(&mut nodes, results);

        let steps = collect_steps(&mut nodes, page.index);
        let (resolved, next) = directives.finish();

        let frame = PageFrame::from_directives(&resolved, &split);
        let mut content = String::new();
        render_node(&frame.wrap(page.index, nodes), &mut content);

        let record = PageRecord {
            index: page.index,
            content,
            note: page_note(&resolved),
            class_name: frame.class_name,
            style: frame.style,
            split,
            max_step: steps.max_step,
            steps,
            heading,
            directives: resolved,
        };
        Ok((next, record))
    }

    fn highlight(&self, code: CodePass<'_>) -> Vec<Highlighted> {
        let requests = code.into_requests();
        if requests.is_empty() {
            return Vec::new();
        }
        let highlighter = self.highlighter.as_ref();
        let languages = self.languages.as_ref();
        match &self.pool {
            Some(pool) => pool.install(|| resolve_all(requests, highlighter, languages)),
            None => resolve_all(requests, highlighter, languages),
        }
    }
}

/// Compiles `source` with the built-in highlighter.
pub fn compile_document(source: &str, options: &CompileOptions) -> Result<SlideDocument, SlideError> {
    SlideCompiler::new(options.clone())?.compile(source)
}

fn build_pool(threads: Option<usize>) -> Result<Option<Arc<rayon::ThreadPool>>, SlideError> {
    let Some(threads) = threads else {
        return Ok(None);
    };
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("slidemd-highlight-{i}"))
        .build()
        .map(|pool| Some(Arc::new(pool)))
        .map_err(|err| SlideError::Internal(format!("highlight pool: {err}")))
}

fn first_heading(nodes: &[Node]) -> Option<String> {
    let heading = find_element(nodes, "h1")?;
    let text: String = heading.children.iter().map(Node::text_content).collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(text: &str) -> RawPage<'_> {
        RawPage {
            index: 1,
            text,
            first_line: 1,
        }
    }

    #[test]
    fn compile_page_threads_the_baseline() {
        let compiler = SlideCompiler::new(CompileOptions::default()).expect("compiler");
        let mut diagnostics = Diagnostics::new();

        let (next, record) = compiler
            .compile_page(
                DirectiveMap::new(),
                &page("<!-- color:blue _class:lead -->\n\n# Hello"),
                &mut diagnostics,
            )
            .expect("page");
        assert_eq!(record.directives.get_str("color"), Some("blue"));
        assert_eq!(record.class_name, "slide lead");
        assert_eq!(record.heading.as_deref(), Some("Hello"));
        assert_eq!(next.get_str("color"), Some("blue"));
        assert_eq!(next.get_str("class"), None);
    }

    #[test]
    fn page_content_is_wrapped_in_a_section() {
        let compiler = SlideCompiler::new(CompileOptions::default()).expect("compiler");
        let mut diagnostics = Diagnostics::new();
        let (_, record) = compiler
            .compile_page(DirectiveMap::new(), &page("Hello *world*"), &mut diagnostics)
            .expect("page");
        insta::assert_snapshot!(record.content, @r#"<section class="slide" data-page="1"><p>Hello <em>world</em></p></section>"#);
        assert!(!diagnostics.has_warnings());
    }

    #[test]
    fn split_size_is_a_page_only_directive() {
        let compiler = SlideCompiler::new(CompileOptions::default()).expect("compiler");
        let mut diagnostics = Diagnostics::new();
        let (next, record) = compiler
            .compile_page(
                DirectiveMap::new(),
                &page("Left\n\n<!-- split:2fr -->\n\nRight"),
                &mut diagnostics,
            )
            .expect("page");
        assert_eq!(record.directives.get_str("splitSize"), Some("2fr 1fr"));
        assert_eq!(record.style.as_deref(), Some("--split-col: 2fr 1fr"));
        assert_eq!(next.get("splitSize"), None);
    }

    #[test]
    fn unknown_language_is_reported() {
        let compiler = SlideCompiler::new(CompileOptions::default()).expect("compiler");
        let mut diagnostics = Diagnostics::new();
        let (_, record) = compiler
            .compile_page(
                DirectiveMap::new(),
                &page("```klingon\nqapla'\n```"),
                &mut diagnostics,
            )
            .expect("page");
        assert_eq!(
            diagnostics.warnings,
            vec![Warning::UnknownLanguage {
                page: 1,
                language: "klingon".into()
            }]
        );
        assert!(record.content.contains(r#"data-language="plaintext""#), "{}", record.content);
    }

    #[test]
    fn dedicated_pool_is_used_when_configured() {
        let options = CompileOptions {
            highlight_threads: Some(2),
            ..CompileOptions::default()
        };
        let document = compile_document("```rust\nfn main() {}\n```", &options).expect("document");
        assert!(document.pages[0].content.contains(r#"<span class="line">fn main() &#123;&#125;</span>"#));
    }
}
