use slidemd_core::SourceLocation;
use slidemd_slides::{
    CompileOptions, HighlightError, Highlighter, Node, SlideCompiler, SlideError, Warning,
    compile_document,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn compile(source: &str) -> slidemd_slides::SlideDocument {
    compile_document(source, &CompileOptions::default()).expect("compile should succeed")
}

#[derive(Default)]
struct CountingHighlighter {
    calls: AtomicUsize,
}

impl Highlighter for CountingHighlighter {
    fn load_language(&self, _lang: &str) -> Result<(), HighlightError> {
        Ok(())
    }

    fn highlight(&self, code: &str, _lang: &str) -> Result<Vec<Node>, HighlightError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![Node::text(code)])
    }
}

#[test]
fn split_marker_produces_two_partitions() {
    let doc = compile("Left\n\n<!-- split:30% -->\n\nRight");
    let page = &doc.pages[0];

    assert!(page.split.enabled);
    assert_eq!(page.split.size.as_deref(), Some("30% 1fr"));
    assert_eq!(page.class_name, "slide split");
    insta::assert_snapshot!(page.content, @r#"<section class="slide split" data-page="1" style="--split-col: 30% 1fr"><section class="split-contents" data-size="30%"><p>Left</p></section><section class="split-contents" data-size="1fr"><p>Right</p></section></section>"#);
}

#[test]
fn image_tokens_become_inline_style() {
    let doc = compile("![x blur cover top](a.png)");
    insta::assert_snapshot!(doc.pages[0].content, @r#"<section class="slide" data-page="1"><p><img src="a.png" alt="x" style="filter: blur(10px); object-fit: cover; object-position: top" loading="lazy" /></p></section>"#);
}

#[test]
fn background_image_leaves_the_flow() {
    let doc = compile("# Title\n\n![x bg photo.png x:10px](photo.png)");
    let content = &doc.pages[0].content;

    assert!(!content.contains("<img"), "{content}");
    assert!(!content.contains("<p></p>"), "{content}");
    assert!(
        content.contains(
            r#"<div class="advanced-bg" style="--bg-columns: 1fr"><div class="advanced-bg-image" style="background-image:url(photo.png); background-position:10px 50%"#
        ),
        "{content}"
    );
    assert_eq!(content.matches("advanced-bg-image").count(), 1);
}

#[test]
fn backgrounds_are_composited_per_partition() {
    let doc = compile(
        "![a bg](a.png)\n\n<!-- split -->\n\n![b bg size:2fr](b.png)\n![c bg](c.png)",
    );
    let content = &doc.pages[0].content;
    assert_eq!(content.matches(r#"class="advanced-bg""#).count(), 2, "{content}");
    assert!(content.contains(r#"style="--bg-columns: 2fr 1fr""#), "{content}");
}

#[test]
fn local_directive_applies_to_one_page() {
    let doc = compile("<!-- color:blue -->\n\none\n\n---\n\n<!-- _color:red -->\n\ntwo\n\n---\n\nthree");

    let colors: Vec<_> = doc
        .pages
        .iter()
        .map(|page| page.directives.get_str("color"))
        .collect();
    assert_eq!(colors, vec![Some("blue"), Some("red"), Some("blue")]);
    assert_eq!(doc.pages[1].style.as_deref(), Some("color: red"));
    assert_eq!(doc.pages[2].style.as_deref(), Some("color: blue"));
}

#[test]
fn global_directive_persists_until_unset() {
    let doc = compile("<!-- bgColor:#222 -->\n\na\n\n---\n\nb\n\n---\n\n<!-- bgColor:- -->\n\nc");
    let classes: Vec<_> = doc.pages.iter().map(|page| page.class_name.as_str()).collect();
    assert_eq!(classes, vec!["slide bg", "slide bg", "slide"]);
}

#[test]
fn diagrams_skip_the_highlighter() {
    let highlighter = Arc::new(CountingHighlighter::default());
    let compiler =
        SlideCompiler::with_highlighter(CompileOptions::default(), highlighter.clone())
            .expect("compiler");

    let doc = compiler
        .compile("```mermaid\ngraph TD; A-->B\n```")
        .expect("compile should succeed");
    assert_eq!(highlighter.calls.load(Ordering::SeqCst), 0);
    insta::assert_snapshot!(doc.pages[0].content, @r#"<section class="slide" data-page="1"><pre class="mermaid">graph TD; A--&gt;B</pre></section>"#);

    compiler
        .compile("```rust\nfn main() {}\n```")
        .expect("compile should succeed");
    assert_eq!(highlighter.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn explicit_step_value_sets_max_step() {
    let doc = compile("Hello <!-- click-2=\"fade-in\" -->");
    let page = &doc.pages[0];

    assert_eq!(page.max_step, 2);
    assert_eq!(page.steps.entries.len(), 1);
    insta::assert_snapshot!(page.content, @r#"<section class="slide" data-page="1"><p click-2="fade-in" data-step-id="p1-s1">Hello</p></section>"#);
}

#[test]
fn list_items_take_trailing_annotations() {
    let doc = compile("- one <!-- click-1 -->\n- two <!-- click-2 -->");
    let page = &doc.pages[0];

    assert_eq!(page.max_step, 2);
    assert!(
        page.content.contains(r#"<li click-1="opacity-100" click-0="opacity-0" class="opacity-0" data-step-id="p1-s1">one</li>"#),
        "{}",
        page.content
    );
}

#[test]
fn title_comes_from_frontmatter_then_heading() {
    let doc = compile("---\ntitle: Deck\n---\n\n# Welcome");
    assert_eq!(doc.title, "Deck");
    assert_eq!(doc.frontmatter.get("title").and_then(|v| v.as_str()), Some("Deck"));

    assert_eq!(compile("# Welcome\n\n---\n\n# Later").title, "Welcome");
    assert_eq!(compile("no heading").title, "SlideMD");
}

#[test]
fn frontmatter_scalars_seed_the_baseline() {
    let doc = compile("---\nclass: lead\npaginate: true\n---\n\none\n\n---\n\ntwo");
    assert_eq!(doc.pages.len(), 2);
    for page in &doc.pages {
        assert_eq!(page.class_name, "slide lead");
        assert!(page.directives.is_enabled("paginate"));
    }
}

#[test]
fn malformed_frontmatter_is_fatal() {
    let err = compile_document("---\ntitle: [oops\n---\n\n# Body", &CompileOptions::default())
        .expect_err("bad yaml");
    assert!(matches!(err, SlideError::Frontmatter(_)), "{err:?}");

    let err = compile_document("---\ntitle: open\n", &CompileOptions::default())
        .expect_err("unterminated");
    assert!(matches!(err, SlideError::Frontmatter(_)), "{err:?}");
}

#[test]
fn separators_inside_fences_do_not_split() {
    let doc = compile("```md\n---\n```\n\n---\n\nnext");
    assert_eq!(doc.pages.len(), 2);
    assert!(doc.diagnostics.warnings.is_empty());

    let doc = compile("```\nopen\n\n---\n\nstill code");
    assert_eq!(doc.pages.len(), 1);
    assert!(matches!(
        doc.diagnostics.warnings.as_slice(),
        [Warning::UnclosedCodeFence { .. }]
    ));
}

#[test]
fn unclosed_fence_points_into_the_document() {
    let doc = compile("---\ntitle: x\n---\n\none\n\n---\n\n```js\nlet open;");
    assert_eq!(doc.pages.len(), 2);
    assert_eq!(
        doc.diagnostics.warnings,
        vec![Warning::UnclosedCodeFence {
            location: SourceLocation::in_page(2, 9, 1),
            marker: '`',
        }]
    );
}

#[test]
fn comments_sharing_a_line_are_all_applied() {
    let doc = compile("<!-- color:red --> <!-- .lead -->\n\nx");
    let page = &doc.pages[0];

    assert_eq!(page.directives.get_str("color"), Some("red"));
    assert_eq!(page.directives.get_str("class"), Some("lead"));
    insta::assert_snapshot!(page.content, @r#"<section class="slide lead" data-page="1" style="color: red"><p>x</p></section>"#);
}

#[test]
fn local_and_global_classes_combine_on_one_page() {
    let doc = compile("<!-- _class:a -->\n\n<!-- .b -->\n\nx\n\n---\n\ny");
    assert_eq!(doc.pages[0].class_name, "slide a b");
    assert_eq!(doc.pages[1].class_name, "slide b");
}

#[test]
fn partition_directives_stay_inside_their_partition() {
    let doc = compile("<!-- @split bgColor:red .x -->\n\nL\n\n<!-- split -->\n\nR\n\n---\n\nnext");
    let page = &doc.pages[0];

    assert_eq!(page.class_name, "slide split");
    assert!(page.directives.get("bgColor").is_none());
    insta::assert_snapshot!(page.content, @r#"<section class="slide split" data-page="1" style="--split-col: 1fr 1fr"><section class="split-contents x bg" data-size="1fr" style="--bg-color: red"><p>L</p></section><section class="split-contents" data-size="1fr"><p>R</p></section></section>"#);
    assert_eq!(doc.pages[1].class_name, "slide");
    assert_eq!(doc.pages[1].style, None);
}

#[test]
fn note_is_page_only() {
    let doc = compile("<!-- note:\"say hello\" -->\n\none\n\n---\n\ntwo");
    assert_eq!(doc.pages[0].note.as_deref(), Some("say hello"));
    assert_eq!(doc.pages[1].note, None);
}

#[test]
fn lazy_loading_can_be_disabled() {
    let options = CompileOptions {
        lazy_images: false,
        ..CompileOptions::default()
    };
    let doc = compile_document("![x](a.png)", &options).expect("compile should succeed");
    assert!(!doc.pages[0].content.contains("loading"), "{}", doc.pages[0].content);
}

#[test]
fn document_serializes_for_hosts() {
    let doc = compile("# A <!-- .big -->\n\n---\n\nB");
    let json = serde_json::to_value(&doc).expect("serialize");
    assert_eq!(json["title"], "A");
    assert_eq!(json["pages"][1]["index"], 2);
    assert_eq!(json["pages"][0]["className"], "slide");
    assert_eq!(json["pages"][0]["split"]["enabled"], false);
    assert!(
        json["pages"][0]["content"]
            .as_str()
            .is_some_and(|html| html.contains(r#"<h1 class="big">A</h1>"#))
    );
}
