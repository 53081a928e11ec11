//! Splits a slide body into raw per-page Markdown.
//!
//! A line consisting solely of `---` separates pages. Separator lines inside
//! fenced code blocks are content, not separators.

use crate::error::{Diagnostics, SourceLocation, Warning};

/// One page of raw Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPage<'a> {
    /// 1-based page index.
    pub index: usize,
    /// Page text without the separator lines.
    pub text: &'a str,
    /// 1-based document line where the page starts.
    pub first_line: usize,
}

/// Pages of a body plus any warnings raised while scanning.
#[derive(Debug, Clone, Default)]
pub struct PageSplit<'a> {
    /// Pages in document order (always at least one).
    pub pages: Vec<RawPage<'a>>,
    /// Non-fatal findings (e.g. an unclosed fence).
    pub diagnostics: Diagnostics,
}

/// Splits `body` on separator lines, numbering lines from `first_line` (the
/// document line on which the body begins).
pub fn split_pages(body: &str, first_line: usize) -> PageSplit<'_> {
    let mut split = PageSplit::default();
    let mut fence = FenceTracker::default();
    let mut page_start = 0usize;
    let mut page_line = first_line;
    let mut offset = 0usize;

    for (line_no, line) in body.split_inclusive('\n').enumerate() {
        let line_start = offset;
        offset += line.len();

        let content = line.trim_end_matches(['\n', '\r']);
        if fence.observe(content, first_line + line_no) {
            continue;
        }

        if content.trim_end() == "---" {
            split.push(&body[page_start..line_start], page_line);
            page_start = offset;
            page_line = first_line + line_no + 1;
        }
    }
    split.push(&body[page_start..], page_line);

    // An open fence swallows every later separator, so it sits on the last page.
    if let Some(open) = fence.open {
        split.diagnostics.add_warning(Warning::UnclosedCodeFence {
            location: SourceLocation::in_page(split.pages.len(), open.line, open.indent + 1),
            marker: open.marker,
        });
    }

    split
}

impl<'a> PageSplit<'a> {
    fn push(&mut self, text: &'a str, first_line: usize) {
        let text = text
            .strip_suffix('\n')
            .map(|t| t.strip_suffix('\r').unwrap_or(t))
            .unwrap_or(text);
        self.pages.push(RawPage {
            index: self.pages.len() + 1,
            text,
            first_line,
        });
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenFence {
    marker: char,
    length: usize,
    indent: usize,
    line: usize,
}

/// CommonMark fence tracking: openers and closers take 0–3 columns of indent,
/// closers repeat the opener's marker at least as many times and carry no info.
#[derive(Debug, Default)]
struct FenceTracker {
    open: Option<OpenFence>,
}

impl FenceTracker {
    /// Feeds one line; returns true when the line belongs to a fence.
    fn observe(&mut self, line: &str, line_no: usize) -> bool {
        let (columns, bytes) = leading_indent(line);
        let rest = &line[bytes..];

        match self.open {
            None => {
                if columns > 3 {
                    return false;
                }
                let Some((marker, length)) = fence_run(rest) else {
                    return false;
                };
                // Backtick fences may not carry backticks in their info string.
                if marker == '`' && rest[length..].contains('`') {
                    return false;
                }
                self.open = Some(OpenFence {
                    marker,
                    length,
                    indent: columns,
                    line: line_no,
                });
                true
            }
            Some(open) => {
                if columns <= 3
                    && let Some((marker, length)) = fence_run(rest)
                    && marker == open.marker
                    && length >= open.length
                    && rest[length..].trim().is_empty()
                {
                    self.open = None;
                }
                true
            }
        }
    }
}

/// Returns `(visual_columns, byte_len)` of the leading whitespace; tabs advance
/// to the next multiple of four.
fn leading_indent(line: &str) -> (usize, usize) {
    let mut columns = 0;
    let mut bytes = 0;
    for b in line.bytes() {
        match b {
            b' ' => columns += 1,
            b'\t' => columns += 4 - (columns % 4),
            _ => break,
        }
        bytes += 1;
    }
    (columns, bytes)
}

fn fence_run(s: &str) -> Option<(char, usize)> {
    let marker = s.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let length = s.chars().take_while(|c| *c == marker).count();
    (length >= 3).then_some((marker, length))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(body: &str) -> Vec<&str> {
        split_pages(body, 1).pages.iter().map(|p| p.text).collect()
    }

    #[test]
    fn single_page_without_separator() {
        assert_eq!(texts("# One\n\nBody"), vec!["# One\n\nBody"]);
    }

    #[test]
    fn splits_on_separator_lines() {
        let body = "# One\n\n---\n\n# Two\n\n---\n\n# Three\n";
        assert_eq!(texts(body), vec!["# One\n", "\n# Two\n", "\n# Three"]);
    }

    #[test]
    fn indices_and_first_lines() {
        let split = split_pages("a\n---\nb\nc\n---\nd", 1);
        let meta: Vec<_> = split.pages.iter().map(|p| (p.index, p.first_line)).collect();
        assert_eq!(meta, vec![(1, 1), (2, 3), (3, 6)]);
    }

    #[test]
    fn crlf_separators() {
        assert_eq!(texts("a\r\n---\r\nb"), vec!["a", "b"]);
    }

    #[test]
    fn trailing_separator_yields_empty_page() {
        assert_eq!(texts("a\n---\n"), vec!["a", ""]);
    }

    #[test]
    fn separator_inside_fence_is_content() {
        let body = "```yaml\n---\nkey: v\n```\n---\nnext";
        assert_eq!(texts(body), vec!["```yaml\n---\nkey: v\n```", "next"]);
    }

    #[test]
    fn longer_closer_closes_and_shorter_does_not() {
        let body = "````md\n```\n---\n````\n---\nnext";
        let pages = texts(body);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1], "next");
    }

    #[test]
    fn tilde_fence_ignores_backtick_closer() {
        let body = "~~~\n```\n---\n~~~\n---\nb";
        assert_eq!(texts(body).len(), 2);
    }

    #[test]
    fn indented_fence_is_not_a_fence() {
        let body = "    ```\n---\nb";
        assert_eq!(texts(body).len(), 2);
    }

    #[test]
    fn thicker_rules_do_not_split() {
        assert_eq!(texts("a\n----\nb\n- - -\nc").len(), 1);
    }

    #[test]
    fn unclosed_fence_is_reported() {
        let split = split_pages("# a\n```js\nlet x;\n---\n", 1);
        assert_eq!(split.pages.len(), 1);
        assert_eq!(
            split.diagnostics.warnings,
            vec![Warning::UnclosedCodeFence {
                location: SourceLocation::in_page(1, 2, 1),
                marker: '`',
            }]
        );
    }

    #[test]
    fn lines_are_offset_by_the_body_start() {
        let split = split_pages("a\n---\nb\n  ~~~\n---\n", 4);
        let meta: Vec<_> = split.pages.iter().map(|p| (p.index, p.first_line)).collect();
        assert_eq!(meta, vec![(1, 4), (2, 6)]);
        assert_eq!(
            split.diagnostics.warnings,
            vec![Warning::UnclosedCodeFence {
                location: SourceLocation::in_page(2, 7, 3),
                marker: '~',
            }]
        );
    }
}
