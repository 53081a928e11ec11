use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// YAML header split off the front of a slide document.
#[derive(Debug, Clone, PartialEq)]
pub struct Frontmatter {
    /// Parsed header as a JSON object (empty when the document has no header).
    pub metadata: Map<String, JsonValue>,
    /// Byte offset inside the input document where the slide body begins.
    pub body_start: usize,
}

impl Frontmatter {
    fn empty() -> Self {
        Self {
            metadata: Map::new(),
            body_start: 0,
        }
    }

    /// Returns the body of `input` that follows the header.
    pub fn body<'a>(&self, input: &'a str) -> &'a str {
        input.get(self.body_start..).unwrap_or_default()
    }

    /// 1-based line of `input` on which the body begins.
    pub fn body_line(&self, input: &str) -> usize {
        input
            .get(..self.body_start)
            .map_or(0, |header| header.matches('\n').count())
            + 1
    }

    /// Returns the `title` key when it is a string.
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").and_then(JsonValue::as_str)
    }
}

/// Errors emitted while parsing or extracting frontmatter.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// Unclosed YAML fence (e.g., missing terminating `---`).
    #[error("Unterminated YAML frontmatter block: expected closing '---'")]
    Unterminated,
    /// YAML failed to parse.
    #[error("Frontmatter parse error: {0}")]
    Parse(String),
    /// Top-level YAML node was not a mapping.
    #[error("Frontmatter must be a YAML mapping at the top level")]
    InvalidRootType,
}

/// Splits the YAML header from a slide document.
///
/// The header must open on the first non-blank line. Any YAML error is fatal for
/// the whole document.
pub fn extract_frontmatter(input: &str) -> Result<Frontmatter, FrontmatterError> {
    let Some((block, body_start)) = find_yaml_block(input)? else {
        return Ok(Frontmatter::empty());
    };

    Ok(Frontmatter {
        metadata: parse_yaml_block(block)?,
        body_start,
    })
}

fn parse_yaml_block(block: &str) -> Result<Map<String, JsonValue>, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(Map::new());
    }

    let yaml: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    let json =
        serde_json::to_value(yaml).map_err(|err| FrontmatterError::Parse(err.to_string()))?;

    match json {
        JsonValue::Null => Ok(Map::new()),
        JsonValue::Object(map) => Ok(map),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}

/// Returns the raw YAML text and the body offset, or `None` without a header.
fn find_yaml_block(input: &str) -> Result<Option<(&str, usize)>, FrontmatterError> {
    let bom_len = if input.starts_with('\u{feff}') {
        '\u{feff}'.len_utf8()
    } else {
        0
    };

    let mut lines = LineCursor::new(input, bom_len);
    let opened = loop {
        match lines.next() {
            Some((line, _)) if line.trim().is_empty() => continue,
            Some((line, _)) if is_yaml_fence(line) => break true,
            _ => break false,
        }
    };
    if !opened {
        return Ok(None);
    }

    let block_start = lines.offset;
    while let Some((line, line_start)) = lines.next() {
        if is_yaml_fence(line) {
            let block = input[block_start..line_start].trim_end_matches(['\r', '\n']);
            return Ok(Some((block, lines.offset)));
        }
    }

    Err(FrontmatterError::Unterminated)
}

/// Iterates lines as `(line_without_newline, line_start_offset)`.
struct LineCursor<'a> {
    input: &'a str,
    offset: usize,
}

impl<'a> LineCursor<'a> {
    fn new(input: &'a str, offset: usize) -> Self {
        Self { input, offset }
    }
}

impl<'a> Iterator for LineCursor<'a> {
    type Item = (&'a str, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.input.len() {
            return None;
        }
        let start = self.offset;
        let rest = &self.input[start..];
        match rest.find('\n') {
            Some(pos) => {
                self.offset = start + pos + 1;
                Some((&rest[..pos], start))
            }
            None => {
                self.offset = self.input.len();
                Some((rest, start))
            }
        }
    }
}

fn is_yaml_fence(line: &str) -> bool {
    line.trim_end_matches('\r') == "---"
}
