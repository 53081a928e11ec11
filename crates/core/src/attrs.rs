//! Annotation micro-grammar.
//!
//! One annotation string (an HTML comment body, a code fence meta string or the
//! tail of an image alt text) is split into whitespace-separated tokens. Quotes
//! group whitespace into a single token. Each token is then classified:
//!
//! | token            | meaning                                        |
//! |------------------|------------------------------------------------|
//! | `.a` / `.a.b`    | class name(s); dots separate several classes   |
//! | `#a`             | id name                                        |
//! | `key=value`      | scalar attribute (first `=` or `:` separates)  |
//! | `key:value`      | scalar attribute                               |
//! | `key="a b"`      | scalar attribute, quotes stripped              |
//! | `key`            | flag (boolean `true`)                          |
//!
//! Keys must match `[A-Za-z_][A-Za-z0-9_-]*`; anything else is ignored. The
//! parser never fails: unrecognised fragments contribute nothing.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Value of one attribute or directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// A string value, already de-quoted.
    Text(String),
    /// A boolean; bare keywords parse as `Bool(true)`.
    Bool(bool),
}

impl AttrValue {
    /// Shorthand for a text value.
    pub fn text(value: impl Into<String>) -> Self {
        AttrValue::Text(value.into())
    }

    /// Returns the text value, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(value) => Some(value),
            AttrValue::Bool(_) => None,
        }
    }

    /// True for a bare flag or an empty string: "no explicit value".
    pub fn is_flag(&self) -> bool {
        match self {
            AttrValue::Text(value) => value.is_empty(),
            AttrValue::Bool(_) => true,
        }
    }

    /// True when the value enables its key (non-empty text or `true`).
    pub fn is_truthy(&self) -> bool {
        match self {
            AttrValue::Text(value) => !value.is_empty(),
            AttrValue::Bool(flag) => *flag,
        }
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttrValue::Text(value) => serializer.serialize_str(value),
            AttrValue::Bool(flag) => serializer.serialize_bool(*flag),
        }
    }
}

/// Insertion-ordered attribute map.
///
/// `class` and `id` are stored as space-separated lists and grow through
/// [`Attributes::add_class`] / [`Attributes::add_id`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, AttrValue)>,
}

impl Attributes {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entry is present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a key.
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Looks up a key and returns its text value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttrValue::as_str)
    }

    /// True when `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Sets `key`, overwriting in place when it already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: AttrValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Appends one or more space-separated class names.
    pub fn add_class(&mut self, class: &str) {
        self.append_list("class", class);
    }

    /// Appends one or more space-separated id names.
    pub fn add_id(&mut self, id: &str) {
        self.append_list("id", id);
    }

    /// Merges a parsed bag: `class`/`id` concatenate, scalar keys overwrite.
    pub fn merge_bag(&mut self, bag: &AttributeBag) {
        for (key, value) in bag.attrs.iter() {
            match (key, value) {
                ("class", AttrValue::Text(class)) => self.add_class(class),
                ("id", AttrValue::Text(id)) => self.add_id(id),
                _ => self.insert(key, value.clone()),
            }
        }
        for class in &bag.classes {
            self.add_class(class);
        }
        for id in &bag.ids {
            self.add_id(id);
        }
    }

    fn append_list(&mut self, key: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        let joined = match self.get_str(key) {
            Some(existing) if !existing.is_empty() => format!("{existing} {value}"),
            _ => value.to_string(),
        };
        self.insert(key, AttrValue::Text(joined));
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Parsed result of exactly one annotation string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeBag {
    /// Scalar and flag attributes (explicit `class`/`id` keys included).
    pub attrs: Attributes,
    /// Shorthand `.class` tokens in source order.
    pub classes: Vec<String>,
    /// Shorthand `#id` tokens in source order.
    pub ids: Vec<String>,
}

impl AttributeBag {
    /// True when the annotation contributed nothing.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty() && self.classes.is_empty() && self.ids.is_empty()
    }
}

/// One classified annotation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// `.name`
    Class(&'a str),
    /// `#name`
    Id(&'a str),
    /// `key`, `key=value` or `key:value`. `None` means no explicit value.
    Pair {
        /// Attribute key.
        key: &'a str,
        /// De-quoted value; `None` when absent or empty.
        value: Option<&'a str>,
    },
}

/// Parses one annotation string into an [`AttributeBag`].
pub fn parse_annotation(input: &str) -> AttributeBag {
    let mut bag = AttributeBag::default();
    for token in tokenize(input) {
        match token {
            Token::Class(name) => bag.classes.push(name.to_string()),
            Token::Id(name) => bag.ids.push(name.to_string()),
            Token::Pair { key, value } => {
                let value = match value {
                    Some(value) => AttrValue::text(value),
                    None => AttrValue::Bool(true),
                };
                bag.attrs.insert(key, value);
            }
        }
    }
    bag
}

/// Splits and classifies an annotation string.
///
/// A `key:` or `key=` token with nothing after the separator takes the next
/// token as its value (`note: "hello"`), unless that token is itself a class,
/// an id or a pair.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut raws = split_quoted(input).into_iter().peekable();
    while let Some(raw) = raws.next() {
        if let Some(key) = raw.strip_suffix([':', '='])
            && is_valid_key(key)
            && let Some(value) = raws.next_if(|next| !starts_token(next))
        {
            let value = strip_quotes(value);
            tokens.push(Token::Pair {
                key,
                value: (!value.is_empty()).then_some(value),
            });
            continue;
        }
        classify(raw, &mut tokens);
    }
    tokens
}

/// True when `raw` would classify as a class, an id or a pair on its own.
fn starts_token(raw: &str) -> bool {
    if raw.starts_with(['.', '#']) {
        return true;
    }
    match raw.find(['=', ':']) {
        Some(pos) => is_valid_key(&raw[..pos]),
        None => false,
    }
}

fn classify<'a>(raw: &'a str, out: &mut Vec<Token<'a>>) {
    if let Some(names) = raw.strip_prefix('.') {
        out.extend(
            names
                .split('.')
                .filter(|name| !name.is_empty())
                .map(Token::Class),
        );
        return;
    }

    if let Some(name) = raw.strip_prefix('#') {
        if !name.is_empty() {
            out.push(Token::Id(name));
        }
        return;
    }

    let (key, value) = match raw.find(['=', ':']) {
        Some(pos) => (&raw[..pos], Some(strip_quotes(&raw[pos + 1..]))),
        None => (raw, None),
    };

    if !is_valid_key(key) {
        log::debug!("ignoring annotation fragment '{raw}'");
        return;
    }

    out.push(Token::Pair {
        key,
        value: value.filter(|v| !v.is_empty()),
    });
}

/// Splits on whitespace, keeping quoted runs inside one token.
fn split_quoted(input: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut token_start: Option<usize> = None;
    let mut quote: Option<char> = None;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => {
                token_start.get_or_insert(i);
                quote = Some(c);
            }
            (Some(open), _) if c == open => quote = None,
            (None, c) if c.is_whitespace() => {
                if let Some(start) = token_start.take() {
                    tokens.push(&input[start..i]);
                }
            }
            _ => {
                token_start.get_or_insert(i);
            }
        }
    }

    if let Some(start) = token_start {
        tokens.push(&input[start..]);
    }

    tokens
}

fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix(['"', '\'']).unwrap_or(value);
    value.strip_suffix(['"', '\'']).unwrap_or(value)
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_with_both_separators() {
        let bag = parse_annotation("key=value other:thing");
        assert_eq!(bag.attrs.len(), 2);
        assert_eq!(bag.attrs.get_str("key"), Some("value"));
        assert_eq!(bag.attrs.get_str("other"), Some("thing"));
    }

    #[test]
    fn quoted_values_keep_spaces_and_lose_quotes() {
        let bag = parse_annotation(r#"key2="v2 with space" note:'one two'"#);
        assert_eq!(bag.attrs.get_str("key2"), Some("v2 with space"));
        assert_eq!(bag.attrs.get_str("note"), Some("one two"));
    }

    #[test]
    fn directive_example_from_docs() {
        let bag =
            parse_annotation(r#" key:value key2="v2 with space" .class-a .class-b #id-a "#);
        assert_eq!(bag.attrs.len(), 2);
        assert_eq!(bag.classes, vec!["class-a", "class-b"]);
        assert_eq!(bag.ids, vec!["id-a"]);
    }

    #[test]
    fn bare_keywords_are_flags() {
        let bag = parse_annotation("vertical click-2 empty=");
        assert_eq!(bag.attrs.get("vertical"), Some(&AttrValue::Bool(true)));
        assert_eq!(bag.attrs.get("click-2"), Some(&AttrValue::Bool(true)));
        assert_eq!(bag.attrs.get("empty"), Some(&AttrValue::Bool(true)));
    }

    #[test]
    fn dotted_class_tokens_split() {
        let bag = parse_annotation(".a.b .hover:text-blue-500");
        assert_eq!(bag.classes, vec!["a", "b", "hover:text-blue-500"]);
    }

    #[test]
    fn first_separator_wins() {
        let bag = parse_annotation(r#"style="color:red" bgImg:url(a=b)"#);
        assert_eq!(bag.attrs.get_str("style"), Some("color:red"));
        assert_eq!(bag.attrs.get_str("bgImg"), Some("url(a=b)"));
    }

    #[test]
    fn malformed_fragments_are_ignored() {
        let bag = parse_annotation("photo.png 50% :x = . # {1,3}");
        assert!(bag.is_empty(), "{bag:?}");
    }

    #[test]
    fn explicit_class_comes_before_shorthand() {
        let bag = parse_annotation(".b class:a .c");
        assert_eq!(bag.attrs.get_str("class"), Some("a"));
        assert_eq!(bag.classes, vec!["b", "c"]);

        let mut attrs = Attributes::new();
        attrs.merge_bag(&bag);
        assert_eq!(attrs.get_str("class"), Some("a b c"));
        assert!(!attrs.contains_key("id"));
    }

    #[test]
    fn later_duplicate_keys_overwrite() {
        let bag = parse_annotation("k:1 k:2");
        assert_eq!(bag.attrs.len(), 1);
        assert_eq!(bag.attrs.get_str("k"), Some("2"));
    }

    #[test]
    fn identical_input_is_deterministic() {
        let input = "a:1 .x #y b";
        assert_eq!(parse_annotation(input), parse_annotation(input));
    }

    #[test]
    fn merge_bag_concatenates_lists_and_overwrites_scalars() {
        let mut attrs = Attributes::new();
        attrs.insert("class", AttrValue::text("base"));
        attrs.insert("title", AttrValue::text("old"));
        attrs.merge_bag(&parse_annotation(".x class:y #i title:new"));
        assert_eq!(attrs.get_str("class"), Some("base y x"));
        assert_eq!(attrs.get_str("title"), Some("new"));
        assert_eq!(attrs.get_str("id"), Some("i"));
    }

    #[test]
    fn yaml_style_pairs_take_the_next_token() {
        let bag = parse_annotation("color: red\nnote: \"speak up\"\nbgImg: url(https://x/a.png)");
        assert_eq!(bag.attrs.get_str("color"), Some("red"));
        assert_eq!(bag.attrs.get_str("note"), Some("speak up"));
        assert_eq!(bag.attrs.get_str("bgImg"), Some("url(https://x/a.png)"));
    }

    #[test]
    fn dangling_separator_before_a_pair_is_a_flag() {
        let bag = parse_annotation("split: size:2fr .x");
        assert_eq!(bag.attrs.get("split"), Some(&AttrValue::Bool(true)));
        assert_eq!(bag.attrs.get_str("size"), Some("2fr"));
        assert_eq!(bag.classes, vec!["x"]);
    }

    #[test]
    fn tokens_preserve_order() {
        let tokens = tokenize("blur:5px .a cover");
        assert_eq!(
            tokens,
            vec![
                Token::Pair {
                    key: "blur",
                    value: Some("5px")
                },
                Token::Class("a"),
                Token::Pair {
                    key: "cover",
                    value: None
                },
            ]
        );
    }

    #[test]
    fn serializes_in_insertion_order() {
        let mut attrs = Attributes::new();
        attrs.insert("z", AttrValue::text("1"));
        attrs.insert("a", AttrValue::Bool(true));
        insta::assert_snapshot!(serde_json::to_string(&attrs).unwrap(), @r#"{"z":"1","a":true}"#);
    }
}
