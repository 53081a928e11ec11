//! Page directives and their cross-page inheritance.
//!
//! A directive written in a root-level comment applies to the current page and
//! becomes the baseline of every following page until reassigned. Prefixing the
//! key with `_` scopes the assignment to the current page only.
//!
//! ```text
//! <!-- color:blue -->     page 1 blue, page 2.. blue
//! <!-- _color:red -->     this page red, next page back to the baseline
//! <!-- color:- -->        unset from here on
//! ```
//!
//! The inheritance is an explicit fold: [`PageDirectives::new`] takes the baseline
//! produced by the previous page and [`PageDirectives::finish`] returns the page's
//! resolved set together with the next baseline.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::attrs::{AttrValue, AttributeBag};

/// Marks a directive key as page-local.
pub const LOCAL_PREFIX: char = '_';

/// Value that removes a directive instead of setting it.
pub const UNSET_VALUE: &str = "-";

/// Keys that never carry over to the next page.
pub const PAGE_ONLY_KEYS: &[&str] = &["note", "splitSize"];

/// Resolved directive set (key → string or bool).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DirectiveMap {
    values: BTreeMap<String, AttrValue>,
}

impl DirectiveMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the initial baseline from frontmatter scalars.
    ///
    /// Strings and booleans map directly, numbers become their decimal text;
    /// arrays, objects and null are not directives.
    pub fn from_frontmatter(metadata: &Map<String, JsonValue>) -> Self {
        let mut map = Self::new();
        for (key, value) in metadata {
            let value = match value {
                JsonValue::String(s) => AttrValue::text(s.as_str()),
                JsonValue::Bool(b) => AttrValue::Bool(*b),
                JsonValue::Number(n) => AttrValue::text(n.to_string()),
                _ => continue,
            };
            map.values.insert(key.clone(), value);
        }
        map
    }

    /// Looks up a directive.
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.values.get(key)
    }

    /// Looks up a directive's text value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttrValue::as_str)
    }

    /// True when the directive is set to a non-empty value or `true`.
    pub fn is_enabled(&self, key: &str) -> bool {
        self.get(key).is_some_and(AttrValue::is_truthy)
    }

    /// Sets a directive.
    pub fn insert(&mut self, key: impl Into<String>, value: AttrValue) {
        self.values.insert(key.into(), value);
    }

    /// Removes a directive.
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.values.remove(key)
    }

    /// Iterates directives in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of directives.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no directive is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn apply(&mut self, changes: &BTreeMap<String, Assignment>) {
        for (key, change) in changes {
            match change {
                Assignment::Set(value) => self.insert(key.clone(), value.clone()),
                Assignment::Unset => {
                    self.remove(key);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Assignment {
    Set(AttrValue),
    Unset,
}

/// Which scope an assignment lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Current page and every following page.
    Global,
    /// Current page only.
    Local,
}

/// Directive state of the page being compiled.
#[derive(Debug, Clone)]
pub struct PageDirectives {
    baseline: DirectiveMap,
    global: BTreeMap<String, Assignment>,
    local: BTreeMap<String, Assignment>,
    /// `class` values assigned on this page, in source order, across both scopes.
    page_classes: Vec<String>,
}

impl PageDirectives {
    /// Starts a page from the baseline left by the previous page.
    pub fn new(baseline: DirectiveMap) -> Self {
        Self {
            baseline,
            global: BTreeMap::new(),
            local: BTreeMap::new(),
            page_classes: Vec::new(),
        }
    }

    /// Applies a root-level annotation.
    ///
    /// `_key` assignments are local; everything else is global. Shorthand
    /// `.class` / `#id` tokens feed the `class` / `id` directives.
    pub fn apply_bag(&mut self, bag: &AttributeBag) {
        for (key, value) in bag.attrs.iter() {
            self.assign(key, value.clone());
        }
        if !bag.classes.is_empty() {
            self.assign("class", AttrValue::text(bag.classes.join(" ")));
        }
        if !bag.ids.is_empty() {
            self.assign("id", AttrValue::text(bag.ids.join(" ")));
        }
    }

    /// Assigns one directive, resolving the scope from the key.
    pub fn assign(&mut self, key: &str, value: AttrValue) {
        let (scope, key) = match key.strip_prefix(LOCAL_PREFIX) {
            Some(stripped) if !stripped.is_empty() => (Scope::Local, stripped),
            _ => (Scope::Global, key),
        };
        self.assign_scoped(scope, key, value);
    }

    /// Assigns one directive in an explicit scope.
    pub fn assign_scoped(&mut self, scope: Scope, key: &str, value: AttrValue) {
        let scope = if PAGE_ONLY_KEYS.contains(&key) {
            Scope::Local
        } else {
            scope
        };

        if key == "class" {
            match &value {
                AttrValue::Text(class) if class != UNSET_VALUE => {
                    self.page_classes.push(class.clone())
                }
                _ => self.page_classes.clear(),
            }
        }

        let target = match scope {
            Scope::Global => &mut self.global,
            Scope::Local => &mut self.local,
        };
        let assignment = if value.as_str() == Some(UNSET_VALUE) {
            Assignment::Unset
        } else {
            concat_class(target.get(key), key, value)
        };

        log::debug!("directive {key} = {assignment:?} ({scope:?})");
        target.insert(key.to_string(), assignment);
    }

    /// Resolved set for the current page: baseline ⊕ global ⊕ local.
    ///
    /// `class` is the concatenation of every class assigned on this page, in
    /// source order, regardless of scope.
    pub fn resolved(&self) -> DirectiveMap {
        let mut map = self.baseline.clone();
        map.apply(&self.global);
        map.apply(&self.local);
        if !self.page_classes.is_empty() {
            map.insert("class", AttrValue::text(self.page_classes.join(" ")));
        }
        map
    }

    /// Ends the page: returns `(resolved, next_baseline)`.
    pub fn finish(self) -> (DirectiveMap, DirectiveMap) {
        let resolved = self.resolved();
        let mut next = self.baseline;
        next.apply(&self.global);
        for key in PAGE_ONLY_KEYS {
            next.remove(key);
        }
        (resolved, next)
    }
}

/// Repeated `class` assignments on one page concatenate.
fn concat_class(previous: Option<&Assignment>, key: &str, value: AttrValue) -> Assignment {
    match (key, previous, &value) {
        ("class", Some(Assignment::Set(AttrValue::Text(prev))), AttrValue::Text(next))
            if !prev.is_empty() =>
        {
            Assignment::Set(AttrValue::text(format!("{prev} {next}")))
        }
        _ => Assignment::Set(value),
    }
}
