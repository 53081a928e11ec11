//! Click/step pass.
//!
//! Keys of the form `click-N` / `step-N` on any element register reveal steps.
//! A single bare key synthesises a hidden-then-shown pair
//! (`{prefix}-0="opacity-0"`, `{key}="opacity-100"`); otherwise every value is
//! the literal class list of its step.

use crate::tree::{Element, Node, walk_elements_mut};
use serde::Serialize;
use slidemd_core::AttrValue;
use std::collections::BTreeMap;

/// Class applied before an element's step is reached.
pub const HIDDEN_CLASS: &str = "opacity-0";
/// Class applied once an element's step is reached.
pub const REVEALED_CLASS: &str = "opacity-100";

/// Steps registered by one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepEntry {
    /// Value of the element's `data-step-id`.
    pub id: String,
    /// Step index to class list.
    pub steps: BTreeMap<u32, String>,
}

/// Per-page step registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRegistry {
    /// Stepped elements in document order.
    pub entries: Vec<StepEntry>,
    /// Greatest step index on the page.
    pub max_step: u32,
}

impl StepRegistry {
    /// True when no element has steps.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses `click-N` / `step-N` into `(prefix, N)`.
pub fn parse_step_key(key: &str) -> Option<(&str, u32)> {
    let (prefix, index) = key.split_once('-')?;
    if !matches!(prefix, "click" | "step")
        || index.is_empty()
        || !index.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    Some((prefix, index.parse().ok()?))
}

/// Normalises step attributes under `nodes` and returns the page registry.
pub fn collect_steps(nodes: &mut [Node], page: usize) -> StepRegistry {
    let mut registry = StepRegistry::default();
    walk_elements_mut(nodes, &mut |element| {
        if let Some(steps) = normalize(element) {
            let id = format!("p{page}-s{}", registry.entries.len() + 1);
            element.attrs.insert("data-step-id", AttrValue::text(id.as_str()));
            if let Some(max) = steps.keys().max() {
                registry.max_step = registry.max_step.max(*max);
            }
            registry.entries.push(StepEntry { id, steps });
        }
    });
    registry
}

fn normalize(element: &mut Element) -> Option<BTreeMap<u32, String>> {
    let keys: Vec<(String, String, u32)> = element
        .attrs
        .iter()
        .filter_map(|(key, _)| {
            let (prefix, index) = parse_step_key(key)?;
            Some((key.to_string(), prefix.to_string(), index))
        })
        .collect();

    if keys.is_empty() {
        return None;
    }

    let mut steps = BTreeMap::new();
    if let [(key, prefix, index)] = keys.as_slice()
        && element.attrs.get(key).is_some_and(AttrValue::is_flag)
    {
        element
            .attrs
            .insert(format!("{prefix}-0"), AttrValue::text(HIDDEN_CLASS));
        element.attrs.insert(key.as_str(), AttrValue::text(REVEALED_CLASS));
        element.attrs.add_class(HIDDEN_CLASS);
        steps.insert(0, HIDDEN_CLASS.to_string());
        steps.insert(*index, REVEALED_CLASS.to_string());
        return Some(steps);
    }

    for (key, _, index) in &keys {
        let classes = element
            .attrs
            .get_str(key)
            .unwrap_or_default()
            .to_string();
        steps.insert(*index, classes);
    }
    Some(steps)
}
