//! Footnote definitions and first-use numbering.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Footnote definition line: `[^id]: text`.
static DEFINITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\[\^([^\]\s]+)\]:\s?(.*)$").expect("valid footnote regex"));

/// Numbering of a single `[^id]` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FootnoteUse {
    /// 1-based footnote number, shared by every reference to the id.
    pub number: usize,
    /// 1-based count of references to the id so far, this one included.
    pub occurrence: usize,
}

/// Definitions keyed by id plus the ids in first-reference order.
///
/// The reference order, not the map, decides numbering and the order of
/// the rendered footnotes section.
#[derive(Debug, Default)]
pub struct FootnoteRegistry {
    definitions: HashMap<String, String>,
    order: Vec<String>,
    uses: HashMap<String, FootnoteUse>,
}

impl FootnoteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a definition. A later definition of the same id wins.
    pub fn define(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.definitions.insert(id.into(), text.into());
    }

    pub fn is_defined(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Records a reference and returns its number and occurrence.
    ///
    /// Returns `None` for ids without a definition; those references stay
    /// literal text.
    pub fn reference(&mut self, id: &str) -> Option<FootnoteUse> {
        if !self.is_defined(id) {
            return None;
        }

        if let Some(seen) = self.uses.get_mut(id) {
            seen.occurrence += 1;
            return Some(*seen);
        }

        self.order.push(id.to_string());
        let first = FootnoteUse {
            number: self.order.len(),
            occurrence: 1,
        };
        self.uses.insert(id.to_string(), first);
        Some(first)
    }

    /// Referenced definitions in numbering order.
    pub fn referenced(&self) -> impl Iterator<Item = (usize, &str, &str)> {
        self.order.iter().enumerate().filter_map(|(i, id)| {
            self.definitions
                .get(id)
                .map(|text| (i + 1, id.as_str(), text.as_str()))
        })
    }

    pub fn has_references(&self) -> bool {
        !self.order.is_empty()
    }
}

/// Splits a definition line into `(id, text)`.
pub fn parse_definition(line: &str) -> Option<(&str, &str)> {
    let caps = DEFINITION.captures(line)?;
    let id = caps.get(1)?.as_str();
    let text = caps.get(2).map_or("", |m| m.as_str());
    Some((id, text.trim_end()))
}
