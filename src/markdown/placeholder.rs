//! Placeholder contract: HTML with `{{KIND<n>}}` tokens plus a registry of
//! component records keyed by token.
//!
//! Callers that render blockquotes, code blocks and tables with their own UI
//! use [`parse`] and then [`ParsedMarkdown::assemble`] to splice their
//! output into the HTML.

use maud::{Markup, PreEscaped};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::ast::{Blockquote, CodeBlock, Document, Table};
use super::blocks::parse_document;
use super::component::Component;
use super::html::{RichBlocks, render_document};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlaceholderKind {
    Blockquote,
    CodeBlock,
    Table,
}

impl PlaceholderKind {
    const ALL: [PlaceholderKind; 3] = [
        PlaceholderKind::Blockquote,
        PlaceholderKind::CodeBlock,
        PlaceholderKind::Table,
    ];

    /// Token tag, e.g. `CODEBLOCK`.
    pub fn tag(&self) -> &'static str {
        match self {
            PlaceholderKind::Blockquote => "BLOCKQUOTE",
            PlaceholderKind::CodeBlock => "CODEBLOCK",
            PlaceholderKind::Table => "TABLE",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    fn slot(&self) -> usize {
        match self {
            PlaceholderKind::Blockquote => 0,
            PlaceholderKind::CodeBlock => 1,
            PlaceholderKind::Table => 2,
        }
    }
}

/// Token reserving the position of one rich block, e.g. `{{TABLE3}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    pub index: usize,
}

impl Placeholder {
    /// Parses a complete token including its braces.
    ///
    /// Only the canonical spelling is accepted, so `{{TABLE01}}` is not
    /// `{{TABLE1}}`.
    pub fn parse(token: &str) -> Option<Self> {
        let inner = token.strip_prefix("{{")?.strip_suffix("}}")?;
        let digits_at = inner.find(|c: char| c.is_ascii_digit())?;
        let (tag, digits) = inner.split_at(digits_at);
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let placeholder = Self {
            kind: PlaceholderKind::from_tag(tag)?,
            index: digits.parse().ok()?,
        };
        (placeholder.to_string() == token).then_some(placeholder)
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{{{}{}}}}}", self.kind.tag(), self.index)
    }
}

impl Serialize for Placeholder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Per-kind monotonic counters, fresh for every parse call.
#[derive(Debug, Default)]
pub struct PlaceholderIds {
    next: [usize; 3],
}

impl PlaceholderIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next token for `kind`, starting at 0.
    pub fn next(&mut self, kind: PlaceholderKind) -> Placeholder {
        let slot = &mut self.next[kind.slot()];
        let placeholder = Placeholder {
            kind,
            index: *slot,
        };
        *slot += 1;
        placeholder
    }
}

/// HTML with placeholder tokens and the records they stand for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedMarkdown {
    pub html: String,
    pub components: BTreeMap<Placeholder, Component>,
}

/// Parses markdown into the placeholder contract. Never fails.
///
/// # Arguments
///
/// * `source`: Markdown text
///
/// # Returns
///
/// HTML string in which each blockquote, code block and table appears as a
/// placeholder token, plus the component record for each token
pub fn parse(source: &str) -> ParsedMarkdown {
    ParsedMarkdown::from_document(&parse_document(source))
}

impl ParsedMarkdown {
    pub fn from_document(document: &Document) -> Self {
        let mut collector = Collector::default();
        let html = render_document(document, &mut collector);
        Self {
            html,
            components: collector.components,
        }
    }

    /// Replaces every registered token with the caller's rendering.
    ///
    /// Tokens are matched whole, delimiter to delimiter, and each is
    /// substituted exactly once. Unknown or repeated tokens are left as
    /// they are; registered tokens missing from the HTML are logged.
    ///
    /// # Arguments
    ///
    /// * `render`: Produces the HTML for one component
    ///
    /// # Returns
    ///
    /// Final HTML string
    pub fn assemble<F>(&self, mut render: F) -> String
    where
        F: FnMut(&Placeholder, &Component) -> String,
    {
        let mut out = String::with_capacity(self.html.len());
        let mut used = BTreeSet::new();
        let mut rest = self.html.as_str();

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let candidate = &rest[start..];

            let matched = candidate
                .find("}}")
                .map(|end| end + 2)
                .and_then(|len| Some((len, Placeholder::parse(&candidate[..len])?)))
                .filter(|(_, placeholder)| !used.contains(placeholder))
                .and_then(|(len, placeholder)| {
                    Some((len, placeholder, self.components.get(&placeholder)?))
                });

            match matched {
                Some((len, placeholder, component)) => {
                    out.push_str(&render(&placeholder, component));
                    used.insert(placeholder);
                    rest = &candidate[len..];
                }
                None => {
                    out.push_str("{{");
                    rest = &candidate[2..];
                }
            }
        }
        out.push_str(rest);

        for orphan in self.components.keys().filter(|p| !used.contains(*p)) {
            log::warn!("Placeholder {} not found in rendered HTML", orphan);
        }

        out
    }
}

/// Registers rich blocks and emits their tokens.
#[derive(Default)]
struct Collector {
    ids: PlaceholderIds,
    components: BTreeMap<Placeholder, Component>,
}

impl Collector {
    fn register(&mut self, component: Component) -> Markup {
        let placeholder = self.ids.next(component.kind());
        self.components.insert(placeholder, component);
        PreEscaped(placeholder.to_string())
    }
}

impl RichBlocks for Collector {
    fn blockquote(&mut self, quote: &Blockquote) -> Markup {
        self.register(Component::Blockquote(quote.into()))
    }

    fn code_block(&mut self, code: &CodeBlock) -> Markup {
        self.register(Component::CodeBlock(code.into()))
    }

    fn table(&mut self, table: &Table) -> Markup {
        self.register(Component::Table(table.into()))
    }
}
