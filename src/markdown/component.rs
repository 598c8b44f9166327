//! Component records for blocks rendered as structured UI.

use serde::Serialize;

use super::ast::{Alignment, Blockquote, CodeBlock, QuoteNode, Table};
use super::html::inline_html;
use super::placeholder::PlaceholderKind;

/// Record registered for a rich block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Component {
    Blockquote(BlockquoteRecord),
    CodeBlock(CodeBlockRecord),
    Table(TableRecord),
}

impl Component {
    pub fn kind(&self) -> PlaceholderKind {
        match self {
            Component::Blockquote(_) => PlaceholderKind::Blockquote,
            Component::CodeBlock(_) => PlaceholderKind::CodeBlock,
            Component::Table(_) => PlaceholderKind::Table,
        }
    }
}

/// Blockquote with inline content already rendered to HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockquoteRecord {
    pub nested: bool,
    pub content: Vec<QuoteLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuoteLine {
    Line { html: String },
    Break,
    Nested { children: Vec<QuoteLine> },
}

impl From<&Blockquote> for BlockquoteRecord {
    fn from(quote: &Blockquote) -> Self {
        Self {
            nested: quote.is_nested(),
            content: quote_lines(quote),
        }
    }
}

fn quote_lines(quote: &Blockquote) -> Vec<QuoteLine> {
    quote
        .children
        .iter()
        .map(|child| match child {
            QuoteNode::Line(content) => QuoteLine::Line {
                html: inline_html(content),
            },
            QuoteNode::Break => QuoteLine::Break,
            QuoteNode::Nested(inner) => QuoteLine::Nested {
                children: quote_lines(inner),
            },
        })
        .collect()
}

/// Raw fenced code; highlighting happens at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlockRecord {
    pub code: String,
    pub language: Option<String>,
    pub filename: Option<String>,
    pub show_line_numbers: bool,
}

impl From<&CodeBlock> for CodeBlockRecord {
    fn from(block: &CodeBlock) -> Self {
        Self {
            code: block.code.clone(),
            language: block.language.clone(),
            filename: block.filename.clone(),
            show_line_numbers: block.show_line_numbers,
        }
    }
}

/// Table with every cell rendered to inline HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRecord {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub alignments: Vec<Alignment>,
}

impl TableRecord {
    /// Alignment for a column, left when out of range.
    pub fn alignment(&self, column: usize) -> Alignment {
        self.alignments.get(column).copied().unwrap_or_default()
    }
}

impl From<&Table> for TableRecord {
    fn from(table: &Table) -> Self {
        Self {
            headers: table
                .headers
                .iter()
                .map(|cell| inline_html(&cell.content))
                .collect(),
            rows: table
                .rows
                .iter()
                .map(|row| row.iter().map(|cell| inline_html(&cell.content)).collect())
                .collect(),
            alignments: table.alignments.clone(),
        }
    }
}
