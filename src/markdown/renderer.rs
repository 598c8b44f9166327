//! Markdown rendering with structured code, quote and table components.

use anyhow::{Context, Result};
use maud::Markup;
use std::path::Path;

use super::ast::{Blockquote, CodeBlock, Document, Table};
use super::blocks::parse_document;
use super::component::{BlockquoteRecord, CodeBlockRecord, Component, TableRecord};
use super::html::{RichBlocks, render_document};
use super::placeholder::ParsedMarkdown;
use crate::components::{blockquote, code_block, table};
use crate::highlight::CodeHighlighter;

/// Renders markdown to HTML with rich blocks rendered as components.
///
/// Code blocks are highlighted with syntect using CSS classes. The renderer
/// holds no per document state, so one instance can render any number of
/// documents.
pub struct MarkdownRenderer {
    highlighter: CodeHighlighter,
}

impl MarkdownRenderer {
    /// Creates renderer with the default syntax set.
    pub fn new() -> Self {
        Self {
            highlighter: CodeHighlighter::new(),
        }
    }

    /// Renders markdown content to HTML string.
    ///
    /// Blockquotes, code blocks and tables are rendered in place, no
    /// placeholders are involved.
    ///
    /// # Arguments
    ///
    /// * `content`: Markdown content to render
    ///
    /// # Returns
    ///
    /// HTML fragment
    pub fn render(&self, content: &str) -> String {
        self.render_document(&parse_document(content))
    }

    /// Renders an already parsed document.
    pub fn render_document(&self, document: &Document) -> String {
        render_document(document, &mut Components { renderer: self })
    }

    /// Renders one registered component record.
    pub fn render_component(&self, component: &Component) -> String {
        self.component_markup(component).into_string()
    }

    /// Replaces every placeholder of a parse result with its rendered component.
    ///
    /// Produces the same HTML as [`MarkdownRenderer::render`] on the source
    /// the parse result came from.
    pub fn assemble(&self, parsed: &ParsedMarkdown) -> String {
        parsed.assemble(|_, component| self.render_component(component))
    }

    /// Renders markdown file at given path.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read
    pub fn render_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read markdown file: {}", path.display()))?;
        Ok(self.render(&content))
    }

    fn component_markup(&self, component: &Component) -> Markup {
        match component {
            Component::Blockquote(record) => blockquote::blockquote(record),
            Component::CodeBlock(record) => code_block::code_block(record, &self.highlighter),
            Component::Table(record) => table::table(record),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders rich blocks through their component records.
struct Components<'r> {
    renderer: &'r MarkdownRenderer,
}

impl RichBlocks for Components<'_> {
    fn blockquote(&mut self, quote: &Blockquote) -> Markup {
        blockquote::blockquote(&BlockquoteRecord::from(quote))
    }

    fn code_block(&mut self, code: &CodeBlock) -> Markup {
        code_block::code_block(&CodeBlockRecord::from(code), &self.renderer.highlighter)
    }

    fn table(&mut self, table: &Table) -> Markup {
        table::table(&TableRecord::from(table))
    }
}
