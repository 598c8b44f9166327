//! Markdown parsing and rendering.
//!
//! Source text is scanned into a [`Document`] tree of blocks and inline
//! nodes. The tree can be rendered directly with [`MarkdownRenderer`], or
//! turned into a [`ParsedMarkdown`] fragment where blockquotes, code blocks
//! and tables are replaced by `{{KIND<n>}}` placeholders and returned as
//! component records for the caller to render.

mod ast;
mod blocks;
mod component;
mod footnotes;
mod html;
mod inlines;
mod placeholder;
mod renderer;

pub use ast::{
    Alignment, Block, Blockquote, Cell, CodeBlock, Document, Footnote, Inline, List, ListItem,
    ListKind, QuoteNode, Table, plain_text,
};
pub use blocks::parse_document;
pub use component::{BlockquoteRecord, CodeBlockRecord, Component, QuoteLine, TableRecord};
pub use footnotes::{FootnoteRegistry, FootnoteUse};
pub use html::{EXTERNAL_LINK_GLYPH, RichBlocks, inline_html, render_document};
pub use inlines::InlineParser;
pub use placeholder::{ParsedMarkdown, Placeholder, PlaceholderIds, PlaceholderKind, parse};
pub use renderer::MarkdownRenderer;
