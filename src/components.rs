//! Reusable HTML components for markdown pages
//!
//! Blockquotes, code blocks and tables are rendered from their component
//! records so the same markup serves both direct rendering and placeholder
//! assembly. The layout wraps a rendered fragment into a standalone page.

pub mod blockquote;
pub mod code_block;
pub mod icons;
pub mod layout;
pub mod table;
