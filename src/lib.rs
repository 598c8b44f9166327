//! Markdown rendering for Passport UI documentation pages.

pub mod components;
mod config;
mod highlight;
pub mod markdown;
pub mod sidebar;
mod util;

pub use config::{Config, OutputFormat};
pub use highlight::CodeHighlighter;
pub use markdown::{Document, MarkdownRenderer, ParsedMarkdown, parse, parse_document};
pub use sidebar::{Shortcut, Sidebar, SidebarCookie, SidebarState};
