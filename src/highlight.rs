//! Syntax highlighting for fenced code blocks with syntect.

use anyhow::{Context, Result};
use std::path::Path;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::util::escape_html;

/// CSS class prefix for highlighted spans, matching highlight.js themes.
const CLASS_PREFIX: &str = "hljs-";

/// Highlights code with CSS classes, never failing.
///
/// Syntax is chosen from the fence language first, then the filename
/// extension, then the first line of the code (shebangs, XML prologs).
/// When nothing matches or highlighting errors, the code is returned as
/// escaped plain text.
pub struct CodeHighlighter {
    syntax_set: SyntaxSet,
}

impl CodeHighlighter {
    /// Creates highlighter with syntect's bundled syntax definitions.
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// Highlights code to HTML.
    ///
    /// # Arguments
    ///
    /// * `code`: Raw source code
    /// * `language`: Fence language token (rust, py, etc)
    /// * `filename`: Fence filename, used for its extension
    ///
    /// # Returns
    ///
    /// HTML with `<span class="hljs-*">` tags, or escaped plain text
    pub fn highlight(&self, code: &str, language: Option<&str>, filename: Option<&str>) -> String {
        if code.is_empty() {
            return String::new();
        }

        let requested = language
            .and_then(|lang| self.find_syntax(lang))
            .or_else(|| {
                filename
                    .and_then(|name| Path::new(name).extension())
                    .and_then(|ext| ext.to_str())
                    .and_then(|ext| self.syntax_set.find_syntax_by_extension(ext))
            });

        if let Some(syntax) = requested {
            match self.highlight_with(code, syntax) {
                Ok(html) => return html,
                Err(e) => log::warn!(
                    "Highlighting as {} failed, trying auto-detection: {:#}",
                    syntax.name,
                    e
                ),
            }
        } else if let Some(lang) = language {
            log::debug!("No syntax for language {}, trying auto-detection", lang);
        }

        if let Some(syntax) = self.detect(code) {
            match self.highlight_with(code, syntax) {
                Ok(html) => return html,
                Err(e) => log::warn!("Auto-detected highlighting failed: {:#}", e),
            }
        }

        escape_html(code)
    }

    fn find_syntax(&self, language: &str) -> Option<&SyntaxReference> {
        self.syntax_set
            .find_syntax_by_token(language)
            .or_else(|| self.syntax_set.find_syntax_by_extension(language))
    }

    fn detect(&self, code: &str) -> Option<&SyntaxReference> {
        let first_line = code.lines().next()?;
        self.syntax_set.find_syntax_by_first_line(first_line)
    }

    fn highlight_with(&self, code: &str, syntax: &SyntaxReference) -> Result<String> {
        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &self.syntax_set,
            ClassStyle::SpacedPrefixed {
                prefix: CLASS_PREFIX,
            },
        );

        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .context("Failed to parse line for syntax highlighting")?;
        }

        Ok(generator.finalize())
    }
}

impl Default for CodeHighlighter {
    fn default() -> Self {
        Self::new()
    }
}
