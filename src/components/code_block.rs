//! Code block component

use maud::{Markup, PreEscaped, html};

use super::icons::file_icon;
use crate::highlight::CodeHighlighter;
use crate::markdown::CodeBlockRecord;

/// Language class used when the fence names none.
const PLAIN_LANGUAGE: &str = "text";

/// Renders a fenced code block with highlighting.
///
/// A header with file icon and name is shown when the fence carries a
/// filename. The line number gutter is emitted only when requested and
/// counts at least one line.
///
/// # Arguments
///
/// * `record`: Code block record
/// * `highlighter`: Syntax highlighter, falls back to escaped text
///
/// # Returns
///
/// Code block markup
pub fn code_block(record: &CodeBlockRecord, highlighter: &CodeHighlighter) -> Markup {
    let language = record.language.as_deref().unwrap_or(PLAIN_LANGUAGE);
    let highlighted = highlighter.highlight(
        &record.code,
        record.language.as_deref(),
        record.filename.as_deref(),
    );
    let line_count = record.code.lines().count().max(1);

    html! {
        div class="md-code-block" data-language=(language) {
            @if let Some(filename) = &record.filename {
                div class="md-code-header" {
                    (file_icon(filename))
                    span class="md-code-filename" { (filename) }
                }
            }
            div class="md-code-body" {
                @if record.show_line_numbers {
                    div class="md-line-numbers" aria-hidden="true" {
                        @for number in 1..=line_count {
                            span class="md-line-number" { (number) }
                        }
                    }
                }
                pre class="md-pre" {
                    code class=(format!("language-{}", language)) { (PreEscaped(highlighted)) }
                }
            }
        }
    }
}
