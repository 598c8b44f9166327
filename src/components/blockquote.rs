//! Blockquote component

use maud::{Markup, PreEscaped, html};

use crate::markdown::{BlockquoteRecord, QuoteLine};

/// Renders a blockquote record with its nested quotes.
///
/// Line content is already inline HTML and is inserted unescaped.
pub fn blockquote(record: &BlockquoteRecord) -> Markup {
    let class = if record.nested {
        "md-blockquote md-blockquote-has-nested"
    } else {
        "md-blockquote"
    };

    html! {
        blockquote class=(class) {
            (quote_lines(&record.content))
        }
    }
}

fn quote_lines(lines: &[QuoteLine]) -> Markup {
    html! {
        @for line in lines {
            @match line {
                QuoteLine::Line { html } => {
                    p class="md-quote-line" { (PreEscaped(html)) }
                },
                QuoteLine::Break => {
                    br class="md-quote-break";
                },
                QuoteLine::Nested { children } => {
                    blockquote class="md-blockquote md-blockquote-nested" {
                        (quote_lines(children))
                    }
                },
            }
        }
    }
}
