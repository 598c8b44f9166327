//! HTML rendering of the document tree.
//!
//! Plain blocks and inline nodes are rendered here. Blockquotes, code blocks
//! and tables go through [`RichBlocks`], which either renders them as
//! components or stands a placeholder in for them.

use maud::{Markup, PreEscaped, html};

use super::ast::{
    Block, Blockquote, CodeBlock, Document, Footnote, Inline, List, ListItem, ListKind, Table,
};
use crate::util::escape_text;

/// Glyph appended to every link opened in a new browsing context.
pub const EXTERNAL_LINK_GLYPH: &str = "\u{2197}";

/// Renderer for blocks that need structured UI.
pub trait RichBlocks {
    fn blockquote(&mut self, quote: &Blockquote) -> Markup;
    fn code_block(&mut self, code: &CodeBlock) -> Markup;
    fn table(&mut self, table: &Table) -> Markup;
}

/// Renders a document to an HTML fragment.
///
/// Blocks are separated by newlines. A footnotes section is appended only
/// when at least one footnote was referenced.
///
/// # Arguments
///
/// * `document`: Parsed document tree
/// * `rich`: Renderer for blockquotes, code blocks and tables
///
/// # Returns
///
/// HTML fragment string
pub fn render_document(document: &Document, rich: &mut impl RichBlocks) -> String {
    let mut out = String::new();

    for block in &document.blocks {
        out.push_str(&render_block(block, rich).into_string());
        out.push('\n');
    }

    if !document.footnotes.is_empty() {
        out.push_str(&footnotes_section(&document.footnotes).into_string());
        out.push('\n');
    }

    out
}

fn render_block(block: &Block, rich: &mut impl RichBlocks) -> Markup {
    match block {
        Block::Heading { level, content } => heading(*level, content),
        Block::Paragraph(content) => html! { p class="md-p" { (inlines(content)) } },
        Block::List(list) => list_markup(list),
        Block::ThematicBreak => html! { hr class="md-hr"; },
        Block::Blockquote(quote) => rich.blockquote(quote),
        Block::CodeBlock(code) => rich.code_block(code),
        Block::Table(table) => rich.table(table),
    }
}

fn heading(level: u8, content: &[Inline]) -> Markup {
    let inner = inlines(content);
    match level {
        1 => html! { h1 class="md-h1" { (inner) } },
        2 => html! { h2 class="md-h2" { (inner) } },
        3 => html! { h3 class="md-h3" { (inner) } },
        4 => html! { h4 class="md-h4" { (inner) } },
        5 => html! { h5 class="md-h5" { (inner) } },
        _ => html! { h6 class="md-h6" { (inner) } },
    }
}

fn list_markup(list: &List) -> Markup {
    let items = html! {
        @for item in &list.items {
            (list_item(item))
        }
    };

    match list.kind {
        ListKind::Bullet => html! { ul class="md-ul" { (items) } },
        ListKind::Ordered { start: 1 } => html! { ol class="md-ol" { (items) } },
        ListKind::Ordered { start } => html! { ol class="md-ol" start=(start) { (items) } },
    }
}

fn list_item(item: &ListItem) -> Markup {
    match item.task {
        Some(checked) => html! {
            li class="md-li md-task" {
                input type="checkbox" class="md-task-checkbox" disabled checked[checked];
                " "
                (inlines(&item.content))
            }
        },
        None => html! { li class="md-li" { (inlines(&item.content)) } },
    }
}

/// Renders inline nodes.
pub fn inlines(nodes: &[Inline]) -> Markup {
    html! {
        @for node in nodes {
            (inline(node))
        }
    }
}

/// Renders inline nodes to an HTML string.
pub fn inline_html(nodes: &[Inline]) -> String {
    inlines(nodes).into_string()
}

fn inline(node: &Inline) -> Markup {
    match node {
        Inline::Text(text) => PreEscaped(escape_text(text)),
        Inline::Code(code) => html! { code class="md-code" { (attr(code)) } },
        Inline::Strong(children) => html! { strong class="md-strong" { (inlines(children)) } },
        Inline::Emphasis(children) => html! { em class="md-em" { (inlines(children)) } },
        Inline::Strikethrough(children) => html! { del class="md-del" { (inlines(children)) } },
        Inline::Link { url, children } => html! {
            a href=(attr(url)) target="_blank" rel="noopener noreferrer" class="md-link" {
                (inlines(children))
                span class="md-external-link" aria-hidden="true" { (EXTERNAL_LINK_GLYPH) }
            }
        },
        Inline::Image { url, alt } => html! {
            img src=(attr(url)) alt=(attr(alt)) class="md-image" loading="lazy";
        },
        Inline::Keyboard(keys) => html! { kbd class="md-kbd" { (attr(keys)) } },
        Inline::FootnoteRef {
            id,
            number,
            occurrence,
        } => html! {
            sup class="md-footnote-ref" id=(attr(&footnote_ref_id(id, *occurrence))) {
                a href=(attr(&format!("#fn-{id}"))) { (number) }
            }
        },
        Inline::LineBreak => html! { br; },
    }
}

fn footnotes_section(notes: &[Footnote]) -> Markup {
    html! {
        section class="md-footnotes" {
            hr class="md-hr";
            ol class="md-footnote-list" {
                @for note in notes {
                    li id=(attr(&format!("fn-{}", note.id))) {
                        (inlines(&note.content))
                        " "
                        a href=(attr(&format!("#fnref-{}", note.id)))
                            class="md-footnote-back"
                            aria-label="Back to reference" {
                            "\u{21A9}"
                        }
                    }
                }
            }
        }
    }
}

/// Anchor id of a footnote reference.
///
/// The first reference owns `fnref-<id>`, which the back link targets.
/// Later references to the same id get `-2`, `-3`, ...
fn footnote_ref_id(id: &str, occurrence: usize) -> String {
    match occurrence {
        0 | 1 => format!("fnref-{id}"),
        n => format!("fnref-{id}-{n}"),
    }
}

/// Escapes a value for element content or attributes.
fn attr(value: &str) -> PreEscaped<String> {
    PreEscaped(escape_text(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::blocks::parse_document;

    /// Renders rich blocks as bare markers so plain rendering can be
    /// asserted on its own.
    struct Markers;

    impl RichBlocks for Markers {
        fn blockquote(&mut self, _quote: &Blockquote) -> Markup {
            PreEscaped("[quote]".to_string())
        }

        fn code_block(&mut self, _code: &CodeBlock) -> Markup {
            PreEscaped("[code]".to_string())
        }

        fn table(&mut self, _table: &Table) -> Markup {
            PreEscaped("[table]".to_string())
        }
    }

    fn render(source: &str) -> String {
        render_document(&parse_document(source), &mut Markers)
    }

    #[test]
    fn test_bold_with_escaped_asterisks() {
        // Act
        let html = render("**bold** and \\*escaped\\*");

        // Assert
        assert!(
            html.contains("<strong class=\"md-strong\">bold</strong> and *escaped*"),
            "Got: {}",
            html
        );
        assert!(!html.contains("<em"), "Escaped asterisks are not italics");
    }

    #[test]
    fn test_heading_tags_match_level() {
        for level in 1..=6 {
            // Arrange
            let source = format!("{} Title", "#".repeat(level));

            // Act
            let html = render(&source);

            // Assert
            assert_eq!(html.matches(&format!("<h{}", level)).count(), 1, "{}", html);
            assert_eq!(html.matches(&format!("</h{}>", level)).count(), 1);
        }
    }

    #[test]
    fn test_single_list_container() {
        // Act
        let html = render("- a\n- b\n- c");

        // Assert
        assert_eq!(html.matches("<ul").count(), 1, "Got: {}", html);
        assert_eq!(html.matches("<li").count(), 3);
    }

    #[test]
    fn test_list_switch_produces_sibling_lists() {
        // Act
        let html = render("- a\n1. b");

        // Assert
        assert_eq!(html.matches("<ul").count(), 1);
        assert_eq!(html.matches("<ol").count(), 1);
        assert!(html.find("</ul>") < html.find("<ol"), "Got: {}", html);
    }

    #[test]
    fn test_ordered_list_start_attribute() {
        // Act
        let html = render("5. five");

        // Assert
        assert!(html.contains("<ol class=\"md-ol\" start=\"5\">"), "Got: {}", html);
    }

    #[test]
    fn test_task_checkboxes() {
        // Act
        let html = render("- [x] done\n- [ ] pending");

        // Assert
        assert!(
            html.contains("<input type=\"checkbox\" class=\"md-task-checkbox\" disabled checked> done"),
            "Got: {}",
            html
        );
        assert!(
            html.contains("<input type=\"checkbox\" class=\"md-task-checkbox\" disabled> pending"),
            "Got: {}",
            html
        );
    }

    #[test]
    fn test_link_attributes_and_glyph() {
        // Act
        let html = render("[Docs](https://example.com)");

        // Assert
        assert!(html.contains("href=\"https://example.com\""));
        assert!(html.contains("target=\"_blank\""));
        assert!(html.contains("rel=\"noopener noreferrer\""));
        assert!(html.contains(EXTERNAL_LINK_GLYPH), "Got: {}", html);
    }

    #[test]
    fn test_text_is_escaped() {
        // Act
        let html = render("<script>alert(1)</script>");

        // Assert
        assert!(html.contains("&lt;script&gt;"), "Got: {}", html);
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_code_span_escaped_verbatim() {
        // Act
        let html = render("`<b>*x*</b>`");

        // Assert
        assert!(
            html.contains("<code class=\"md-code\">&lt;b&gt;*x*&lt;/b&gt;</code>"),
            "Got: {}",
            html
        );
    }

    #[test]
    fn test_footnote_reference_and_section() {
        // Act
        let html = render("Claim[^src].\n\n[^src]: The source.");

        // Assert
        assert!(
            html.contains("<sup class=\"md-footnote-ref\" id=\"fnref-src\"><a href=\"#fn-src\">1</a></sup>"),
            "Got: {}",
            html
        );
        assert!(html.contains("<section class=\"md-footnotes\">"));
        assert!(html.contains("<li id=\"fn-src\">The source."));
        assert!(html.contains("href=\"#fnref-src\""));
    }

    #[test]
    fn test_repeated_footnote_reference_ids_are_unique() {
        // Act
        let html = render("One[^n] and two[^n] and three[^n].\n\n[^n]: Shared note.");

        // Assert
        assert_eq!(html.matches("id=\"fnref-n\"").count(), 1, "Got: {}", html);
        assert_eq!(html.matches("id=\"fnref-n-2\"").count(), 1);
        assert_eq!(html.matches("id=\"fnref-n-3\"").count(), 1);
        assert_eq!(html.matches("<a href=\"#fn-n\">1</a>").count(), 3);
        assert_eq!(html.matches("href=\"#fnref-n\"").count(), 1, "One back link");
    }

    #[test]
    fn test_emphasis_wrapping_strong() {
        // Act
        let html = render("*a **b** c*");

        // Assert
        assert!(
            html.contains("<em class=\"md-em\">a <strong class=\"md-strong\">b</strong> c</em>"),
            "Got: {}",
            html
        );
    }

    #[test]
    fn test_code_span_keeps_padding_spaces() {
        // Act
        let html = render("x ` a ` y");

        // Assert
        assert!(html.contains("<code class=\"md-code\"> a </code>"), "Got: {}", html);
    }

    #[test]
    fn test_missing_footnote_stays_literal() {
        // Act
        let html = render("See [^missing].");

        // Assert
        assert!(html.contains("[^missing]"), "Got: {}", html);
        assert!(!html.contains("md-footnotes"));
    }

    #[test]
    fn test_no_footnotes_no_section() {
        let html = render("Plain text only.");
        assert!(!html.contains("md-footnotes"));
    }

    #[test]
    fn test_keyboard_and_strikethrough() {
        // Act
        let html = render("Press [[Esc]] to ~~quit~~ close");

        // Assert
        assert!(html.contains("<kbd class=\"md-kbd\">Esc</kbd>"));
        assert!(html.contains("<del class=\"md-del\">quit</del>"));
    }

    #[test]
    fn test_rich_blocks_delegated() {
        // Act
        let html = render("> quote\n\n```\ncode\n```\n\n| a |\n|---|\n| 1 |");

        // Assert
        assert!(html.contains("[quote]"));
        assert!(html.contains("[code]"));
        assert!(html.contains("[table]"));
    }
}
