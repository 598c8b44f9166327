//! Line oriented block scanner.
//!
//! Footnote definitions are lifted out first. The remaining lines are
//! classified one at a time: fenced code, blockquote groups and tables are
//! recognised before headings, rules, list items and paragraph text.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ast::{
    Alignment, Block, Blockquote, Cell, CodeBlock, Document, Footnote, List, ListItem, ListKind,
    QuoteNode, Table,
};
use super::footnotes::{FootnoteRegistry, parse_definition};
use super::inlines::InlineParser;

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").expect("valid heading regex"));

static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*-{3,}\s*$").expect("valid rule regex"));

static BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-*+]\s+(.*)$").expect("valid bullet regex"));

static ORDERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,9})\.\s+(.*)$").expect("valid ordered regex"));

static TASK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([ xX])\](?:\s+(.*))?$").expect("valid task regex"));

static FILENAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"filename\s*=\s*["']([^"']*)["']"#).expect("valid filename regex")
});

const FENCE: &str = "```";
const LINE_NUMBERS_FLAG: &str = "showLineNumbers";

/// Parses markdown source into a document tree. Never fails.
///
/// # Arguments
///
/// * `source`: Markdown text, newline delimited
///
/// # Returns
///
/// Document with blocks in source order and referenced footnotes in
/// first-use order
pub fn parse_document(source: &str) -> Document {
    let mut registry = FootnoteRegistry::new();
    let lines = extract_footnote_definitions(source, &mut registry);

    let blocks = BlockScanner::new(&lines, &mut registry).run();

    let footnotes = registry
        .referenced()
        .map(|(number, id, text)| Footnote {
            id: id.to_string(),
            number,
            content: InlineParser::without_footnotes().parse(text),
        })
        .collect();

    Document { blocks, footnotes }
}

/// Removes `[^id]: text` lines outside fenced code and registers them.
fn extract_footnote_definitions<'s>(
    source: &'s str,
    registry: &mut FootnoteRegistry,
) -> Vec<&'s str> {
    let source_lines: Vec<&str> = source.lines().collect();
    let closes = fence_closes(&source_lines);
    let mut lines = Vec::new();
    let mut in_fence = false;

    for (i, &line) in source_lines.iter().enumerate() {
        if in_fence {
            in_fence = line.trim() != FENCE;
        } else if is_fence_open(line) {
            // unclosed fences are plain text
            in_fence = closes[i].is_some();
        }

        if !in_fence && let Some((id, text)) = parse_definition(line) {
            registry.define(id, text);
            continue;
        }

        lines.push(line);
    }

    lines
}

/// Kind of list a line belongs to, before items are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Bullet,
    Ordered(u64),
}

struct BlockScanner<'s, 'r> {
    lines: &'s [&'s str],
    fence_closes: Vec<Option<usize>>,
    pos: usize,
    inlines: InlineParser<'r>,
    blocks: Vec<Block>,
    paragraph: Vec<&'s str>,
    list: Option<List>,
}

impl<'s, 'r> BlockScanner<'s, 'r> {
    fn new(lines: &'s [&'s str], registry: &'r mut FootnoteRegistry) -> Self {
        Self {
            lines,
            fence_closes: fence_closes(lines),
            pos: 0,
            inlines: InlineParser::new(registry),
            blocks: Vec::new(),
            paragraph: Vec::new(),
            list: None,
        }
    }

    fn run(mut self) -> Vec<Block> {
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];

            if is_fence_open(line)
                && let Some(close) = self.find_fence_close()
            {
                self.flush();
                let block = self.code_block(close);
                self.blocks.push(block);
                continue;
            }

            if quote_marker(line).is_some() {
                self.flush();
                let block = self.blockquote();
                self.blocks.push(block);
                continue;
            }

            if self.is_table_start() {
                self.flush();
                let block = self.table();
                self.blocks.push(block);
                continue;
            }

            if let Some(caps) = HEADING.captures(line) {
                self.flush();
                let level = caps[1].len() as u8;
                let content = self.inlines.parse(caps[2].trim());
                self.blocks.push(Block::Heading { level, content });
                self.pos += 1;
                continue;
            }

            if RULE.is_match(line) {
                self.flush();
                self.blocks.push(Block::ThematicBreak);
                self.pos += 1;
                continue;
            }

            if let Some((marker, content)) = list_item(line) {
                self.flush_paragraph();
                self.push_item(marker, content);
                self.pos += 1;
                continue;
            }

            if line.trim().is_empty() {
                self.flush();
                self.pos += 1;
                continue;
            }

            self.flush_list();
            self.paragraph.push(line);
            self.pos += 1;
        }

        self.flush();
        self.blocks
    }

    fn flush(&mut self) {
        self.flush_paragraph();
        self.flush_list();
    }

    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }

        let text = self
            .paragraph
            .drain(..)
            .map(str::trim_start)
            .collect::<Vec<_>>()
            .join("\n");
        let content = self.inlines.parse(text.trim_end());
        self.blocks.push(Block::Paragraph(content));
    }

    fn flush_list(&mut self) {
        if let Some(list) = self.list.take() {
            self.blocks.push(Block::List(list));
        }
    }

    /// Adds an item, closing the open list first when its kind differs.
    fn push_item(&mut self, marker: Marker, content: &str) {
        let same_kind = matches!(
            (self.list.as_ref().map(|l| l.kind), marker),
            (Some(ListKind::Bullet), Marker::Bullet)
                | (Some(ListKind::Ordered { .. }), Marker::Ordered(_))
        );
        if !same_kind {
            self.flush_list();
        }

        let (task, text) = match marker {
            Marker::Bullet => match TASK.captures(content) {
                Some(caps) => {
                    let checked = &caps[1] != " ";
                    let rest = caps.get(2).map_or("", |m| m.as_str());
                    (Some(checked), rest)
                }
                None => (None, content),
            },
            Marker::Ordered(_) => (None, content),
        };

        let item = ListItem {
            task,
            content: self.inlines.parse(text.trim_end()),
        };

        let kind = match marker {
            Marker::Bullet => ListKind::Bullet,
            Marker::Ordered(start) => ListKind::Ordered { start },
        };
        self.list
            .get_or_insert_with(|| List {
                kind,
                items: Vec::new(),
            })
            .items
            .push(item);
    }

    fn find_fence_close(&self) -> Option<usize> {
        self.fence_closes[self.pos]
    }

    /// Captures lines between the opening fence and `close` verbatim.
    fn code_block(&mut self, close: usize) -> Block {
        let info = self.lines[self.pos].trim_start()[FENCE.len()..].trim();
        let code = self.lines[self.pos + 1..close].join("\n");
        self.pos = close + 1;

        let filename = FILENAME
            .captures(info)
            .map(|caps| caps[1].to_string())
            .filter(|name| !name.is_empty());
        let remainder = FILENAME.replace_all(info, " ");

        let mut language = None;
        let mut show_line_numbers = false;
        for token in remainder.split_whitespace() {
            if token == LINE_NUMBERS_FLAG || token == "showLineNumbers=true" {
                show_line_numbers = true;
            } else if language.is_none() && !token.contains('=') {
                language = Some(token.to_string());
            }
        }

        Block::CodeBlock(CodeBlock {
            code,
            language,
            filename,
            show_line_numbers,
        })
    }

    /// Groups consecutive `>` lines into one nested quote tree.
    ///
    /// A blank line stays in the group only when the line right after it is
    /// also a quote line.
    fn blockquote(&mut self) -> Block {
        let mut entries: Vec<Option<(usize, &str)>> = Vec::new();

        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            if let Some(marker) = quote_marker(line) {
                entries.push(Some(marker));
            } else if line.trim().is_empty()
                && self
                    .lines
                    .get(self.pos + 1)
                    .is_some_and(|next| quote_marker(next).is_some())
            {
                entries.push(None);
            } else {
                break;
            }
            self.pos += 1;
        }

        // stack[0] is the outermost quote
        let mut stack = vec![Blockquote::default()];
        for entry in entries {
            let Some((depth, content)) = entry else {
                push_quote_node(&mut stack, QuoteNode::Break);
                continue;
            };

            while stack.len() < depth {
                stack.push(Blockquote::default());
            }
            while stack.len() > depth {
                close_level(&mut stack);
            }

            let node = if content.is_empty() {
                QuoteNode::Break
            } else {
                QuoteNode::Line(self.inlines.parse(content))
            };
            push_quote_node(&mut stack, node);
        }

        while stack.len() > 1 {
            close_level(&mut stack);
        }

        Block::Blockquote(stack.pop().unwrap_or_default())
    }

    fn is_table_start(&self) -> bool {
        self.lines[self.pos].contains('|')
            && self
                .lines
                .get(self.pos + 1)
                .is_some_and(|next| next.contains('|') && next.contains('-'))
    }

    fn table(&mut self) -> Block {
        let lines = self.lines;
        let header_cells = split_row(lines[self.pos]);
        let width = header_cells.len();

        let mut alignments: Vec<Alignment> = split_row(lines[self.pos + 1])
            .iter()
            .map(|cell| Alignment::from_separator(cell))
            .collect();
        alignments.resize(width, Alignment::Left);

        self.pos += 2;

        let headers = header_cells
            .into_iter()
            .map(|text| self.cell(text))
            .collect();

        let mut rows = Vec::new();
        while let Some(line) = lines.get(self.pos) {
            if !line.contains('|') {
                break;
            }
            let mut cells = split_row(line);
            cells.resize(width, "");
            rows.push(cells.into_iter().map(|text| self.cell(text)).collect());
            self.pos += 1;
        }

        Block::Table(Table {
            headers,
            rows,
            alignments,
        })
    }

    fn cell(&mut self, text: &str) -> Cell {
        Cell {
            text: text.to_string(),
            content: self.inlines.parse(text),
        }
    }
}

fn is_fence_open(line: &str) -> bool {
    line.trim_start().starts_with(FENCE)
}

/// Index of the first closing fence line after each line.
fn fence_closes(lines: &[&str]) -> Vec<Option<usize>> {
    let mut closes = vec![None; lines.len()];
    let mut next = None;
    for (i, line) in lines.iter().enumerate().rev() {
        closes[i] = next;
        if line.trim() == FENCE {
            next = Some(i);
        }
    }
    closes
}

/// Returns quote depth and the content after the markers.
fn quote_marker(line: &str) -> Option<(usize, &str)> {
    let mut rest = line.trim_start();
    if !rest.starts_with('>') {
        return None;
    }

    let mut depth = 0;
    while let Some(after) = rest.strip_prefix('>') {
        depth += 1;
        rest = after.trim_start();
    }

    Some((depth, rest.trim_end()))
}

fn push_quote_node(stack: &mut [Blockquote], node: QuoteNode) {
    if let Some(top) = stack.last_mut() {
        top.children.push(node);
    }
}

/// Pops the innermost quote and attaches it to its parent.
fn close_level(stack: &mut Vec<Blockquote>) {
    if let Some(inner) = stack.pop() {
        push_quote_node(stack, QuoteNode::Nested(inner));
    }
}

fn list_item(line: &str) -> Option<(Marker, &str)> {
    if let Some(caps) = BULLET.captures(line) {
        return Some((Marker::Bullet, caps.get(1)?.as_str()));
    }

    let caps = ORDERED.captures(line)?;
    let start = caps[1].parse().ok()?;
    Some((Marker::Ordered(start), caps.get(2)?.as_str()))
}

/// Splits a table row on unescaped pipes, dropping the outer pipes.
fn split_row(line: &str) -> Vec<&str> {
    let mut row = line.trim();
    row = row.strip_prefix('|').unwrap_or(row);
    if row.ends_with('|') && !row.ends_with("\\|") {
        row = &row[..row.len() - 1];
    }

    let mut cells = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in row.char_indices() {
        match c {
            '\\' => escaped = !escaped,
            '|' if !escaped => {
                cells.push(row[start..i].trim());
                start = i + 1;
            }
            _ => escaped = false,
        }
    }
    cells.push(row[start..].trim());

    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::ast::Inline;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[rstest]
    #[case("# One", 1)]
    #[case("## Two", 2)]
    #[case("### Three", 3)]
    #[case("#### Four", 4)]
    #[case("##### Five", 5)]
    #[case("###### Six", 6)]
    fn test_heading_levels(#[case] source: &str, #[case] level: u8) {
        // Act
        let doc = parse_document(source);

        // Assert
        assert_eq!(doc.blocks.len(), 1);
        match &doc.blocks[0] {
            Block::Heading { level: got, .. } => assert_eq!(*got, level),
            other => panic!("Expected heading, got {:?}", other),
        }
    }

    #[test]
    fn test_seven_hashes_is_not_heading() {
        // Act
        let doc = parse_document("####### Seven");

        // Assert
        assert_eq!(
            doc.blocks,
            vec![Block::Paragraph(vec![text("####### Seven")])]
        );
    }

    #[test]
    fn test_bullet_items_share_one_list() {
        // Act
        let doc = parse_document("- a\n- b\n- c");

        // Assert
        assert_eq!(doc.blocks.len(), 1, "Expected one list: {:?}", doc.blocks);
        match &doc.blocks[0] {
            Block::List(list) => {
                assert_eq!(list.kind, ListKind::Bullet);
                assert_eq!(list.items.len(), 3);
            }
            other => panic!("Expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_mixed_bullet_markers_share_one_list() {
        let doc = parse_document("- a\n* b\n+ c");
        assert_eq!(doc.blocks.len(), 1);
    }

    #[test]
    fn test_list_kind_switch_flushes() {
        // Act
        let doc = parse_document("- a\n1. b");

        // Assert
        assert_eq!(doc.blocks.len(), 2);
        assert!(matches!(
            &doc.blocks[0],
            Block::List(List {
                kind: ListKind::Bullet,
                ..
            })
        ));
        assert!(matches!(
            &doc.blocks[1],
            Block::List(List {
                kind: ListKind::Ordered { start: 1 },
                ..
            })
        ));
    }

    #[test]
    fn test_ordered_list_keeps_start_number() {
        // Act
        let doc = parse_document("3. c\n4. d");

        // Assert
        match &doc.blocks[0] {
            Block::List(list) => {
                assert_eq!(list.kind, ListKind::Ordered { start: 3 });
                assert_eq!(list.items.len(), 2);
            }
            other => panic!("Expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_line_splits_lists() {
        let doc = parse_document("- a\n\n- b");
        assert_eq!(doc.blocks.len(), 2);
    }

    #[test]
    fn test_task_items() {
        // Act
        let doc = parse_document("- [x] done\n- [ ] pending\n- plain");

        // Assert
        let Block::List(list) = &doc.blocks[0] else {
            panic!("Expected list, got {:?}", doc.blocks);
        };
        assert_eq!(list.items[0].task, Some(true));
        assert_eq!(list.items[0].content, vec![text("done")]);
        assert_eq!(list.items[1].task, Some(false));
        assert_eq!(list.items[1].content, vec![text("pending")]);
        assert_eq!(list.items[2].task, None);
    }

    #[test]
    fn test_ordered_task_syntax_is_plain_text() {
        // Act
        let doc = parse_document("1. [x] not a task");

        // Assert
        let Block::List(list) = &doc.blocks[0] else {
            panic!("Expected list");
        };
        assert_eq!(list.items[0].task, None);
    }

    #[test]
    fn test_paragraphs_split_on_blank_lines() {
        // Act
        let doc = parse_document("first line\nsecond line\n\nnext paragraph");

        // Assert
        assert_eq!(
            doc.blocks,
            vec![
                Block::Paragraph(vec![text("first line\nsecond line")]),
                Block::Paragraph(vec![text("next paragraph")]),
            ]
        );
    }

    #[test]
    fn test_thematic_break() {
        // Act
        let doc = parse_document("above\n\n---\n\nbelow");

        // Assert
        assert_eq!(doc.blocks[1], Block::ThematicBreak);
        assert_eq!(doc.blocks.len(), 3);
    }

    #[test]
    fn test_escaped_list_marker_is_paragraph() {
        // Act
        let doc = parse_document(r"\- not a list");

        // Assert
        assert_eq!(doc.blocks, vec![Block::Paragraph(vec![text("- not a list")])]);
    }

    #[test]
    fn test_fenced_code_with_language_and_filename() {
        // Arrange
        let source = "```rust filename=\"src/main.rs\" showLineNumbers\nfn main() {\n    **x**\n}\n```";

        // Act
        let doc = parse_document(source);

        // Assert
        assert_eq!(
            doc.blocks,
            vec![Block::CodeBlock(CodeBlock {
                code: "fn main() {\n    **x**\n}".to_string(),
                language: Some("rust".to_string()),
                filename: Some("src/main.rs".to_string()),
                show_line_numbers: true,
            })]
        );
    }

    #[test]
    fn test_fence_without_info() {
        // Act
        let doc = parse_document("```\nplain\n```");

        // Assert
        assert_eq!(
            doc.blocks,
            vec![Block::CodeBlock(CodeBlock {
                code: "plain".to_string(),
                ..CodeBlock::default()
            })]
        );
    }

    #[test]
    fn test_unclosed_fence_is_literal_text() {
        // Act
        let doc = parse_document("```rust\nlet x = 1;");

        // Assert
        assert_eq!(
            doc.blocks,
            vec![Block::Paragraph(vec![text("```rust\nlet x = 1;")])]
        );
    }

    #[test]
    fn test_fence_closes_point_past_each_line() {
        // Arrange
        let lines = ["```rust", "code", "```", "text", "```"];

        // Act
        let closes = fence_closes(&lines);

        // Assert
        assert_eq!(closes, vec![Some(2), Some(2), Some(4), Some(4), None]);
    }

    #[test]
    fn test_many_unclosed_fences_stay_literal() {
        // Arrange
        let source = "```x\n".repeat(20_000);

        // Act
        let doc = parse_document(&source);

        // Assert
        assert_eq!(doc.blocks.len(), 1);
        assert!(matches!(doc.blocks[0], Block::Paragraph(_)));
    }

    #[test]
    fn test_fence_pairs_after_unclosed_opener() {
        // Act
        let doc = parse_document("```a\n```b\nbody\n```");

        // Assert
        assert_eq!(
            doc.blocks,
            vec![Block::CodeBlock(CodeBlock {
                code: "```b\nbody".to_string(),
                language: Some("a".to_string()),
                ..CodeBlock::default()
            })]
        );
    }

    #[test]
    fn test_table_alignment() {
        // Arrange
        let source = "| A | B | C |\n| :-- | :-: | --: |\n| 1 | 2 | 3 |\n| 4 | 5 | 6 |";

        // Act
        let doc = parse_document(source);

        // Assert
        let Block::Table(table) = &doc.blocks[0] else {
            panic!("Expected table, got {:?}", doc.blocks);
        };
        assert_eq!(
            table.alignments,
            vec![Alignment::Left, Alignment::Center, Alignment::Right]
        );
        let headers: Vec<_> = table.headers.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(headers, vec!["A", "B", "C"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][2].text, "6");
    }

    #[test]
    fn test_table_ends_at_non_pipe_line() {
        // Arrange
        let source = "| A | B |\n|---|---|\n| 1 | 2 |\nafter";

        // Act
        let doc = parse_document(source);

        // Assert
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[1], Block::Paragraph(vec![text("after")]));
    }

    #[test]
    fn test_table_rows_padded_to_header_width() {
        // Arrange
        let source = "| A | B |\n|---|---|\n| only |\n| 1 | 2 | 3 |";

        // Act
        let doc = parse_document(source);

        // Assert
        let Block::Table(table) = &doc.blocks[0] else {
            panic!("Expected table");
        };
        assert_eq!(table.rows[0].len(), 2);
        assert_eq!(table.rows[0][1].text, "");
        assert_eq!(table.rows[1].len(), 2);
    }

    #[test]
    fn test_split_row_respects_escaped_pipe() {
        assert_eq!(split_row(r"| a \| b | c |"), vec![r"a \| b", "c"]);
        assert_eq!(split_row("a|b"), vec!["a", "b"]);
    }

    #[test]
    fn test_nested_blockquote() {
        // Act
        let doc = parse_document("> outer\n>> inner\n> outer again");

        // Assert
        assert_eq!(
            doc.blocks,
            vec![Block::Blockquote(Blockquote {
                children: vec![
                    QuoteNode::Line(vec![text("outer")]),
                    QuoteNode::Nested(Blockquote {
                        children: vec![QuoteNode::Line(vec![text("inner")])],
                    }),
                    QuoteNode::Line(vec![text("outer again")]),
                ],
            })]
        );
    }

    #[test]
    fn test_blockquote_spaced_markers_count_as_depth() {
        // Act
        let doc = parse_document("> > deep");

        // Assert
        let Block::Blockquote(quote) = &doc.blocks[0] else {
            panic!("Expected blockquote");
        };
        assert!(quote.is_nested());
    }

    #[test]
    fn test_blockquote_blank_line_continues_when_followed_by_quote() {
        // Act
        let doc = parse_document("> one\n\n> two");

        // Assert
        assert_eq!(
            doc.blocks,
            vec![Block::Blockquote(Blockquote {
                children: vec![
                    QuoteNode::Line(vec![text("one")]),
                    QuoteNode::Break,
                    QuoteNode::Line(vec![text("two")]),
                ],
            })]
        );
    }

    #[test]
    fn test_blockquote_blank_line_then_text_terminates() {
        // Act
        let doc = parse_document("> quote\n\nplain");

        // Assert
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[1], Block::Paragraph(vec![text("plain")]));
    }

    #[test]
    fn test_footnote_definitions_removed_and_numbered() {
        // Arrange
        let source = "Second[^b] then first[^a].\n\n[^a]: Alpha\n[^b]: Beta";

        // Act
        let doc = parse_document(source);

        // Assert
        assert_eq!(doc.blocks.len(), 1, "Definitions are not paragraphs");
        let ids: Vec<_> = doc
            .footnotes
            .iter()
            .map(|f| (f.number, f.id.as_str()))
            .collect();
        assert_eq!(ids, vec![(1, "b"), (2, "a")]);
        assert_eq!(doc.footnotes[0].content, vec![text("Beta")]);
    }

    #[test]
    fn test_footnote_definition_inside_fence_is_code() {
        // Act
        let doc = parse_document("```\n[^a]: kept\n```");

        // Assert
        let Block::CodeBlock(code) = &doc.blocks[0] else {
            panic!("Expected code block");
        };
        assert_eq!(code.code, "[^a]: kept");
    }

    #[test]
    fn test_no_references_no_footnotes() {
        // Act
        let doc = parse_document("Text.\n\n[^unused]: never cited");

        // Assert
        assert!(doc.footnotes.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_document(""), Document::default());
    }
}
