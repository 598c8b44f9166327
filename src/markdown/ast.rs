//! Document tree produced by the block and inline scanners.

use serde::Serialize;

/// Parsed markdown document.
///
/// Blocks appear in source order. Footnotes hold only the definitions that
/// were referenced, ordered by first use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
    pub footnotes: Vec<Footnote>,
}

impl Document {
    /// Returns heading levels with their plain text in document order.
    ///
    /// Used to render an outline next to standalone pages.
    pub fn headings(&self) -> Vec<(u8, String)> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Heading { level, content } => Some((*level, plain_text(content))),
                _ => None,
            })
            .collect()
    }
}

/// Block level node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    Paragraph(Vec<Inline>),
    List(List),
    ThematicBreak,
    Blockquote(Blockquote),
    CodeBlock(CodeBlock),
    Table(Table),
}

/// Inline node inside a heading, paragraph, list item, quote line or cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Code(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link { url: String, children: Vec<Inline> },
    Image { url: String, alt: String },
    Keyboard(String),
    /// `occurrence` counts references to the same id, starting at 1.
    FootnoteRef {
        id: String,
        number: usize,
        occurrence: usize,
    },
    LineBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Ordered { start: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub kind: ListKind,
    pub items: Vec<ListItem>,
}

/// List entry. `task` is `Some(checked)` for `- [ ]` and `- [x]` items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub task: Option<bool>,
    pub content: Vec<Inline>,
}

/// Quote group. Nesting follows the `>` depth of each source line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blockquote {
    pub children: Vec<QuoteNode>,
}

impl Blockquote {
    /// True when the quote contains at least one deeper level.
    pub fn is_nested(&self) -> bool {
        self.children
            .iter()
            .any(|child| matches!(child, QuoteNode::Nested(_)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteNode {
    Line(Vec<Inline>),
    Break,
    Nested(Blockquote),
}

/// Fenced code block, captured verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBlock {
    pub code: String,
    pub language: Option<String>,
    pub filename: Option<String>,
    pub show_line_numbers: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<Cell>,
    pub rows: Vec<Vec<Cell>>,
    pub alignments: Vec<Alignment>,
}

/// Table cell: trimmed source text plus its parsed inline content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub content: Vec<Inline>,
}

/// Column alignment derived from the separator row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Derives alignment from a separator cell such as `:-:`.
    pub fn from_separator(cell: &str) -> Self {
        let cell = cell.trim();
        match (cell.starts_with(':'), cell.ends_with(':') && cell.len() > 1) {
            (true, true) => Alignment::Center,
            (false, true) => Alignment::Right,
            _ => Alignment::Left,
        }
    }

    /// CSS `text-align` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

/// Referenced footnote definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footnote {
    pub id: String,
    pub number: usize,
    pub content: Vec<Inline>,
}

/// Flattens inline nodes to their visible text.
pub fn plain_text(nodes: &[Inline]) -> String {
    let mut text = String::new();
    collect_text(nodes, &mut text);
    text
}

fn collect_text(nodes: &[Inline], out: &mut String) {
    for node in nodes {
        match node {
            Inline::Text(t) | Inline::Code(t) | Inline::Keyboard(t) => out.push_str(t),
            Inline::Strong(children)
            | Inline::Emphasis(children)
            | Inline::Strikethrough(children)
            | Inline::Link { children, .. } => collect_text(children, out),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::FootnoteRef { number, .. } => out.push_str(&number.to_string()),
            Inline::LineBreak => out.push(' '),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("---", Alignment::Left)]
    #[case(":--", Alignment::Left)]
    #[case(":-:", Alignment::Center)]
    #[case("--:", Alignment::Right)]
    #[case(" :---: ", Alignment::Center)]
    #[case(":", Alignment::Left)]
    fn test_alignment_from_separator(#[case] cell: &str, #[case] expected: Alignment) {
        assert_eq!(Alignment::from_separator(cell), expected);
    }

    #[test]
    fn test_plain_text_flattens_formatting() {
        // Arrange
        let nodes = vec![
            Inline::Text("a ".to_string()),
            Inline::Strong(vec![Inline::Text("b".to_string())]),
            Inline::Code(" c".to_string()),
        ];

        // Act
        let text = plain_text(&nodes);

        // Assert
        assert_eq!(text, "a b c");
    }

    #[test]
    fn test_blockquote_is_nested() {
        // Arrange
        let flat = Blockquote {
            children: vec![QuoteNode::Line(vec![]), QuoteNode::Break],
        };
        let nested = Blockquote {
            children: vec![QuoteNode::Nested(Blockquote::default())],
        };

        // Act & Assert
        assert!(!flat.is_nested());
        assert!(nested.is_nested());
    }
}
