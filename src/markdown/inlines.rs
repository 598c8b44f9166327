//! Inline scanner: escapes, code spans, footnote references, links,
//! emphasis and keyboard spans.
//!
//! Precedence at each position follows the order in which the syntax must
//! be protected: escapes first, then code spans, then footnote references,
//! then images, keyboard spans and links, then emphasis. Unmatched syntax
//! is kept as literal text.

use std::collections::HashMap;

use super::ast::Inline;
use super::footnotes::FootnoteRegistry;

/// Punctuation that a backslash turns into a literal character.
const ESCAPABLE: &[char] = &[
    '\\', '`', '*', '_', '{', '}', '[', ']', '(', ')', '#', '+', '-', '.', '!', '~', '|',
];

/// Parses inline markdown into nodes.
///
/// Holds the document's footnote registry so that references are resolved
/// and numbered in first-use order while blocks are scanned top to bottom.
pub struct InlineParser<'a> {
    footnotes: Option<&'a mut FootnoteRegistry>,
}

impl<'a> InlineParser<'a> {
    /// Creates parser resolving `[^id]` against the given registry.
    pub fn new(footnotes: &'a mut FootnoteRegistry) -> Self {
        Self {
            footnotes: Some(footnotes),
        }
    }

    /// Creates parser that leaves every `[^id]` literal.
    ///
    /// Used for footnote definitions themselves.
    pub fn without_footnotes() -> Self {
        Self { footnotes: None }
    }

    /// Parses text into inline nodes. Never fails.
    pub fn parse(&mut self, text: &str) -> Vec<Inline> {
        let mut nodes = Vec::new();
        let mut searches = Searches::default();
        let mut pos = 0;

        while pos < text.len() {
            if let Some((node, len)) = self.scan(text, pos, &mut searches) {
                match node {
                    Inline::Text(t) => push_text(&mut nodes, &t),
                    other => nodes.push(other),
                }
                pos += len;
                continue;
            }

            let Some(c) = text[pos..].chars().next() else {
                break;
            };
            let mut buf = [0u8; 4];
            push_text(&mut nodes, c.encode_utf8(&mut buf));
            pos += c.len_utf8();
        }

        nodes
    }

    /// Tries every inline construct starting at `pos`.
    fn scan(
        &mut self,
        text: &str,
        pos: usize,
        searches: &mut Searches,
    ) -> Option<(Inline, usize)> {
        let rest = &text[pos..];

        match *rest.as_bytes().first()? {
            b'\\' => {
                let c = rest[1..].chars().next()?;
                ESCAPABLE
                    .contains(&c)
                    .then(|| (Inline::Text(c.to_string()), 1 + c.len_utf8()))
            }
            b'`' => {
                let run = backtick_run(rest.as_bytes());
                match searches.code_span(text, pos) {
                    Some((start, end)) => {
                        Some((Inline::Code(text[start..end].to_string()), end + run - pos))
                    }
                    None => Some((Inline::Text(rest[..run].to_string()), run)),
                }
            }
            b'!' => {
                let link = searches.bracket_link(text, pos + 1, true)?;
                Some((
                    Inline::Image {
                        url: text[link.url.0..link.url.1].to_string(),
                        alt: text[link.label.0..link.label.1].to_string(),
                    },
                    link.end - pos,
                ))
            }
            b'[' => self.scan_bracket(text, pos, searches),
            b'*' => {
                if rest.starts_with("**")
                    && let Some(strong) = self.delimited(text, pos, Delim::Strong, searches)
                {
                    return Some(strong);
                }
                self.delimited(text, pos, Delim::Star, searches)
            }
            b'_' => {
                let preceded_by_word = text[..pos]
                    .chars()
                    .next_back()
                    .is_some_and(char::is_alphanumeric);
                if preceded_by_word {
                    return None;
                }
                self.delimited(text, pos, Delim::Underscore, searches)
            }
            b'~' if rest.starts_with("~~") => self.delimited(text, pos, Delim::Tilde, searches),
            b' ' => {
                let spaces = rest.bytes().take_while(|b| *b == b' ').count();
                if spaces >= 2 && rest[spaces..].starts_with('\n') {
                    Some((Inline::LineBreak, spaces + 1))
                } else {
                    Some((Inline::Text(rest[..spaces].to_string()), spaces))
                }
            }
            _ => None,
        }
    }

    /// Emphasis or strikethrough opened by `delim` at `pos`.
    fn delimited(
        &mut self,
        text: &str,
        pos: usize,
        delim: Delim,
        searches: &mut Searches,
    ) -> Option<(Inline, usize)> {
        let width = delim.token().len();
        let start = pos + width;
        let end = searches
            .closer(text, start, delim)
            .filter(|&end| end > start)?;
        let children = self.parse(&text[start..end]);
        let node = match delim {
            Delim::Tilde => Inline::Strikethrough(children),
            Delim::Strong => Inline::Strong(children),
            Delim::Star | Delim::Underscore => Inline::Emphasis(children),
        };
        Some((node, end + width - pos))
    }

    /// Handles constructs opening with `[`: footnote references, keyboard
    /// spans and links.
    fn scan_bracket(
        &mut self,
        text: &str,
        pos: usize,
        searches: &mut Searches,
    ) -> Option<(Inline, usize)> {
        let rest = &text[pos..];
        let inner = pos + 2;

        if rest.starts_with("[^")
            && let Some(close) = searches.footnote_close.find(inner, |s| find_str(text, s, "]"))
            && close > inner
            && !searches
                .whitespace
                .find(inner, |s| find_whitespace(text, s))
                .is_some_and(|w| w < close)
        {
            let id = &text[inner..close];
            let len = close + 1 - pos;
            let used = self
                .footnotes
                .as_deref_mut()
                .and_then(|registry| registry.reference(id));
            return Some(match used {
                Some(used) => (
                    Inline::FootnoteRef {
                        id: id.to_string(),
                        number: used.number,
                        occurrence: used.occurrence,
                    },
                    len,
                ),
                None => (Inline::Text(rest[..len].to_string()), len),
            });
        }

        if rest.starts_with("[[")
            && let Some(close) = searches.keyboard_close.find(inner, |s| find_str(text, s, "]]"))
            && close > inner
            && !searches
                .keyboard_newline
                .find(inner, |s| find_str(text, s, "\n"))
                .is_some_and(|n| n < close)
        {
            let keys = &text[inner..close];
            return Some((Inline::Keyboard(keys.to_string()), close + 2 - pos));
        }

        let link = searches.bracket_link(text, pos, false)?;
        let children = self.parse(&text[link.label.0..link.label.1]);
        Some((
            Inline::Link {
                url: text[link.url.0..link.url.1].to_string(),
                children,
            },
            link.end - pos,
        ))
    }
}

/// Appends text, merging with a preceding text node.
fn push_text(nodes: &mut Vec<Inline>, text: &str) {
    if let Some(Inline::Text(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(Inline::Text(text.to_string()));
    }
}

/// Emphasis and strikethrough delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delim {
    Strong,
    Star,
    Underscore,
    Tilde,
}

impl Delim {
    fn token(self) -> &'static str {
        match self {
            Delim::Strong => "**",
            Delim::Star => "*",
            Delim::Underscore => "_",
            Delim::Tilde => "~~",
        }
    }

    /// Word bounded closers must not be followed by a word character, so
    /// `snake_case_name` is not emphasis.
    fn word_bounded(self) -> bool {
        self == Delim::Underscore
    }
}

/// Byte ranges of a matched `[label](url)`.
struct LinkSpan {
    label: (usize, usize),
    url: (usize, usize),
    /// Position just past the closing `)`.
    end: usize,
}

/// Memoised forward search.
///
/// `last` holds the start of the previous search and its outcome: `Ok` with
/// the match position, or `Err` with the position where the search stopped.
/// Nothing matched between the two, so any later start up to that position
/// has the same answer.
#[derive(Debug, Default)]
struct Lookahead {
    last: Option<(usize, Result<usize, usize>)>,
}

impl Lookahead {
    fn find(
        &mut self,
        start: usize,
        search: impl FnOnce(usize) -> Result<usize, usize>,
    ) -> Option<usize> {
        let covered = self.last.is_some_and(|(from, outcome)| {
            let (Ok(reach) | Err(reach)) = outcome;
            from <= start && start <= reach
        });
        if !covered {
            self.last = Some((start, search(start)));
        }
        self.last.and_then(|(_, outcome)| outcome.ok())
    }
}

/// Every forward search of one `parse` call.
///
/// The scanner moves left to right, so each search is answered from the
/// previous one while the start stays inside the span already covered.
/// Runs of unmatched openers such as `[[[[` stay linear.
#[derive(Debug, Default)]
struct Searches {
    footnote_close: Lookahead,
    whitespace: Lookahead,
    keyboard_close: Lookahead,
    keyboard_newline: Lookahead,
    label_close: Lookahead,
    label_newline: Lookahead,
    url_close: Lookahead,
    checked_url: Option<(usize, Option<(usize, usize)>)>,
    strong: Lookahead,
    star: Lookahead,
    underscore: Lookahead,
    tilde: Lookahead,
    code_closers: HashMap<usize, Lookahead>,
}

impl Searches {
    /// Matches a backtick code span opening at `pos`.
    ///
    /// The closing run must have the same length as the opening run. The
    /// content is kept verbatim, padding spaces included.
    ///
    /// Returns the byte range of the content.
    fn code_span(&mut self, text: &str, pos: usize) -> Option<(usize, usize)> {
        let run = backtick_run(&text.as_bytes()[pos..]);
        let start = pos + run;
        let end = self
            .code_closers
            .entry(run)
            .or_default()
            .find(start, |s| find_backtick_run(text.as_bytes(), s, run))?;
        (end > start).then_some((start, end))
    }

    /// Matches `[label](url)` with the `[` at `open`.
    ///
    /// Images allow an empty label; links do not. Neither part may span
    /// lines, and the trimmed url may not contain whitespace.
    fn bracket_link(
        &mut self,
        text: &str,
        open: usize,
        allow_empty_label: bool,
    ) -> Option<LinkSpan> {
        if !text[open..].starts_with('[') {
            return None;
        }
        let label_start = open + 1;
        let label_end = self
            .label_close
            .find(label_start, |s| find_unescaped(text.as_bytes(), s, b']'))?;
        let spans_lines = self
            .label_newline
            .find(label_start, |s| find_str(text, s, "\n"))
            .is_some_and(|newline| newline < label_end);
        if spans_lines || (label_end == label_start && !allow_empty_label) {
            return None;
        }

        if !text[label_end + 1..].starts_with('(') {
            return None;
        }
        let url_start = label_end + 2;
        let url_end = self.url_close.find(url_start, |s| find_str(text, s, ")"))?;
        let url = self.url_range(text, url_start, url_end)?;

        Some(LinkSpan {
            label: (label_start, label_end),
            url,
            end: url_end + 1,
        })
    }

    /// Trimmed url range, checked once per url start.
    fn url_range(&mut self, text: &str, start: usize, end: usize) -> Option<(usize, usize)> {
        if let Some((checked, range)) = self.checked_url
            && checked == start
        {
            return range;
        }

        let raw = &text[start..end];
        let trimmed = raw.trim();
        let range = (!trimmed.is_empty() && !trimmed.contains(char::is_whitespace)).then(|| {
            let lead = start + raw.len() - raw.trim_start().len();
            (lead, lead + trimmed.len())
        });
        self.checked_url = Some((start, range));
        range
    }

    /// Finds the closing delimiter for content starting at `start`.
    fn closer(&mut self, text: &str, start: usize, delim: Delim) -> Option<usize> {
        let mut lookahead = std::mem::take(self.closer_lookahead(delim));
        let found = lookahead.find(start, |s| self.scan_closer(text, s, delim));
        *self.closer_lookahead(delim) = lookahead;
        found
    }

    fn closer_lookahead(&mut self, delim: Delim) -> &mut Lookahead {
        match delim {
            Delim::Strong => &mut self.strong,
            Delim::Star => &mut self.star,
            Delim::Underscore => &mut self.underscore,
            Delim::Tilde => &mut self.tilde,
        }
    }

    /// Scans for a closer, skipping escapes and code spans and stopping at
    /// a line end.
    ///
    /// A single `*` never closes on half of a `**`: a complete `**...**`
    /// run is stepped over as a unit and a lone `**` is skipped.
    fn scan_closer(&mut self, text: &str, start: usize, delim: Delim) -> Result<usize, usize> {
        let bytes = text.as_bytes();
        let token = delim.token().as_bytes();
        let mut i = start;

        while i < bytes.len() {
            match bytes[i] {
                b'\n' => return Err(i),
                b'\\' => {
                    i += 2;
                    continue;
                }
                b'`' => {
                    let run = backtick_run(&bytes[i..]);
                    i = match self.code_span(text, i) {
                        Some((_, end)) => end + run,
                        None => i + run,
                    };
                    continue;
                }
                _ => {}
            }

            if delim == Delim::Star && bytes[i..].starts_with(b"**") {
                match self.closer(text, i + 2, Delim::Strong) {
                    Some(end) if end > i + 2 => {
                        i = end + 2;
                        continue;
                    }
                    _ if i > start => {
                        i += 2;
                        continue;
                    }
                    _ => {}
                }
            }

            if bytes[i..].starts_with(token) {
                let followed_by_word = text[i + token.len()..]
                    .chars()
                    .next()
                    .is_some_and(char::is_alphanumeric);
                if !(delim.word_bounded() && followed_by_word) {
                    return Ok(i);
                }
            }
            i += 1;
        }

        Err(bytes.len())
    }
}

fn backtick_run(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| **b == b'`').count()
}

/// First backtick run of exactly `run` characters at or after `start`.
fn find_backtick_run(bytes: &[u8], start: usize, run: usize) -> Result<usize, usize> {
    let mut i = start;
    while let Some(found) = bytes[i..].iter().position(|b| *b == b'`') {
        let at = i + found;
        let closing = backtick_run(&bytes[at..]);
        if closing == run {
            return Ok(at);
        }
        i = at + closing;
    }
    Err(bytes.len())
}

fn find_str(text: &str, start: usize, needle: &str) -> Result<usize, usize> {
    text[start..]
        .find(needle)
        .map(|i| start + i)
        .ok_or(text.len())
}

fn find_whitespace(text: &str, start: usize) -> Result<usize, usize> {
    text[start..]
        .find(char::is_whitespace)
        .map(|i| start + i)
        .ok_or(text.len())
}

/// Finds `target` skipping backslash escapes.
fn find_unescaped(bytes: &[u8], start: usize, target: u8) -> Result<usize, usize> {
    let mut i = start;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
        } else if bytes[i] == target {
            return Ok(i);
        } else {
            i += 1;
        }
    }
    Err(bytes.len())
}
