//! Utility functions for passport-markdown

/// Escapes HTML special characters.
///
/// Used for text nodes, attribute values and the plain text fallback of
/// code blocks.
///
/// # Arguments
///
/// * `text`: Plain text to escape
///
/// # Returns
///
/// HTML safe string
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escapes text destined for the placeholder HTML stream.
///
/// Applies [`escape_html`] and additionally encodes every `{{` so that
/// document text can never be mistaken for a component placeholder during
/// assembly.
///
/// # Arguments
///
/// * `text`: Plain text to escape
///
/// # Returns
///
/// HTML safe string without literal `{{` sequences
pub fn escape_text(text: &str) -> String {
    let escaped = escape_html(text);
    if escaped.contains("{{") {
        escaped.replace("{{", "&#123;&#123;")
    } else {
        escaped
    }
}
