//! File type icons for code block headers

use maud::{Markup, html};
use std::path::Path;

/// Renders file icon for a code block filename
///
/// Generates Phosphor icon HTML with CSS classes chosen from the file
/// extension, so headers of different languages are visually distinct.
///
/// # Arguments
///
/// * `filename`: Filename from the code fence
///
/// # Returns
///
/// Icon markup with Phosphor icon class and optional color modifier
pub fn file_icon(filename: &str) -> Markup {
    let (icon_class, icon_modifier) = icon_classes(filename);

    html! {
        span class="md-code-icon" aria-hidden="true" {
            @if let Some(modifier) = icon_modifier {
                i class=(format!("{} {}", icon_class, modifier)) {}
            } @else {
                i class=(icon_class) {}
            }
        }
    }
}

/// Returns Phosphor icon classes for a filename
///
/// # Returns
///
/// Phosphor icon class name and optional CSS modifier class for color styling
pub fn icon_classes(filename: &str) -> (&'static str, Option<&'static str>) {
    let lower = filename.to_lowercase();
    let path = Path::new(&lower);
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

    if name == "dockerfile" {
        return ("ph ph-cube", Some("icon-docker"));
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some("rs") => ("ph ph-file-rs", Some("icon-rust")),
        Some("ts" | "tsx") => ("ph ph-file-ts", Some("icon-typescript")),
        Some("js" | "jsx" | "mjs" | "cjs") => ("ph ph-file-js", Some("icon-javascript")),
        Some("py") => ("ph ph-file-py", Some("icon-python")),
        Some("css" | "scss") => ("ph ph-file-css", Some("icon-css")),
        Some("html" | "htm") => ("ph ph-file-html", Some("icon-html")),
        Some("md" | "mdx") => ("ph ph-file-md", Some("icon-markdown")),
        Some("sql") => ("ph ph-file-sql", Some("icon-sql")),
        Some("sh" | "bash" | "zsh") => ("ph ph-terminal-window", Some("icon-shell")),
        Some("json" | "toml" | "yaml" | "yml") => ("ph ph-gear", Some("icon-config")),
        _ => ("ph ph-file-code", None),
    }
}
