//! Page layout wrapper component

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::sidebar::Sidebar;

/// Stylesheet inlined into standalone pages.
const STYLESHEET: &str = include_str!("../../assets/markdown.css");

/// Wraps rendered markdown into a standalone HTML document
///
/// The outline sidebar lists document headings and is omitted when there
/// are none. Its initial `data-state` comes from the sidebar state.
///
/// # Arguments
///
/// * `title`: Page title text (without suffix)
/// * `outline`: Heading level and plain text pairs
/// * `sidebar`: Sidebar state for the outline
/// * `body`: Rendered markdown fragment
///
/// # Returns
///
/// Complete HTML document with wrapped content
pub fn page_wrapper(
    title: &str,
    outline: &[(u8, String)],
    sidebar: &Sidebar,
    body: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Passport UI" }
                script src="https://unpkg.com/@phosphor-icons/web" {}
                style { (PreEscaped(STYLESHEET)) }
            }
            body {
                div class="page" {
                    @if !outline.is_empty() {
                        aside class="sidebar"
                            data-state=(sidebar.state().as_str())
                            data-mobile-open=(sidebar.open_mobile().to_string()) {
                            nav class="sidebar-outline" aria-label="Outline" {
                                ul {
                                    @for (level, text) in outline {
                                        li class=(format!("outline-level-{}", level)) { (text) }
                                    }
                                }
                            }
                        }
                    }
                    main class="markdown-body" {
                        (body)
                    }
                }
            }
        }
    }
}
