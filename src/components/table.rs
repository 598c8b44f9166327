//! Table component

use maud::{Markup, PreEscaped, html};

use crate::markdown::{Alignment, TableRecord};

/// Renders a table record with per column alignment.
///
/// Cells hold inline HTML and are inserted unescaped. The table is wrapped
/// in a scroll container so wide tables do not stretch the page.
pub fn table(record: &TableRecord) -> Markup {
    html! {
        div class="md-table-wrapper" {
            table class="md-table" {
                thead {
                    tr {
                        @for (column, header) in record.headers.iter().enumerate() {
                            th style=(align_style(record.alignment(column))) {
                                (PreEscaped(header))
                            }
                        }
                    }
                }
                tbody {
                    @for row in &record.rows {
                        tr {
                            @for (column, cell) in row.iter().enumerate() {
                                td style=(align_style(record.alignment(column))) {
                                    (PreEscaped(cell))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn align_style(alignment: Alignment) -> String {
    format!("text-align: {}", alignment.as_str())
}
