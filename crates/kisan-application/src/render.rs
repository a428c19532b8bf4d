//! History list rendering.
//!
//! Query and answer text come from users and from the backend, so every
//! field is HTML-escaped before it is placed in markup.

use chrono::Local;
use kisan_core::history::HistoryRecord;

/// Shown instead of the query text for image-only questions.
pub const IMAGE_ONLY_PLACEHOLDER: &str = "(photo question)";

const TIMESTAMP_FORMAT: &str = "%d %b %Y, %H:%M";

/// Escapes `& < > " '` for safe inclusion in HTML text and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// The query text to display, with the placeholder for image-only questions.
pub fn display_query(record: &HistoryRecord) -> &str {
    if record.is_image_only() {
        IMAGE_ONLY_PLACEHOLDER
    } else {
        &record.query
    }
}

/// Record timestamp in the viewer's local time zone.
pub fn format_timestamp(record: &HistoryRecord) -> String {
    record
        .timestamp
        .with_timezone(&Local)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// Renders records (already in display order) as an HTML list fragment.
pub fn render_history_html<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a HistoryRecord>,
{
    let items: Vec<String> = records
        .into_iter()
        .map(|record| {
            format!(
                "  <li class=\"history-item\">\n    \
                 <div class=\"history-query\">{}</div>\n    \
                 <time class=\"history-time\">{}</time>\n    \
                 <div class=\"history-answer\">{}</div>\n  \
                 </li>\n",
                escape_html(display_query(record)),
                escape_html(&format_timestamp(record)),
                escape_html(&record.answer)
            )
        })
        .collect();

    if items.is_empty() {
        return "<p class=\"history-empty\">No questions yet.</p>\n".to_string();
    }

    format!("<ul class=\"history\">\n{}</ul>\n", items.concat())
}

/// Wraps a rendered history fragment in a standalone HTML page.
pub fn render_history_document(fragment: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Kisan - recent questions</title>\n</head>\n<body>\n\
         <h1>Recent questions</h1>\n{fragment}</body>\n</html>\n"
    )
}
