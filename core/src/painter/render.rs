//! HTML fragment rendering

use serde::{Deserialize, Serialize};

use super::classify::{Classification, LineState};

/// Presentation settings for the painted fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub taken_color: String,
    pub not_taken_color: String,
    /// Escape `&`, `<` and `>` in line text
    pub escape_html: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            taken_color: "lawngreen".to_string(),
            not_taken_color: "red".to_string(),
            escape_html: false,
        }
    }
}

/// One `<p>` fragment per line of `source`; empty source is a single empty line
pub fn render_lines(
    source: &str,
    classification: &Classification,
    options: &RenderOptions,
) -> Vec<String> {
    source
        .split('\n')
        .enumerate()
        .map(|(line, text)| {
            let text = if options.escape_html {
                escape(text)
            } else {
                text.to_string()
            };
            match classification.line_state(line) {
                LineState::Taken => highlight(&text, &options.taken_color),
                LineState::NotTaken => highlight(&text, &options.not_taken_color),
                LineState::Plain => format!("<p>{}</p>", text),
            }
        })
        .collect()
}

pub fn render_html(source: &str, classification: &Classification, options: &RenderOptions) -> String {
    render_lines(source, classification, options).concat()
}

fn highlight(text: &str, color: &str) -> String {
    format!(
        "<p><mark style=\"background-color:{}\">{}</mark></p>",
        color, text
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}
