//! Output buffering and serialization
//!
//! The renderer appends characters row by row and records sparse color
//! markers at (column, row) positions; a formatter then serializes the
//! whole buffer once, as plain text, ANSI-escaped text, or HTML.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::color::{ColorToken, ANSI_RESET};

/// Incrementally built render result: rows of characters plus sparse
/// color markers.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer {
    rows: Vec<String>,
    colors: HashMap<(usize, usize), ColorToken>,
    row: usize,
    column: usize,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text to the current row and advance the column cursor.
    pub fn add_text(&mut self, text: &str) {
        if self.rows.len() == self.row {
            self.rows.push(String::new());
        }
        self.rows[self.row].push_str(text);
        self.column += text.chars().count();
    }

    /// Record a color marker at the current cursor position. The next
    /// character appended here gets rendered in this color.
    pub fn add_color(&mut self, token: ColorToken) {
        self.colors.insert((self.column, self.row), token);
    }

    /// Advance to the next row.
    pub fn add_line_break(&mut self) {
        self.row += 1;
        self.column = 0;
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn color_at(&self, column: usize, row: usize) -> Option<ColorToken> {
        self.colors.get(&(column, row)).copied()
    }

    pub fn marker_count(&self) -> usize {
        self.colors.len()
    }
}

/// Serialization target for a rendered buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Formatter {
    /// Plain newline-joined text, colors ignored.
    Text,
    /// ANSI escape immediately before each marked character, one reset
    /// at the very end.
    #[default]
    Ansi,
    /// A `<pre>` block with `<br>` line breaks and at most one open
    /// `<span>` at any time.
    Html,
}

impl Formatter {
    pub fn render(&self, buffer: &OutputBuffer) -> String {
        match self {
            Formatter::Text => buffer.rows().join("\n"),
            Formatter::Ansi => render_ansi(buffer),
            Formatter::Html => render_html(buffer),
        }
    }
}

fn render_ansi(buffer: &OutputBuffer) -> String {
    let mut output = String::new();
    let mut any_color = false;
    for (row_index, row) in buffer.rows().iter().enumerate() {
        if row_index > 0 {
            output.push('\n');
        }
        for (column_index, character) in row.chars().enumerate() {
            if let Some(token) = buffer.color_at(column_index, row_index) {
                output.push_str(&token.ansi());
                any_color = true;
            }
            output.push(character);
        }
    }
    if any_color {
        output.push_str(ANSI_RESET);
    }
    output
}

fn render_html(buffer: &OutputBuffer) -> String {
    let mut output = String::from("<pre>");
    let mut span_open = false;
    for (row_index, row) in buffer.rows().iter().enumerate() {
        if row_index > 0 {
            output.push_str("<br>");
        }
        for (column_index, character) in row.chars().enumerate() {
            if let Some(token) = buffer.color_at(column_index, row_index) {
                if span_open {
                    output.push_str("</span>");
                }
                output.push_str(&format!("<span style=\"color: {}\">", token.css()));
                span_open = true;
            }
            output.push(character);
        }
    }
    if span_open {
        output.push_str("</span>");
    }
    output.push_str("</pre>");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    fn sample_buffer() -> OutputBuffer {
        let mut buffer = OutputBuffer::new();
        buffer.add_color(ColorToken::Palette(4));
        buffer.add_text("ab");
        buffer.add_line_break();
        buffer.add_text("c");
        buffer.add_color(ColorToken::Raw(Rgb::new(0, 255, 0)));
        buffer.add_text("d");
        buffer
    }

    #[test]
    fn test_cursor_tracks_rows_and_columns() {
        let buffer = sample_buffer();
        assert_eq!(buffer.rows(), &["ab".to_string(), "cd".to_string()]);
        assert_eq!(buffer.color_at(0, 0), Some(ColorToken::Palette(4)));
        assert_eq!(
            buffer.color_at(1, 1),
            Some(ColorToken::Raw(Rgb::new(0, 255, 0)))
        );
        assert_eq!(buffer.color_at(1, 0), None);
    }

    #[test]
    fn test_text_formatter_ignores_colors() {
        assert_eq!(Formatter::Text.render(&sample_buffer()), "ab\ncd");
    }

    #[test]
    fn test_ansi_formatter_places_escapes_before_marked_chars() {
        let rendered = Formatter::Ansi.render(&sample_buffer());
        assert_eq!(
            rendered,
            "\x1b[31mab\nc\x1b[38;2;0;255;0md\x1b[0m"
        );
    }

    #[test]
    fn test_ansi_formatter_without_colors_has_no_escapes() {
        let mut buffer = OutputBuffer::new();
        buffer.add_text("xy");
        buffer.add_line_break();
        buffer.add_text("z");
        assert_eq!(Formatter::Ansi.render(&buffer), "xy\nz");
    }

    #[test]
    fn test_html_formatter_keeps_one_span_open() {
        let rendered = Formatter::Html.render(&sample_buffer());
        assert_eq!(
            rendered,
            "<pre><span style=\"color: #aa0000\">ab<br>c</span>\
             <span style=\"color: #00ff00\">d</span></pre>"
        );
    }
}
