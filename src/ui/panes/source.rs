//! Source code pane rendering with syntax highlighting
//!
//! Displays the snippet being traced with light highlighting for both subsets
//! (C-like and dynamic-like keywords share one table) and marks the line the
//! current snapshot belongs to.
//!
//! # Rendering
//!
//! The pane uses a simple character-by-character tokenizer to apply styles
//! without requiring a full lexer.

use crate::ui::theme::{border_style, DEFAULT_THEME};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn highlight_source_code(line: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current_word = String::new();
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut i = 0;

    while i < chars.len() {
        let (byte, c) = chars[i];

        // Comments run to the end of the line
        if c == '/' && chars.get(i + 1).is_some_and(|&(_, n)| n == '/') {
            flush_word(&mut current_word, &mut spans, false);
            spans.push(Span::styled(
                line[byte..].to_string(),
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            break;
        }

        if c == '"' || c == '\'' || c == '`' {
            flush_word(&mut current_word, &mut spans, false);
            let mut end = i + 1;
            while end < chars.len() && chars[end].1 != c {
                end += if chars[end].1 == '\\' { 2 } else { 1 };
            }
            end = (end + 1).min(chars.len());
            let end_byte = chars.get(end).map_or(line.len(), |&(b, _)| b);
            spans.push(Span::styled(
                line[byte..end_byte].to_string(),
                Style::default().fg(DEFAULT_THEME.string),
            ));
            i = end;
            continue;
        }

        if !c.is_alphanumeric() && c != '_' && c != '$' {
            flush_word(&mut current_word, &mut spans, c == '(');
            let style = match c {
                '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };
            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    flush_word(&mut current_word, &mut spans, false);
    Line::from(spans)
}

fn flush_word(word: &mut String, spans: &mut Vec<Span<'static>>, is_func: bool) {
    if !word.is_empty() {
        let style = get_keyword_style(word, is_func);
        spans.push(Span::styled(std::mem::take(word), style));
    }
}

fn get_keyword_style(word: &str, is_function: bool) -> Style {
    match word {
        "int" | "long" | "short" | "char" | "void" | "bool" | "double" => {
            Style::default().fg(DEFAULT_THEME.type_name)
        }
        "let" | "const" | "var" | "function" | "return" | "if" | "else" | "while" | "for"
        | "break" | "continue" | "using" | "namespace" | "include" => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        "true" | "false" | "null" | "undefined" | "endl" => Style::default().fg(DEFAULT_THEME.number),
        _ if word.chars().all(|c| c.is_ascii_digit()) => Style::default().fg(DEFAULT_THEME.number),
        _ if is_function => Style::default().fg(DEFAULT_THEME.function),
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Scroll state for the source pane
#[derive(Debug, Default)]
pub struct SourceScrollState {
    pub offset: usize,
    /// Visual row the current line is pinned to (`None` until first render)
    pub target_line_row: Option<usize>,
}

/// Data needed to render the source pane
pub struct SourceRenderData<'a> {
    pub source_code: &'a str,
    /// 1-based line of the current snapshot
    pub current_line: usize,
    /// The run faulted and this is its last snapshot
    pub is_error: bool,
}

/// Render the source code pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    data: SourceRenderData,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let block = Block::default()
        .title(" Source Code ")
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let lines: Vec<&str> = data.source_code.lines().collect();
    let total_lines = lines.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    // Keep the current line at the pinned row
    if data.current_line > 0 && data.current_line <= total_lines {
        scroll_state.offset = (data.current_line - 1).saturating_sub(target_row);
        if total_lines > visible_height {
            scroll_state.offset = scroll_state.offset.min(total_lines - visible_height);
        } else {
            scroll_state.offset = 0;
        }
    }

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_current = line_num == data.current_line;

            let (num_style, content_style) = match (is_current, data.is_error) {
                (true, true) => (
                    Style::default()
                        .fg(DEFAULT_THEME.error)
                        .add_modifier(Modifier::BOLD),
                    Some(
                        Style::default()
                            .bg(DEFAULT_THEME.error)
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                ),
                (true, false) => (
                    Style::default()
                        .fg(DEFAULT_THEME.secondary)
                        .add_modifier(Modifier::BOLD),
                    Some(Style::default().bg(DEFAULT_THEME.current_line_bg)),
                ),
                _ => (Style::default().fg(DEFAULT_THEME.comment), None),
            };

            let mut content_line = highlight_source_code(line);
            if let Some(style) = content_style {
                for span in &mut content_line.spans {
                    span.style = if data.is_error {
                        style
                    } else {
                        span.style.patch(style)
                    };
                }
            }

            let marker = if is_current { "▶" } else { " " };
            let mut spans = vec![Span::styled(format!("{}{:4} ", marker, line_num), num_style)];
            spans.extend(content_line.spans);
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible_lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_highlight_preserves_text() {
        for src in [
            "int sum = 0; // total",
            "console.log(\"héllo\", x);",
            "let s = 'it\\'s';",
            "cout << \"unterminated",
        ] {
            assert_eq!(text(&highlight_source_code(src)), src);
        }
    }

    #[test]
    fn test_keyword_styles() {
        assert_eq!(
            get_keyword_style("while", false).fg,
            Some(DEFAULT_THEME.keyword)
        );
        assert_eq!(get_keyword_style("int", false).fg, Some(DEFAULT_THEME.type_name));
        assert_eq!(get_keyword_style("show", true).fg, Some(DEFAULT_THEME.function));
    }
}
