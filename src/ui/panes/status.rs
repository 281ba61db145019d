//! Status bar rendering with keybindings and state indicators

use crate::ui::theme::DEFAULT_THEME;
use std::borrow::Cow;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Data needed to render the status bar
pub struct StatusRenderData<'a> {
    pub message: &'a str,
    /// 0-based position in the trace
    pub current_step: usize,
    pub total_steps: usize,
    /// Note of the current snapshot
    pub note: Option<&'a str>,
    /// Loop condition evaluated at the current snapshot
    pub condition: Option<&'a str>,
    pub has_error: bool,
    pub truncated: bool,
    pub is_playing: bool,
}

fn badge<'a>(text: impl Into<Cow<'a, str>>, bg: Color) -> Span<'a> {
    Span::styled(
        text,
        Style::default()
            .bg(bg)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    )
}

/// Render the status bar at the bottom
pub fn render_status_bar(frame: &mut Frame, area: Rect, data: StatusRenderData) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let bar = Style::default().bg(DEFAULT_THEME.current_line_bg);
    let sep_style = bar.fg(DEFAULT_THEME.comment);

    // Left side: step counter, note, condition
    let step_text = format!(" Step {}/{} ", data.current_step + 1, data.total_steps.max(1));
    let mut left_spans = vec![
        badge(
            step_text,
            if data.has_error {
                DEFAULT_THEME.error
            } else {
                DEFAULT_THEME.primary
            },
        ),
        Span::styled(" | ", sep_style),
        Span::styled(
            format!(" {} ", data.note.unwrap_or(data.message)),
            bar.fg(DEFAULT_THEME.fg),
        ),
    ];
    if let Some(condition) = data.condition {
        left_spans.push(Span::styled("│", sep_style));
        left_spans.push(Span::styled(
            format!(" {} ", condition),
            bar.fg(DEFAULT_THEME.keyword),
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(left_spans))
            .style(bar)
            .alignment(Alignment::Left),
        layout[0],
    );

    // Right side: keybinds and state markers
    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = bar.fg(DEFAULT_THEME.fg);

    let mut right_spans = vec![
        Span::styled(" ←/→ ", key_style),
        Span::styled(" step ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ⎵ ", key_style),
        Span::styled(" play ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ↵ / ⌫ ", key_style),
        Span::styled(" end/start ", desc_style),
        Span::styled("│", sep_style),
        Span::styled("q", key_style),
        Span::styled(" quit ", desc_style),
    ];

    if data.has_error {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(badge(" ERROR ", DEFAULT_THEME.error));
    }
    if data.truncated {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(badge(" TRUNCATED ", DEFAULT_THEME.secondary));
    }

    let is_at_start = data.current_step == 0;
    let is_at_end = data.current_step + 1 >= data.total_steps;
    if data.is_playing {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(badge(" ▶ PLAYING ", DEFAULT_THEME.secondary));
    } else if is_at_end {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(badge(" END ", DEFAULT_THEME.error));
    } else if is_at_start {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(badge(" START ", DEFAULT_THEME.success));
    }

    frame.render_widget(
        Paragraph::new(Line::from(right_spans))
            .style(bar)
            .alignment(Alignment::Right),
        layout[1],
    );
}
