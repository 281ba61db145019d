//! Mismatch pane rendering
//!
//! Lists every divergence between the learner's trace and the generated one.
//! Entries at the current step are highlighted; earlier ones stay visible so
//! the learner can see where their model first went wrong.

use crate::discrepancy::Mismatch;
use crate::ui::theme::{border_style, DEFAULT_THEME};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

/// Data needed to render the mismatch pane
pub struct MismatchRenderData<'a> {
    pub mismatches: &'a [Mismatch],
    /// 1-based position of the snapshot on screen
    pub current_step: usize,
    /// Whether a learner trace was supplied at all
    pub has_learner_trace: bool,
}

/// Render the mismatch pane
pub fn render_mismatch_pane(
    frame: &mut Frame,
    area: Rect,
    data: MismatchRenderData,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let title = format!(" Mismatches ({}) ", data.mismatches.len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    if data.mismatches.is_empty() {
        let (text, color) = if data.has_learner_trace {
            ("Your prediction matches the run.", DEFAULT_THEME.success)
        } else {
            ("(no prediction loaded)", DEFAULT_THEME.comment)
        };
        let paragraph = Paragraph::new(text)
            .block(block)
            .style(Style::default().fg(color))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = data
        .mismatches
        .iter()
        .map(|m| {
            let is_current = m.at_step == data.current_step;
            let step_style = if is_current {
                Style::default()
                    .fg(DEFAULT_THEME.error)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };
            let text_style = if is_current {
                Style::default()
                    .fg(DEFAULT_THEME.fg)
                    .bg(DEFAULT_THEME.current_line_bg)
            } else {
                Style::default().fg(DEFAULT_THEME.fg)
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("#{:<3} ", m.at_step), step_style),
                Span::styled(m.explanation.as_str(), text_style),
            ]))
        })
        .collect();

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll_offset = (*scroll_offset).min(items.len().saturating_sub(visible_height));

    let visible: Vec<ListItem> = items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();
    frame.render_widget(List::new(visible).block(block), area);
}
