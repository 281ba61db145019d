//! Output pane rendering: everything emitted up to the current snapshot

use crate::ui::theme::{border_style, DEFAULT_THEME};
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the output pane
pub fn render_output_pane(
    frame: &mut Frame,
    area: Rect,
    lines: &[String],
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(" Output ")
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    if lines.is_empty() {
        let paragraph = Paragraph::new("(no output)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    // usize::MAX pins the view to the newest line
    *scroll_offset = (*scroll_offset).min(lines.len().saturating_sub(visible_height));

    let visible_items: Vec<ListItem> = lines
        .iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|line| ListItem::new(line.as_str()).style(Style::default().fg(DEFAULT_THEME.fg)))
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
