//! Variables pane rendering: bindings and simulated call frames
//!
//! Shows the bindings of the current snapshot, highlighting values that
//! changed since the previous step. When the learner predicted a different
//! value at this step, the prediction is shown next to the actual value.
//! Below the bindings, each active frame is listed innermost last with the
//! arguments it was entered with.

use crate::discrepancy::Mismatch;
use crate::memory::value::{describe, display_value, values_equal, Value};
use crate::snapshot::Snapshot;
use crate::ui::theme::{border_style, DEFAULT_THEME};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Scroll state for the variables pane
#[derive(Debug, Default)]
pub struct VariablesScrollState {
    pub offset: usize,
}

/// Data needed to render the variables pane
pub struct VariablesRenderData<'a> {
    pub snapshot: &'a Snapshot,
    pub previous: Option<&'a Snapshot>,
    /// Mismatches reported at this snapshot's position
    pub mismatches: Vec<&'a Mismatch>,
}

fn value_style(value: &Value) -> Style {
    let color = match value {
        Value::String(_) => DEFAULT_THEME.string,
        Value::Number(_) | Value::Bool(_) | Value::Null => DEFAULT_THEME.number,
        Value::Array(_) | Value::Object(_) => DEFAULT_THEME.type_name,
    };
    Style::default().fg(color)
}

/// Display form: strings quoted, everything else as printed
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{:?}", s),
        other => display_value(other),
    }
}

fn binding_line<'a>(
    name: &'a str,
    value: &'a Value,
    previous: Option<&Snapshot>,
    mismatch: Option<&&Mismatch>,
) -> Line<'a> {
    let changed = previous.is_some_and(|prev| !values_equal(prev.bindings.get(name), Some(value)));

    let name_style = if changed {
        Style::default()
            .fg(DEFAULT_THEME.changed)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.fg)
    };

    let mut spans = vec![
        Span::styled(if changed { "● " } else { "  " }, Style::default().fg(DEFAULT_THEME.changed)),
        Span::styled(name, name_style),
        Span::styled(" = ", Style::default().fg(DEFAULT_THEME.comment)),
        Span::styled(format_value(value), value_style(value)),
    ];

    if let Some(m) = mismatch {
        spans.push(Span::styled(
            format!("  ✗ you predicted {}", describe(m.predicted.as_ref())),
            Style::default()
                .fg(DEFAULT_THEME.predicted)
                .add_modifier(Modifier::ITALIC),
        ));
    }

    Line::from(spans)
}

fn section_header(title: &str) -> ListItem<'_> {
    ListItem::new(Line::from(vec![
        Span::styled("▸ ", Style::default().fg(DEFAULT_THEME.secondary)),
        Span::styled(
            title,
            Style::default()
                .fg(DEFAULT_THEME.comment)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
}

/// Render the variables pane
pub fn render_variables_pane(
    frame: &mut Frame,
    area: Rect,
    data: VariablesRenderData,
    is_focused: bool,
    scroll_state: &mut VariablesScrollState,
) {
    let block = Block::default()
        .title(" Variables ")
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let snapshot = data.snapshot;
    let mut all_items = vec![section_header("Bindings")];

    if snapshot.bindings.is_empty() && data.mismatches.is_empty() {
        all_items.push(ListItem::new("  (none)").style(Style::default().fg(DEFAULT_THEME.comment)));
    }
    for (name, value) in snapshot.bindings.iter() {
        let mismatch = data.mismatches.iter().find(|m| m.variable == name);
        all_items.push(ListItem::new(binding_line(name, value, data.previous, mismatch)));
    }

    // Variables the learner expected but the run never bound
    for m in data
        .mismatches
        .iter()
        .filter(|m| !snapshot.bindings.contains(&m.variable))
    {
        all_items.push(ListItem::new(Line::from(vec![
            Span::raw("  "),
            Span::styled(m.variable.as_str(), Style::default().fg(DEFAULT_THEME.comment)),
            Span::styled(" unbound", Style::default().fg(DEFAULT_THEME.comment)),
            Span::styled(
                format!("  ✗ you predicted {}", describe(m.predicted.as_ref())),
                Style::default()
                    .fg(DEFAULT_THEME.predicted)
                    .add_modifier(Modifier::ITALIC),
            ),
        ])));
    }

    all_items.push(ListItem::new(""));
    all_items.push(section_header("Call Stack"));

    if snapshot.call_stack.is_empty() {
        all_items.push(ListItem::new("  (empty)").style(Style::default().fg(DEFAULT_THEME.comment)));
    }
    for (depth, stack_frame) in snapshot.call_stack.iter().enumerate() {
        all_items.push(ListItem::new(Line::from(vec![
            Span::styled(format!("  [{}] ", depth), Style::default().fg(DEFAULT_THEME.comment)),
            Span::styled(
                format!("{}()", stack_frame.name),
                Style::default()
                    .fg(DEFAULT_THEME.function)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ← line {}", stack_frame.source_line),
                Style::default().fg(DEFAULT_THEME.comment),
            ),
        ])));
        for (name, value) in stack_frame.bindings.iter() {
            all_items.push(ListItem::new(Line::from(vec![
                Span::raw("      "),
                Span::styled(name, Style::default().fg(DEFAULT_THEME.fg)),
                Span::styled(" = ", Style::default().fg(DEFAULT_THEME.comment)),
                Span::styled(format_value(value), value_style(value)),
            ])));
        }
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let max_scroll = all_items.len().saturating_sub(visible_height);
    scroll_state.offset = scroll_state.offset.min(max_scroll);

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(scroll_state.offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
