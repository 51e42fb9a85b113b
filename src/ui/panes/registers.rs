//! CPU registers pane

use super::utils::{format_register, pane_block};
use crate::ui::theme::DEFAULT_THEME;
use crate::vm::Registers;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

/// Render the registers pane.
///
/// Without a snapshot only the frame is drawn. Rows beyond the pane height are
/// cut off.
pub fn render_registers_pane(frame: &mut Frame, area: Rect, registers: Option<&Registers>) {
    let block = pane_block("CPU Registers");

    let items: Vec<ListItem> = registers
        .into_iter()
        .flat_map(Registers::all)
        .map(|(name, value)| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {:>6}", name.to_ascii_uppercase()),
                    Style::default().fg(DEFAULT_THEME.label),
                ),
                Span::styled(": ", Style::default().fg(DEFAULT_THEME.comment)),
                Span::styled(
                    format_register(value),
                    Style::default().fg(DEFAULT_THEME.number),
                ),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
