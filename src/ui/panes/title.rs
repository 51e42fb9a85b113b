//! Title bar with the VM name, liveness badge and key legend

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the title bar.
///
/// The legend is dropped first when the line gets crowded, then the badge;
/// the VM name is always shown.
pub fn render_title_pane(frame: &mut Frame, area: Rect, vm_name: &str, live: bool) {
    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(DEFAULT_THEME.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let title = Line::from(vec![
        Span::styled(" VirtualBox: ", Style::default().fg(DEFAULT_THEME.comment)),
        Span::styled(
            vm_name.to_string(),
            Style::default()
                .fg(DEFAULT_THEME.title)
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    let title_width = title.width();
    frame.render_widget(Paragraph::new(title).alignment(Alignment::Left), inner);

    let badge = if live {
        Span::styled(
            " RUNNING ",
            Style::default()
                .bg(DEFAULT_THEME.success)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            " NOT RUNNING ",
            Style::default()
                .bg(DEFAULT_THEME.error)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
    };

    let mut right = legend();
    right.push(Span::raw(" "));
    right.push(badge.clone());
    let mut right = Line::from(right);

    let room = (inner.width as usize).saturating_sub(title_width + 1);
    if right.width() > room {
        right = Line::from(vec![badge]);
    }
    if right.width() > room {
        return;
    }

    frame.render_widget(Paragraph::new(right).alignment(Alignment::Right), inner);
}

fn legend() -> Vec<Span<'static>> {
    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = Style::default().fg(DEFAULT_THEME.fg);
    let sep_style = Style::default().fg(DEFAULT_THEME.comment);

    let mut spans = Vec::new();
    for (i, (key, desc)) in [
        ("a/s", "line"),
        ("d/f", "page"),
        ("g", "top"),
        ("q", "quit"),
    ]
    .into_iter()
    .enumerate()
    {
        if i > 0 {
            spans.push(Span::styled("│", sep_style));
        }
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", desc), desc_style));
    }
    spans
}
