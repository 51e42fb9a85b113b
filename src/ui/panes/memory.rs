//! Memory pane: hex grid and ASCII view of the same byte range
//!
//! ```text
//! offset 0x0000000000000000 of 0x0000000020000000 (512.0 MiB)
//! ──────────────────────────────────────────────────────────
//! 0000000000000000: 48 65 6C 6C 6F 00 ... │ Hello.
//! ```

use super::utils::{ascii_char, format_size, pane_block};
use crate::ui::theme::DEFAULT_THEME;
use crate::ui::viewport::Viewport;
use crate::vm::CoreDump;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Render the memory pane.
///
/// `viewport` must already be updated for the current terminal size and
/// dump. With no dump, or an empty one, only the frame is drawn.
pub fn render_memory_pane(
    frame: &mut Frame,
    area: Rect,
    dump: Option<&CoreDump>,
    viewport: &Viewport,
) {
    let block = pane_block("Memory");

    let dump = match dump {
        Some(dump) if !dump.is_empty() && viewport.bytes_per_line > 0 => dump,
        _ => {
            frame.render_widget(block, area);
            return;
        }
    };

    let bytes = dump
        .read_memory(viewport.offset, viewport.window())
        .unwrap_or_else(|e| {
            tracing::warn!(offset = viewport.offset, error = %e, "memory read failed");
            Vec::new()
        });

    let comment = Style::default().fg(DEFAULT_THEME.comment);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(" offset ", comment),
            Span::styled(
                format!("0x{:016X}", viewport.offset),
                Style::default().fg(DEFAULT_THEME.number),
            ),
            Span::styled(" of ", comment),
            Span::styled(
                format!("0x{:016X}", dump.memory_size()),
                Style::default().fg(DEFAULT_THEME.number),
            ),
            Span::styled(format!(" ({})", format_size(dump.memory_size())), comment),
        ]),
        Line::from(Span::styled(
            "─".repeat(area.width.saturating_sub(2) as usize),
            comment,
        )),
    ];

    let mut chunks = bytes.chunks(viewport.bytes_per_line);
    for row in 0..viewport.lines {
        let chunk = chunks.next().unwrap_or(&[]);
        let row_offset = viewport.offset + row * viewport.bytes_per_line;
        lines.push(memory_row(row_offset, chunk, viewport.bytes_per_line));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// One grid row. Short or empty chunks are padded so the separator and the
/// ASCII column stay aligned.
fn memory_row(offset: usize, chunk: &[u8], bytes_per_line: usize) -> Line<'static> {
    let hex: String = chunk.iter().map(|b| format!("{:02X} ", b)).collect();
    let hex = format!("{:<width$}", hex, width = bytes_per_line * 3);
    let ascii: String = chunk.iter().copied().map(ascii_char).collect();

    let header = if chunk.is_empty() {
        " ".repeat(19)
    } else {
        format!(" {:016X}: ", offset)
    };

    Line::from(vec![
        Span::styled(header, Style::default().fg(DEFAULT_THEME.offset)),
        Span::styled(hex, Style::default().fg(DEFAULT_THEME.fg)),
        Span::styled("│ ", Style::default().fg(DEFAULT_THEME.border)),
        Span::styled(ascii, Style::default().fg(DEFAULT_THEME.ascii)),
    ])
}
