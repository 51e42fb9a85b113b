//! Guest call stack pane
//!
//! One row per frame, innermost first, under a fixed column header:
//!
//! ```text
//! SS:BP | Ret SS:BP | Ret CS:EIP | Arg 0 .. Arg 3 | CS:EIP
//! ```

use super::utils::{pane_block, pointer_span, word_span};
use crate::ui::theme::DEFAULT_THEME;
use crate::vm::StackEntry;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

/// Frames beyond this many are not shown
pub const MAX_FRAMES: usize = 16;

const POINTER_WIDTH: usize = 21;
const WORD_WIDTH: usize = 10;

/// Render the stack pane
pub fn render_stack_pane(frame: &mut Frame, area: Rect, stack: &[StackEntry]) {
    let block = pane_block("Stack");
    let rule_width = area.width.saturating_sub(2) as usize;

    let header_style = Style::default()
        .fg(DEFAULT_THEME.label)
        .add_modifier(Modifier::BOLD);
    let sep_style = Style::default().fg(DEFAULT_THEME.comment);

    let header = format!(
        " {:<pw$} | {:<pw$} | {:<pw$} | {:<ww$} | {:<ww$} | {:<ww$} | {:<ww$} | {}",
        "SS:BP:",
        "Ret SS:BP:",
        "Ret CS:EIP:",
        "Arg 0:",
        "Arg 1:",
        "Arg 2:",
        "Arg 3:",
        "CS:EIP:",
        pw = POINTER_WIDTH,
        ww = WORD_WIDTH,
    );

    let mut items = vec![
        ListItem::new(Line::from(Span::styled(header, header_style))),
        ListItem::new(Line::from(Span::styled("─".repeat(rule_width), sep_style))),
    ];

    for entry in stack.iter().take(MAX_FRAMES) {
        let sep = || Span::styled(" | ", sep_style);
        let mut spans = vec![
            Span::raw(" "),
            pointer_span(entry.bp),
            sep(),
            pointer_span(entry.ret_bp),
            sep(),
            pointer_span(entry.ret_ip),
        ];
        for arg in entry.args {
            spans.push(sep());
            spans.push(word_span(arg));
        }
        spans.push(sep());
        spans.push(pointer_span(entry.ip));

        items.push(ListItem::new(Line::from(spans)));
    }

    frame.render_widget(List::new(items).block(block), area);
}
