use crate::ui::theme::DEFAULT_THEME;
use crate::vm::FarPointer;
use ratatui::{style::Style, text::Span};

/// Register value as fixed-width uppercase hex
pub(crate) fn format_register(value: u64) -> String {
    format!("0x{:016X}", value)
}

/// Stack argument word
pub(crate) fn format_word(value: u64) -> String {
    format!("0x{:08X}", value)
}

pub(crate) fn pointer_span(ptr: FarPointer) -> Span<'static> {
    Span::styled(ptr.to_string(), Style::default().fg(DEFAULT_THEME.pointer))
}

pub(crate) fn word_span(value: u64) -> Span<'static> {
    Span::styled(format_word(value), Style::default().fg(DEFAULT_THEME.number))
}

/// Printable, non-space ASCII as itself; everything else as `.`
pub(crate) fn ascii_char(byte: u8) -> char {
    if byte.is_ascii_graphic() {
        byte as char
    } else {
        '.'
    }
}

/// Human readable byte count
pub(crate) fn format_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = "B";
    for u in UNITS {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = u;
    }
    format!("{:.1} {}", value, unit)
}
