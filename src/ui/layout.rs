//! Fixed dashboard layout
//!
//! ```text
//! row 0  ┌─ title ──────────────────────────────────────────────┐
//! row 3  ├ registers (30 wide) ┬ stack (rest of width) ─────────┤
//! row 25 ├ memory (full width, down to the bottom) ─────────────┤
//! ```
//!
//! Each pane is only placed when the terminal is big enough to draw it whole;
//! a pane that does not fit is skipped for that tick rather than clipped.

use ratatui::layout::Rect;

pub const TITLE_HEIGHT: u16 = 3;
pub const TOP_ROW: u16 = TITLE_HEIGHT;
pub const TOP_HEIGHT: u16 = 22;
pub const MEMORY_ROW: u16 = TOP_ROW + TOP_HEIGHT;

pub const REGISTERS_WIDTH: u16 = 30;
pub const REGISTERS_MIN: (u16, u16) = (30, 25);
pub const STACK_MIN: (u16, u16) = (190, 25);
pub const MEMORY_MIN: (u16, u16) = (30, 35);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLayout {
    pub title: Option<Rect>,
    pub registers: Option<Rect>,
    pub stack: Option<Rect>,
    pub memory: Option<Rect>,
}

impl DashboardLayout {
    pub fn new(width: u16, height: u16) -> Self {
        let fits = |(min_w, min_h): (u16, u16)| width >= min_w && height >= min_h;

        let title = (width > 0 && height >= TITLE_HEIGHT).then(|| Rect::new(0, 0, width, TITLE_HEIGHT));

        let registers = fits(REGISTERS_MIN)
            .then(|| Rect::new(0, TOP_ROW, REGISTERS_WIDTH, TOP_HEIGHT));

        let stack = fits(STACK_MIN).then(|| {
            Rect::new(REGISTERS_WIDTH, TOP_ROW, width - REGISTERS_WIDTH, TOP_HEIGHT)
        });

        let memory = fits(MEMORY_MIN)
            .then(|| Rect::new(0, MEMORY_ROW, width, height - MEMORY_ROW));

        DashboardLayout {
            title,
            registers,
            stack,
            memory,
        }
    }

    pub fn from_area(area: Rect) -> Self {
        Self::new(area.width, area.height)
    }
}
