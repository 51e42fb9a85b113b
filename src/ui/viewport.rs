//! Memory pane viewport

/// Which slice of the memory image the memory pane shows.
///
/// `bytes_per_line` and `lines` follow the terminal size and are refreshed on
/// every render tick; `total` is the size of the last non-empty dump. The
/// offset stays below `total`, or at 0 while nothing has been seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub offset: usize,
    pub bytes_per_line: usize,
    pub lines: usize,
    pub total: usize,
}

impl Viewport {
    pub fn new() -> Self {
        Viewport::default()
    }

    /// Bytes per line for a terminal `width` columns wide
    pub fn bytes_per_line_for(width: u16) -> usize {
        ((width as usize).saturating_sub(4) / 4).saturating_sub(5)
    }

    /// Visible rows for a terminal `height` rows tall
    pub fn lines_for(height: u16) -> usize {
        (height as usize).saturating_sub(29)
    }

    /// Recompute geometry from the terminal size and the size of the dump
    /// about to be drawn
    pub fn update(&mut self, width: u16, height: u16, total: usize) {
        self.bytes_per_line = Self::bytes_per_line_for(width);
        self.lines = Self::lines_for(height);
        self.total = total;

        if total == 0 {
            self.offset = 0;
        } else if self.offset >= total {
            // A smaller dump arrived; show its last line
            let per_line = self.bytes_per_line.max(1);
            self.offset = (total - 1) / per_line * per_line;
        }
    }

    /// Number of bytes the pane shows at once
    pub fn window(&self) -> usize {
        self.bytes_per_line * self.lines
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(self.bytes_per_line * n);
    }

    /// Move down `n` lines, unless that would start past the end of memory
    pub fn scroll_down(&mut self, n: usize) {
        let next = self.offset + self.bytes_per_line * n;
        if next < self.total {
            self.offset = next;
        }
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.lines);
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.lines);
    }

    pub fn reset(&mut self) {
        self.offset = 0;
    }
}
