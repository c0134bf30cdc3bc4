//! The 2D cell grid: cursor, scroll region, scrollback ring and resize
//! reflow.
//!
//! Grounded on `examples/wez-wezterm/term/src/screen.rs`'s overall
//! responsibility (one `Screen` per primary/alternate buffer, scrollback
//! only on the primary), but the storage is a fixed-capacity ring
//! (`lines: Vec<Line>` of length `h + scroll.max`, indexed by
//! `(offset + logical) mod total`) rather than wezterm's growable
//! `VecDeque`, matching `examples/original_source/include/screen.h`'s
//! `scroll{max,height,offset,view_offset}` struct exactly.

use crate::line::Line;
use loomterm_wire::cell::{Cell, CellStyle};
use loomterm_wire::text::Codepoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub top: usize,
    pub bottom: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollState {
    pub max: usize,
    pub height: usize,
    pub offset: usize,
    pub view_offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub column: usize,
    pub line: usize,
    pub brush: CellStyle,
    pub wrap_pending: bool,
    pub origin: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor {
            column: 0,
            line: 0,
            brush: CellStyle::default(),
            wrap_pending: false,
            origin: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SavedCursor {
    column: usize,
    line: usize,
    brush: CellStyle,
    wrap_pending: bool,
    origin: bool,
}

#[derive(Debug, Clone)]
pub struct Screen {
    pub w: usize,
    pub h: usize,
    pub margins: Margins,
    pub scroll: ScrollState,
    lines: Vec<Line>,
    pub cursor: Cursor,
    saved_cursor: Option<SavedCursor>,
}

impl Screen {
    /// `scrollback_max` is the number of lines of history to retain beyond
    /// the visible `h` rows; pass `0` for the alternate screen, which is
    /// never backed by scrollback.
    pub fn new(w: usize, h: usize, scrollback_max: usize) -> Screen {
        let w = w.max(1);
        let h = h.max(1);
        let total = h + scrollback_max;
        Screen {
            w,
            h,
            margins: Margins { top: 0, bottom: h - 1 },
            scroll: ScrollState {
                max: scrollback_max,
                height: 0,
                offset: 0,
                view_offset: 0,
            },
            lines: (0..total).map(|_| Line::blank(w)).collect(),
            cursor: Cursor::default(),
            saved_cursor: None,
        }
    }

    pub fn has_scrollback(&self) -> bool {
        self.scroll.max > 0
    }

    fn total_lines(&self) -> usize {
        self.h + self.scroll.max
    }

    fn phys_of_logical(&self, logical: usize) -> usize {
        let total = self.total_lines();
        (total + self.scroll.offset + logical) % total
    }

    fn phys_of_viewport_row(&self, row: usize) -> usize {
        self.phys_of_logical(self.scroll.height + row)
    }

    fn line_mut(&mut self, row: usize) -> &mut Line {
        let phys = self.phys_of_viewport_row(row);
        &mut self.lines[phys]
    }

    pub fn line_ref(&self, row: usize) -> &Line {
        let phys = self.phys_of_viewport_row(row);
        &self.lines[phys]
    }

    /// The row as currently displayed, taking `scroll.view_offset` (a
    /// scrollback browse position) into account; used by the renderer.
    pub fn display_line(&self, row: usize) -> &Line {
        let base = self.scroll.height - self.scroll.view_offset;
        let phys = self.phys_of_logical(base + row);
        &self.lines[phys]
    }

    pub fn scroll_view(&mut self, delta: i64) {
        let max = self.scroll.height as i64;
        let next = (self.scroll.view_offset as i64 + delta).clamp(0, max);
        self.scroll.view_offset = next as usize;
    }

    fn write_cell(&mut self, row: usize, col: usize, cell: Cell) {
        if col >= self.w {
            return;
        }
        let phys = self.phys_of_viewport_row(row);
        let line = &mut self.lines[phys];
        let old = line.cells[col].clone();
        line.cells[col] = cell;
        // Invariant: overwriting a wide cell's leading half normalizes its
        // trailing companion back to a plain space, preserving its style.
        if old.is_wide() && col + 1 < line.cells.len() {
            line.cells[col + 1] = Cell {
                cp: Codepoint::space(),
                style: old.style,
                link: old.link.clone(),
            };
        }
    }

    pub fn insert(&mut self, cell: Cell, wrap: bool) {
        if self.cursor.wrap_pending && wrap {
            self.newline(true);
        }
        self.cursor.wrap_pending = false;

        let wide = cell.is_wide();
        if wide && self.cursor.column == self.w.saturating_sub(1) {
            if wrap {
                self.newline(true);
            } else {
                return;
            }
        }

        let row = self.cursor.line;
        let col = self.cursor.column;
        let style = cell.style;
        let link = cell.link.clone();
        self.write_cell(row, col, cell);

        if wide {
            let trailer = Cell {
                cp: Codepoint::space(),
                style,
                link,
            };
            self.write_cell(row, col + 1, trailer);
            self.cursor.column += 2;
        } else {
            self.cursor.column += 1;
        }

        let end = if wide { col + 2 } else { col + 1 };
        let line = self.line_mut(row);
        if end as u16 > line.eol {
            line.eol = end as u16;
        }

        if self.cursor.column >= self.w {
            self.cursor.column = self.w - 1;
            self.cursor.wrap_pending = true;
        }
    }

    /// Batched ASCII fast path; semantically identical to calling
    /// [`Screen::insert`] once per byte.
    pub fn insert_ascii_run(&mut self, brush: CellStyle, bytes: &[u8], wrap: bool) {
        for &b in bytes {
            self.insert(
                Cell {
                    cp: Codepoint::new(b as char),
                    style: brush,
                    link: None,
                },
                wrap,
            );
        }
    }

    pub fn move_cursor_relative(&mut self, dx: i64, dy: i64) {
        let col = (self.cursor.column as i64 + dx).clamp(0, self.w as i64 - 1);
        let line = (self.cursor.line as i64 + dy).clamp(0, self.h as i64 - 1);
        self.cursor.column = col as usize;
        self.cursor.line = line as usize;
        self.cursor.wrap_pending = false;
    }

    pub fn set_cursor(&mut self, x: usize, y: usize) {
        let line = if self.cursor.origin { y + self.margins.top } else { y };
        self.cursor.column = x.min(self.w - 1);
        self.cursor.line = line.min(self.h - 1);
        self.cursor.wrap_pending = false;
    }

    pub fn newline(&mut self, carriage: bool) {
        let row = self.cursor.line;
        self.line_mut(row).has_newline = true;
        self.move_or_scroll_down();
        if carriage {
            self.cursor.column = 0;
        }
    }

    pub fn move_or_scroll_down(&mut self) {
        self.cursor.wrap_pending = false;
        if self.cursor.line == self.margins.bottom {
            let (top, bottom) = (self.margins.top, self.margins.bottom);
            self.shuffle_rows_up(1, top, bottom);
        } else if self.cursor.line + 1 < self.h {
            self.cursor.line += 1;
        }
    }

    pub fn move_or_scroll_up(&mut self) {
        self.cursor.wrap_pending = false;
        if self.cursor.line == self.margins.top {
            let (top, bottom) = (self.margins.top, self.margins.bottom);
            self.shuffle_rows_down(1, top, bottom);
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
        }
    }

    /// For the full-screen region this extends the scrollback ring instead
    /// of moving cells; any other region is a plain in-place shift.
    pub fn shuffle_rows_up(&mut self, n: usize, top: usize, bottom: usize) {
        if bottom < top {
            return;
        }
        let n = n.min(bottom - top + 1);
        if n == 0 {
            return;
        }
        let blank = Cell::blank_with_style(self.cursor.brush);
        if top == 0 && bottom == self.h - 1 {
            let total = self.total_lines();
            self.scroll.offset = (self.scroll.offset + n) % total;
            self.scroll.height = (self.scroll.height + n).min(self.scroll.max);
            for row in self.h - n..self.h {
                self.line_mut(row).clear(blank.clone());
            }
        } else {
            for row in top..=bottom - n {
                let src = self.phys_of_viewport_row(row + n);
                let dst = self.phys_of_viewport_row(row);
                self.lines.swap(src, dst);
            }
            for row in (bottom - n + 1)..=bottom {
                self.line_mut(row).clear(blank.clone());
            }
        }
    }

    /// Symmetric to [`Screen::shuffle_rows_up`] but never extends the
    /// scrollback ring, even for the full-screen region.
    pub fn shuffle_rows_down(&mut self, n: usize, top: usize, bottom: usize) {
        if bottom < top {
            return;
        }
        let n = n.min(bottom - top + 1);
        if n == 0 {
            return;
        }
        let blank = Cell::blank_with_style(self.cursor.brush);
        for row in ((top + n)..=bottom).rev() {
            let src = self.phys_of_viewport_row(row - n);
            let dst = self.phys_of_viewport_row(row);
            self.lines.swap(src, dst);
        }
        for row in top..top + n {
            self.line_mut(row).clear(blank.clone());
        }
    }

    /// Inclusive rectangular erase in line-major order from `a` to `b`
    /// (each `(line, column)`), writing blanks styled with the current
    /// brush.
    pub fn erase_between(&mut self, a: (usize, usize), b: (usize, usize)) {
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        let blank = Cell::blank_with_style(self.cursor.brush);
        for row in a.0..=b.0.min(self.h - 1) {
            let (start, end) = if a.0 == b.0 {
                (a.1, b.1)
            } else if row == a.0 {
                (a.1, self.w - 1)
            } else if row == b.0 {
                (0, b.1)
            } else {
                (0, self.w - 1)
            };
            let end = end.min(self.w - 1);
            if start > end {
                continue;
            }
            let w = self.w;
            let line = self.line_mut(row);
            for col in start..=end {
                line.cells[col] = blank.clone();
            }
            let eol = line.eol as usize;
            // The erased range's first column becomes the new eol iff the
            // old eol fell within (or at the boundary of, when erasure
            // reaches end-of-line) the erased range.
            let reaches_eol = end + 1 >= w;
            if (eol >= start && eol <= end) || (reaches_eol && eol >= start) {
                line.eol = start as u16;
            }
        }
    }

    /// ICH: shift cells at and after the cursor right by `n`, padding the
    /// vacated columns with brush-styled blanks.
    pub fn insert_blanks(&mut self, n: usize) {
        let col = self.cursor.column;
        let w = self.w;
        let brush = self.cursor.brush;
        let n = n.min(w.saturating_sub(col));
        if n == 0 {
            return;
        }
        let row = self.cursor.line;
        let line = self.line_mut(row);
        for i in (col..w - n).rev() {
            line.cells[i + n] = line.cells[i].clone();
        }
        for i in col..col + n {
            line.cells[i] = Cell::blank_with_style(brush);
        }
        line.eol = ((line.eol as usize + n).min(w)) as u16;
    }

    /// DCH: shift cells left from the cursor by `n`, padding the tail with
    /// brush-styled blanks.
    pub fn shift_from_cursor(&mut self, n: usize) {
        let col = self.cursor.column;
        let w = self.w;
        let brush = self.cursor.brush;
        let n = n.min(w.saturating_sub(col));
        if n == 0 {
            return;
        }
        let row = self.cursor.line;
        let line = self.line_mut(row);
        for i in col..w - n {
            line.cells[i] = line.cells[i + n].clone();
        }
        for i in w - n..w {
            line.cells[i] = Cell::blank_with_style(brush);
        }
        line.recompute_eol();
    }

    pub fn insert_lines(&mut self, n: usize) {
        if self.cursor.line < self.margins.top || self.cursor.line > self.margins.bottom {
            return;
        }
        let bottom = self.margins.bottom;
        self.shuffle_rows_down(n, self.cursor.line, bottom);
    }

    pub fn delete_lines(&mut self, n: usize) {
        if self.cursor.line < self.margins.top || self.cursor.line > self.margins.bottom {
            return;
        }
        let bottom = self.margins.bottom;
        self.shuffle_rows_up(n, self.cursor.line, bottom);
    }

    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        let top = top.min(self.h - 1);
        let bottom = bottom.min(self.h - 1);
        if bottom < top {
            return;
        }
        self.margins = Margins { top, bottom };
        self.set_cursor(0, 0);
    }

    pub fn save_cursor(&mut self) {
        self.saved_cursor = Some(SavedCursor {
            column: self.cursor.column,
            line: self.cursor.line,
            brush: self.cursor.brush,
            wrap_pending: self.cursor.wrap_pending,
            origin: self.cursor.origin,
        });
    }

    pub fn restore_cursor(&mut self) {
        if let Some(s) = self.saved_cursor {
            self.cursor.column = s.column;
            self.cursor.line = s.line;
            self.cursor.brush = s.brush;
            self.cursor.wrap_pending = s.wrap_pending;
            self.cursor.origin = s.origin;
        }
    }

    /// Blank every visible row and reset scroll state, keeping history.
    pub fn erase_all_and_home(&mut self) {
        let brush = self.cursor.brush;
        let blank = Cell::blank_with_style(brush);
        for row in 0..self.h {
            self.line_mut(row).clear(blank.clone());
        }
        self.cursor.column = 0;
        self.cursor.line = 0;
        self.cursor.wrap_pending = false;
    }

    pub fn resize(&mut self, new_w: usize, new_h: usize, wrap: bool) {
        if new_w == self.w && new_h == self.h {
            return;
        }
        if self.has_scrollback() {
            self.reflow_resize(new_w, new_h, wrap);
        } else {
            self.resize_no_reflow(new_w, new_h);
        }
    }

    fn reflow_resize(&mut self, new_w: usize, new_h: usize, wrap: bool) {
        let total_logical = self.scroll.height + self.h;
        let cursor_logical = self.scroll.height + self.cursor.line;

        let mut dest = Screen::new(new_w, new_h, self.scroll.max);
        dest.cursor.brush = self.cursor.brush;
        dest.cursor.origin = self.cursor.origin;

        let mut recorded_cursor = None;

        for logical in 0..total_logical {
            let phys = self.phys_of_logical(logical);
            let src_line = self.lines[phys].clone();
            let is_last = logical + 1 == total_logical;
            let trimmed_eol = if src_line.has_newline || is_last {
                src_line.eol as usize
            } else {
                src_line.width()
            };

            for col in 0..trimmed_eol.min(src_line.cells.len()) {
                if logical == cursor_logical && col == self.cursor.column {
                    recorded_cursor = Some((dest.cursor.line, dest.cursor.column));
                }
                dest.insert(src_line.cells[col].clone(), wrap);
            }
            if logical == cursor_logical && self.cursor.column >= trimmed_eol {
                recorded_cursor = Some((dest.cursor.line, dest.cursor.column));
            }
            if src_line.has_newline {
                dest.newline(true);
            }
        }

        if let Some((line, col)) = recorded_cursor {
            dest.cursor.line = line.min(new_h - 1);
            dest.cursor.column = col.min(new_w - 1);
        }
        dest.cursor.wrap_pending = false;
        *self = dest;
    }

    fn resize_no_reflow(&mut self, new_w: usize, new_h: usize) {
        let blank = Cell::blank_with_style(CellStyle::default());
        let mut new_lines = Vec::with_capacity(new_h);
        for row in 0..new_h {
            if row < self.h {
                let mut line = self.line_ref(row).clone();
                line.resize_no_reflow(new_w, blank.clone());
                new_lines.push(line);
            } else {
                new_lines.push(Line::blank(new_w));
            }
        }
        self.lines = new_lines;
        self.w = new_w;
        self.h = new_h;
        self.margins = Margins { top: 0, bottom: new_h - 1 };
        self.scroll.offset = 0;
        self.scroll.height = 0;
        self.scroll.view_offset = 0;
        self.cursor.column = self.cursor.column.min(new_w - 1);
        self.cursor.line = self.cursor.line.min(new_h - 1);
        self.cursor.wrap_pending = false;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use loomterm_wire::text::Codepoint;
    use k9::assert_equal as assert_eq;

    fn type_str(screen: &mut Screen, s: &str) {
        for c in s.chars() {
            screen.insert(
                Cell {
                    cp: Codepoint::new(c),
                    style: screen.cursor.brush,
                    link: None,
                },
                true,
            );
        }
    }

    fn row_text(screen: &Screen, row: usize) -> String {
        screen
            .line_ref(row)
            .cells
            .iter()
            .map(|c| c.cp.value)
            .collect()
    }

    #[test]
    fn s1_wrap_around() {
        let mut s = Screen::new(8, 5, 0);
        type_str(&mut s, "abcdefghijk");
        assert_eq!(row_text(&s, 0), "abcdefgh");
        assert_eq!(row_text(&s, 1), "ijk     ");
        assert_eq!(s.cursor.line, 1);
        assert_eq!(s.cursor.column, 3);
        assert!(!s.cursor.wrap_pending);
    }

    #[test]
    fn s3_scroll_out() {
        let mut s = Screen::new(8, 5, 100);
        type_str(&mut s, "line1   line2   line3   line4   line5   l");
        assert_eq!(row_text(&s, 0), "line2   ");
        assert_eq!(row_text(&s, 1), "line3   ");
        assert_eq!(row_text(&s, 2), "line4   ");
        assert_eq!(row_text(&s, 3), "line5   ");
        assert_eq!(row_text(&s, 4), "l       ");
    }

    #[test]
    fn cursor_never_leaves_bounds() {
        let mut s = Screen::new(8, 5, 0);
        s.move_cursor_relative(-100, -100);
        assert_eq!((s.cursor.column, s.cursor.line), (0, 0));
        s.move_cursor_relative(100, 100);
        assert_eq!((s.cursor.column, s.cursor.line), (7, 4));
    }

    #[test]
    fn scroll_region_isolation() {
        let mut s = Screen::new(8, 5, 0);
        type_str(&mut s, "11111111");
        s.newline(true);
        type_str(&mut s, "22222222");
        s.set_scroll_region(1, 3);
        s.cursor.line = 1;
        s.cursor.column = 0;
        s.insert_lines(1);
        assert_eq!(row_text(&s, 0), "11111111");
    }

    #[test]
    fn resize_grow_then_shrink_round_trips() {
        let mut s = Screen::new(5, 5, 0);
        type_str(&mut s, "AAAAABBBBBCCCCCDDDDD");
        let before: Vec<String> = (0..5).map(|r| row_text(&s, r)).collect();
        s.resize(8, 5, true);
        s.resize(5, 5, true);
        let after: Vec<String> = (0..5).map(|r| row_text(&s, r)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn s5_reflow_shrink_with_newlines() {
        let mut s = Screen::new(8, 5, 0);
        type_str(&mut s, "AAAAAAA");
        s.newline(true);
        type_str(&mut s, "BB");
        s.newline(true);
        type_str(&mut s, "DDDDDDD");
        s.resize(5, 5, true);
        assert_eq!(row_text(&s, 0), "AAAAA");
        assert_eq!(row_text(&s, 1), "AA   ");
        assert_eq!(row_text(&s, 2), "BB   ");
        assert_eq!(row_text(&s, 3), "DDDDD");
        assert_eq!(row_text(&s, 4), "DD   ");
    }

    #[test]
    fn erase_updates_eol_when_old_eol_in_range() {
        let mut s = Screen::new(8, 5, 0);
        type_str(&mut s, "hello");
        assert_eq!(s.line_ref(0).eol, 5);
        s.erase_between((0, 2), (0, 7));
        assert_eq!(s.line_ref(0).eol, 2);
    }
}
