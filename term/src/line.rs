//! A single row of cells, grounded on `examples/wez-wezterm/term/src/line.rs`'s
//! `Line` but holding a fixed-width `Vec<Cell>` plus an `eol`/`has_newline`
//! pair instead of wezterm's dynamically-growing, grapheme-cluster-aware
//! cell storage — this model never needs to grow a row past the screen
//! width.

use loomterm_wire::cell::Cell;

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub cells: Vec<Cell>,
    /// First trailing-blank column, in `[0, cells.len()]`.
    pub eol: u16,
    /// True if this line ended with LF/CRLF rather than an auto-wrap.
    pub has_newline: bool,
}

impl Line {
    pub fn blank(width: usize) -> Line {
        Line {
            cells: vec![Cell::default(); width],
            eol: 0,
            has_newline: false,
        }
    }

    pub fn width(&self) -> usize {
        self.cells.len()
    }

    /// Recompute `eol` by scanning backward from the end for the first
    /// non-blank cell (a blank is a space with default style and no link).
    pub fn recompute_eol(&mut self) {
        let mut eol = self.cells.len();
        while eol > 0 && self.cells[eol - 1] == Cell::default() {
            eol -= 1;
        }
        self.eol = eol as u16;
    }

    pub fn clear(&mut self, blank: Cell) {
        for cell in &mut self.cells {
            *cell = blank.clone();
        }
        self.eol = 0;
        self.has_newline = false;
    }

    /// Resize in place, padding with `blank` or truncating; used by
    /// alternate-screen resize (truncate/pad, no reflow).
    pub fn resize_no_reflow(&mut self, width: usize, blank: Cell) {
        self.cells.resize(width, blank);
        self.eol = self.eol.min(width as u16);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn blank_line_has_zero_eol() {
        let line = Line::blank(8);
        assert_eq!(line.eol, 0);
    }

    #[test]
    fn recompute_eol_finds_trailing_blank_boundary() {
        let mut line = Line::blank(8);
        line.cells[0].cp = loomterm_wire::Codepoint::new('a');
        line.cells[2].cp = loomterm_wire::Codepoint::new('b');
        line.recompute_eol();
        assert_eq!(line.eol, 3);
    }
}
