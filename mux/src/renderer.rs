//! The compositing renderer: stages every window's visible screen into a
//! back buffer, diffs it against the previous frame and emits the
//! smallest correct byte stream that brings the outer terminal up to
//! date.
//!
//! Grounded on `examples/original_source/src/velvet_scene.c`'s
//! `velvet_render_*` family (damage scan, REP compression, cursor-motion
//! minimisation, buffer cycling) and on
//! `examples/wez-wezterm/termwiz/src/render/terminfo.rs`'s
//! `current_attr`/`pending_attr` pattern for SGR diffing, adapted onto
//! this crate's resolved-RGB `CompositeCell` rather than wezterm's
//! `CellAttributes` + `Capabilities` machinery.

use std::io::Write as _;

use loomterm_wire::cell::{Attr, Cell};
use loomterm_wire::color::Rgb;
use loomterm_wire::escape::csi::CursorStyle;
use loomterm_wire::text;

use crate::theme::Theme;
use crate::window::{Rect, Window, WindowId};

/// Damage ranges emitted per line before falling back to a single
/// whole-line range.
const DAMAGE_MAX: usize = 8;
/// Gaps of this many columns or fewer between two damaged ranges on the
/// same line are merged into one.
const CONSOLIDATE_GAP: usize = 10;
/// `CSI N b` (REP) is used only when it saves at least this many bytes
/// over literal repetition.
const REP_SAVINGS_THRESHOLD: usize = 10;
/// SGR parameter strings are split into `CSI ... m` calls of at most
/// this many parameters.
const MAX_LOAD: usize = 10;
/// Frames touching this many or more cells are wrapped in a
/// synchronized-update envelope.
const SYNC_THRESHOLD: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq)]
struct CompositeCell {
    glyph: char,
    fg: Rgb,
    bg: Rgb,
    attr: Attr,
    wide: bool,
}

impl CompositeCell {
    fn blank(theme: &Theme) -> CompositeCell {
        CompositeCell {
            glyph: ' ',
            fg: theme.palette.foreground,
            bg: theme.backdrop,
            attr: Attr::empty(),
            wide: false,
        }
    }
}

/// Cursor styles the renderer emulates by swapping a cell's glyph/style
/// rather than relying on the outer terminal's own cursor; bar styles
/// are left to the native cursor, grounded on
/// `examples/original_source/src/velvet_scene.c`'s `should_emulate_cursor`.
fn should_emulate_cursor(style: CursorStyle) -> bool {
    matches!(
        style,
        CursorStyle::Default
            | CursorStyle::BlinkingBlock
            | CursorStyle::SteadyBlock
            | CursorStyle::BlinkingUnderline
            | CursorStyle::SteadyUnderline
    )
}

fn cursor_style_param(style: CursorStyle) -> u8 {
    match style {
        CursorStyle::Default => 0,
        CursorStyle::BlinkingBlock => 1,
        CursorStyle::SteadyBlock => 2,
        CursorStyle::BlinkingUnderline => 3,
        CursorStyle::SteadyUnderline => 4,
        CursorStyle::BlinkingBar => 5,
        CursorStyle::SteadyBar => 6,
    }
}

fn normalize(cell: &Cell, theme: &Theme) -> (char, Rgb, Rgb, Attr) {
    let mut fg = theme.palette.resolve(cell.style.fg);
    let mut bg = theme.palette.resolve_bg(cell.style.bg);
    let mut attr = cell.style.attr;
    if attr.contains(Attr::REVERSE) {
        std::mem::swap(&mut fg, &mut bg);
        attr.remove(Attr::REVERSE);
    }
    let glyph = if cell.cp.value == '\0' { ' ' } else { cell.cp.value };
    (glyph, fg, bg, attr)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct NativeCursor {
    visible: bool,
    row: usize,
    col: usize,
    style: CursorStyle,
}

impl Default for NativeCursor {
    fn default() -> Self {
        NativeCursor { visible: false, row: 0, col: 0, style: CursorStyle::Default }
    }
}

pub struct Renderer {
    w: usize,
    h: usize,
    buffers: [Vec<CompositeCell>; 2],
    current: usize,
    initialized: bool,
    output: Vec<u8>,
    emitted_cursor: Option<(usize, usize)>,
    emitted_style: Option<(Rgb, Rgb, Attr)>,
    native_cursor: NativeCursor,
}

impl Renderer {
    pub fn new(w: usize, h: usize) -> Renderer {
        let w = w.max(1);
        let h = h.max(1);
        Renderer {
            buffers: [
                vec![CompositeCell::blank(&Theme::default()); w * h],
                vec![CompositeCell::blank(&Theme::default()); w * h],
            ],
            w,
            h,
            current: 0,
            initialized: false,
            output: Vec::new(),
            emitted_cursor: None,
            emitted_style: None,
            native_cursor: NativeCursor::default(),
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        let w = w.max(1);
        let h = h.max(1);
        if w == self.w && h == self.h {
            return;
        }
        self.w = w;
        self.h = h;
        self.buffers = [vec![CompositeCell::blank(&Theme::default()); w * h], vec![
            CompositeCell::blank(&Theme::default());
            w * h
        ]];
        self.initialized = false;
        self.emitted_cursor = None;
        self.emitted_style = None;
        self.native_cursor = NativeCursor::default();
    }

    fn previous_index(&self) -> usize {
        1 - self.current
    }

    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.w + col
    }

    /// Step 1: fill the frame's target buffer with theme background.
    fn clear(&mut self, theme: &Theme) {
        let blank = CompositeCell::blank(theme);
        self.buffers[self.current].fill(blank);
    }

    /// Steps 2 and 3 fused: each window's visible cells are written and
    /// blended into the composite in one pass, since blending a window
    /// needs only what lower windows already committed, not a separate
    /// staging buffer.
    fn stage_and_blend(&mut self, windows: &[Window], focus: Option<WindowId>, theme: &Theme) {
        for window in windows {
            if window.hidden {
                continue;
            }
            let screen = window.emulator.screen();
            let is_focused = focus == Some(window.id);
            let emulate_cursor =
                is_focused && window.emulator.options.cursor_visible && should_emulate_cursor(window.emulator.options.cursor_style);

            for line in 0..window.geometry.h {
                let row = window.geometry.y + line;
                if row >= self.h {
                    break;
                }
                let src = screen.display_line(line);
                for col in 0..window.geometry.w {
                    let out_col = window.geometry.x + col;
                    if out_col >= self.w {
                        break;
                    }
                    let cell = src.cells.get(col).cloned().unwrap_or_default();
                    let is_cursor_cell =
                        emulate_cursor && screen.cursor.line == line && screen.cursor.column == col;

                    let (mut glyph, mut fg, mut bg, mut attr) = normalize(&cell, theme);
                    if is_cursor_cell {
                        std::mem::swap(&mut fg, &mut bg);
                        if matches!(
                            window.emulator.options.cursor_style,
                            CursorStyle::BlinkingUnderline | CursorStyle::SteadyUnderline
                        ) {
                            attr.insert(Attr::UNDERLINE);
                        }
                    }

                    if window.dim_factor > 0.0 {
                        let keep = 1.0 - window.dim_factor;
                        fg = fg.scaled(keep);
                        bg = bg.scaled(keep);
                    }

                    let blends = !is_cursor_cell
                        && match window.transparency.mode {
                            crate::window::TransparencyMode::None => false,
                            crate::window::TransparencyMode::AllCells => true,
                            crate::window::TransparencyMode::EmptyCellsOnly => {
                                matches!(cell.style.bg, loomterm_wire::color::Color::Default)
                            }
                        };
                    if blends {
                        let under = self.buffers[self.current][self.idx(row, out_col)];
                        let alpha = window.transparency.alpha;
                        bg = bg.blend(under.bg, alpha);
                        if glyph == ' ' && attr.is_empty() {
                            glyph = under.glyph;
                            fg = under.fg.blend(bg, alpha);
                        }
                    }

                    let index = self.idx(row, out_col);
                    self.buffers[self.current][index] =
                        CompositeCell { glyph, fg, bg, attr, wide: cell.is_wide() };

                    // Wide-cell bleed cleanup: this cell is non-blank and
                    // sits right after a wide glyph's leading half, whose
                    // companion it just overwrote without touching the
                    // leading half itself.
                    if glyph != ' ' && out_col > 0 {
                        let before = self.idx(row, out_col - 1);
                        if self.buffers[self.current][before].wide {
                            self.buffers[self.current][before].glyph = ' ';
                        }
                    }
                }
            }
        }
    }

    fn compute_native_cursor(&self, windows: &[Window], focus: Option<WindowId>) -> NativeCursor {
        let Some(focus_id) = focus else { return NativeCursor::default() };
        let Some(window) = windows.iter().find(|w| w.id == focus_id) else {
            return NativeCursor::default();
        };
        if window.hidden || !window.emulator.options.cursor_visible {
            return NativeCursor::default();
        }
        let style = window.emulator.options.cursor_style;
        if should_emulate_cursor(style) {
            return NativeCursor::default();
        }
        let screen = window.emulator.screen();
        let row = window.geometry.y + screen.cursor.line;
        let col = window.geometry.x + screen.cursor.column;
        if row >= self.h || col >= self.w {
            return NativeCursor::default();
        }
        let obscured = windows
            .iter()
            .any(|other| other.z_index > window.z_index && !other.hidden && other.geometry.contains(row, col));
        if obscured {
            return NativeCursor::default();
        }
        NativeCursor { visible: true, row, col, style }
    }

    /// Damage for one line: a forward scan bounded to `DAMAGE_MAX - 1`
    /// ranges, plus a backward scan for any trailing damage the forward
    /// scan's budget didn't reach, then gap-consolidation. Grounded on
    /// `velvet_render_calculate_damage`'s two-phase scan.
    fn line_damage(&self, row: usize) -> Vec<(usize, usize)> {
        let prev = &self.buffers[self.previous_index()];
        let cur = &self.buffers[self.current];
        let base = row * self.w;
        let mut ranges = Vec::new();
        let mut col = 0;
        while col < self.w && ranges.len() + 1 < DAMAGE_MAX {
            if prev[base + col] != cur[base + col] {
                let start = col;
                let mut end = col;
                while end + 1 < self.w && prev[base + end + 1] != cur[base + end + 1] {
                    end += 1;
                }
                ranges.push((start, end));
                col = end + 1;
            } else {
                col += 1;
            }
        }
        if col < self.w {
            let mut last_diff = None;
            for c in (col..self.w).rev() {
                if prev[base + c] != cur[base + c] {
                    last_diff = Some(c);
                    break;
                }
            }
            if let Some(end) = last_diff {
                let mut start = col;
                while start <= end && prev[base + start] == cur[base + start] {
                    start += 1;
                }
                if start <= end {
                    ranges.push((start, end));
                }
            }
        }
        consolidate(ranges)
    }

    fn position_cursor(&mut self, row: usize, col: usize) {
        match self.emitted_cursor {
            Some((r, c)) if r == row && c == col => {}
            Some((r, c)) if r == row && c != col => {
                let _ = write!(self.output_writer(), "\x1b[{}G", col + 1);
            }
            Some((r, c)) if c == col && r != row => {
                let _ = write!(self.output_writer(), "\x1b[{}d", row + 1);
            }
            _ => {
                let _ = write!(self.output_writer(), "\x1b[{};{}H", row + 1, col + 1);
            }
        }
        self.emitted_cursor = Some((row, col));
    }

    fn output_writer(&mut self) -> &mut Vec<u8> {
        &mut self.output
    }

    fn emit_style(&mut self, fg: Rgb, bg: Rgb, attr: Attr) {
        if self.emitted_style == Some((fg, bg, attr)) {
            return;
        }
        let mut params: Vec<String> = Vec::new();
        let prev = self.emitted_style;
        let prev_attr = prev.map(|(_, _, a)| a).unwrap_or(Attr::empty());

        let removed = prev_attr & !attr;
        if removed.intersects(Attr::BOLD | Attr::FAINT) && !attr.intersects(Attr::BOLD | Attr::FAINT) {
            params.push("22".into());
        }
        if removed.contains(Attr::ITALIC) {
            params.push("23".into());
        }
        if removed.intersects(Attr::UNDERLINE_ANY) && !attr.intersects(Attr::UNDERLINE_ANY) {
            params.push("24".into());
        }
        if removed.intersects(Attr::BLINK_ANY) && !attr.intersects(Attr::BLINK_ANY) {
            params.push("25".into());
        }
        if removed.contains(Attr::CONCEAL) {
            params.push("28".into());
        }
        if removed.contains(Attr::CROSSED_OUT) {
            params.push("29".into());
        }
        if removed.intersects(Attr::FRAMED | Attr::ENCIRCLED)
            && !attr.intersects(Attr::FRAMED | Attr::ENCIRCLED)
        {
            params.push("54".into());
        }
        if removed.contains(Attr::OVERLINED) {
            params.push("55".into());
        }

        let added = attr & !prev_attr;
        if added.contains(Attr::BOLD) {
            params.push("1".into());
        }
        if added.contains(Attr::FAINT) {
            params.push("2".into());
        }
        if added.contains(Attr::ITALIC) {
            params.push("3".into());
        }
        if added.contains(Attr::UNDERLINE) {
            params.push("4".into());
        }
        if added.contains(Attr::UNDERLINE_DOUBLE) {
            params.push("4:2".into());
        }
        if added.contains(Attr::UNDERLINE_CURLY) {
            params.push("4:3".into());
        }
        if added.contains(Attr::UNDERLINE_DOTTED) {
            params.push("4:4".into());
        }
        if added.contains(Attr::UNDERLINE_DASHED) {
            params.push("4:5".into());
        }
        if added.contains(Attr::BLINK_SLOW) {
            params.push("5".into());
        }
        if added.contains(Attr::BLINK_RAPID) {
            params.push("6".into());
        }
        if added.contains(Attr::CONCEAL) {
            params.push("8".into());
        }
        if added.contains(Attr::CROSSED_OUT) {
            params.push("9".into());
        }
        if added.contains(Attr::FRAMED) {
            params.push("51".into());
        }
        if added.contains(Attr::ENCIRCLED) {
            params.push("52".into());
        }
        if added.contains(Attr::OVERLINED) {
            params.push("53".into());
        }

        if prev.map(|(pfg, _, _)| pfg) != Some(fg) {
            params.push(format!("38;2;{};{};{}", fg.red, fg.green, fg.blue));
        }
        if prev.map(|(_, pbg, _)| pbg) != Some(bg) {
            params.push(format!("48;2;{};{};{}", bg.red, bg.green, bg.blue));
        }

        if !params.is_empty() {
            for chunk in params.chunks(MAX_LOAD) {
                let _ = write!(self.output, "\x1b[{}m", chunk.join(";"));
            }
        }
        self.emitted_style = Some((fg, bg, attr));
    }

    /// Step 5: emit one damage range, factoring out runs of identical
    /// cells with REP when it is cheaper than literal repetition.
    fn emit_range(&mut self, row: usize, start: usize, end: usize) {
        self.position_cursor(row, start);
        let base = row * self.w;
        let mut col = start;
        while col <= end {
            let cell = self.buffers[self.current][base + col];
            let mut run = 1;
            while col + run <= end && self.buffers[self.current][base + col + run] == cell {
                run += 1;
            }
            self.emit_style(cell.fg, cell.bg, cell.attr);
            let (glyph_bytes, glyph_len) = text::encode(cell.glyph);
            let glyph_bytes = &glyph_bytes[..glyph_len];
            self.output.extend_from_slice(glyph_bytes);

            let repeats = run - 1;
            if repeats > 0 {
                let literal_cost = repeats * glyph_len;
                let rep_cost = format!("\x1b[{}b", repeats).len();
                let rep_eligible = cell.glyph.is_ascii() && !cell.wide;
                if rep_eligible && literal_cost.saturating_sub(rep_cost) >= REP_SAVINGS_THRESHOLD {
                    let _ = write!(self.output, "\x1b[{}b", repeats);
                } else {
                    for _ in 0..repeats {
                        self.output.extend_from_slice(glyph_bytes);
                    }
                }
            }
            col += run;
        }
        self.emitted_cursor = Some((row, end + 1));
    }

    /// Step 7: emit native-cursor visibility/style/position transitions.
    fn emit_cursor_chrome(&mut self, next: NativeCursor) {
        if next.visible != self.native_cursor.visible {
            self.output.extend_from_slice(if next.visible { b"\x1b[?25h" } else { b"\x1b[?25l" });
        }
        if next.visible {
            if next.style != self.native_cursor.style {
                let _ = write!(self.output, "\x1b[{} q", cursor_style_param(next.style));
            }
            if !self.native_cursor.visible || next.row != self.native_cursor.row || next.col != self.native_cursor.col {
                self.position_cursor(next.row, next.col);
            }
        }
        self.native_cursor = next;
    }

    pub fn render(&mut self, windows: &[Window], focus: Option<WindowId>, viewport: Rect, theme: &Theme) -> &[u8] {
        self.output.clear();
        if self.w != viewport.w || self.h != viewport.h {
            self.resize(viewport.w, viewport.h);
        }

        self.clear(theme);
        self.stage_and_blend(windows, focus, theme);

        let mut damaged_cells = 0usize;
        let mut line_ranges: Vec<(usize, Vec<(usize, usize)>)> = Vec::new();
        if self.initialized {
            for row in 0..self.h {
                let ranges = self.line_damage(row);
                if !ranges.is_empty() {
                    damaged_cells += ranges.iter().map(|(s, e)| e - s + 1).sum::<usize>();
                    line_ranges.push((row, ranges));
                }
            }
        } else {
            let ranges = vec![(0, self.w.saturating_sub(1))];
            damaged_cells = self.h * self.w;
            for row in 0..self.h {
                line_ranges.push((row, ranges.clone()));
            }
        }

        let synchronize = damaged_cells >= SYNC_THRESHOLD;
        if synchronize {
            self.output.extend_from_slice(b"\x1b[?2026h");
        }

        for (row, ranges) in &line_ranges {
            for (start, end) in ranges {
                self.emit_range(*row, *start, *end);
            }
        }

        let native_cursor = self.compute_native_cursor(windows, focus);
        self.emit_cursor_chrome(native_cursor);

        if synchronize {
            self.output.extend_from_slice(b"\x1b[?2026l");
        }

        self.initialized = true;
        self.current = self.previous_index();
        &self.output
    }
}

fn consolidate(ranges: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    let mut out: Vec<(usize, usize)> = Vec::new();
    for (start, end) in ranges {
        if let Some(last) = out.last_mut() {
            if start <= last.1 + CONSOLIDATE_GAP + 1 {
                last.1 = last.1.max(end);
                continue;
            }
        }
        out.push((start, end));
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::window::Window;
    use k9::assert_equal as assert_eq;

    fn type_into(window: &mut Window, s: &str) {
        window.emulator.process(s.as_bytes());
    }

    #[test]
    fn first_frame_paints_full_viewport() {
        let theme = Theme::default();
        let mut renderer = Renderer::new(4, 2);
        let mut window = Window::new(vec![], Rect::new(0, 0, 4, 2), 0);
        type_into(&mut window, "ab");
        let out = renderer.render(&[window], None, Rect::new(0, 0, 4, 2), &theme);
        assert!(!out.is_empty());
        let text = String::from_utf8_lossy(out);
        assert!(text.contains('a'));
        assert!(text.contains('b'));
    }

    #[test]
    fn second_identical_frame_emits_no_cell_bytes() {
        let theme = Theme::default();
        let mut renderer = Renderer::new(4, 2);
        let mut window = Window::new(vec![], Rect::new(0, 0, 4, 2), 0);
        type_into(&mut window, "ab");
        let _ = renderer.render(std::slice::from_ref(&window), None, Rect::new(0, 0, 4, 2), &theme);
        let out = renderer.render(std::slice::from_ref(&window), None, Rect::new(0, 0, 4, 2), &theme);
        assert!(!out.contains(&b'a'));
        assert!(!out.contains(&b'b'));
    }

    #[test]
    fn sgr_diffing_emits_three_runs_for_three_cells() {
        let theme = Theme::default();
        let mut renderer = Renderer::new(3, 1);
        let mut window = Window::new(vec![], Rect::new(0, 0, 3, 1), 0);
        type_into(&mut window, "\x1b[31mA\x1b[44mB\x1b[0mC");
        let out = renderer.render(&[window], None, Rect::new(0, 0, 3, 1), &theme);
        let sgr_count = String::from_utf8_lossy(out).matches('m').count();
        assert_eq!(sgr_count, 3);
    }

    #[test]
    fn consolidate_merges_close_ranges() {
        let ranges = vec![(0, 2), (5, 6), (40, 41)];
        let merged = consolidate(ranges);
        assert_eq!(merged, vec![(0, 6), (40, 41)]);
    }
}
