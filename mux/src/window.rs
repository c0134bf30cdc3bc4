//! A window binds one [`Vte`] to a geometry rectangle and the handful of
//! presentation knobs the renderer reads: border, layering, transparency,
//! dimming. Grounded on `examples/wez-wezterm/mux/src/window.rs`'s
//! `WIN_ID`/`WindowId` id-allocation idiom, but without its `Mux`
//! singleton and `MuxNotification` pub/sub bus — this crate's `Scene`
//! owns its windows outright and has no need for a cross-window
//! notification channel.

use std::sync::atomic::{AtomicU32, Ordering};

use loomterm_term::Vte;

pub type WindowId = u32;

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

fn allocate_id() -> WindowId {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A window's position and size, in both cells and pixels; the pixel
/// fields are carried through for `CSI 14/16 t`-style reports and are
/// otherwise unused by this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
    pub x_pixel: usize,
    pub y_pixel: usize,
}

impl Rect {
    pub fn new(x: usize, y: usize, w: usize, h: usize) -> Rect {
        Rect { x, y, w, h, x_pixel: 0, y_pixel: 0 }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.y && row < self.y + self.h && col >= self.x && col < self.x + self.w
    }
}

/// `None` is fully opaque, `AllCells` blends every cell's background,
/// `EmptyCellsOnly` blends only cells whose background is still
/// `Color::Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransparencyMode {
    None,
    AllCells,
    EmptyCellsOnly,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transparency {
    pub mode: TransparencyMode,
    pub alpha: f32,
}

impl Default for Transparency {
    fn default() -> Self {
        Transparency { mode: TransparencyMode::None, alpha: 1.0 }
    }
}

/// What happens to a window once its child process has exited: closed
/// right away, held open for a grace period, or left for an explicit
/// close only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseBehavior {
    CloseImmediately,
    HoldAfterExit { close_delay_ms: u64 },
    ExplicitOnly,
}

pub struct Window {
    pub id: WindowId,
    pub cmdline: Vec<String>,
    pub title: String,
    pub cwd: Option<String>,
    pub geometry: Rect,
    pub border_width: usize,
    pub layer: i32,
    pub z_index: i32,
    pub hidden: bool,
    pub transparency: Transparency,
    pub dim_factor: f32,
    pub emulator: Vte,
    pub close_behavior: CloseBehavior,
}

impl Window {
    pub fn new(cmdline: Vec<String>, geometry: Rect, scrollback_max: usize) -> Window {
        Window {
            id: allocate_id(),
            cmdline,
            title: String::new(),
            cwd: None,
            geometry,
            border_width: 0,
            layer: 0,
            z_index: 0,
            hidden: false,
            transparency: Transparency::default(),
            dim_factor: 0.0,
            emulator: Vte::new(geometry.w, geometry.h, scrollback_max),
            close_behavior: CloseBehavior::CloseImmediately,
        }
    }

    /// Propagates the inner (client) size to the VTE; the PTY winsize
    /// ioctl is a separate I/O-loop collaborator's job, outside this core.
    pub fn resize(&mut self, geometry: Rect) {
        self.geometry = geometry;
        self.emulator.resize(geometry.w, geometry.h);
    }

    pub fn is_focusable(&self) -> bool {
        !self.hidden
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use k9::assert_equal as assert_eq;

    #[test]
    fn ids_are_distinct_and_increasing() {
        let a = Window::new(vec![], Rect::new(0, 0, 10, 10), 0);
        let b = Window::new(vec![], Rect::new(0, 0, 10, 10), 0);
        assert!(b.id > a.id);
    }

    #[test]
    fn resize_propagates_to_emulator() {
        let mut w = Window::new(vec![], Rect::new(0, 0, 10, 4), 0);
        w.resize(Rect::new(0, 0, 20, 8));
        assert_eq!(w.emulator.screen().w, 20);
        assert_eq!(w.emulator.screen().h, 8);
    }

    #[test]
    fn rect_contains_checks_both_axes() {
        let r = Rect::new(2, 3, 4, 5);
        assert!(r.contains(3, 2));
        assert!(!r.contains(8, 2));
        assert!(!r.contains(3, 0));
    }
}
