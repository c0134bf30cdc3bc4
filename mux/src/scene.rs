//! Ordered set of windows, focus tracking and the render entry point.
//!
//! Grounded on `examples/original_source/include/velvet_scene.h`'s
//! `velvet_scene` struct (a flat window list plus focus index and a
//! draw buffer) for the overall shape, and on
//! `examples/wez-wezterm/mux/src/window.rs`'s id-based ownership idiom
//! for how windows are looked up — without that file's `Mux` singleton,
//! since the `Scene` is meant to be the sole owner of its `Window`s.

use crate::renderer::Renderer;
use crate::theme::Theme;
use crate::window::{Rect, Window, WindowId};

pub struct Scene {
    windows: Vec<Window>,
    focus: Option<WindowId>,
    pub viewport: Rect,
    pub theme: Theme,
    renderer: Renderer,
}

impl Scene {
    pub fn new(viewport: Rect, theme: Theme) -> Scene {
        Scene {
            windows: Vec::new(),
            focus: None,
            renderer: Renderer::new(viewport.w, viewport.h),
            viewport,
            theme,
        }
    }

    /// Ascending `(z_index, id)`, stable; matches insertion order for
    /// windows sharing a `z_index`.
    fn sort_windows(&mut self) {
        self.windows.sort_by(|a, b| a.z_index.cmp(&b.z_index).then(a.id.cmp(&b.id)));
    }

    pub fn spawn(&mut self, window: Window) -> WindowId {
        let id = window.id;
        self.windows.push(window);
        self.sort_windows();
        if self.focus.is_none() {
            self.focus = Some(id);
        }
        id
    }

    /// Removes and returns the window, updating focus: prefers the
    /// previous focus if it still exists (it won't, if it was the one
    /// removed), else the first non-hidden window, else none.
    pub fn remove(&mut self, id: WindowId) -> Option<Window> {
        let index = self.windows.iter().position(|w| w.id == id)?;
        let removed = self.windows.remove(index);
        if self.focus == Some(id) {
            self.focus = self
                .windows
                .iter()
                .find(|w| w.is_focusable())
                .map(|w| w.id);
        }
        Some(removed)
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    /// Re-sorts after a caller mutates a window's `z_index` in place via
    /// [`Scene::window_mut`]; z-order is only guaranteed after this call.
    pub fn resort(&mut self) {
        self.sort_windows();
    }

    pub fn focus(&self) -> Option<WindowId> {
        self.focus
    }

    pub fn set_focus(&mut self, id: Option<WindowId>) {
        match id {
            Some(id) if self.window(id).is_some() => self.focus = Some(id),
            Some(_) => {}
            None => self.focus = None,
        }
        for w in &mut self.windows {
            w.emulator.notify_focus(self.focus == Some(w.id));
        }
    }

    pub fn resize_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.renderer.resize(viewport.w, viewport.h);
    }

    pub fn render(&mut self) -> &[u8] {
        self.renderer
            .render(&self.windows, self.focus, self.viewport, &self.theme)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use k9::assert_equal as assert_eq;

    fn scene() -> Scene {
        Scene::new(Rect::new(0, 0, 20, 10), Theme::default())
    }

    #[test]
    fn spawn_focuses_first_window() {
        let mut s = scene();
        let id = s.spawn(Window::new(vec![], Rect::new(0, 0, 10, 5), 0));
        assert_eq!(s.focus(), Some(id));
    }

    #[test]
    fn remove_prefers_first_non_hidden_window() {
        let mut s = scene();
        let a = s.spawn(Window::new(vec![], Rect::new(0, 0, 10, 5), 0));
        let b = s.spawn(Window::new(vec![], Rect::new(0, 0, 10, 5), 0));
        s.set_focus(Some(a));
        s.remove(a);
        assert_eq!(s.focus(), Some(b));
    }

    #[test]
    fn windows_sort_by_z_index_then_id() {
        let mut s = scene();
        let a = s.spawn(Window::new(vec![], Rect::new(0, 0, 10, 5), 0));
        let b = s.spawn(Window::new(vec![], Rect::new(0, 0, 10, 5), 0));
        s.window_mut(a).unwrap().z_index = 5;
        s.resort();
        let ids: Vec<WindowId> = s.windows().iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![b, a]);
    }
}
