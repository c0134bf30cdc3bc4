//! End-to-end scene/render scenarios, exercising `Window`, `Scene` and
//! `Renderer` together the way an I/O loop collaborator would: spawn
//! windows, feed bytes, call `render()`.

use k9::assert_equal as assert_eq;
use loomterm_mux::{Rect, Scene, Theme, Window};

#[test]
fn damage_minimality_second_identical_render_emits_no_glyph_bytes() {
    let mut scene = Scene::new(Rect::new(0, 0, 20, 5), Theme::default());
    let mut window = Window::new(vec![], Rect::new(0, 0, 20, 5), 0);
    window.emulator.process(b"hello, world");
    let id = scene.spawn(window);
    scene.set_focus(Some(id));

    let first = scene.render().to_vec();
    assert!(!first.is_empty());

    let second = scene.render().to_vec();
    assert!(!second.contains(&b'h'));
    assert!(!second.contains(&b'o'));
}

#[test]
fn hidden_window_is_not_staged() {
    let mut scene = Scene::new(Rect::new(0, 0, 10, 3), Theme::default());
    let mut window = Window::new(vec![], Rect::new(0, 0, 10, 3), 0);
    window.emulator.process(b"secret");
    window.hidden = true;
    scene.spawn(window);

    let out = scene.render().to_vec();
    assert!(!out.contains(&b's'));
}

#[test]
fn removing_focused_window_refocuses_first_non_hidden() {
    let mut scene = Scene::new(Rect::new(0, 0, 10, 3), Theme::default());
    let a = scene.spawn(Window::new(vec![], Rect::new(0, 0, 5, 3), 0));
    let b = scene.spawn(Window::new(vec![], Rect::new(5, 0, 5, 3), 0));
    scene.set_focus(Some(a));
    scene.remove(a);
    assert_eq!(scene.focus(), Some(b));
}

#[test]
fn two_overlapping_windows_higher_z_index_wins() {
    let mut scene = Scene::new(Rect::new(0, 0, 5, 1), Theme::default());
    let mut back = Window::new(vec![], Rect::new(0, 0, 5, 1), 0);
    back.emulator.process(b"AAAAA");
    let mut front = Window::new(vec![], Rect::new(0, 0, 5, 1), 0);
    front.emulator.process(b"B");
    front.z_index = 1;

    scene.spawn(back);
    scene.spawn(front);

    let out = scene.render().to_vec();
    let text = String::from_utf8_lossy(&out);
    assert!(text.contains('B'));
}
