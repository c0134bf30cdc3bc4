//! End-to-end scenarios driven through `Vte::process`, rather than
//! directly against `Screen`, complementing the unit tests colocated
//! with `screen.rs`/`vte.rs`. Ported from `examples/original_source`'s
//! `cmd/vv.c`/`cmd/vv2.c`/`cmd/test.c` drive-the-emulator-with-raw-bytes
//! style.

use k9::assert_equal as assert_eq;
use loomterm_term::Vte;

fn row_text(vte: &Vte, row: usize) -> String {
    vte.screen().line_ref(row).cells.iter().map(|c| c.cp.value).collect()
}

fn rows(vte: &Vte) -> Vec<String> {
    (0..vte.screen().h).map(|r| row_text(vte, r)).collect()
}

#[test]
fn reflow_grow_then_shrink_reproduces_original_layout() {
    let mut vte = Vte::new(5, 5, 0);
    vte.process(b"AAAAABBBBBCCCCCDDDDD");
    let before = rows(&vte);
    assert_eq!(before[0], "AAAAA");
    assert_eq!(before[1], "BBBBB");
    assert_eq!(before[2], "CCCCC");
    assert_eq!(before[3], "DDDDD");

    vte.resize(8, 5);
    let grown = rows(&vte);
    assert_eq!(grown[0], "AAAAABBB");
    assert_eq!(grown[1], "BBCCCCCD");
    assert_eq!(grown[2], "DDDD    ");

    vte.resize(5, 5);
    assert_eq!(rows(&vte), before);
}

#[test]
fn bracketed_paste_mode_toggles_on_decset_2004() {
    let mut vte = Vte::new(10, 3, 0);
    assert!(!vte.options.bracketed_paste);
    vte.process(b"\x1b[?2004h");
    assert!(vte.options.bracketed_paste);
    vte.process(b"\x1b[?2004l");
    assert!(!vte.options.bracketed_paste);
}

#[test]
fn focus_reporting_emits_csi_i_and_o_only_when_enabled() {
    let mut vte = Vte::new(10, 3, 0);
    vte.notify_focus(true);
    assert_eq!(vte.drain_pending_input(), Vec::<u8>::new());

    vte.process(b"\x1b[?1004h");
    vte.notify_focus(true);
    assert_eq!(vte.drain_pending_input(), b"\x1b[I".to_vec());
    vte.notify_focus(false);
    assert_eq!(vte.drain_pending_input(), b"\x1b[O".to_vec());
}

#[test]
fn cursor_extremes_scenario() {
    let mut vte = Vte::new(8, 5, 0);
    vte.process(b"\x1b[123A\x1b[123D\x1b[1C\x1b[1B12\x1b[99C\x1b[99B\x1b[1A\x1b[1D3");
    let grid = rows(&vte);
    assert_eq!(&grid[1][1..3], "12");
    assert_eq!(&grid[3][6..7], "3");
}
