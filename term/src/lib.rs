//! Virtual terminal emulator core: a byte-stream FSM executor (`vte`)
//! driving a 2D cell grid with scrollback (`screen`), one row at a time
//! (`line`).
//!
//! Sits directly on top of `loomterm-wire`'s escape-sequence vocabulary
//! the way `examples/wez-wezterm/term`'s `TerminalState` sits on top of
//! `termwiz::escape`, minus the PTY/clipboard/image-protocol collaborators
//! that belong to a host program rather than this core.

pub mod line;
pub mod screen;
pub mod vte;

pub use line::Line;
pub use screen::{Cursor, Margins, Screen, ScrollState};
pub use vte::{MouseCoordinate, MouseMode, Vte, VteOptions};
