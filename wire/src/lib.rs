//! Typed escape-sequence vocabulary and cell/color model shared by
//! `loomterm-term`'s executor and `loomterm-mux`'s renderer.
//!
//! Layered on top of `vtparse`'s byte-level state machine the way
//! `examples/wez-wezterm/termwiz` sits on top of its own `vtparse` copy:
//! this crate gives the raw FSM callbacks domain meaning (`escape::Action`)
//! without touching a screen model, which lives one layer up.

pub mod cell;
pub mod color;
pub mod escape;
pub mod hyperlink;
pub mod text;

pub use cell::{Attr, Cell, CellStyle};
pub use color::{Color, Palette, Rgb};
pub use escape::{Action, Parser};
pub use hyperlink::{Hyperlink, HyperlinkHandle, HyperlinkInterner};
pub use text::Codepoint;
