//! Cell styling.
//!
//! `CellAttributes` is a flat bitset rather than wezterm's packed-field
//! `CellAttributes` (which stores `Intensity`/`Underline` as multi-bit
//! sub-fields via a hand-rolled `bitfield!` macro in
//! `examples/wez-wezterm/term/src/cell.rs`). Cell styling here is a bitset
//! of independent boolean attributes (one bit per SGR code), matching
//! `examples/original_source/include/screen.h`'s
//! `enum cell_attributes` exactly, so `bitflags!` (already a teacher
//! dependency, see `examples/wez-wezterm/termwiz/src/surface/line.rs`) is
//! the idiomatic fit rather than the multi-bit packed fields.

use crate::color::Color;
use crate::hyperlink::HyperlinkHandle;
use crate::text::Codepoint;
use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Attr: u16 {
        const BOLD            = 1 << 0;
        const FAINT           = 1 << 1;
        const ITALIC          = 1 << 2;
        const UNDERLINE       = 1 << 3;
        const BLINK_SLOW      = 1 << 4;
        const BLINK_RAPID     = 1 << 5;
        const REVERSE         = 1 << 6;
        const CONCEAL         = 1 << 7;
        const CROSSED_OUT     = 1 << 8;
        const UNDERLINE_DOUBLE = 1 << 9;
        const UNDERLINE_CURLY  = 1 << 10;
        const UNDERLINE_DOTTED = 1 << 11;
        const UNDERLINE_DASHED = 1 << 12;
        const FRAMED          = 1 << 13;
        const ENCIRCLED       = 1 << 14;
        const OVERLINED       = 1 << 15;

        const UNDERLINE_ANY = Self::UNDERLINE.bits() | Self::UNDERLINE_DOUBLE.bits()
            | Self::UNDERLINE_CURLY.bits() | Self::UNDERLINE_DOTTED.bits()
            | Self::UNDERLINE_DASHED.bits();
        const BLINK_ANY = Self::BLINK_SLOW.bits() | Self::BLINK_RAPID.bits();
    }
}

/// The brush/style applied to a cell: attribute bitset plus fg/bg color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellStyle {
    pub attr: Attr,
    pub fg: Color,
    pub bg: Color,
}

impl CellStyle {
    pub fn reset(&mut self) {
        *self = CellStyle::default();
    }

    /// Clear the underline family and set one underline variant; used by
    /// SGR 4/21 and the `4:N` sub-parameter forms.
    pub fn set_underline(&mut self, variant: Attr) {
        self.attr.remove(Attr::UNDERLINE_ANY);
        self.attr.insert(variant);
    }
}

/// One screen cell: a glyph, its style, and an optional hyperlink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub cp: Codepoint,
    pub style: CellStyle,
    pub link: Option<HyperlinkHandle>,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            cp: Codepoint::space(),
            style: CellStyle::default(),
            link: None,
        }
    }
}

impl Cell {
    pub fn blank_with_style(style: CellStyle) -> Self {
        Cell {
            cp: Codepoint::space(),
            style,
            link: None,
        }
    }

    pub fn is_wide(&self) -> bool {
        self.cp.wide
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reset_clears_style_but_not_type() {
        let mut s = CellStyle {
            attr: Attr::BOLD,
            fg: Color::Palette(3),
            bg: Color::Rgb(1, 2, 3),
        };
        s.reset();
        assert_eq!(s, CellStyle::default());
    }

    #[test]
    fn underline_variants_are_exclusive() {
        let mut s = CellStyle::default();
        s.set_underline(Attr::UNDERLINE_CURLY);
        assert!(s.attr.contains(Attr::UNDERLINE_CURLY));
        s.set_underline(Attr::UNDERLINE_DOUBLE);
        assert!(!s.attr.contains(Attr::UNDERLINE_CURLY));
        assert!(s.attr.contains(Attr::UNDERLINE_DOUBLE));
    }
}
