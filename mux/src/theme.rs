//! Color scheme applied by the renderer: the 16-entry ANSI table plus
//! default foreground/background/cursor colors.
//!
//! `loomterm_wire::color::Palette` already carries exactly this shape
//! (it is what `Vte`'s SGR handling resolves `Color` values against), so
//! a `Theme` is that palette plus the one renderer-only knob the
//! compositor needs: the backdrop color the composite is cleared to and
//! that pseudo-transparent windows blend toward.

use loomterm_wire::color::{Palette, Rgb};

#[derive(Debug, Clone)]
pub struct Theme {
    pub palette: Palette,
    /// Backdrop color pseudo-transparent windows are blended against.
    pub backdrop: Rgb,
}

impl Default for Theme {
    fn default() -> Self {
        let palette = Palette::default();
        Theme {
            backdrop: palette.background,
            palette,
        }
    }
}

impl Theme {
    pub fn new(palette: Palette) -> Theme {
        let backdrop = palette.background;
        Theme { palette, backdrop }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use k9::assert_equal as assert_eq;

    #[test]
    fn default_backdrop_matches_palette_background() {
        let theme = Theme::default();
        assert_eq!(theme.backdrop, theme.palette.background);
    }
}
