//! Typed CSI (Control Sequence Introducer) commands.
//!
//! Grounded on `examples/wez-wezterm/termwiz/src/escape/csi.rs`'s overall
//! shape (one `Csi` enum, a `Cracked` helper that groups raw `CsiParam`s by
//! `;`/`:` separators before interpreting them) but only the commands this
//! core's terminal emulator actually acts on are modeled — wezterm's
//! mouse-report encoding, kitty keyboard protocol and most `Device`/`Window`
//! sub-commands have no counterpart here and are folded into
//! `Csi::Unspecified`.

use crate::cell::Attr;
use crate::color::Color;
use vtparse::CsiParam;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseMode {
    ToEnd,
    ToStart,
    All,
    Scrollback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    Default,
    BlinkingBlock,
    SteadyBlock,
    BlinkingUnderline,
    SteadyUnderline,
    BlinkingBar,
    SteadyBar,
}

impl CursorStyle {
    fn from_param(n: i64) -> CursorStyle {
        match n {
            1 => CursorStyle::BlinkingBlock,
            2 => CursorStyle::SteadyBlock,
            3 => CursorStyle::BlinkingUnderline,
            4 => CursorStyle::SteadyUnderline,
            5 => CursorStyle::BlinkingBar,
            6 => CursorStyle::SteadyBar,
            _ => CursorStyle::Default,
        }
    }
}

/// One SGR (`m`) parameter's effect. A full `CSI ... m` decodes to a `Vec`
/// of these, applied left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SgrAttribute {
    Reset,
    Bold,
    Faint,
    NormalIntensity,
    Italic(bool),
    Underline(Option<Attr>),
    Blink(Option<Attr>),
    Reverse(bool),
    Conceal(bool),
    CrossedOut(bool),
    Framed(bool),
    Encircled(bool),
    Overlined(bool),
    Foreground(Color),
    Background(Color),
}

/// A DEC private mode number (`CSI ? ... h/l`), e.g. 1049 for the alternate
/// screen. Only the modes this emulator acts on are given constants;
/// anything else is carried as its raw number and treated as a no-op by
/// the executor.
pub mod dec_mode {
    pub const APPLICATION_CURSOR_KEYS: u16 = 1;
    pub const ORIGIN: u16 = 6;
    pub const AUTO_WRAP: u16 = 7;
    pub const MOUSE_X10: u16 = 9;
    pub const BLINKING_CURSOR: u16 = 12;
    pub const SHOW_CURSOR: u16 = 25;
    pub const MOUSE_NORMAL: u16 = 1000;
    pub const MOUSE_BUTTON_EVENT: u16 = 1002;
    pub const MOUSE_ANY_EVENT: u16 = 1003;
    pub const FOCUS_REPORTING: u16 = 1004;
    pub const MOUSE_UTF8: u16 = 1005;
    pub const MOUSE_SGR: u16 = 1006;
    pub const ALTERNATE_SCROLL: u16 = 1007;
    pub const MOUSE_URXVT: u16 = 1015;
    pub const MOUSE_SGR_PIXELS: u16 = 1016;
    pub const ALTERNATE_SCREEN: u16 = 1049;
    pub const BRACKETED_PASTE: u16 = 2004;
    pub const SYNCHRONIZED_OUTPUT: u16 = 2026;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Csi {
    CursorUp(u32),
    CursorDown(u32),
    CursorForward(u32),
    CursorBack(u32),
    CursorPosition { row: u32, col: u32 },
    CursorColumn(u32),
    CursorLine(u32),
    CursorNextLine(u32),
    CursorPrecedingLine(u32),
    EraseDisplay(EraseMode),
    EraseLine(EraseMode),
    InsertLines(u32),
    DeleteLines(u32),
    DeleteCharacters(u32),
    InsertCharacters(u32),
    EraseCharacters(u32),
    ScrollUp(u32),
    ScrollDown(u32),
    Sgr(Vec<SgrAttribute>),
    SetScrollRegion { top: u32, bottom: u32 },
    DecSet(Vec<u16>),
    DecReset(Vec<u16>),
    SetMode(Vec<u16>),
    ResetMode(Vec<u16>),
    CursorStyle(CursorStyle),
    RequestPrimaryDeviceAttributes,
    RequestSecondaryDeviceAttributes,
    DeviceStatusReport(u16),
    RequestMode { private: bool, mode: u16 },
    RepeatLastCharacter(u32),
    WindowOp(Vec<i64>),
    /// A recognised final byte whose parameters didn't parse cleanly, or a
    /// final byte this table has no entry for. Never fatal.
    Unspecified {
        params: Vec<i64>,
        leader: Option<u8>,
        intermediate: Option<u8>,
        control: u8,
    },
}

/// Groups raw `CsiParam`s into `;`-separated top-level fields, each of
/// which may itself hold `:`-separated sub-fields. An empty field (two
/// adjacent separators, or none before the first) is `None`.
struct Cracked {
    leader: Option<u8>,
    intermediate: Option<u8>,
    groups: Vec<Vec<Option<i64>>>,
}

impl Cracked {
    fn parse(params: &[CsiParam]) -> Cracked {
        let mut leader = None;
        let mut intermediate = None;
        let mut groups: Vec<Vec<Option<i64>>> = vec![vec![]];
        let mut pending = false;

        for p in params {
            match p {
                CsiParam::P(b'?' | b'<' | b'=' | b'>') => {
                    if let CsiParam::P(b) = p {
                        leader = Some(*b);
                    }
                }
                CsiParam::P(b';') => {
                    if !pending {
                        groups.last_mut().unwrap().push(None);
                    }
                    groups.push(vec![]);
                    pending = false;
                }
                CsiParam::P(b':') => {
                    if !pending {
                        groups.last_mut().unwrap().push(None);
                    }
                    pending = false;
                }
                CsiParam::Integer(n) => {
                    groups.last_mut().unwrap().push(Some(*n));
                    pending = true;
                }
                CsiParam::P(b) => {
                    intermediate = Some(*b);
                }
            }
        }
        Cracked {
            leader,
            intermediate,
            groups,
        }
    }

    fn top(&self, idx: usize, default: i64) -> i64 {
        self.groups
            .get(idx)
            .and_then(|g| g.first().copied().flatten())
            .unwrap_or(default)
    }

    fn sub(&self, idx: usize, sub: usize) -> Option<i64> {
        self.groups.get(idx)?.get(sub).copied().flatten()
    }

    fn group_len(&self, idx: usize) -> usize {
        self.groups.get(idx).map(|g| g.len()).unwrap_or(0)
    }

    fn all_top(&self) -> Vec<i64> {
        self.groups
            .iter()
            .map(|g| g.first().copied().flatten().unwrap_or(0))
            .collect()
    }

    fn len(&self) -> usize {
        self.groups.len()
    }
}

fn erase_mode(n: i64) -> EraseMode {
    match n {
        1 => EraseMode::ToStart,
        2 => EraseMode::All,
        3 => EraseMode::Scrollback,
        _ => EraseMode::ToEnd,
    }
}

fn sgr_color(c: &Cracked, idx: usize) -> Option<(Color, usize)> {
    match c.sub(idx, 1) {
        Some(5) => {
            let palette = c.sub(idx, 2)? as u8;
            Some((Color::Palette(palette), 1))
        }
        Some(2) => {
            // `38;2;R;G;B` (xterm) or `38:2::R:G:B` (colon form, colorspace
            // sub-field ignored). Try the colon form first.
            if c.group_len(idx) >= 5 {
                let r = c.sub(idx, 2).unwrap_or(0) as u8;
                let g = c.sub(idx, 3).unwrap_or(0) as u8;
                let b = c.sub(idx, 4).unwrap_or(0) as u8;
                Some((Color::Rgb(r, g, b), 1))
            } else {
                let r = c.top(idx + 1, 0) as u8;
                let g = c.top(idx + 2, 0) as u8;
                let b = c.top(idx + 3, 0) as u8;
                Some((Color::Rgb(r, g, b), 4))
            }
        }
        _ => match c.top(idx, 0) {
            5 => {
                let palette = c.top(idx + 1, 0) as u8;
                Some((Color::Palette(palette), 2))
            }
            2 => {
                let r = c.top(idx + 1, 0) as u8;
                let g = c.top(idx + 2, 0) as u8;
                let b = c.top(idx + 3, 0) as u8;
                Some((Color::Rgb(r, g, b), 4))
            }
            _ => None,
        },
    }
}

fn parse_sgr(c: &Cracked) -> Vec<SgrAttribute> {
    if c.len() == 0 || (c.len() == 1 && c.top(0, 0) == 0) {
        return vec![SgrAttribute::Reset];
    }
    let mut out = vec![];
    let mut idx = 0;
    while idx < c.len() {
        let n = c.top(idx, 0);
        match n {
            0 => out.push(SgrAttribute::Reset),
            1 => out.push(SgrAttribute::Bold),
            2 => out.push(SgrAttribute::Faint),
            3 => out.push(SgrAttribute::Italic(true)),
            4 => {
                let variant = match c.sub(idx, 1) {
                    Some(0) => None,
                    Some(2) => Some(Attr::UNDERLINE_DOUBLE),
                    Some(3) => Some(Attr::UNDERLINE_CURLY),
                    Some(4) => Some(Attr::UNDERLINE_DOTTED),
                    Some(5) => Some(Attr::UNDERLINE_DASHED),
                    _ => Some(Attr::UNDERLINE),
                };
                out.push(SgrAttribute::Underline(variant));
            }
            5 => out.push(SgrAttribute::Blink(Some(Attr::BLINK_SLOW))),
            6 => out.push(SgrAttribute::Blink(Some(Attr::BLINK_RAPID))),
            7 => out.push(SgrAttribute::Reverse(true)),
            8 => out.push(SgrAttribute::Conceal(true)),
            9 => out.push(SgrAttribute::CrossedOut(true)),
            21 => out.push(SgrAttribute::Underline(Some(Attr::UNDERLINE_DOUBLE))),
            22 => out.push(SgrAttribute::NormalIntensity),
            23 => out.push(SgrAttribute::Italic(false)),
            24 => out.push(SgrAttribute::Underline(None)),
            25 => out.push(SgrAttribute::Blink(None)),
            27 => out.push(SgrAttribute::Reverse(false)),
            28 => out.push(SgrAttribute::Conceal(false)),
            29 => out.push(SgrAttribute::CrossedOut(false)),
            51 => out.push(SgrAttribute::Framed(true)),
            52 => out.push(SgrAttribute::Encircled(true)),
            53 => out.push(SgrAttribute::Overlined(true)),
            54 => {
                out.push(SgrAttribute::Framed(false));
                out.push(SgrAttribute::Encircled(false));
            }
            55 => out.push(SgrAttribute::Overlined(false)),
            30..=37 => out.push(SgrAttribute::Foreground(Color::Palette((n - 30) as u8))),
            38 => {
                if let Some((color, consumed)) = sgr_color(c, idx) {
                    out.push(SgrAttribute::Foreground(color));
                    idx += consumed;
                    continue;
                }
            }
            39 => out.push(SgrAttribute::Foreground(Color::Default)),
            40..=47 => out.push(SgrAttribute::Background(Color::Palette((n - 40) as u8))),
            48 => {
                if let Some((color, consumed)) = sgr_color(c, idx) {
                    out.push(SgrAttribute::Background(color));
                    idx += consumed;
                    continue;
                }
            }
            49 => out.push(SgrAttribute::Background(Color::Default)),
            90..=97 => out.push(SgrAttribute::Foreground(Color::Palette((n - 90 + 8) as u8))),
            100..=107 => out.push(SgrAttribute::Background(Color::Palette((n - 100 + 8) as u8))),
            _ => {}
        }
        idx += 1;
    }
    out
}

impl Csi {
    /// `truncated` is set by the tokenizer when a CSI sequence carried more
    /// top-level or sub-parameters than a conforming parser accepts; such a
    /// sequence is a parse-reject, not a best-effort parse of whatever
    /// parameters happened to fit, so it yields no commands and the
    /// executor sees no state change beyond returning to ground.
    pub fn parse(params: &[CsiParam], truncated: bool, control: u8) -> Vec<Csi> {
        if truncated {
            return vec![];
        }
        let c = Cracked::parse(params);
        let unspecified = || Csi::Unspecified {
            params: c.all_top(),
            leader: c.leader,
            intermediate: c.intermediate,
            control,
        };

        let csi = match (c.leader, c.intermediate, control) {
            (None, None, b'A') => Csi::CursorUp(c.top(0, 1).max(1) as u32),
            (None, None, b'B') => Csi::CursorDown(c.top(0, 1).max(1) as u32),
            (None, None, b'C') => Csi::CursorForward(c.top(0, 1).max(1) as u32),
            (None, None, b'D') => Csi::CursorBack(c.top(0, 1).max(1) as u32),
            (None, None, b'H') | (None, None, b'f') => Csi::CursorPosition {
                row: c.top(0, 1).max(1) as u32,
                col: c.top(1, 1).max(1) as u32,
            },
            (None, None, b'G') => Csi::CursorColumn(c.top(0, 1).max(1) as u32),
            (None, None, b'd') => Csi::CursorLine(c.top(0, 1).max(1) as u32),
            (None, None, b'E') => Csi::CursorNextLine(c.top(0, 1).max(1) as u32),
            (None, None, b'F') => Csi::CursorPrecedingLine(c.top(0, 1).max(1) as u32),
            (None, None, b'J') => Csi::EraseDisplay(erase_mode(c.top(0, 0))),
            (None, None, b'K') => Csi::EraseLine(erase_mode(c.top(0, 0))),
            (None, None, b'L') => Csi::InsertLines(c.top(0, 1).max(1) as u32),
            (None, None, b'M') => Csi::DeleteLines(c.top(0, 1).max(1) as u32),
            (None, None, b'P') => Csi::DeleteCharacters(c.top(0, 1).max(1) as u32),
            (None, None, b'@') => Csi::InsertCharacters(c.top(0, 1).max(1) as u32),
            (None, None, b'X') => Csi::EraseCharacters(c.top(0, 1).max(1) as u32),
            (None, None, b'S') => Csi::ScrollUp(c.top(0, 1).max(1) as u32),
            (None, None, b'T') => Csi::ScrollDown(c.top(0, 1).max(1) as u32),
            (None, None, b'm') => Csi::Sgr(parse_sgr(&c)),
            (None, None, b'r') => Csi::SetScrollRegion {
                top: c.top(0, 1).max(1) as u32,
                bottom: c.top(1, 0) as u32,
            },
            (Some(b'?'), None, b'h') => Csi::DecSet(c.all_top().into_iter().map(|n| n as u16).collect()),
            (Some(b'?'), None, b'l') => Csi::DecReset(c.all_top().into_iter().map(|n| n as u16).collect()),
            (None, None, b'h') => Csi::SetMode(c.all_top().into_iter().map(|n| n as u16).collect()),
            (None, None, b'l') => Csi::ResetMode(c.all_top().into_iter().map(|n| n as u16).collect()),
            (None, Some(b' '), b'q') => Csi::CursorStyle(CursorStyle::from_param(c.top(0, 0))),
            (None, None, b'c') => Csi::RequestPrimaryDeviceAttributes,
            (Some(b'>'), None, b'c') => Csi::RequestSecondaryDeviceAttributes,
            (None, None, b'n') => Csi::DeviceStatusReport(c.top(0, 0) as u16),
            (Some(b'?'), Some(b'$'), b'p') => Csi::RequestMode {
                private: true,
                mode: c.top(0, 0) as u16,
            },
            (None, Some(b'$'), b'p') => Csi::RequestMode {
                private: false,
                mode: c.top(0, 0) as u16,
            },
            (None, None, b'b') => Csi::RepeatLastCharacter(c.top(0, 1).max(1) as u32),
            (None, None, b't') => Csi::WindowOp(c.all_top()),
            _ => unspecified(),
        };
        vec![csi]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use vtparse::VTParser;

    fn parse_one(input: &[u8]) -> Csi {
        struct Collector(Vec<Csi>);
        impl vtparse::VTActor for Collector {
            fn print(&mut self, _b: char) {}
            fn execute_c0_or_c1(&mut self, _b: u8) {}
            fn dcs_hook(&mut self, _b: u8, _p: &[i64], _i: &[u8], _t: bool) {}
            fn dcs_put(&mut self, _b: u8) {}
            fn dcs_unhook(&mut self) {}
            fn esc_dispatch(&mut self, _p: &[i64], _i: &[u8], _t: bool, _b: u8) {}
            fn csi_dispatch(&mut self, params: &[CsiParam], truncated: bool, byte: u8) {
                self.0.extend(Csi::parse(params, truncated, byte));
            }
            fn osc_dispatch(&mut self, _p: &[&[u8]]) {}
            fn apc_dispatch(&mut self, _d: Vec<u8>) {}
        }
        let mut parser = VTParser::new();
        let mut collector = Collector(vec![]);
        parser.parse(input, &mut collector);
        collector.0.remove(0)
    }

    #[test]
    fn cursor_up_default() {
        assert_eq!(parse_one(b"\x1b[A"), Csi::CursorUp(1));
    }

    #[test]
    fn cursor_position_two_params() {
        assert_eq!(
            parse_one(b"\x1b[5;10H"),
            Csi::CursorPosition { row: 5, col: 10 }
        );
    }

    #[test]
    fn sgr_reset_on_no_params() {
        assert_eq!(parse_one(b"\x1b[m"), Csi::Sgr(vec![SgrAttribute::Reset]));
    }

    #[test]
    fn sgr_bold_and_palette_fg() {
        assert_eq!(
            parse_one(b"\x1b[1;32m"),
            Csi::Sgr(vec![
                SgrAttribute::Bold,
                SgrAttribute::Foreground(Color::Palette(2))
            ])
        );
    }

    #[test]
    fn sgr_truecolor_fg() {
        assert_eq!(
            parse_one(b"\x1b[38;2;10;20;30m"),
            Csi::Sgr(vec![SgrAttribute::Foreground(Color::Rgb(10, 20, 30))])
        );
    }

    #[test]
    fn curly_underline_colon_form() {
        assert_eq!(
            parse_one(b"\x1b[4:3m"),
            Csi::Sgr(vec![SgrAttribute::Underline(Some(Attr::UNDERLINE_CURLY))])
        );
    }

    #[test]
    fn decset_alternate_screen() {
        assert_eq!(parse_one(b"\x1b[?1049h"), Csi::DecSet(vec![1049]));
    }

    #[test]
    fn unknown_final_is_unspecified_not_fatal() {
        match parse_one(b"\x1b[5z") {
            Csi::Unspecified { control, .. } => assert_eq!(control, b'z'),
            other => panic!("expected Unspecified, got {:?}", other),
        }
    }

    #[test]
    fn truncated_csi_yields_no_commands() {
        assert_eq!(Csi::parse(&[], true, b'm'), Vec::<Csi>::new());
    }

    #[test]
    fn csi_with_too_many_params_is_rejected() {
        let too_many: String = (0..20).map(|_| "1;").collect();
        let input = format!("\x1b[{}m", too_many);

        struct Collector(Vec<Csi>);
        impl vtparse::VTActor for Collector {
            fn print(&mut self, _b: char) {}
            fn execute_c0_or_c1(&mut self, _b: u8) {}
            fn dcs_hook(&mut self, _b: u8, _p: &[i64], _i: &[u8], _t: bool) {}
            fn dcs_put(&mut self, _b: u8) {}
            fn dcs_unhook(&mut self) {}
            fn esc_dispatch(&mut self, _p: &[i64], _i: &[u8], _t: bool, _b: u8) {}
            fn csi_dispatch(&mut self, params: &[CsiParam], truncated: bool, byte: u8) {
                self.0.extend(Csi::parse(params, truncated, byte));
            }
            fn osc_dispatch(&mut self, _p: &[&[u8]]) {}
            fn apc_dispatch(&mut self, _d: Vec<u8>) {}
        }
        let mut parser = VTParser::new();
        let mut collector = Collector(vec![]);
        parser.parse(input.as_bytes(), &mut collector);
        assert_eq!(collector.0, Vec::<Csi>::new());
    }
}
