//! Byte-stream FSM executor: owns the primary and alternate [`Screen`]s,
//! terminal-mode options and the host-bound reply buffer.
//!
//! Grounded on `examples/wez-wezterm/term/src/terminalstate/performer.rs`'s
//! `Performer` (one big `Action` dispatch translating `termwiz::escape`
//! types into `TerminalState` mutations) and
//! `examples/wez-wezterm/term/src/terminalstate/mod.rs`'s mode-flag fields,
//! rewired onto `loomterm_wire::escape::Action` and this crate's `Screen`.

use crate::screen::Screen;
use loomterm_wire::cell::{Attr, Cell, CellStyle};
use loomterm_wire::color::Color;
use loomterm_wire::escape::csi::{dec_mode, Csi, CursorStyle, EraseMode, SgrAttribute};
use loomterm_wire::escape::{Action, Charset, CharsetSlot, ControlCode, Esc};
use loomterm_wire::escape::{DeviceControl, OperatingSystemCommand, Parser};
use loomterm_wire::hyperlink::{HyperlinkHandle, HyperlinkInterner};
use loomterm_wire::text::Codepoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveScreen {
    Primary,
    Alternate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseMode {
    Off,
    X10,
    Normal,
    ButtonEvent,
    AnyEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseCoordinate {
    Normal,
    Utf8,
    Sgr,
    Urxvt,
    SgrPixels,
}

/// Terminal-mode flags toggled by DECSET/DECRST and SM/RM.
#[derive(Debug, Clone)]
pub struct VteOptions {
    pub application_cursor_keys: bool,
    pub application_keypad: bool,
    pub origin: bool,
    pub auto_wrap: bool,
    pub blinking_cursor: bool,
    pub cursor_visible: bool,
    pub mouse_mode: MouseMode,
    pub mouse_coordinate: MouseCoordinate,
    pub focus_reporting: bool,
    pub alternate_scroll: bool,
    pub bracketed_paste: bool,
    pub synchronized_output: bool,
    pub cursor_style: CursorStyle,
    /// ANSI mode 20 (LNM): when set, a bare line feed also returns the
    /// cursor to column 0.
    pub line_feed_new_line: bool,
}

impl Default for VteOptions {
    fn default() -> Self {
        VteOptions {
            application_cursor_keys: false,
            application_keypad: false,
            origin: false,
            auto_wrap: true,
            blinking_cursor: false,
            cursor_visible: true,
            mouse_mode: MouseMode::Off,
            mouse_coordinate: MouseCoordinate::Normal,
            focus_reporting: false,
            alternate_scroll: false,
            bracketed_paste: false,
            synchronized_output: false,
            cursor_style: CursorStyle::Default,
            line_feed_new_line: false,
        }
    }
}

/// DEC Special Graphics (VT100 line-drawing) translation for the byte
/// range designated by `ESC ( 0` / `ESC ) 0`, grounded on
/// `examples/wez-wezterm/term/src/terminalstate/performer.rs`'s
/// `flush_print` table.
fn dec_special_graphics(c: char) -> char {
    match c {
        '`' => '◆',
        'a' => '▒',
        'b' => '␉',
        'c' => '␌',
        'd' => '␍',
        'e' => '␊',
        'f' => '°',
        'g' => '±',
        'h' => '␤',
        'i' => '␋',
        'j' => '┘',
        'k' => '┐',
        'l' => '┌',
        'm' => '└',
        'n' => '┼',
        'o' => '⎺',
        'p' => '⎻',
        'q' => '─',
        'r' => '⎼',
        's' => '⎽',
        't' => '├',
        'u' => '┤',
        'v' => '┴',
        'w' => '┬',
        'x' => '│',
        'y' => '≤',
        'z' => '≥',
        '{' => 'π',
        '|' => '≠',
        '}' => '£',
        '~' => '·',
        other => other,
    }
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

/// Renders a `CellStyle` back into `CSI ... m` parameters, for DECRQSS
/// `$qm` replies.
fn encode_sgr_reply(brush: CellStyle) -> String {
    let mut parts = vec!["0".to_string()];
    if brush.attr.contains(Attr::BOLD) {
        parts.push("1".into());
    }
    if brush.attr.contains(Attr::FAINT) {
        parts.push("2".into());
    }
    if brush.attr.contains(Attr::ITALIC) {
        parts.push("3".into());
    }
    if brush.attr.intersects(Attr::UNDERLINE_ANY) {
        parts.push("4".into());
    }
    if brush.attr.contains(Attr::BLINK_SLOW) {
        parts.push("5".into());
    }
    if brush.attr.contains(Attr::BLINK_RAPID) {
        parts.push("6".into());
    }
    if brush.attr.contains(Attr::REVERSE) {
        parts.push("7".into());
    }
    if brush.attr.contains(Attr::CONCEAL) {
        parts.push("8".into());
    }
    if brush.attr.contains(Attr::CROSSED_OUT) {
        parts.push("9".into());
    }
    push_color(&mut parts, brush.fg, 30, 90, 38);
    push_color(&mut parts, brush.bg, 40, 100, 48);
    parts.join(";")
}

fn push_color(parts: &mut Vec<String>, color: Color, base: u16, bright_base: u16, extended: u16) {
    match color {
        Color::Default => {}
        Color::Palette(n) if n < 8 => parts.push((base + n as u16).to_string()),
        Color::Palette(n) if n < 16 => parts.push((bright_base + n as u16 - 8).to_string()),
        Color::Palette(n) => {
            parts.push(extended.to_string());
            parts.push("5".into());
            parts.push(n.to_string());
        }
        Color::Rgb(r, g, b) => {
            parts.push(extended.to_string());
            parts.push("2".into());
            parts.push(r.to_string());
            parts.push(g.to_string());
            parts.push(b.to_string());
        }
    }
}

/// Owns the parser, both screens and pending host-bound replies for one
/// window's pseudo-terminal session.
pub struct Vte {
    primary: Screen,
    alternate: Screen,
    active: ActiveScreen,
    parser: Parser,
    pub options: VteOptions,
    pending_input: Vec<u8>,
    hyperlinks: HyperlinkInterner,
    current_hyperlink: Option<HyperlinkHandle>,
    g0: Charset,
    g1: Charset,
    shift_out: bool,
    last_glyph: Option<char>,
    pub title: String,
    pub icon_name: String,
}

impl Vte {
    pub fn new(w: usize, h: usize, scrollback_max: usize) -> Vte {
        Vte {
            primary: Screen::new(w, h, scrollback_max),
            alternate: Screen::new(w, h, 0),
            active: ActiveScreen::Primary,
            parser: Parser::new(),
            options: VteOptions::default(),
            pending_input: vec![],
            hyperlinks: HyperlinkInterner::new(),
            current_hyperlink: None,
            g0: Charset::Ascii,
            g1: Charset::Ascii,
            shift_out: false,
            last_glyph: None,
            title: String::new(),
            icon_name: String::new(),
        }
    }

    pub fn screen(&self) -> &Screen {
        match self.active {
            ActiveScreen::Primary => &self.primary,
            ActiveScreen::Alternate => &self.alternate,
        }
    }

    fn screen_mut(&mut self) -> &mut Screen {
        match self.active {
            ActiveScreen::Primary => &mut self.primary,
            ActiveScreen::Alternate => &mut self.alternate,
        }
    }

    pub fn is_alternate_screen(&self) -> bool {
        self.active == ActiveScreen::Alternate
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.primary.resize(w, h, self.options.auto_wrap);
        self.alternate.resize(w, h, self.options.auto_wrap);
    }

    /// Drains and returns bytes queued for the host program (query replies,
    /// focus events); the I/O loop collaborator owns writing them to the
    /// PTY.
    pub fn drain_pending_input(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.pending_input)
    }

    fn push_reply(&mut self, bytes: &[u8]) {
        self.pending_input.extend_from_slice(bytes);
    }

    pub fn notify_focus(&mut self, focused: bool) {
        if self.options.focus_reporting {
            self.push_reply(if focused { b"\x1b[I" } else { b"\x1b[O" });
        }
    }

    pub fn process(&mut self, bytes: &[u8]) {
        let mut actions = Vec::new();
        self.parser.parse(bytes, |action| actions.push(action));
        for action in actions {
            self.dispatch(action);
        }
    }

    fn active_charset(&self) -> Charset {
        if self.shift_out {
            self.g1
        } else {
            self.g0
        }
    }

    fn translate(&self, c: char) -> char {
        if self.active_charset() == Charset::DecLineDrawing {
            dec_special_graphics(c)
        } else {
            c
        }
    }

    fn dispatch(&mut self, action: Action) {
        match action {
            Action::Print(c) => self.print(c),
            Action::Control(code) => self.dispatch_control(code),
            Action::Esc(esc) => self.dispatch_esc(esc),
            Action::Csi(csi) => self.dispatch_csi(csi),
            Action::OperatingSystemCommand(osc) => self.dispatch_osc(*osc),
            Action::DeviceControl(dcs) => self.dispatch_dcs(*dcs),
            Action::ApcData(data) => {
                if data.first() == Some(&b'G') {
                    log::debug!("TODO: kitty graphics APC ({} bytes) discarded", data.len());
                } else {
                    log::trace!("discarding {} bytes of unrecognised APC data", data.len());
                }
            }
        }
    }

    fn print(&mut self, c: char) {
        let c = self.translate(c);
        self.last_glyph = Some(c);
        let cell = Cell {
            cp: Codepoint::new(c),
            style: self.screen().cursor.brush,
            link: self.current_hyperlink.clone(),
        };
        let wrap = self.options.auto_wrap;
        self.screen_mut().insert(cell, wrap);
    }

    fn dispatch_control(&mut self, code: ControlCode) {
        match code {
            ControlCode::Null | ControlCode::Enquiry | ControlCode::Delete => {}
            ControlCode::Bell => log::trace!("bell"),
            ControlCode::Backspace => self.screen_mut().move_cursor_relative(-1, 0),
            ControlCode::Tab => self.advance_tab_stop(),
            ControlCode::LineFeed | ControlCode::VerticalTab | ControlCode::FormFeed => {
                let carriage = self.options.line_feed_new_line;
                self.screen_mut().newline(carriage);
            }
            ControlCode::CarriageReturn => {
                let s = self.screen_mut();
                s.cursor.column = 0;
                s.cursor.wrap_pending = false;
            }
            ControlCode::ShiftOut => self.shift_out = true,
            ControlCode::ShiftIn => self.shift_out = false,
        }
    }

    fn advance_tab_stop(&mut self) {
        let s = self.screen_mut();
        let next = ((s.cursor.column / 8) + 1) * 8;
        s.cursor.column = next.min(s.w - 1);
        s.cursor.wrap_pending = false;
    }

    fn dispatch_esc(&mut self, esc: Esc) {
        match esc {
            Esc::SaveCursor => self.screen_mut().save_cursor(),
            Esc::RestoreCursor => self.screen_mut().restore_cursor(),
            Esc::FullReset => self.full_reset(),
            Esc::ApplicationKeypad(on) => self.options.application_keypad = on,
            Esc::Index => self.screen_mut().move_or_scroll_down(),
            Esc::ReverseIndex => self.screen_mut().move_or_scroll_up(),
            Esc::NextLine => self.screen_mut().newline(true),
            Esc::DesignateCharset(slot, set) => match slot {
                CharsetSlot::G0 => self.g0 = set,
                CharsetSlot::G1 => self.g1 = set,
            },
        }
    }

    fn full_reset(&mut self) {
        let (w, h) = (self.primary.w, self.primary.h);
        let scrollback = self.primary.scroll.max;
        self.primary = Screen::new(w, h, scrollback);
        self.alternate = Screen::new(w, h, 0);
        self.active = ActiveScreen::Primary;
        self.options = VteOptions::default();
        self.g0 = Charset::Ascii;
        self.g1 = Charset::Ascii;
        self.shift_out = false;
        self.current_hyperlink = None;
        self.last_glyph = None;
    }

    fn dispatch_csi(&mut self, csi: Csi) {
        match csi {
            Csi::CursorUp(n) => self.screen_mut().move_cursor_relative(0, -(n as i64)),
            Csi::CursorDown(n) => self.screen_mut().move_cursor_relative(0, n as i64),
            Csi::CursorForward(n) => self.screen_mut().move_cursor_relative(n as i64, 0),
            Csi::CursorBack(n) => self.screen_mut().move_cursor_relative(-(n as i64), 0),
            Csi::CursorPosition { row, col } => {
                self.screen_mut().set_cursor(col as usize - 1, row as usize - 1)
            }
            Csi::CursorColumn(n) => {
                let s = self.screen_mut();
                s.cursor.column = (n as usize - 1).min(s.w - 1);
                s.cursor.wrap_pending = false;
            }
            Csi::CursorLine(n) => {
                let s = self.screen_mut();
                let row = if s.cursor.origin {
                    (n as usize - 1) + s.margins.top
                } else {
                    n as usize - 1
                };
                s.cursor.line = row.min(s.h - 1);
                s.cursor.wrap_pending = false;
            }
            Csi::CursorNextLine(n) => {
                for _ in 0..n {
                    self.screen_mut().move_or_scroll_down();
                }
                self.screen_mut().cursor.column = 0;
            }
            Csi::CursorPrecedingLine(n) => {
                for _ in 0..n {
                    self.screen_mut().move_or_scroll_up();
                }
                self.screen_mut().cursor.column = 0;
            }
            Csi::EraseDisplay(mode) => self.erase_display(mode),
            Csi::EraseLine(mode) => self.erase_line(mode),
            Csi::InsertLines(n) => self.screen_mut().insert_lines(n as usize),
            Csi::DeleteLines(n) => self.screen_mut().delete_lines(n as usize),
            Csi::DeleteCharacters(n) => self.screen_mut().shift_from_cursor(n as usize),
            Csi::InsertCharacters(n) => self.screen_mut().insert_blanks(n as usize),
            Csi::EraseCharacters(n) => self.erase_characters(n as usize),
            Csi::ScrollUp(n) => {
                let (top, bottom) = (self.screen().margins.top, self.screen().margins.bottom);
                self.screen_mut().shuffle_rows_up(n as usize, top, bottom);
            }
            Csi::ScrollDown(n) => {
                let (top, bottom) = (self.screen().margins.top, self.screen().margins.bottom);
                self.screen_mut().shuffle_rows_down(n as usize, top, bottom);
            }
            Csi::Sgr(attrs) => self.apply_sgr(attrs),
            Csi::SetScrollRegion { top, bottom } => {
                let bottom = if bottom == 0 { self.screen().h as u32 } else { bottom };
                self.screen_mut().set_scroll_region(
                    (top as usize).saturating_sub(1),
                    (bottom as usize).saturating_sub(1),
                );
            }
            Csi::DecSet(modes) => {
                for m in modes {
                    self.set_dec_mode(m, true);
                }
            }
            Csi::DecReset(modes) => {
                for m in modes {
                    self.set_dec_mode(m, false);
                }
            }
            Csi::SetMode(modes) => {
                for m in modes {
                    self.set_ansi_mode(m, true);
                }
            }
            Csi::ResetMode(modes) => {
                for m in modes {
                    self.set_ansi_mode(m, false);
                }
            }
            Csi::CursorStyle(style) => self.options.cursor_style = style,
            Csi::RequestPrimaryDeviceAttributes => self.push_reply(b"\x1b[?6c"),
            Csi::RequestSecondaryDeviceAttributes => self.push_reply(b"\x1b[>1;10;0c"),
            Csi::DeviceStatusReport(n) => self.device_status_report(n),
            Csi::RequestMode { private, mode } => {
                let resp = self.query_mode_state(private, mode);
                let lead = if private { "?" } else { "" };
                self.push_reply(format!("\x1b[{}{};{}$y", lead, mode, resp).as_bytes());
            }
            Csi::RepeatLastCharacter(n) => self.repeat_last_character(n as usize),
            Csi::WindowOp(params) => {
                log::trace!("window operation {:?} acknowledged as omitted", params);
            }
            Csi::Unspecified { control, .. } => {
                log::debug!("TODO: unhandled CSI final byte {:?}", control as char);
            }
        }
    }

    fn erase_display(&mut self, mode: EraseMode) {
        let s = self.screen_mut();
        let (w, h) = (s.w, s.h);
        let (cl, cc) = (s.cursor.line, s.cursor.column);
        match mode {
            EraseMode::ToEnd => s.erase_between((cl, cc), (h - 1, w - 1)),
            EraseMode::ToStart => s.erase_between((0, 0), (cl, cc)),
            EraseMode::All => s.erase_between((0, 0), (h - 1, w - 1)),
            EraseMode::Scrollback => log::debug!("TODO: ED mode 3 (erase scrollback) is a no-op"),
        }
    }

    fn erase_line(&mut self, mode: EraseMode) {
        let s = self.screen_mut();
        let w = s.w;
        let (cl, cc) = (s.cursor.line, s.cursor.column);
        match mode {
            EraseMode::ToEnd => s.erase_between((cl, cc), (cl, w - 1)),
            EraseMode::ToStart => s.erase_between((cl, 0), (cl, cc)),
            EraseMode::All | EraseMode::Scrollback => s.erase_between((cl, 0), (cl, w - 1)),
        }
    }

    fn erase_characters(&mut self, n: usize) {
        let s = self.screen_mut();
        let cl = s.cursor.line;
        let cc = s.cursor.column;
        let end = (cc + n.max(1) - 1).min(s.w - 1);
        s.erase_between((cl, cc), (cl, end));
    }

    fn repeat_last_character(&mut self, n: usize) {
        let Some(c) = self.last_glyph else { return };
        for _ in 0..n {
            let cell = Cell {
                cp: Codepoint::new(c),
                style: self.screen().cursor.brush,
                link: self.current_hyperlink.clone(),
            };
            let wrap = self.options.auto_wrap;
            self.screen_mut().insert(cell, wrap);
        }
    }

    fn apply_sgr(&mut self, attrs: Vec<SgrAttribute>) {
        let brush = &mut self.screen_mut().cursor.brush;
        for attr in attrs {
            match attr {
                SgrAttribute::Reset => *brush = CellStyle::default(),
                SgrAttribute::Bold => brush.attr.insert(Attr::BOLD),
                SgrAttribute::Faint => brush.attr.insert(Attr::FAINT),
                SgrAttribute::NormalIntensity => brush.attr.remove(Attr::BOLD | Attr::FAINT),
                SgrAttribute::Italic(on) => brush.attr.set(Attr::ITALIC, on),
                SgrAttribute::Underline(variant) => match variant {
                    Some(v) => brush.set_underline(v),
                    None => brush.attr.remove(Attr::UNDERLINE_ANY),
                },
                SgrAttribute::Blink(variant) => {
                    brush.attr.remove(Attr::BLINK_ANY);
                    if let Some(v) = variant {
                        brush.attr.insert(v);
                    }
                }
                SgrAttribute::Reverse(on) => brush.attr.set(Attr::REVERSE, on),
                SgrAttribute::Conceal(on) => brush.attr.set(Attr::CONCEAL, on),
                SgrAttribute::CrossedOut(on) => brush.attr.set(Attr::CROSSED_OUT, on),
                SgrAttribute::Framed(on) => brush.attr.set(Attr::FRAMED, on),
                SgrAttribute::Encircled(on) => brush.attr.set(Attr::ENCIRCLED, on),
                SgrAttribute::Overlined(on) => brush.attr.set(Attr::OVERLINED, on),
                SgrAttribute::Foreground(c) => brush.fg = c,
                SgrAttribute::Background(c) => brush.bg = c,
            }
        }
    }

    fn set_dec_mode(&mut self, mode: u16, enabled: bool) {
        match mode {
            dec_mode::APPLICATION_CURSOR_KEYS => self.options.application_cursor_keys = enabled,
            dec_mode::ORIGIN => {
                self.options.origin = enabled;
                self.screen_mut().cursor.origin = enabled;
                self.screen_mut().set_cursor(0, 0);
            }
            dec_mode::AUTO_WRAP => self.options.auto_wrap = enabled,
            dec_mode::MOUSE_X10 => {
                self.options.mouse_mode = if enabled { MouseMode::X10 } else { MouseMode::Off }
            }
            dec_mode::BLINKING_CURSOR => self.options.blinking_cursor = enabled,
            dec_mode::SHOW_CURSOR => self.options.cursor_visible = enabled,
            dec_mode::MOUSE_NORMAL => {
                self.options.mouse_mode = if enabled { MouseMode::Normal } else { MouseMode::Off }
            }
            dec_mode::MOUSE_BUTTON_EVENT => {
                self.options.mouse_mode =
                    if enabled { MouseMode::ButtonEvent } else { MouseMode::Off }
            }
            dec_mode::MOUSE_ANY_EVENT => {
                self.options.mouse_mode =
                    if enabled { MouseMode::AnyEvent } else { MouseMode::Off }
            }
            dec_mode::FOCUS_REPORTING => self.options.focus_reporting = enabled,
            dec_mode::MOUSE_UTF8 => {
                self.options.mouse_coordinate =
                    if enabled { MouseCoordinate::Utf8 } else { MouseCoordinate::Normal }
            }
            dec_mode::MOUSE_SGR => {
                self.options.mouse_coordinate =
                    if enabled { MouseCoordinate::Sgr } else { MouseCoordinate::Normal }
            }
            dec_mode::ALTERNATE_SCROLL => self.options.alternate_scroll = enabled,
            dec_mode::MOUSE_URXVT => {
                self.options.mouse_coordinate =
                    if enabled { MouseCoordinate::Urxvt } else { MouseCoordinate::Normal }
            }
            dec_mode::MOUSE_SGR_PIXELS => {
                self.options.mouse_coordinate =
                    if enabled { MouseCoordinate::SgrPixels } else { MouseCoordinate::Normal }
            }
            dec_mode::ALTERNATE_SCREEN => self.set_alternate_screen(enabled),
            dec_mode::BRACKETED_PASTE => self.options.bracketed_paste = enabled,
            dec_mode::SYNCHRONIZED_OUTPUT => self.options.synchronized_output = enabled,
            _ => log::debug!("TODO: unrecognised DEC private mode {}", mode),
        }
    }

    /// SM/RM: only ANSI mode 20 (LNM) is honoured; others are logged and ignored.
    fn set_ansi_mode(&mut self, mode: u16, enabled: bool) {
        match mode {
            20 => self.options.line_feed_new_line = enabled,
            _ => log::debug!("TODO: unrecognised ANSI mode {}", mode),
        }
    }

    fn set_alternate_screen(&mut self, enabled: bool) {
        match (enabled, self.active) {
            (true, ActiveScreen::Primary) => {
                let (w, h) = (self.primary.w, self.primary.h);
                self.alternate = Screen::new(w, h, 0);
                self.active = ActiveScreen::Alternate;
            }
            (false, ActiveScreen::Alternate) => {
                self.active = ActiveScreen::Primary;
            }
            _ => {}
        }
    }

    fn device_status_report(&mut self, n: u16) {
        match n {
            5 => self.push_reply(b"\x1b[0n"),
            6 => {
                let s = self.screen();
                let row = if s.cursor.origin { s.cursor.line - s.margins.top } else { s.cursor.line } + 1;
                let col = s.cursor.column + 1;
                self.push_reply(format!("\x1b[{};{}R", row, col).as_bytes());
            }
            _ => log::debug!("TODO: unrecognised DSR request {}", n),
        }
    }

    fn query_mode_state(&self, private: bool, mode: u16) -> u8 {
        let enabled = if private {
            match mode {
                dec_mode::APPLICATION_CURSOR_KEYS => Some(self.options.application_cursor_keys),
                dec_mode::ORIGIN => Some(self.options.origin),
                dec_mode::AUTO_WRAP => Some(self.options.auto_wrap),
                dec_mode::SHOW_CURSOR => Some(self.options.cursor_visible),
                dec_mode::ALTERNATE_SCREEN => Some(self.active == ActiveScreen::Alternate),
                dec_mode::BRACKETED_PASTE => Some(self.options.bracketed_paste),
                dec_mode::FOCUS_REPORTING => Some(self.options.focus_reporting),
                dec_mode::SYNCHRONIZED_OUTPUT => Some(self.options.synchronized_output),
                _ => None,
            }
        } else {
            match mode {
                20 => Some(self.options.line_feed_new_line),
                _ => None,
            }
        };
        match enabled {
            Some(true) => 1,
            Some(false) => 2,
            None => 0,
        }
    }

    fn dispatch_osc(&mut self, osc: OperatingSystemCommand) {
        match osc {
            OperatingSystemCommand::SetIconNameAndTitle(s) => {
                self.icon_name = s.clone();
                self.title = s;
            }
            OperatingSystemCommand::SetTitle(s) => self.title = s,
            OperatingSystemCommand::SetIconName(s) => self.icon_name = s,
            OperatingSystemCommand::SetHyperlink(link) => {
                self.current_hyperlink = link.map(|l| self.hyperlinks.intern(l));
            }
            OperatingSystemCommand::SetForegroundColor(_)
            | OperatingSystemCommand::SetBackgroundColor(_)
            | OperatingSystemCommand::SetCursorColor(_) => {
                // Theme colors are a renderer input, not VTE state; a
                // running program overriding them locally has no
                // counterpart in this core's data model and is
                // intentionally a no-op.
            }
            OperatingSystemCommand::Unknown { ps, .. } => {
                log::debug!("TODO: unhandled OSC {}", ps);
            }
        }
    }

    fn dispatch_dcs(&mut self, dcs: DeviceControl) {
        match dcs {
            DeviceControl::RequestStatusString(payload) => self.dispatch_decrqss(&payload),
            DeviceControl::Unknown { params, intermediates, byte, .. } => {
                log::debug!(
                    "TODO: unhandled DCS params={:?} intermediates={:?} final={:?}",
                    params,
                    intermediates,
                    byte as char
                );
                self.push_reply(b"\x1bP0$r\x1b\\");
            }
        }
    }

    fn dispatch_decrqss(&mut self, payload: &[u8]) {
        match payload {
            b"m" => {
                let sgr = encode_sgr_reply(self.screen().cursor.brush);
                self.push_reply(format!("\x1bP1$r{}m\x1b\\", sgr).as_bytes());
            }
            b"r" => {
                let (top, bottom) = (self.screen().margins.top + 1, self.screen().margins.bottom + 1);
                self.push_reply(format!("\x1bP1$r{};{}r\x1b\\", top, bottom).as_bytes());
            }
            b" q" => {
                let n = cursor_style_param(self.options.cursor_style);
                self.push_reply(format!("\x1bP1$r{} q\x1b\\", n).as_bytes());
            }
            _ => self.push_reply(b"\x1bP0$r\x1b\\"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn row_text(vte: &Vte, row: usize) -> String {
        vte.screen().line_ref(row).cells.iter().map(|c| c.cp.value).collect()
    }

    #[test]
    fn s1_wrap_around_through_process() {
        let mut vte = Vte::new(8, 5, 0);
        vte.process(b"abcdefghijk");
        assert_eq!(row_text(&vte, 0), "abcdefgh");
        assert_eq!(row_text(&vte, 1), "ijk     ");
    }

    #[test]
    fn s2_cursor_extremes() {
        let mut vte = Vte::new(8, 5, 0);
        vte.process(b"\x1b[123A\x1b[123D\x1b[1C\x1b[1B12\x1b[99C\x1b[99B\x1b[1A\x1b[1D3");
        assert_eq!(row_text(&vte, 1).trim_end(), "12".to_string() + &" ".repeat(0));
        assert_eq!(&row_text(&vte, 1)[1..3], "12");
        assert_eq!(&row_text(&vte, 3)[6..7], "3");
    }

    #[test]
    fn s6_sgr_diffing_produces_three_distinct_styles() {
        let mut vte = Vte::new(8, 5, 0);
        vte.process(b"\x1b[31mA\x1b[44mB\x1b[39;49mC");
        let line = vte.screen().line_ref(0);
        assert_ne!(line.cells[0].style, line.cells[1].style);
        assert_ne!(line.cells[1].style, line.cells[2].style);
        assert_eq!(line.cells[2].style, CellStyle::default());
    }

    #[test]
    fn alternate_screen_round_trip_does_not_touch_primary_content() {
        let mut vte = Vte::new(8, 5, 10);
        vte.process(b"primary");
        vte.process(b"\x1b[?1049h");
        assert!(vte.is_alternate_screen());
        vte.process(b"alt");
        vte.process(b"\x1b[?1049l");
        assert!(!vte.is_alternate_screen());
        assert_eq!(row_text(&vte, 0), "primary ");
    }

    #[test]
    fn decrqss_cursor_style_round_trips_through_process() {
        let mut vte = Vte::new(8, 5, 0);
        vte.process(b"\x1b[3 q");
        vte.process(b"\x1bP$q q\x1b\\");
        let reply = vte.drain_pending_input();
        assert_eq!(reply, b"\x1bP1$r3 q\x1b\\".to_vec());
    }

    #[test]
    fn device_status_report_cursor_position() {
        let mut vte = Vte::new(8, 5, 0);
        vte.process(b"\x1b[3;4H\x1b[6n");
        assert_eq!(vte.drain_pending_input(), b"\x1b[3;4R".to_vec());
    }
}
