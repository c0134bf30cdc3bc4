//! Streaming byte-to-`Action` parser.
//!
//! Grounded on `examples/wez-wezterm/termwiz/src/escape/parser/mod.rs`'s
//! `Parser`/`Performer` split: a thin `VTActor` implementation that turns
//! each vtparse callback into an `Action` and hands it to a caller-supplied
//! closure. Trimmed of wezterm's sixel/tmux-passthrough/XtGetTcap DCS
//! branches, which this core's device-control handling has no use for.

use super::dcs::{self, DeviceControl};
use super::{Action, ControlCode, Csi, Esc, OperatingSystemCommand};
use vtparse::{CsiParam, VTActor, VTParser};

pub struct Parser {
    machine: VTParser,
    dcs_builder: Option<dcs::Builder>,
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            machine: VTParser::new(),
            dcs_builder: None,
        }
    }

    pub fn parse<F: FnMut(Action)>(&mut self, bytes: &[u8], mut callback: F) {
        let mut performer = Performer {
            callback: &mut callback,
            dcs_builder: &mut self.dcs_builder,
        };
        self.machine.parse(bytes, &mut performer);
    }

    pub fn parse_as_vec(&mut self, bytes: &[u8]) -> Vec<Action> {
        let mut actions = vec![];
        self.parse(bytes, |a| actions.push(a));
        actions
    }
}

struct Performer<'a, F: FnMut(Action)> {
    callback: &'a mut F,
    dcs_builder: &'a mut Option<dcs::Builder>,
}

impl<'a, F: FnMut(Action)> VTActor for Performer<'a, F> {
    fn print(&mut self, c: char) {
        (self.callback)(Action::Print(c));
    }

    fn execute_c0_or_c1(&mut self, byte: u8) {
        if let Some(code) = ControlCode::from_u8(byte) {
            (self.callback)(Action::Control(code));
        } else {
            log::trace!("dropping unrecognised control code 0x{:02x}", byte);
        }
    }

    fn dcs_hook(&mut self, byte: u8, params: &[i64], intermediates: &[u8], _truncated: bool) {
        *self.dcs_builder = Some(dcs::Builder::new(params, intermediates, byte));
    }

    fn dcs_put(&mut self, byte: u8) {
        if let Some(builder) = self.dcs_builder.as_mut() {
            builder.put(byte);
        }
    }

    fn dcs_unhook(&mut self) {
        if let Some(builder) = self.dcs_builder.take() {
            let dc: DeviceControl = builder.finish();
            (self.callback)(Action::DeviceControl(Box::new(dc)));
        }
    }

    fn esc_dispatch(&mut self, _params: &[i64], intermediates: &[u8], _truncated: bool, byte: u8) {
        let intermediate = intermediates.first().copied();
        if let Some(esc) = Esc::parse(intermediate, byte) {
            (self.callback)(Action::Esc(esc));
        } else {
            log::trace!(
                "dropping unrecognised escape sequence intermediate={:?} final={:?}",
                intermediate,
                byte as char
            );
        }
    }

    fn csi_dispatch(&mut self, params: &[CsiParam], truncated: bool, byte: u8) {
        if truncated {
            log::warn!("rejecting CSI with too many parameters, final={:?}", byte as char);
        }
        for csi in Csi::parse(params, truncated, byte) {
            (self.callback)(Action::Csi(csi));
        }
    }

    fn osc_dispatch(&mut self, osc: &[&[u8]]) {
        let parsed = OperatingSystemCommand::parse(osc);
        (self.callback)(Action::OperatingSystemCommand(Box::new(parsed)));
    }

    fn apc_dispatch(&mut self, data: Vec<u8>) {
        (self.callback)(Action::ApcData(data));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::color::Color;
    use crate::escape::csi::SgrAttribute;

    #[test]
    fn print_run_yields_individual_prints() {
        let mut parser = Parser::new();
        let actions = parser.parse_as_vec(b"hi");
        assert_eq!(actions, vec![Action::Print('h'), Action::Print('i')]);
    }

    #[test]
    fn bold_red_text_sequence() {
        let mut parser = Parser::new();
        let actions = parser.parse_as_vec(b"\x1b[1;31mx");
        assert_eq!(
            actions,
            vec![
                Action::Csi(Csi::Sgr(vec![
                    SgrAttribute::Bold,
                    SgrAttribute::Foreground(Color::Palette(1))
                ])),
                Action::Print('x'),
            ]
        );
    }

    #[test]
    fn decrqss_cursor_style_request() {
        let mut parser = Parser::new();
        let actions = parser.parse_as_vec(b"\x1bP$q q\x1b\\");
        assert_eq!(
            actions,
            vec![Action::DeviceControl(Box::new(DeviceControl::RequestStatusString(
                b" q".to_vec()
            )))]
        );
    }

    #[test]
    fn hyperlink_open_close_roundtrip() {
        let mut parser = Parser::new();
        let actions =
            parser.parse_as_vec(b"\x1b]8;id=1;http://example.com\x07link\x1b]8;;\x07");
        assert_eq!(actions.len(), 6);
    }
}
