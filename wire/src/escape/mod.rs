//! Typed escape-sequence vocabulary produced from the raw byte stream.
//!
//! Three layers, mirroring `examples/wez-wezterm/termwiz/src/escape/`:
//! `vtparse` tokenizes bytes into FSM actions, this module gives those
//! actions domain meaning (`Action`), and `loomterm-term` executes them
//! against a `Screen`.

pub mod csi;
pub mod dcs;
pub mod osc;
pub mod parser;

pub use csi::Csi;
pub use dcs::DeviceControl;
pub use osc::OperatingSystemCommand;
pub use parser::Parser;

/// A C0 control code recognised from the ground-state dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCode {
    Null,
    Enquiry,
    Bell,
    Backspace,
    Tab,
    LineFeed,
    VerticalTab,
    FormFeed,
    CarriageReturn,
    ShiftOut,
    ShiftIn,
    Delete,
}

impl ControlCode {
    pub fn from_u8(byte: u8) -> Option<ControlCode> {
        use ControlCode::*;
        Some(match byte {
            0x00 => Null,
            0x05 => Enquiry,
            0x07 => Bell,
            0x08 => Backspace,
            0x09 => Tab,
            0x0a => LineFeed,
            0x0b => VerticalTab,
            0x0c => FormFeed,
            0x0d => CarriageReturn,
            0x0e => ShiftOut,
            0x0f => ShiftIn,
            0x7f => Delete,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharsetSlot {
    G0,
    G1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Ascii,
    DecLineDrawing,
}

/// A two-character (`ESC X`) or three-character (`ESC ( X`) escape
/// sequence recognised from the escape sub-dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Esc {
    SaveCursor,
    RestoreCursor,
    FullReset,
    ApplicationKeypad(bool),
    Index,
    ReverseIndex,
    NextLine,
    DesignateCharset(CharsetSlot, Charset),
}

impl Esc {
    pub fn parse(intermediate: Option<u8>, control: u8) -> Option<Esc> {
        match (intermediate, control) {
            (None, b'7') => Some(Esc::SaveCursor),
            (None, b'8') => Some(Esc::RestoreCursor),
            (None, b'c') => Some(Esc::FullReset),
            (None, b'=') => Some(Esc::ApplicationKeypad(true)),
            (None, b'>') => Some(Esc::ApplicationKeypad(false)),
            (None, b'D') => Some(Esc::Index),
            (None, b'M') => Some(Esc::ReverseIndex),
            (None, b'E') => Some(Esc::NextLine),
            (Some(b'(' | b')' | b'*' | b'+' | b'-' | b'.' | b'/'), charset) => {
                let slot = match intermediate {
                    Some(b'(' | b'*' | b'-') => CharsetSlot::G0,
                    _ => CharsetSlot::G1,
                };
                let set = match charset {
                    b'0' => Charset::DecLineDrawing,
                    _ => Charset::Ascii,
                };
                Some(Esc::DesignateCharset(slot, set))
            }
            _ => None,
        }
    }
}

/// One parsed unit of input: a glyph, a control function, or a string
/// command. This is what `loomterm-term`'s executor consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Print(char),
    Control(ControlCode),
    Esc(Esc),
    Csi(Csi),
    OperatingSystemCommand(Box<OperatingSystemCommand>),
    DeviceControl(Box<DeviceControl>),
    /// `ESC _ … ST`; a leading `G` byte is the kitty graphics protocol.
    /// TODO: decode kitty graphics payloads instead of discarding them.
    ApcData(Vec<u8>),
}
