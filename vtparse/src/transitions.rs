//! The byte-level state transition table feeding `VTParser::process_byte`.
//!
//! This is the classic VT500-series ANSI parser state machine
//! (<https://vt100.net/emu/dec_ansi_parser>), packed as `[[u16; 256]; 15]`:
//! one row per non-terminal `State`, one column per input byte, each cell
//! an `Action`/`State` pair for "what to do, where to go next". Every row
//! here ultimately decides which `loomterm_wire::escape::Parser` callback
//! fires for a given input byte — the `CsiEntry`/`CsiParam`/`CsiIntermediate`
//! rows are what let a CSI sequence's leader/parameter/intermediate bytes
//! accumulate before `csi_dispatch` ever sees them, for instance.

use crate::enums::{Action, State};

/// Build one `[u16; 256]` row by applying `$f` to every byte value at
/// compile time.
macro_rules! row_from_fn {
    ( $f:tt ) => {{
        const fn build() -> [u16; 256] {
            let mut row = [0; 256];
            let mut byte = 0;
            while byte < 256 {
                row[byte] = $f(byte as u8);
                byte += 1;
            }
            row
        }
        build()
    }};
}

const fn pack(action: Action, state: State) -> u16 {
    ((action as u16) << 8) | (state as u16)
}

/// Bytes that interrupt parsing from *any* state: C1 controls smuggled in as
/// single bytes, CAN/SUB (abort to Ground), and the introducers for
/// ESC/DCS/OSC/CSI/SOS-PM-APC. `state` is the fallback for bytes this row
/// doesn't otherwise care about — each state-specific function below is
/// itself the fallback for its own unmatched bytes.
const fn global_interrupt_or(byte: u8, state: State) -> u16 {
    use Action::*;
    use State::*;
    match byte {
        0x18 => pack(Execute, Ground),
        0x1a => pack(Execute, Ground),
        0x80..=0x8f => pack(Execute, Ground),
        0x91..=0x97 => pack(Execute, Ground),
        0x99 => pack(Execute, Ground),
        0x9a => pack(Execute, Ground),
        0x9c => pack(None, Ground),
        0x1b => pack(None, Escape),
        0x98 => pack(None, SosPmString),
        0x9e => pack(None, SosPmString),
        0x9f => pack(None, SosPmString),
        0x90 => pack(None, DcsEntry),
        0x9d => pack(None, OscString),
        0x9b => pack(None, CsiEntry),
        _ => pack(None, state),
    }
}

const fn ground_row(byte: u8) -> u16 {
    use Action::*;
    use State::*;
    match byte {
        0x00..=0x17 => pack(Execute, Ground),
        0x19 => pack(Execute, Ground),
        0x1c..=0x1f => pack(Execute, Ground),
        0x20..=0x7f => pack(Print, Ground),
        // Leading bytes of a UTF-8 multibyte sequence are recognized here
        // so ground-state text doesn't need a separate decode pass.
        0xc2..=0xdf => pack(Utf8, Utf8Sequence),
        0xe0..=0xef => pack(Utf8, Utf8Sequence),
        0xf0..=0xf4 => pack(Utf8, Utf8Sequence),
        _ => global_interrupt_or(byte, Ground),
    }
}

const fn escape_row(byte: u8) -> u16 {
    use Action::*;
    use State::*;
    match byte {
        0x00..=0x17 => pack(Execute, Escape),
        0x19 => pack(Execute, Escape),
        0x1c..=0x1f => pack(Execute, Escape),
        0x7f => pack(Ignore, Escape),
        0x20..=0x2f => pack(Collect, EscapeIntermediate),
        0x30..=0x4f => pack(EscDispatch, Ground),
        0x51..=0x57 => pack(EscDispatch, Ground),
        0x59 => pack(EscDispatch, Ground),
        0x5a => pack(EscDispatch, Ground),
        0x5c => pack(EscDispatch, Ground),
        0x60..=0x7e => pack(EscDispatch, Ground),
        0x5b => pack(None, CsiEntry),
        0x5d => pack(None, OscString),
        0x50 => pack(None, DcsEntry),
        0x58 => pack(None, SosPmString),
        0x5e => pack(None, SosPmString),
        0x5f => pack(None, ApcString),
        _ => global_interrupt_or(byte, Escape),
    }
}

const fn escape_intermediate_row(byte: u8) -> u16 {
    use Action::*;
    use State::*;
    match byte {
        0x00..=0x17 => pack(Execute, EscapeIntermediate),
        0x19 => pack(Execute, EscapeIntermediate),
        0x1c..=0x1f => pack(Execute, EscapeIntermediate),
        0x20..=0x2f => pack(Collect, EscapeIntermediate),
        0x7f => pack(Ignore, EscapeIntermediate),
        0x30..=0x7e => pack(EscDispatch, Ground),
        _ => global_interrupt_or(byte, EscapeIntermediate),
    }
}

const fn csi_entry_row(byte: u8) -> u16 {
    use Action::*;
    use State::*;
    match byte {
        0x00..=0x17 => pack(Execute, CsiEntry),
        0x19 => pack(Execute, CsiEntry),
        0x1c..=0x1f => pack(Execute, CsiEntry),
        0x7f => pack(Ignore, CsiEntry),
        0x20..=0x2f => pack(Collect, CsiIntermediate),
        0x3a => pack(None, CsiIgnore),
        0x30..=0x39 => pack(Param, CsiParam),
        0x3b => pack(Param, CsiParam),
        0x3c..=0x3f => pack(Collect, CsiParam),
        0x40..=0x7e => pack(CsiDispatch, Ground),
        _ => global_interrupt_or(byte, CsiEntry),
    }
}

const fn csi_param_row(byte: u8) -> u16 {
    use Action::*;
    use State::*;
    match byte {
        0x00..=0x17 => pack(Execute, CsiParam),
        0x19 => pack(Execute, CsiParam),
        0x1c..=0x1f => pack(Execute, CsiParam),
        0x30..=0x3b => pack(Param, CsiParam),
        0x7f => pack(Ignore, CsiParam),
        0x3c..=0x3f => pack(None, CsiIgnore),
        0x20..=0x2f => pack(Collect, CsiIntermediate),
        0x40..=0x7e => pack(CsiDispatch, Ground),
        _ => global_interrupt_or(byte, CsiParam),
    }
}

const fn csi_intermediate_row(byte: u8) -> u16 {
    use Action::*;
    use State::*;
    match byte {
        0x00..=0x17 => pack(Execute, CsiIntermediate),
        0x19 => pack(Execute, CsiIntermediate),
        0x1c..=0x1f => pack(Execute, CsiIntermediate),
        0x20..=0x2f => pack(Collect, CsiIntermediate),
        0x7f => pack(Ignore, CsiIntermediate),
        0x30..=0x3f => pack(None, CsiIgnore),
        0x40..=0x7e => pack(CsiDispatch, Ground),
        _ => global_interrupt_or(byte, CsiIntermediate),
    }
}

const fn csi_ignore_row(byte: u8) -> u16 {
    use Action::*;
    use State::*;
    match byte {
        0x00..=0x17 => pack(Execute, CsiIgnore),
        0x19 => pack(Execute, CsiIgnore),
        0x1c..=0x1f => pack(Execute, CsiIgnore),
        0x20..=0x3f => pack(Ignore, CsiIgnore),
        0x7f => pack(Ignore, CsiIgnore),
        0x40..=0x7e => pack(None, Ground),
        _ => global_interrupt_or(byte, CsiIgnore),
    }
}

const fn dcs_entry_row(byte: u8) -> u16 {
    use Action::*;
    use State::*;
    match byte {
        0x00..=0x17 => pack(Ignore, DcsEntry),
        0x19 => pack(Ignore, DcsEntry),
        0x1c..=0x1f => pack(Ignore, DcsEntry),
        0x7f => pack(Ignore, DcsEntry),
        0x3a => pack(None, DcsIgnore),
        0x20..=0x2f => pack(Collect, DcsIntermediate),
        0x30..=0x39 => pack(Param, DcsParam),
        0x3b => pack(Param, DcsParam),
        0x3c..=0x3f => pack(Collect, DcsParam),
        0x40..=0x7e => pack(None, DcsPassthrough),
        _ => global_interrupt_or(byte, DcsEntry),
    }
}

const fn dcs_param_row(byte: u8) -> u16 {
    use Action::*;
    use State::*;
    match byte {
        0x00..=0x17 => pack(Ignore, DcsParam),
        0x19 => pack(Ignore, DcsParam),
        0x1c..=0x1f => pack(Ignore, DcsParam),
        0x30..=0x39 => pack(Param, DcsParam),
        0x3b => pack(Param, DcsParam),
        0x7f => pack(Ignore, DcsParam),
        0x3a => pack(None, DcsIgnore),
        0x3c..=0x3f => pack(None, DcsIgnore),
        0x20..=0x2f => pack(Collect, DcsIntermediate),
        0x40..=0x7e => pack(None, DcsPassthrough),
        _ => global_interrupt_or(byte, DcsParam),
    }
}

const fn dcs_intermediate_row(byte: u8) -> u16 {
    use Action::*;
    use State::*;
    match byte {
        0x00..=0x17 => pack(Ignore, DcsIntermediate),
        0x19 => pack(Ignore, DcsIntermediate),
        0x1c..=0x1f => pack(Ignore, DcsIntermediate),
        0x20..=0x2f => pack(Collect, DcsIntermediate),
        0x7f => pack(Ignore, DcsIntermediate),
        0x30..=0x3f => pack(None, DcsIgnore),
        0x40..=0x7e => pack(None, DcsPassthrough),
        _ => global_interrupt_or(byte, DcsIntermediate),
    }
}

const fn dcs_passthrough_row(byte: u8) -> u16 {
    use Action::*;
    use State::*;
    match byte {
        0x00..=0x17 => pack(Put, DcsPassthrough),
        0x19 => pack(Put, DcsPassthrough),
        0x1c..=0x1f => pack(Put, DcsPassthrough),
        0x20..=0x7e => pack(Put, DcsPassthrough),
        0x7f => pack(Ignore, DcsPassthrough),
        _ => global_interrupt_or(byte, DcsPassthrough),
    }
}

const fn dcs_ignore_row(byte: u8) -> u16 {
    use Action::*;
    use State::*;
    match byte {
        0x00..=0x17 => pack(Ignore, DcsIgnore),
        0x19 => pack(Ignore, DcsIgnore),
        0x1c..=0x1f => pack(Ignore, DcsIgnore),
        0x20..=0x7f => pack(Ignore, DcsIgnore),
        _ => global_interrupt_or(byte, DcsIgnore),
    }
}

const fn osc_string_row(byte: u8) -> u16 {
    use Action::*;
    use State::*;
    match byte {
        0x00..=0x06 => pack(Ignore, OscString),
        // xterm's deviation from vt100.net: BEL terminates OSC in place of ST.
        0x07 => pack(Ignore, Ground),
        0x08..=0x17 => pack(Ignore, OscString),
        0x19 => pack(Ignore, OscString),
        0x1c..=0x1f => pack(Ignore, OscString),
        0x20..=0x7f => pack(OscPut, OscString),
        // Not part of the base state machine: lets UTF-8 survive inside an
        // OSC payload (titles, hyperlink URLs) without a separate decoder.
        0xc2..=0xdf => pack(Utf8, Utf8Sequence),
        0xe0..=0xef => pack(Utf8, Utf8Sequence),
        0xf0..=0xf4 => pack(Utf8, Utf8Sequence),
        _ => global_interrupt_or(byte, OscString),
    }
}

const fn sos_pm_string_row(byte: u8) -> u16 {
    use Action::*;
    use State::*;
    match byte {
        0x00..=0x17 => pack(Ignore, SosPmString),
        0x19 => pack(Ignore, SosPmString),
        0x1c..=0x1f => pack(Ignore, SosPmString),
        0x20..=0x7f => pack(Ignore, SosPmString),
        _ => global_interrupt_or(byte, SosPmString),
    }
}

const fn apc_string_row(byte: u8) -> u16 {
    use Action::*;
    use State::*;
    match byte {
        0x00..=0x17 => pack(ApcPut, ApcString),
        0x19 => pack(ApcPut, ApcString),
        0x1c..=0x1f => pack(ApcPut, ApcString),
        0x20..=0x7f => pack(ApcPut, ApcString),
        _ => global_interrupt_or(byte, ApcString),
    }
}

/// Row order matches `State`'s discriminants 0..=14 — `VTParser` indexes
/// straight into this with `state as usize`.
pub(crate) static TRANSITIONS: [[u16; 256]; 15] = [
    row_from_fn!(ground_row),
    row_from_fn!(escape_row),
    row_from_fn!(escape_intermediate_row),
    row_from_fn!(csi_entry_row),
    row_from_fn!(csi_param_row),
    row_from_fn!(csi_intermediate_row),
    row_from_fn!(csi_ignore_row),
    row_from_fn!(dcs_entry_row),
    row_from_fn!(dcs_param_row),
    row_from_fn!(dcs_intermediate_row),
    row_from_fn!(dcs_passthrough_row),
    row_from_fn!(dcs_ignore_row),
    row_from_fn!(osc_string_row),
    row_from_fn!(sos_pm_string_row),
    row_from_fn!(apc_string_row),
];

/// Side-effect action fired when *entering* a state, indexed by `State`'s
/// discriminant. `DcsPassthrough`'s `Hook` and `OscString`/`ApcString`'s
/// `*Start` are what let `Performer::dcs_hook`/`osc_dispatch` setup run
/// exactly once per sequence rather than once per byte.
pub(crate) static ENTRY: [Action; 17] = [
    Action::None,     // Ground
    Action::Clear,    // Escape
    Action::None,     // EscapeIntermediate
    Action::Clear,    // CsiEntry
    Action::None,     // CsiParam
    Action::None,     // CsiIntermediate
    Action::None,     // CsiIgnore
    Action::Clear,    // DcsEntry
    Action::None,     // DcsParam
    Action::None,     // DcsIntermediate
    Action::Hook,     // DcsPassthrough
    Action::None,     // DcsIgnore
    Action::OscStart, // OscString
    Action::None,     // SosPmString
    Action::ApcStart, // ApcString
    Action::None,     // Anywhere
    Action::None,     // Utf8Sequence
];

/// Side-effect action fired when *leaving* a state, same indexing as
/// `ENTRY`. `Unhook`/`OscEnd`/`ApcEnd` close out the builder `ENTRY`
/// opened.
pub(crate) static EXIT: [Action; 17] = [
    Action::None,   // Ground
    Action::None,   // Escape
    Action::None,   // EscapeIntermediate
    Action::None,   // CsiEntry
    Action::None,   // CsiParam
    Action::None,   // CsiIntermediate
    Action::None,   // CsiIgnore
    Action::None,   // DcsEntry
    Action::None,   // DcsParam
    Action::None,   // DcsIntermediate
    Action::Unhook, // DcsPassthrough
    Action::None,   // DcsIgnore
    Action::OscEnd, // OscString
    Action::None,   // SosPmString
    Action::ApcEnd, // ApcString
    Action::None,   // Anywhere
    Action::None,   // Utf8Sequence
];

#[cfg(test)]
mod tests {
    use super::*;

    /// Pins the table's actual contents, not the code that builds them —
    /// any restructuring of the functions above that leaves every cell's
    /// value unchanged should leave this hash unchanged too.
    #[test]
    fn test_transitions() {
        let v = format!("{:?}", TRANSITIONS).as_bytes().to_vec();
        assert_eq!(
            (
                v.len(),
                hash(&v, 0, 1),
                hash(&v, 5381, 33), // djb2
                hash(&v, 0, 65599), // sdbm
            ),
            (17385, 799944, 12647816782590382477, 3641575052870461598)
        );
    }

    fn hash(v: &[u8], init: u64, mul: u64) -> u64 {
        v.iter()
            .fold(init, |a, &b| a.wrapping_mul(mul).wrapping_add(b as u64))
    }
}
