//! The action/state vocabulary of the byte-level parser.
//!
//! These two enums are the alphabet the transition table in
//! `transitions.rs` is built from: every table cell packs one `Action` and
//! one `State` into a `u16`. Downstream, `loomterm_wire::escape::Parser`
//! only ever sees the `Action` side via `VTActor` callbacks (`print`,
//! `csi_dispatch`, `dcs_hook`, ...) — `State` never leaves this crate.
#![allow(dead_code)]

/// What the parser should do with the current byte once a table lookup
/// resolves it. Mirrors the callback methods on `VTActor` one-to-one,
/// except `None`/`Ignore`/`Clear`/`Param`/`Collect`, which are consumed
/// internally by `VTParser::process_byte` and never reach an actor.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u16)]
pub enum Action {
    None = 0,
    Ignore = 1,
    Print = 2,
    Execute = 3,
    Clear = 4,
    Collect = 5,
    Param = 6,
    EscDispatch = 7,
    CsiDispatch = 8,
    Hook = 9,
    Put = 10,
    Unhook = 11,
    OscStart = 12,
    OscPut = 13,
    OscEnd = 14,
    Utf8 = 15,
    ApcStart = 16,
    ApcPut = 17,
    ApcEnd = 18,
}

impl Action {
    /// Recover an `Action` from the low byte of a packed table cell.
    /// `transitions::pack` is the only writer of these values, and every
    /// value it can produce is one of the arms below.
    #[inline(always)]
    pub fn from_u16(v: u16) -> Self {
        match v {
            0 => Action::None,
            1 => Action::Ignore,
            2 => Action::Print,
            3 => Action::Execute,
            4 => Action::Clear,
            5 => Action::Collect,
            6 => Action::Param,
            7 => Action::EscDispatch,
            8 => Action::CsiDispatch,
            9 => Action::Hook,
            10 => Action::Put,
            11 => Action::Unhook,
            12 => Action::OscStart,
            13 => Action::OscPut,
            14 => Action::OscEnd,
            15 => Action::Utf8,
            16 => Action::ApcStart,
            17 => Action::ApcPut,
            18 => Action::ApcEnd,
            other => unreachable!("no Action variant packs to {}", other),
        }
    }
}

/// Where the parser sits in the escape-sequence grammar. `Anywhere` and
/// `Utf8Sequence` are not real table rows: `Anywhere` documents the global
/// interrupt bytes `transitions::anywhere_or` handles uniformly across every
/// state, and `Utf8Sequence` is entered directly by `VTParser::next_utf8`
/// without a table lookup at all.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u16)]
pub enum State {
    Ground = 0,
    Escape = 1,
    EscapeIntermediate = 2,
    CsiEntry = 3,
    CsiParam = 4,
    CsiIntermediate = 5,
    CsiIgnore = 6,
    DcsEntry = 7,
    DcsParam = 8,
    DcsIntermediate = 9,
    DcsPassthrough = 10,
    DcsIgnore = 11,
    OscString = 12,
    SosPmString = 13,
    ApcString = 14,
    Anywhere = 15,
    Utf8Sequence = 16,
}

impl State {
    /// Recover a `State` from the high byte of a packed table cell.
    #[inline(always)]
    pub fn from_u16(v: u16) -> Self {
        match v {
            0 => State::Ground,
            1 => State::Escape,
            2 => State::EscapeIntermediate,
            3 => State::CsiEntry,
            4 => State::CsiParam,
            5 => State::CsiIntermediate,
            6 => State::CsiIgnore,
            7 => State::DcsEntry,
            8 => State::DcsParam,
            9 => State::DcsIntermediate,
            10 => State::DcsPassthrough,
            11 => State::DcsIgnore,
            12 => State::OscString,
            13 => State::SosPmString,
            14 => State::ApcString,
            15 => State::Anywhere,
            16 => State::Utf8Sequence,
            other => unreachable!("no State variant packs to {}", other),
        }
    }
}
