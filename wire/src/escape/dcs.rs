//! Device Control String handling.
//!
//! Only DECRQSS (`$q…`) and a not-recognised fallback are modeled;
//! grounded on the streaming hook/put/unhook split in
//! `examples/wez-wezterm/termwiz/src/escape/parser/mod.rs`'s
//! `ShortDeviceControl` builder, without wezterm's sixel/tmux-passthrough/
//! `XtGetTcap` branches.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceControl {
    /// `ESC P $ q <request> ST` (DECRQSS); `request` is the accumulated
    /// payload ("m", "r", or " q").
    RequestStatusString(Vec<u8>),
    Unknown {
        params: Vec<i64>,
        intermediates: Vec<u8>,
        byte: u8,
        data: Vec<u8>,
    },
}

/// Accumulates `dcs_put` bytes between `dcs_hook` and `dcs_unhook`.
#[derive(Debug, Clone)]
pub(crate) struct Builder {
    pub params: Vec<i64>,
    pub intermediates: Vec<u8>,
    pub byte: u8,
    pub is_request_status_string: bool,
    pub data: Vec<u8>,
}

impl Builder {
    pub fn new(params: &[i64], intermediates: &[u8], byte: u8) -> Builder {
        Builder {
            params: params.to_vec(),
            is_request_status_string: intermediates == [b'$'] && byte == b'q',
            intermediates: intermediates.to_vec(),
            byte,
            data: vec![],
        }
    }

    /// Caps accumulated payload at 65,536 bytes; further bytes up to the
    /// terminator are discarded rather than growing the buffer without
    /// bound.
    pub fn put(&mut self, byte: u8) {
        if self.data.len() < 65536 {
            self.data.push(byte);
        }
    }

    pub fn finish(self) -> DeviceControl {
        if self.is_request_status_string {
            DeviceControl::RequestStatusString(self.data)
        } else {
            DeviceControl::Unknown {
                params: self.params,
                intermediates: self.intermediates,
                byte: self.byte,
                data: self.data,
            }
        }
    }
}
