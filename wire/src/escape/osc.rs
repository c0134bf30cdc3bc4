//! Operating System Command parsing (`OSC Ps ; Pt ST`).
//!
//! Grounded on `examples/wez-wezterm/termwiz/src/escape/osc.rs`'s
//! `OperatingSystemCommand::parse(&[&[u8]])` entry point, trimmed to the
//! `Ps` values this core recognises — wezterm also decodes iTerm2
//! proprietary codes, Finder/tab-color extensions and shell-integration
//! markers that have no counterpart here.

use crate::color::Rgb;
use crate::hyperlink::Hyperlink;

#[derive(Debug, Clone, PartialEq)]
pub enum OperatingSystemCommand {
    SetIconNameAndTitle(String),
    SetIconName(String),
    SetTitle(String),
    SetHyperlink(Option<Hyperlink>),
    SetForegroundColor(Rgb),
    SetBackgroundColor(Rgb),
    SetCursorColor(Rgb),
    Unknown { ps: i64, params: Vec<Vec<u8>> },
}

fn utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

impl OperatingSystemCommand {
    pub fn parse(osc: &[&[u8]]) -> OperatingSystemCommand {
        let ps: i64 = osc
            .first()
            .and_then(|b| std::str::from_utf8(b).ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(-1);

        match ps {
            0 if osc.len() >= 2 => OperatingSystemCommand::SetIconNameAndTitle(utf8(osc[1])),
            1 if osc.len() >= 2 => OperatingSystemCommand::SetIconName(utf8(osc[1])),
            2 if osc.len() >= 2 => OperatingSystemCommand::SetTitle(utf8(osc[1])),
            8 if osc.len() >= 3 => {
                let params = utf8(osc[1]);
                let uri = utf8(osc[2]);
                OperatingSystemCommand::SetHyperlink(Hyperlink::parse(&params, &uri))
            }
            10 if osc.len() >= 2 => OperatingSystemCommand::SetForegroundColor(Rgb::parse(&utf8(osc[1]))),
            11 if osc.len() >= 2 => OperatingSystemCommand::SetBackgroundColor(Rgb::parse(&utf8(osc[1]))),
            12 if osc.len() >= 2 => OperatingSystemCommand::SetCursorColor(Rgb::parse(&utf8(osc[1]))),
            _ => OperatingSystemCommand::Unknown {
                ps,
                params: osc.iter().skip(1).map(|b| b.to_vec()).collect(),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn set_title() {
        assert_eq!(
            OperatingSystemCommand::parse(&[b"2", b"my title"]),
            OperatingSystemCommand::SetTitle("my title".to_owned())
        );
    }

    #[test]
    fn hyperlink_open_and_close() {
        let open = OperatingSystemCommand::parse(&[b"8", b"id=1", b"http://example.com"]);
        assert_eq!(
            open,
            OperatingSystemCommand::SetHyperlink(Some(Hyperlink {
                id: Some("1".to_owned()),
                uri: "http://example.com".to_owned(),
            }))
        );
        let close = OperatingSystemCommand::parse(&[b"8", b"", b""]);
        assert_eq!(close, OperatingSystemCommand::SetHyperlink(None));
    }

    #[test]
    fn theme_color_hex() {
        assert_eq!(
            OperatingSystemCommand::parse(&[b"11", b"#1e1e2e"]),
            OperatingSystemCommand::SetBackgroundColor(Rgb::new(0x1e, 0x1e, 0x2e))
        );
    }

    #[test]
    fn unrecognised_ps_is_preserved_not_dropped() {
        match OperatingSystemCommand::parse(&[b"133", b"A"]) {
            OperatingSystemCommand::Unknown { ps, .. } => assert_eq!(ps, 133),
            other => panic!("expected Unknown, got {:?}", other),
        }
    }
}
