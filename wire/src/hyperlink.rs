//! Hyperlink records (OSC 8).
//!
//! Grounded on `examples/wez-wezterm/termwiz/src/hyperlink.rs`'s
//! `Hyperlink::parse`, trimmed of the implicit-match `Rule`/regex machinery
//! (OSC 8 here carries only the explicit `id=`/`uri` pair) and of the
//! `wezterm_dynamic` config-serialization derives, since hyperlinks here
//! are wire-format data, not user configuration.
//!
//! A handle is an `Rc<Hyperlink>` rather than an id looked up in a side
//! table: the record should live as long as its longest holder — it is
//! reclaimed once neither the owning VTE's interner nor any cell still
//! references it, which is exactly `Rc` refcounting and needs no GC pass.

use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hyperlink {
    pub id: Option<String>,
    pub uri: String,
}

pub type HyperlinkHandle = Rc<Hyperlink>;

impl Hyperlink {
    pub fn new(uri: impl Into<String>) -> Self {
        Hyperlink {
            id: None,
            uri: uri.into(),
        }
    }

    /// Parse OSC 8's two parameters: `params` (`key=value` pairs joined by
    /// `:`; only the `id` key is meaningful here) and `uri`. Both empty
    /// closes the current link.
    pub fn parse(params: &str, uri: &str) -> Option<Hyperlink> {
        if params.is_empty() && uri.is_empty() {
            return None;
        }
        let mut id = None;
        for pair in params.split(':').filter(|p| !p.is_empty()) {
            if let Some((k, v)) = pair.split_once('=') {
                if k == "id" {
                    id = Some(v.to_owned());
                }
            }
        }
        Some(Hyperlink {
            id,
            uri: uri.to_owned(),
        })
    }
}

/// Interns hyperlink records so that repeated OSC 8 sequences carrying the
/// same `id` within a VTE's lifetime share one `Rc`, rather than allocating
/// a fresh record per cell.
#[derive(Debug, Default)]
pub struct HyperlinkInterner {
    by_id: HashMap<String, HyperlinkHandle>,
}

impl HyperlinkInterner {
    pub fn new() -> Self {
        HyperlinkInterner::default()
    }

    pub fn intern(&mut self, link: Hyperlink) -> HyperlinkHandle {
        match link.id.clone() {
            Some(id) => {
                if let Some(existing) = self.by_id.get(&id) {
                    if existing.uri == link.uri {
                        return Rc::clone(existing);
                    }
                }
                let handle = Rc::new(link);
                self.by_id.insert(id, Rc::clone(&handle));
                handle
            }
            None => Rc::new(link),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_params_and_uri_closes_link() {
        assert_eq!(Hyperlink::parse("", ""), None);
    }

    #[test]
    fn id_param_is_extracted() {
        let link = Hyperlink::parse("id=foo", "https://example.com").unwrap();
        assert_eq!(link.id.as_deref(), Some("foo"));
        assert_eq!(link.uri, "https://example.com");
    }

    #[test]
    fn same_id_shares_handle() {
        let mut interner = HyperlinkInterner::new();
        let a = interner.intern(Hyperlink::parse("id=x", "https://a").unwrap());
        let b = interner.intern(Hyperlink::parse("id=x", "https://a").unwrap());
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn no_id_never_shares() {
        let mut interner = HyperlinkInterner::new();
        let a = interner.intern(Hyperlink::new("https://a"));
        let b = interner.intern(Hyperlink::new("https://a"));
        assert!(!Rc::ptr_eq(&a, &b));
    }
}
