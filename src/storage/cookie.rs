//! Cookie-backed theme storage and the cookie string codec.
//!
//! The cookie backend exists so the server can see the theme while rendering.
//! Cookies have no change notification, so this adapter never syncs tabs.

use std::rc::Rc;

use crate::storage::{StorageArea, ThemeStorage, delete_or_warn, read_or_warn, write_or_warn};

/// Lifetime of the theme cookie: one year.
pub const COOKIE_MAX_AGE_SECS: u32 = 31_536_000;

/// Adapter over a cookie jar. `subscribe` keeps the trait's no-op default.
pub struct CookieStorage {
    jar: Rc<dyn StorageArea>,
}

impl CookieStorage {
    pub fn new(jar: Rc<dyn StorageArea>) -> Self {
        Self { jar }
    }
}

impl ThemeStorage for CookieStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        read_or_warn(self.jar.as_ref(), key)
    }

    fn set_item(&self, key: &str, value: &str) {
        write_or_warn(self.jar.as_ref(), key, value);
    }

    fn remove_item(&self, key: &str) {
        delete_or_warn(self.jar.as_ref(), key);
    }
}

/// Iterate the decoded `(name, value)` pairs of a `Cookie` header or a
/// `document.cookie` string.
pub fn parse_cookies(header: &str) -> impl Iterator<Item = (&str, String)> {
    header.split(';').filter_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some((name, decode_component(value.trim())))
    })
}

/// Value of cookie `name`, percent-decoded. Names are matched in their
/// encoded form, as written by [`set_cookie_string`].
#[must_use]
pub fn read_cookie(header: &str, name: &str) -> Option<String> {
    let wanted = encode_component(name);
    parse_cookies(header).find(|(n, _)| *n == wanted).map(|(_, value)| value)
}

/// `document.cookie` assignment storing `value` under `name`.
#[must_use]
pub fn set_cookie_string(name: &str, value: &str) -> String {
    format!(
        "{}={}; path=/; max-age={COOKIE_MAX_AGE_SECS}; SameSite=Lax",
        encode_component(name),
        encode_component(value)
    )
}

/// `document.cookie` assignment expiring `name`.
#[must_use]
pub fn expire_cookie_string(name: &str) -> String {
    format!("{}=; path=/; max-age=0; SameSite=Lax", encode_component(name))
}

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Percent-encode like `encodeURIComponent`, so the bootstrap script can
/// decode with `decodeURIComponent`.
#[must_use]
pub fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || b"-_.!~*'()".contains(&byte) {
            out.push(char::from(byte));
        } else {
            out.push('%');
            out.push(char::from(HEX_UPPER[usize::from(byte >> 4)]));
            out.push(char::from(HEX_UPPER[usize::from(byte & 0x0f)]));
        }
    }
    out
}

/// Reverse [`encode_component`]. Malformed escapes are kept literally.
#[must_use]
pub fn decode_component(encoded: &str) -> String {
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let Some(byte) = bytes.get(i + 1..i + 3).and_then(hex_pair) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_pair(pair: &[u8]) -> Option<u8> {
    Some((hex_digit(pair[0])? << 4) | hex_digit(pair[1])?)
}

fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
