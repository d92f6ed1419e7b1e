//! `application/x-www-form-urlencoded` decoding.
//!
//! The same format carries both URL query strings and URL-encoded form
//! bodies, so one parser serves [`Request::query`](crate::Request::query) and
//! [`Request::form`](crate::Request::form).
//!
//! - `&`-separated `key=value` pairs, empty segments skipped
//! - a key without `=` has the empty string as its value
//! - `+` decodes to a space, `%XX` to the byte it names
//! - the first occurrence of a key wins for single-value access

use std::borrow::Cow;

/// Decoded key/value pairs, in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    /// Parses a query string (without the leading `?`) or a form body.
    pub fn parse(raw: &str) -> Self {
        let pairs = raw
            .split('&')
            .filter(|s| !s.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                (percent_decode(k).into_owned(), percent_decode(v).into_owned())
            })
            .collect();
        Self { pairs }
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, in input order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs.iter().filter(move |(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn is_empty(&self) -> bool { self.pairs.is_empty() }
    pub fn len(&self) -> usize { self.pairs.len() }

    pub(crate) fn push(&mut self, key: String, value: String) {
        self.pairs.push((key, value));
    }
}

/// Percent-decodes `s`, treating `+` as a space. Malformed escapes are kept
/// verbatim; invalid UTF-8 is replaced lossily.
pub fn percent_decode(s: &str) -> Cow<'_, str> {
    decode(s, true)
}

/// Percent-decodes one path segment. Unlike form data, `+` stays a `+`.
pub fn percent_decode_path(s: &str) -> Cow<'_, str> {
    decode(s, false)
}

fn decode(s: &str, plus_is_space: bool) -> Cow<'_, str> {
    if !s.contains('%') && !(plus_is_space && s.contains('+')) {
        return Cow::Borrowed(s);
    }

    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                match (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' if plus_is_space => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    Cow::Owned(String::from_utf8_lossy(&out).into_owned())
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
