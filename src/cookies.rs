//! Cookie header parsing.
//!
//! A `Cookie` header is split into pairs on `"; "`, and each pair is split on
//! its first `=`. Values are percent-decoded. A pair without `=` is kept as a
//! name with no value, so callers can tell "present but malformed" apart from
//! "absent".

use std::collections::HashMap;

use percent_encoding::percent_decode_str;

/// Parsed cookies from a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: HashMap<String, Option<String>>,
}

impl CookieJar {
    /// Parse a raw `Cookie` header value. Later duplicates replace earlier ones.
    pub fn parse(header: &str) -> Self {
        let cookies = header
            .split("; ")
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((name, value)) => (name.to_string(), Some(decode(value))),
                None => {
                    tracing::debug!(cookie = %pair, "Cookie pair without value");
                    (pair.to_string(), None)
                }
            })
            .collect();

        Self { cookies }
    }

    /// Get the decoded value of a cookie, if it is present and has a value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).and_then(|value| value.as_deref())
    }

    /// Check if a cookie name appears in the header, with or without a value.
    pub fn contains(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    /// Number of distinct cookie names.
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Check if the header held no cookies.
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

/// Percent-decode a cookie value. Invalid UTF-8 is replaced, and malformed
/// escapes are left as written.
fn decode(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}
