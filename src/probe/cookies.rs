//! Per-operation cookie jar.
//!
//! Cookies supplied by the client and those set by responses are carried
//! forward across the attempts of one fetch, then discarded.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: BTreeMap<String, String>,
}

impl CookieJar {
    /// Parses a client-supplied `name=value; name2=value2` string.
    ///
    /// Pairs without `=` or with an empty name are ignored.
    pub fn from_client_header(raw: &str) -> Self {
        let mut jar = Self::default();
        for pair in raw.split(';') {
            jar.insert_pair(pair);
        }
        jar
    }

    /// Records the cookie carried by one `Set-Cookie` header value.
    ///
    /// Only the leading `name=value` pair is kept; attributes (`Path`,
    /// `Expires`, ...) are irrelevant within a single operation.
    pub fn absorb_set_cookie(&mut self, header_value: &str) {
        if let Some(pair) = header_value.split(';').next() {
            self.insert_pair(pair);
        }
    }

    fn insert_pair(&mut self, pair: &str) {
        if let Some((name, value)) = pair.split_once('=') {
            let name = name.trim();
            if !name.is_empty() {
                self.cookies
                    .insert(name.to_string(), value.trim().to_string());
            }
        }
    }

    /// Value for a `Cookie` request header, or `None` if the jar is empty.
    pub fn header_value(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}
