//! Cookie header codec
//!
//! Parsing is best-effort: a malformed pair in the incoming header is
//! skipped, never an error. Serialization produces one complete
//! `Set-Cookie` value per directive; directives are never combined into a
//! single header line.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};

/// Parse a raw `Cookie:` header value into a name → value map.
///
/// Pairs are separated by `;`, with whitespace trimmed around each pair and
/// around the name and value. A pair with no `=` or with an empty name is
/// skipped. `name=` yields an empty value. When a name repeats, the later
/// occurrence wins.
pub fn parse(header: &str) -> BTreeMap<String, String> {
    let mut cookies = BTreeMap::new();
    for pair in header.split(';') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let Some((name, value)) = pair.split_once('=') else {
            tracing::debug!(pair, "skipping cookie pair without '='");
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            tracing::debug!(pair, "skipping cookie pair with empty name");
            continue;
        }
        cookies.insert(name.to_string(), value.trim().to_string());
    }
    cookies
}

/// Expiry attribute of an outgoing cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieExpiry {
    /// Relative lifetime in seconds (`Max-Age`).
    MaxAge(i64),
    /// Absolute expiry instant (`Expires`, RFC 1123 date).
    At(DateTime<Utc>),
}

/// A single outgoing `Set-Cookie` directive.
///
/// One-way output value: name and value are emitted as given and must not
/// contain the header's reserved delimiters (`;`, `=` in the name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieDirective {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    pub http_only: bool,
    pub expiry: Option<CookieExpiry>,
}

impl CookieDirective {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            http_only: false,
            expiry: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn http_only(mut self) -> Self {
        self.http_only = true;
        self
    }

    pub fn max_age(mut self, seconds: i64) -> Self {
        self.expiry = Some(CookieExpiry::MaxAge(seconds));
        self
    }

    pub fn expires_at(mut self, when: DateTime<Utc>) -> Self {
        self.expiry = Some(CookieExpiry::At(when));
        self
    }

    /// Render the directive as a `Set-Cookie` header value.
    ///
    /// Attribute order: `Path`, then `Max-Age`/`Expires`, then `HttpOnly`.
    pub fn header_value(&self) -> String {
        let mut out = format!("{}={}", self.name, self.value);
        if let Some(ref path) = self.path {
            out.push_str("; Path=");
            out.push_str(path);
        }
        match self.expiry {
            Some(CookieExpiry::MaxAge(seconds)) => {
                out.push_str(&format!("; Max-Age={seconds}"));
            }
            Some(CookieExpiry::At(when)) => {
                out.push_str(&format!(
                    "; Expires={}",
                    when.format("%a, %d %b %Y %H:%M:%S GMT")
                ));
            }
            None => {}
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        out
    }
}

/// A date guaranteed to already be in the past, used to clear a cookie.
///
/// Rendered as `Thu, 01 Jan 1970 00:00:00 GMT`.
pub fn elapsed_expiry() -> DateTime<Utc> {
    Utc.timestamp_opt(0, 0).single().unwrap_or_default()
}
