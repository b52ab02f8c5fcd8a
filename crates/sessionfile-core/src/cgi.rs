//! CGI request boundary
//!
//! The invoking webserver hands each one-shot process its request metadata
//! through the environment (`HTTP_COOKIE`, `QUERY_STRING`,
//! `REQUEST_METHOD`, `CONTENT_TYPE`, `CONTENT_LENGTH`) and the request body
//! on stdin. [`CgiRequest`] captures the parts this crate consumes, built
//! from any environment map so callers and tests never need a real process
//! environment.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Read};

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// The slice of a CGI invocation this crate consumes: the raw cookie
/// header (if any) and the decoded request parameters.
#[derive(Debug, Clone, Default)]
pub struct CgiRequest {
    cookie_header: Option<String>,
    params: Vec<(String, String)>,
}

impl CgiRequest {
    /// Build a request from an environment map and the raw request body.
    ///
    /// Parameters come from `QUERY_STRING` and, when the declared content
    /// type is `application/x-www-form-urlencoded`, from the body as well;
    /// body parameters are appended after query parameters so they win a
    /// last-occurrence lookup. An empty `HTTP_COOKIE` counts as absent.
    pub fn from_parts(env: &HashMap<String, String>, body: &[u8]) -> Self {
        let cookie_header = env
            .get("HTTP_COOKIE")
            .filter(|value| !value.is_empty())
            .cloned();

        let mut params = Vec::new();
        if let Some(query) = env.get("QUERY_STRING") {
            decode_params(query.as_bytes(), &mut params);
        }
        let is_form = env
            .get("CONTENT_TYPE")
            .is_some_and(|t| t.split(';').next().unwrap_or("").trim() == FORM_URLENCODED);
        if is_form && !body.is_empty() {
            decode_params(body, &mut params);
        }

        Self {
            cookie_header,
            params,
        }
    }

    /// Build a request from the real process environment and stdin.
    ///
    /// Reads at most `CONTENT_LENGTH` bytes of body; with no declared
    /// length the body is treated as empty, per the CGI contract.
    pub fn from_process() -> io::Result<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();

        let content_length = env
            .get("CONTENT_LENGTH")
            .and_then(|len| len.parse::<u64>().ok())
            .unwrap_or(0);
        let mut body = Vec::new();
        if content_length > 0 {
            io::stdin()
                .lock()
                .take(content_length)
                .read_to_end(&mut body)?;
        }

        Ok(Self::from_parts(&env, &body))
    }

    /// Raw `Cookie:` header value, if one was sent.
    pub fn cookie_header(&self) -> Option<&str> {
        self.cookie_header.as_deref()
    }

    /// Incoming cookies, parsed best-effort.
    pub fn cookies(&self) -> BTreeMap<String, String> {
        self.cookie_header
            .as_deref()
            .map(crate::cookie::parse)
            .unwrap_or_default()
    }

    /// Value of the named parameter; when a name repeats, the last
    /// occurrence wins, matching the cookie parsing discipline.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rev()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value.as_str())
    }
}

fn decode_params(raw: &[u8], out: &mut Vec<(String, String)>) {
    for (name, value) in url::form_urlencoded::parse(raw) {
        out.push((name.into_owned(), value.into_owned()));
    }
}
