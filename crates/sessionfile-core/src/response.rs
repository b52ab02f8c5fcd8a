//! CGI response assembly
//!
//! The invoking webserver captures stdout as a header block followed by a
//! blank line and a body. Every view in this crate produces a [`Response`]
//! value; only the binary boundary actually writes it.

use crate::cookie::CookieDirective;
use std::io::{self, Write};

/// One complete CGI response: content type, outgoing cookie directives,
/// and a plain-text body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub content_type: String,
    pub set_cookies: Vec<CookieDirective>,
    pub body: String,
}

impl Response {
    /// A `text/plain` response with no cookies.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            content_type: "text/plain".to_string(),
            set_cookies: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_cookie(mut self, directive: CookieDirective) -> Self {
        self.set_cookies.push(directive);
        self
    }

    /// Emit the header block, blank separator line, and body.
    ///
    /// One `Set-Cookie` line per directive; directives are never folded
    /// into a single header.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Content-Type: {}", self.content_type)?;
        for directive in &self.set_cookies {
            writeln!(out, "Set-Cookie: {}", directive.header_value())?;
        }
        writeln!(out)?;
        out.write_all(self.body.as_bytes())?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::CookieDirective;

    fn rendered(response: &Response) -> String {
        let mut buf = Vec::new();
        response.write_to(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_plain_body() {
        let out = rendered(&Response::text("hello\n"));
        assert_eq!(out, "Content-Type: text/plain\n\nhello\n");
    }

    #[test]
    fn test_cookie_lines_precede_blank_separator() {
        let response = Response::text("ok\n")
            .with_cookie(CookieDirective::new("a", "1"))
            .with_cookie(CookieDirective::new("b", "2").with_path("/"));
        let out = rendered(&response);
        assert_eq!(
            out,
            "Content-Type: text/plain\nSet-Cookie: a=1\nSet-Cookie: b=2; Path=/\n\nok\n"
        );
    }

    #[test]
    fn test_headers_end_at_first_blank_line() {
        let out = rendered(&Response::text("body with\n\nblank lines\n"));
        let (headers, body) = out.split_once("\n\n").unwrap();
        assert_eq!(headers, "Content-Type: text/plain");
        assert_eq!(body, "body with\n\nblank lines\n");
    }
}
