//! Ad-hoc cookie control
//!
//! A sibling capability to the session lifecycle, independent of the
//! session store: set or clear a single named cookie on demand, or report
//! the cookies the client sent. The two mutations are mutually exclusive
//! per invocation.

use crate::cgi::CgiRequest;
use crate::cookie::{elapsed_expiry, CookieDirective};
use crate::response::Response;
use std::collections::BTreeMap;

/// Name of the cookie managed by this component.
pub const DEMO_COOKIE: &str = "demo";

/// What this invocation was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieAction {
    /// `set=<value>`: store `value` in the demo cookie.
    Set(String),
    /// `clear=<anything>`: expire the demo cookie.
    Clear,
    /// Neither parameter: report the incoming cookie set.
    Report,
}

impl CookieAction {
    /// Derive the action from request parameters. When both arrive in
    /// one request, `set` wins over `clear`.
    pub fn from_request(request: &CgiRequest) -> Self {
        if let Some(value) = request.param("set") {
            Self::Set(value.to_string())
        } else if request.param("clear").is_some() {
            Self::Clear
        } else {
            Self::Report
        }
    }
}

/// Produce the response for one cookie-control invocation.
pub fn respond(action: &CookieAction, incoming: &BTreeMap<String, String>) -> Response {
    match action {
        CookieAction::Set(value) => {
            Response::text(format!("Cookie set: {DEMO_COOKIE}={value}\n")).with_cookie(
                CookieDirective::new(DEMO_COOKIE, value)
                    .with_path("/")
                    .http_only(),
            )
        }
        CookieAction::Clear => Response::text("Cookie cleared\n").with_cookie(
            CookieDirective::new(DEMO_COOKIE, "")
                .with_path("/")
                .expires_at(elapsed_expiry()),
        ),
        CookieAction::Report => {
            let mut body = String::from("=== Incoming Cookies ===\n");
            if incoming.is_empty() {
                body.push_str("(No cookies sent)\n");
            } else {
                for (name, value) in incoming {
                    body.push_str(&format!("{name} = {value}\n"));
                }
            }
            Response::text(body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn request(query: &str) -> CgiRequest {
        let env: HashMap<String, String> =
            [("QUERY_STRING".to_string(), query.to_string())].into();
        CgiRequest::from_parts(&env, b"")
    }

    #[test]
    fn test_set_wins_over_clear() {
        let action = CookieAction::from_request(&request("clear=1&set=hello"));
        assert_eq!(action, CookieAction::Set("hello".to_string()));
    }

    #[test]
    fn test_clear_without_set() {
        let action = CookieAction::from_request(&request("clear="));
        assert_eq!(action, CookieAction::Clear);
    }

    #[test]
    fn test_no_parameters_reports() {
        let action = CookieAction::from_request(&request(""));
        assert_eq!(action, CookieAction::Report);
    }

    #[test]
    fn test_set_response() {
        let response = respond(&CookieAction::Set("hello".to_string()), &BTreeMap::new());
        assert_eq!(response.set_cookies.len(), 1);
        assert_eq!(
            response.set_cookies[0].header_value(),
            "demo=hello; Path=/; HttpOnly"
        );
        assert_eq!(response.body, "Cookie set: demo=hello\n");
    }

    #[test]
    fn test_clear_response_expires_in_the_past() {
        let response = respond(&CookieAction::Clear, &BTreeMap::new());
        assert_eq!(response.set_cookies.len(), 1);
        assert_eq!(
            response.set_cookies[0].header_value(),
            "demo=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT"
        );
        assert_eq!(response.body, "Cookie cleared\n");
    }

    #[test]
    fn test_report_lists_cookies_sorted() {
        let incoming: BTreeMap<String, String> = [
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "1".to_string()),
        ]
        .into();
        let response = respond(&CookieAction::Report, &incoming);
        assert_eq!(
            response.body,
            "=== Incoming Cookies ===\na = 1\nb = 2\n"
        );
        assert!(response.set_cookies.is_empty());
    }

    #[test]
    fn test_report_with_no_cookies() {
        let response = respond(&CookieAction::Report, &BTreeMap::new());
        assert_eq!(response.body, "=== Incoming Cookies ===\n(No cookies sent)\n");
    }
}
