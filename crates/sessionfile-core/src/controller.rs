//! Per-invocation session lifecycle
//!
//! One invocation ends in exactly one of three ways: a new session was
//! started, an existing session was revisited, or an explicit error is
//! reported. There is no silent fallback; in particular a cookie that
//! names a session with no backing record is surfaced to the client rather
//! than quietly replaced with a fresh session.

use crate::cookie::{self, CookieDirective};
use crate::response::Response;
use crate::store::{SessionRecord, SessionStore, StoreError};
use crate::token::{self, TokenError};
use thiserror::Error;

/// Name of the cookie carrying the session identifier.
pub const SESSION_COOKIE: &str = "SESSION_ID";

/// Terminal outcome of one successful invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// No usable session cookie arrived; a record was created.
    New { id: String, record: SessionRecord },
    /// The cookie named an existing record, which has been updated.
    Active { id: String, record: SessionRecord },
}

/// Failures surfaced by the lifecycle.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The cookie references an id with no backing record file. No cookie
    /// is re-issued and no file is created; the client is told its
    /// session was lost.
    #[error("session cookie references {id} but no record exists")]
    DanglingSession { id: String },

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Drive one invocation's session lifecycle.
///
/// Pure with respect to process state: everything observable flows in
/// through `cookie_header` and the store.
pub fn run(
    store: &SessionStore,
    cookie_header: Option<&str>,
) -> Result<SessionOutcome, SessionError> {
    let cookies = cookie_header.map(cookie::parse).unwrap_or_default();
    match cookies.get(SESSION_COOKIE) {
        None => start_session(store),
        Some(id) if !store.exists(id) => {
            tracing::warn!(id = %id, "cookie references a session with no backing record");
            Err(SessionError::DanglingSession { id: id.clone() })
        }
        Some(id) => revisit_session(store, id),
    }
}

fn start_session(store: &SessionStore) -> Result<SessionOutcome, SessionError> {
    let id = token::mint()?;
    match store.create(&id) {
        Ok(record) => Ok(SessionOutcome::New { id, record }),
        Err(StoreError::AlreadyExists { .. }) => {
            // Issuer collision; retried once with a fresh id, a second
            // collision propagates.
            tracing::warn!(id = %id, "freshly minted id collided, minting a replacement");
            let id = token::mint()?;
            let record = store.create(&id)?;
            Ok(SessionOutcome::New { id, record })
        }
        Err(e) => Err(e.into()),
    }
}

fn revisit_session(store: &SessionStore, id: &str) -> Result<SessionOutcome, SessionError> {
    let record = store.with_lock(id, |store| {
        let mut record = store.load(id)?;
        record.touch();
        store.save(id, &record)?;
        Ok(record)
    })?;
    tracing::debug!(id = %id, visits = record.visits, "session revisited");
    Ok(SessionOutcome::Active {
        id: id.to_string(),
        record,
    })
}

/// Render a successful outcome as a CGI response.
pub fn render(outcome: &SessionOutcome) -> Response {
    match outcome {
        SessionOutcome::New { id, record } => Response::text(format!(
            "=== New Session Created ===\nSession ID: {id}\n{}\n",
            pretty(record)
        ))
        .with_cookie(
            CookieDirective::new(SESSION_COOKIE, id)
                .with_path("/")
                .http_only(),
        ),
        SessionOutcome::Active { id, record } => Response::text(format!(
            "=== Active Session ===\nSession ID: {id}\n{}\n",
            pretty(record)
        )),
    }
}

/// Render a lifecycle failure as an explicit diagnostic response.
///
/// Lock timeouts get their own retryable wording, distinct from hard
/// store failures. Token errors are fatal to the invocation and are
/// expected to abort the process instead of passing through here.
pub fn render_error(error: &SessionError) -> Response {
    let body = match error {
        SessionError::DanglingSession { .. } => {
            "ERROR: Session cookie exists but session file missing.\n".to_string()
        }
        SessionError::Store(StoreError::LockTimeout { .. }) => {
            "ERROR: Session record is busy, please retry.\n".to_string()
        }
        SessionError::Store(e) => format!("ERROR: Session store failure: {e}\n"),
        SessionError::Token(e) => format!("ERROR: {e}\n"),
    };
    Response::text(body)
}

fn pretty(record: &SessionRecord) -> String {
    serde_json::to_string_pretty(record).unwrap_or_else(|_| "{}".to_string())
}
