//! session-cgi - per-request session tracking
//!
//! Invoked once per request by the webserver: request metadata arrives in
//! the environment (`HTTP_COOKIE` in particular), the response leaves on
//! stdout as a header block, a blank line, and a plain-text body. Session
//! state lives in the file-backed store; failures involving the store are
//! reported in the body, not the exit code, because the collaborator never
//! surfaces exit codes to the client.

use anyhow::Result;
use sessionfile_core::cgi::CgiRequest;
use sessionfile_core::controller::{self, SessionError};
use sessionfile_core::{logging, Config, SessionStore};

fn main() {
    logging::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::resolve();
    let store = SessionStore::new(&config);
    tracing::debug!(dir = %store.session_dir().display(), "session store resolved");

    let request = CgiRequest::from_process()?;

    let response = match controller::run(&store, request.cookie_header()) {
        Ok(outcome) => controller::render(&outcome),
        // Without entropy there is no identifier worth answering with;
        // fail the invocation instead of rendering a body.
        Err(SessionError::Token(e)) => return Err(e.into()),
        Err(e) => controller::render_error(&e),
    };

    let stdout = std::io::stdout();
    response.write_to(&mut stdout.lock())?;
    Ok(())
}
