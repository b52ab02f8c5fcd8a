//! cookie-cgi - ad-hoc cookie control
//!
//! One-shot CGI program over the cookie setter: `set=<value>` stores the
//! demo cookie, `clear` expires it, and with neither parameter the
//! incoming cookie set is reported back. Independent of the session store.

use anyhow::Result;
use sessionfile_core::cgi::CgiRequest;
use sessionfile_core::logging;
use sessionfile_core::setter::{self, CookieAction};

fn main() {
    logging::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let request = CgiRequest::from_process()?;
    let action = CookieAction::from_request(&request);
    tracing::debug!(?action, "cookie action resolved");

    let response = setter::respond(&action, &request.cookies());

    let stdout = std::io::stdout();
    response.write_to(&mut stdout.lock())?;
    Ok(())
}
