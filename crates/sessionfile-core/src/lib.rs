//! Core types and operations for sessionfile
//!
//! This crate implements durable per-client sessions for a request model in
//! which every request is handled by an independent, memory-isolated process
//! invocation. The only shared resource is a directory of one JSON record
//! per session id; all read-modify-write sequences on a record go through an
//! exclusive per-id file lock so that concurrent invocations never lose
//! updates.
//!
//! The pieces:
//!
//! - [`cookie`]: parse the incoming `Cookie:` header, serialize outgoing
//!   `Set-Cookie` directives
//! - [`token`]: mint unpredictable opaque session identifiers
//! - [`store`]: the file-backed session store (atomic writes, per-id locks)
//! - [`controller`]: per-invocation session lifecycle (new / active / error)
//! - [`setter`]: set, clear, or report a standalone demo cookie
//! - [`cgi`] and [`response`]: the one-shot process boundary (environment
//!   map + stdin in, header block + body out)

pub mod cgi;
pub mod config;
pub mod controller;
pub mod cookie;
pub mod logging;
pub mod response;
pub mod setter;
pub mod store;
pub mod token;

pub use config::Config;
pub use response::Response;
pub use store::{SessionRecord, SessionStore, StoreError};
