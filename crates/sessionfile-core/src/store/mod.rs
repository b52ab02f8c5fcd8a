//! File-backed session store
//!
//! One JSON record per session id under a configured directory. The store
//! protects two invariants:
//!
//! - **Atomic visibility**: `save` stages to a temporary path and renames
//!   into place, so a crash mid-write never leaves a truncated record
//!   visible to a later `load`.
//! - **No lost updates**: `with_lock` holds an exclusive per-id advisory
//!   lock across a whole load-modify-save sequence. Concurrent invocations
//!   touching the same id serialize on the lock; distinct ids never
//!   contend.

pub mod error;
pub mod lock;
pub mod record;
mod session;

pub use error::StoreError;
pub use record::SessionRecord;
pub use session::SessionStore;
