//! Session identifier minting
//!
//! Identifiers name session record files and are handed to clients as
//! cookie values, so they must be unpredictable and collision-resistant.
//! Each token is 128 bits read from the operating system's randomness
//! source, laid out in canonical version-4 UUID text form. Process identity
//! and the clock never feed into a token.

use thiserror::Error;

/// Failure to mint an identifier.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The OS randomness source could not be read. Fatal to the
    /// invocation: without entropy no trustworthy identifier exists.
    #[error("system randomness source unavailable: {0}")]
    EntropyUnavailable(getrandom::Error),
}

/// Mint a fresh opaque session identifier.
///
/// # Errors
///
/// Returns [`TokenError::EntropyUnavailable`] if the randomness source
/// cannot be read.
pub fn mint() -> Result<String, TokenError> {
    let mut bytes = [0u8; 16];
    getrandom::fill(&mut bytes).map_err(TokenError::EntropyUnavailable)?;
    Ok(uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .to_string())
}
