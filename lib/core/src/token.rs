//! Opaque random tokens.
//!
//! Tokens are drawn from the operating system's CSPRNG and encoded as
//! unpadded base64url, so they are safe to place in cookies and URLs.

use crate::Result;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::fmt;

/// The operating system could not supply random bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomnessUnavailable {
    /// The reason reported by the OS.
    pub reason: String,
}

impl fmt::Display for RandomnessUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "secure randomness unavailable: {}", self.reason)
    }
}

impl std::error::Error for RandomnessUnavailable {}

/// Generates a token from `byte_len` random bytes.
///
/// # Errors
///
/// Returns `RandomnessUnavailable` if the OS random source fails.
pub fn random_token(byte_len: usize) -> Result<String, RandomnessUnavailable> {
    let mut bytes = vec![0u8; byte_len];
    getrandom::fill(&mut bytes).map_err(|e| RandomnessUnavailable {
        reason: e.to_string(),
    })?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
