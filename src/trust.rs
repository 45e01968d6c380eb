//! Per-process trust token.
//!
//! One secret is generated when the process first needs it and lives until
//! the process exits. Every URI the encoder emits carries it; the decoder
//! honors sensitive fields only when the embedded value matches. The token is
//! never persisted and never derived from descriptor content.

use base64::Engine;
use std::fmt;
use std::sync::OnceLock;
use subtle::ConstantTimeEq;

use crate::error::CodecError;

/// Entropy per token: 256 bits.
const TOKEN_BYTES: usize = 32;

/// Length of the encoded token (unpadded URL-safe base64 of `TOKEN_BYTES`).
pub const TOKEN_LEN: usize = 43;

/// Opaque shared secret proving a URI was produced by this process.
///
/// Only equality is meaningful. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct TrustToken(String);

impl TrustToken {
    /// Draw a fresh token from the OS secure random source.
    pub fn generate() -> Result<Self, CodecError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        getrandom::fill(&mut bytes)?;
        Ok(Self(
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes),
        ))
    }

    /// The single token for this process, generated on first use.
    ///
    /// Fails only if the random source is unavailable on that first call;
    /// callers should treat such a failure as fatal at startup.
    pub fn process() -> Result<&'static TrustToken, CodecError> {
        static TOKEN: OnceLock<TrustToken> = OnceLock::new();
        if let Some(token) = TOKEN.get() {
            return Ok(token);
        }
        let fresh = Self::generate()?;
        // A concurrent first call may win the race; both callers then read
        // the winner, so the process still sees exactly one token.
        Ok(TOKEN.get_or_init(|| fresh))
    }

    /// Wrap a known secret. Intended for tests and for hosts that manage
    /// token generation themselves.
    pub fn from_secret(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against a token read from an untrusted URI.
    ///
    /// Runs in time independent of where the first differing byte is.
    pub fn matches(&self, candidate: &str) -> bool {
        bool::from(self.0.as_bytes().ct_eq(candidate.as_bytes()))
    }
}

impl fmt::Debug for TrustToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TrustToken(<redacted>)")
    }
}
