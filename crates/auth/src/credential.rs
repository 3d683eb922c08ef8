//! API credentials: generation and at-rest digests.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// Raw entropy per key (256 bits).
pub const API_KEY_BYTES: usize = 32;

/// Plaintext API key, handed to the caller once at creation time.
///
/// `Debug` is redacted so keys do not end up in logs by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Generate a fresh key from the OS CSPRNG, URL-safe base64 without padding.
    pub fn generate() -> Self {
        let mut bytes = [0u8; API_KEY_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn digest(&self) -> CredentialDigest {
        CredentialDigest::of(&self.0)
    }
}

impl core::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// SHA-256 of a credential; the only form the identity store keeps.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CredentialDigest([u8; 32]);

impl CredentialDigest {
    pub fn of(raw: &str) -> Self {
        let hash = Sha256::digest(raw.as_bytes());
        let mut out = [0u8; 32];
        out.copy_from_slice(&hash);
        Self(out)
    }
}

impl core::fmt::Display for CredentialDigest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}
