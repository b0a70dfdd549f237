//! One-time password-reset tokens.
//!
//! The plaintext token only ever travels in the reset link; the store keeps
//! its SHA-256 digest.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// A freshly minted reset token and the digest to persist.
#[derive(Debug, Clone)]
pub struct ResetToken {
    /// 64 hex characters, sent to the member.
    pub plaintext: String,
    /// Hex SHA-256 of `plaintext`, stored on the user row.
    pub hash: String,
}

impl ResetToken {
    /// Mint a token with 244 bits of randomness.
    pub fn generate() -> Self {
        let plaintext = format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        );
        let hash = Self::digest(&plaintext);
        Self { plaintext, hash }
    }

    /// Digest a token presented by a client.
    pub fn digest(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }
}
