//! Admin password gate.

use sha2::{Digest, Sha256};

/// SHA-256 hex digest of the stock admin password ("admin123")
pub const DEFAULT_ADMIN_DIGEST: &str =
    "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9";

/// Decides whether a password unlocks admin actions.
pub trait CredentialCheck {
    fn verify(&self, password: &str) -> bool;
}

/// Returns the lowercase hex SHA-256 digest of `password`.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A single shared password, stored only as its SHA-256 digest
#[derive(Debug, Clone)]
pub struct Sha256Password {
    digest: String,
}

impl Sha256Password {
    pub fn new(digest: impl Into<String>) -> Self {
        Self {
            digest: digest.into().trim().to_lowercase(),
        }
    }
}

impl Default for Sha256Password {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_DIGEST)
    }
}

impl CredentialCheck for Sha256Password {
    fn verify(&self, password: &str) -> bool {
        hash_password(password) == self.digest
    }
}
