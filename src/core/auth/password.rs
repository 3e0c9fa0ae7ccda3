//! Password hashing behind a verifier seam
//!
//! The hashing scheme is bcrypt; the rest of the auth core only sees
//! [`PasswordVerifier::verify`].

use std::sync::OnceLock;

/// Cost factor for bcrypt hashing (12 is recommended for production)
pub const BCRYPT_COST: u32 = 12;

/// Password hashing errors
#[derive(Debug, thiserror::Error)]
#[error("Password hashing failed: {0}")]
pub struct HashingError(String);

/// Compares a plaintext password with a stored hash
pub trait PasswordVerifier: Send + Sync {
    /// True when the password matches. A malformed hash is a mismatch.
    fn verify(&self, password: &str, hash: &str) -> bool;

    /// A hash that no real password is expected to match, used to keep
    /// the unknown-email path as slow as the wrong-password path.
    fn dummy_hash(&self) -> &str;
}

/// bcrypt-backed verifier
pub struct BcryptVerifier {
    cost: u32,
    dummy: OnceLock<String>,
}

impl BcryptVerifier {
    pub fn new() -> Self {
        Self::with_cost(BCRYPT_COST)
    }

    /// Lower costs keep tests fast; production uses [`BCRYPT_COST`]
    pub fn with_cost(cost: u32) -> Self {
        Self {
            cost,
            dummy: OnceLock::new(),
        }
    }

    /// Hash a password with automatic salt generation
    pub fn hash(&self, password: &str) -> Result<String, HashingError> {
        bcrypt::hash(password, self.cost).map_err(|e| HashingError(e.to_string()))
    }
}

impl Default for BcryptVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordVerifier for BcryptVerifier {
    fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!("Stored password hash could not be parsed: {}", e);
                false
            }
        }
    }

    fn dummy_hash(&self) -> &str {
        self.dummy.get_or_init(|| {
            // An out-of-range cost leaves an empty hash, which never verifies.
            bcrypt::hash("wedding-admin-dummy-password", self.cost).unwrap_or_default()
        })
    }
}
