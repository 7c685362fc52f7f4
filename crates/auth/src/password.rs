//! Password hashing (bcrypt).

use thiserror::Error;

/// bcrypt only reads the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("password exceeds {max} bytes")]
    TooLong { max: usize },

    #[error("password hashing failed: {0}")]
    Backend(String),
}

/// One-way, salted, adaptive password hashing.
///
/// Implementations hold no mutable state and may be called concurrently.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, HashError>;

    /// Returns `false` on mismatch or on an unreadable stored hash; never errors.
    fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(HashError::TooLong {
                max: MAX_PASSWORD_BYTES,
            });
        }
        bcrypt::hash(plaintext, self.cost).map_err(|e| HashError::Backend(e.to_string()))
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        bcrypt::verify(plaintext, hash).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> BcryptHasher {
        BcryptHasher::new(4)
    }

    #[test]
    fn hash_then_verify() {
        let h = hasher();
        let hash = h.hash("correct horse").unwrap();
        assert_ne!(hash, "correct horse");
        assert!(h.verify("correct horse", &hash));
        assert!(!h.verify("wrong horse", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let h = hasher();
        assert_ne!(h.hash("password123").unwrap(), h.hash("password123").unwrap());
    }

    #[test]
    fn rejects_instead_of_truncating() {
        let h = hasher();
        let long = "x".repeat(MAX_PASSWORD_BYTES + 1);
        assert_eq!(h.hash(&long), Err(HashError::TooLong { max: 72 }));

        let exact = "x".repeat(MAX_PASSWORD_BYTES);
        let hash = h.hash(&exact).unwrap();
        assert!(h.verify(&exact, &hash));
        assert!(!h.verify(&long, &hash));
    }

    #[test]
    fn garbage_hash_verifies_false() {
        assert!(!hasher().verify("password123", "not-a-bcrypt-hash"));
    }

    #[test]
    fn invalid_cost_is_backend_error() {
        let h = BcryptHasher::new(99);
        assert!(matches!(h.hash("password123"), Err(HashError::Backend(_))));
    }
}
