//! Port for one-way password hashing.

use super::define_port_error;

define_port_error! {
    /// Errors raised while hashing or checking passwords.
    pub enum PasswordHashError {
        /// Hashing backend failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// Stored hash could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Hashes and verifies passwords. Implementations are CPU-bound; async
/// callers should run them on the blocking pool.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produce a self-describing hash string for `password`.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Check `password` against a hash produced by [`PasswordHasher::hash`].
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;
}
