//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{AssetId, EmailAddress, User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the username.
        DuplicateUsername { username: String } => "username {username} is already taken",
        /// Another account already uses the email address.
        DuplicateEmail { email: String } => "email {email} is already in use",
    }
}

/// Stored login material for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub user_id: UserId,
    /// PHC-formatted password hash.
    pub password_hash: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account together with its password hash.
    async fn insert(&self, user: &User, password_hash: &str) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Look up login material by exact username.
    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// Owner of `email`, if any account uses it.
    async fn email_owner(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserId>, UserPersistenceError>;

    /// Overwrite the profile fields of an existing user.
    async fn update(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Delete a user and everything it owns.
    ///
    /// Returns every asset referenced by the removed rows: the avatar,
    /// project covers, and photo images.
    async fn delete(&self, id: &UserId) -> Result<Vec<AssetId>, UserPersistenceError>;
}
