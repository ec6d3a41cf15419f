//! Driving ports for account registration and profile management.

use async_trait::async_trait;

use crate::domain::media::UploadSource;
use crate::domain::{Error, Registration, User, UserId};

/// Full replacement of the editable profile fields.
///
/// A missing or blank email clears the stored address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub bio: String,
}

/// Account mutations for the signed-in user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account. Usernames and email addresses are unique.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    async fn update_profile(&self, user_id: &UserId, update: ProfileUpdate)
    -> Result<User, Error>;

    /// Store a new avatar and delete the one it supersedes.
    async fn replace_avatar(&self, user_id: &UserId, source: UploadSource) -> Result<User, Error>;

    async fn clear_avatar(&self, user_id: &UserId) -> Result<User, Error>;

    /// Delete the account with its projects and photos, then clean up every
    /// asset they referenced.
    async fn delete_account(&self, user_id: &UserId) -> Result<(), Error>;
}

/// Profile reads for the signed-in user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Return the profile for the authenticated user.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error>;
}
