//! Account domain services: registration, login, and profile management.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::asset_lifecycle::AssetLifecycle;
use crate::domain::media::{MediaPipeline, UploadSource};
use crate::domain::ports::{
    AccountCommand, AssetFolder, AssetStore, LoginService, PasswordHasher, ProfileUpdate,
    UserProfileQuery, UserRepository,
};
use crate::domain::service_support::{
    EMAIL_IN_USE, USERNAME_TAKEN, field_error, map_hash_error, map_store_error, map_user_error,
    persist_source, validate_upload,
};
use crate::domain::{
    EmailAddress, Error, LoginCredentials, Registration, TraceId, User, UserId, Username,
    biography, personal_name,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Account service implementing the login, profile, and account ports.
pub struct AccountService<U, H, S: ?Sized> {
    users: Arc<U>,
    hasher: Arc<H>,
    lifecycle: AssetLifecycle<S>,
    media: MediaPipeline,
    clock: Arc<dyn Clock>,
}

impl<U, H, S: ?Sized> Clone for AccountService<U, H, S> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            hasher: Arc::clone(&self.hasher),
            lifecycle: self.lifecycle.clone(),
            media: self.media.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<U, H, S> AccountService<U, H, S>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
    S: AssetStore + ?Sized,
{
    pub fn new(
        users: Arc<U>,
        hasher: Arc<H>,
        lifecycle: AssetLifecycle<S>,
        media: MediaPipeline,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            lifecycle,
            media,
            clock,
        }
    }

    async fn load(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    async fn ensure_email_free(
        &self,
        email: &EmailAddress,
        current: Option<&UserId>,
    ) -> Result<(), Error> {
        let owner = self.users.email_owner(email).await.map_err(map_user_error)?;
        match owner {
            Some(owner) if Some(&owner) != current => {
                Err(field_error(EMAIL_IN_USE, "email", "duplicate_email"))
            }
            _ => Ok(()),
        }
    }

    async fn hash_password(&self, password: Zeroizing<String>) -> Result<String, Error> {
        let hasher = Arc::clone(&self.hasher);
        TraceId::spawn_blocking(move || hasher.hash(password.as_str()))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(map_hash_error)
    }

    async fn verify_password(
        &self,
        password: Zeroizing<String>,
        hash: String,
    ) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        TraceId::spawn_blocking(move || hasher.verify(password.as_str(), &hash))
            .await
            .map_err(|err| Error::internal(format!("password check task failed: {err}")))?
            .map_err(map_hash_error)
    }

    async fn save(&self, user: &User) -> Result<(), Error> {
        self.users.update(user).await.map_err(map_user_error)
    }
}

#[async_trait]
impl<U, H, S> LoginService for AccountService<U, H, S>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
    S: AssetStore + ?Sized,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let Ok(username) = Username::new(credentials.username()) else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let Some(stored) = self
            .users
            .find_credentials(&username)
            .await
            .map_err(map_user_error)?
        else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let password = Zeroizing::new(credentials.password().to_owned());
        if self.verify_password(password, stored.password_hash).await? {
            Ok(stored.user_id)
        } else {
            Err(Error::unauthorized(INVALID_CREDENTIALS))
        }
    }
}

#[async_trait]
impl<U, H, S> UserProfileQuery for AccountService<U, H, S>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
    S: AssetStore + ?Sized,
{
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.load(user_id).await
    }
}

#[async_trait]
impl<U, H, S> AccountCommand for AccountService<U, H, S>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
    S: AssetStore + ?Sized,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        if self
            .users
            .find_credentials(registration.username())
            .await
            .map_err(map_user_error)?
            .is_some()
        {
            return Err(field_error(USERNAME_TAKEN, "username", "duplicate_username"));
        }
        if let Some(email) = registration.email() {
            self.ensure_email_free(email, None).await?;
        }

        let hash = self
            .hash_password(Zeroizing::new(registration.password().to_owned()))
            .await?;
        let user = User::new(
            registration.username().clone(),
            registration.email().cloned(),
            self.clock.utc(),
        );
        self.users
            .insert(&user, &hash)
            .await
            .map_err(map_user_error)?;

        info!(user_id = %user.id, username = %user.username, "registered account");
        Ok(user)
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        let invalid = |err: crate::domain::UserValidationError, field: &str| {
            field_error(err.to_string(), field, "invalid")
        };
        let first_name = personal_name(&update.first_name).map_err(|e| invalid(e, "firstName"))?;
        let last_name = personal_name(&update.last_name).map_err(|e| invalid(e, "lastName"))?;
        let bio = biography(&update.bio).map_err(|e| invalid(e, "bio"))?;
        let email = EmailAddress::parse_optional(update.email.as_deref())
            .map_err(|e| invalid(e, "email"))?;

        let mut user = self.load(user_id).await?;
        if let Some(email) = email.as_ref() {
            self.ensure_email_free(email, Some(user_id)).await?;
        }

        user.first_name = first_name;
        user.last_name = last_name;
        user.bio = bio;
        user.email = email;
        user.updated_at = self.clock.utc();
        self.save(&user).await?;
        Ok(user)
    }

    async fn replace_avatar(&self, user_id: &UserId, source: UploadSource) -> Result<User, Error> {
        let mut user = self.load(user_id).await?;
        let source = validate_upload(&self.media, source, "image").await?;
        let store = self.lifecycle.store().as_ref();
        let (avatar, fresh) = persist_source(store, source, AssetFolder::Avatars)
            .await
            .map_err(map_store_error)?;

        self.lifecycle
            .on_replaced(user.avatar.as_ref(), Some(&avatar))
            .await;
        user.avatar = Some(avatar);
        user.updated_at = self.clock.utc();
        if let Err(error) = self.save(&user).await {
            if fresh {
                self.lifecycle.on_destroyed(user.avatar).await;
            }
            return Err(error);
        }
        Ok(user)
    }

    async fn clear_avatar(&self, user_id: &UserId) -> Result<User, Error> {
        let mut user = self.load(user_id).await?;
        self.lifecycle.on_replaced(user.avatar.as_ref(), None).await;
        user.avatar = None;
        user.updated_at = self.clock.utc();
        self.save(&user).await?;
        Ok(user)
    }

    async fn delete_account(&self, user_id: &UserId) -> Result<(), Error> {
        let assets = self.users.delete(user_id).await.map_err(map_user_error)?;
        info!(%user_id, assets = assets.len(), "deleted account");
        self.lifecycle.on_destroyed(assets).await;
        Ok(())
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
