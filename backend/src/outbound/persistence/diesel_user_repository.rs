//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{StoredCredentials, UserPersistenceError, UserRepository};
use crate::domain::{AssetId, EmailAddress, User, UserId, Username};

use super::diesel_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, violated_unique_constraint,
};
use super::models::{CredentialsRow, NewUserRow, UserRow, UserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{photos, projects, users};

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Translate unique violations on username or email into their dedicated
/// variants.
fn map_write_error(error: diesel::result::Error, user: &User) -> UserPersistenceError {
    match violated_unique_constraint(&error) {
        Some(USERNAME_CONSTRAINT) => UserPersistenceError::duplicate_username(user.username.as_ref()),
        Some(EMAIL_CONSTRAINT) => {
            let email: &str = user.email.as_ref().map_or("", AsRef::as_ref);
            UserPersistenceError::duplicate_email(email)
        }
        _ => map_diesel_error(error),
    }
}

fn parse_asset(raw: String) -> Result<AssetId, UserPersistenceError> {
    AssetId::new(raw).map_err(|err| UserPersistenceError::query(err.to_string()))
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let UserRow {
        id,
        username,
        email,
        first_name,
        last_name,
        bio,
        avatar,
        created_at,
        updated_at,
    } = row;

    let invalid = |err: crate::domain::UserValidationError| {
        UserPersistenceError::query(format!("stored user {id} is invalid: {err}"))
    };
    Ok(User {
        id: UserId::from_uuid(id),
        username: Username::new(username).map_err(invalid)?,
        email: email.map(EmailAddress::new).transpose().map_err(invalid)?,
        first_name,
        last_name,
        bio,
        avatar: avatar.map(parse_asset).transpose()?,
        created_at,
        updated_at,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User, password_hash: &str) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *user.id.as_uuid(),
            username: user.username.as_ref(),
            email: user.email.as_ref().map(AsRef::as_ref),
            password_hash,
            first_name: &user.first_name,
            last_name: &user.last_name,
            bio: &user.bio,
            avatar: user.avatar.as_ref().map(AssetId::as_str),
            created_at: user.created_at,
            updated_at: user.updated_at,
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, user))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::username.eq(username.as_ref()))
            .select(CredentialsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(|row| StoredCredentials {
            user_id: UserId::from_uuid(row.id),
            password_hash: row.password_hash,
        }))
    }

    async fn email_owner(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserId>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let owner = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(users::id)
            .first::<uuid::Uuid>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(owner.map(UserId::from_uuid))
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = UserUpdate {
            email: user.email.as_ref().map(AsRef::as_ref),
            first_name: &user.first_name,
            last_name: &user.last_name,
            bio: &user.bio,
            avatar: user.avatar.as_ref().map(AssetId::as_str),
            updated_at: user.updated_at,
        };

        let updated = diesel::update(users::table.filter(users::id.eq(user.id.as_uuid())))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err, user))?;

        if updated == 0 {
            return Err(UserPersistenceError::query(format!(
                "user {} no longer exists",
                user.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<Vec<AssetId>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_id = *id.as_uuid();

        // Gather every asset reference before the cascade removes the rows.
        let raw_assets = conn
            .transaction(|conn| {
                async move {
                    let avatar = users::table
                        .filter(users::id.eq(user_id))
                        .select(users::avatar)
                        .first::<Option<String>>(conn)
                        .await
                        .optional()?
                        .flatten();

                    let covers = projects::table
                        .filter(projects::owner_id.eq(user_id))
                        .filter(projects::cover.is_not_null())
                        .select(projects::cover)
                        .load::<Option<String>>(conn)
                        .await?;

                    let owned_projects = projects::table
                        .filter(projects::owner_id.eq(user_id))
                        .select(projects::id);
                    let images = photos::table
                        .filter(photos::project_id.eq_any(owned_projects))
                        .order((photos::display_order.asc(), photos::uploaded_at.asc()))
                        .select(photos::image)
                        .load::<String>(conn)
                        .await?;

                    diesel::delete(users::table.filter(users::id.eq(user_id)))
                        .execute(conn)
                        .await?;

                    Ok::<_, diesel::result::Error>(
                        avatar
                            .into_iter()
                            .chain(covers.into_iter().flatten())
                            .chain(images)
                            .collect::<Vec<_>>(),
                    )
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        raw_assets.into_iter().map(parse_asset).collect()
    }
}
