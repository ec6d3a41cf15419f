//! User account model.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AssetId;

/// Maximum username length in characters.
pub const USERNAME_MAX: usize = 150;
/// Maximum length of a first or last name.
pub const PERSONAL_NAME_MAX: usize = 150;
/// Maximum email address length.
pub const EMAIL_MAX: usize = 254;
/// Maximum biography length in characters.
pub const BIO_MAX: usize = 500;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyUsername,
    UsernameTooLong { max: usize },
    UsernameInvalidCharacters,
    InvalidEmail,
    EmailTooLong { max: usize },
    NameTooLong { max: usize },
    BioTooLong { max: usize },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, numbers, and @/./+/-/_ characters",
            ),
            Self::InvalidEmail => write!(f, "Enter a valid email address."),
            Self::EmailTooLong { max } => {
                write!(f, "email address must be at most {max} characters")
            }
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::BioTooLong { max } => write!(f, "bio must be at most {max} characters"),
        }
    }
}

impl std::error::Error for UserValidationError {}

impl UserValidationError {
    /// Form field the error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::InvalidId => "id",
            Self::EmptyUsername | Self::UsernameTooLong { .. } | Self::UsernameInvalidCharacters => {
                "username"
            }
            Self::InvalidEmail | Self::EmailTooLong { .. } => "email",
            Self::NameTooLong { .. } => "name",
            Self::BioTooLong { .. } => "bio",
        }
    }
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        Regex::new(r"^[\w.@+-]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Login name, unique across accounts.
///
/// # Examples
/// ```
/// use lightbox::domain::Username;
///
/// let name = Username::new("  ada.l ").expect("valid username");
/// assert_eq!(name.as_ref(), "ada.l");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Trim, validate, and construct a username.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !username_regex().is_match(trimmed) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Email address with a lower-cased domain part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Trim, validate, and normalise an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        let normalised = match trimmed.rsplit_once('@') {
            Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
            None => return Err(UserValidationError::InvalidEmail),
        };
        Ok(Self(normalised))
    }

    /// Parse an optional form value; blank input means "no email".
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<Self>, UserValidationError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => Self::new(value).map(Some),
        }
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validate a first or last name, returning the trimmed value.
pub fn personal_name(raw: &str) -> Result<String, UserValidationError> {
    let trimmed = raw.trim();
    if trimmed.chars().count() > PERSONAL_NAME_MAX {
        return Err(UserValidationError::NameTooLong {
            max: PERSONAL_NAME_MAX,
        });
    }
    Ok(trimmed.to_owned())
}

/// Validate a biography, which may be empty.
pub fn biography(raw: &str) -> Result<String, UserValidationError> {
    if raw.chars().count() > BIO_MAX {
        return Err(UserValidationError::BioTooLong { max: BIO_MAX });
    }
    Ok(raw.to_owned())
}

/// Registered account.
///
/// ## Invariants
/// - `username` is unique across accounts.
/// - `email`, when present, is unique across accounts.
/// - Deleting the user deletes every project it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Option<EmailAddress>,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub avatar: Option<AssetId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh account with empty profile fields.
    pub fn new(username: Username, email: Option<EmailAddress>, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::random(),
            username,
            email,
            first_name: String::new(),
            last_name: String::new(),
            bio: String::new(),
            avatar: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// "First Last" when both names are set, otherwise the username.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use lightbox::domain::{User, Username};
    ///
    /// let mut user = User::new(Username::new("ada").unwrap(), None, Utc::now());
    /// assert_eq!(user.full_name(), "ada");
    /// user.first_name = "Ada".into();
    /// user.last_name = "Lovelace".into();
    /// assert_eq!(user.full_name(), "Ada Lovelace");
    /// ```
    pub fn full_name(&self) -> String {
        if !self.first_name.is_empty() && !self.last_name.is_empty() {
            format!("{} {}", self.first_name, self.last_name)
        } else {
            self.username.to_string()
        }
    }

    /// First name when set, otherwise the username.
    pub fn display_name(&self) -> String {
        if self.first_name.is_empty() {
            self.username.to_string()
        } else {
            self.first_name.clone()
        }
    }
}
