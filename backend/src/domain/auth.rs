//! Authentication primitives: login credentials and account registration.
//!
//! Inbound payload parsing stays outside the domain; these constructors
//! validate raw strings before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::{EmailAddress, UserValidationError, Username};

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN: usize = 8;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use lightbox::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("ada", "hunter22").unwrap();
/// assert_eq!(creds.username(), "ada");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validation failures for account registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    /// Username or email failed value validation.
    #[error(transparent)]
    User(#[from] UserValidationError),
    /// Password shorter than [`PASSWORD_MIN`].
    #[error("This password is too short. It must contain at least {min} characters.")]
    PasswordTooShort { min: usize },
    /// Confirmation does not match the password.
    #[error("The two password fields didn't match.")]
    PasswordMismatch,
}

impl RegistrationValidationError {
    /// Form field the error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::User(inner) => inner.field(),
            Self::PasswordTooShort { .. } => "password",
            Self::PasswordMismatch => "passwordConfirmation",
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::User(_) => "invalid",
            Self::PasswordTooShort { .. } => "password_too_short",
            Self::PasswordMismatch => "password_mismatch",
        }
    }
}

/// Validated registration payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    email: Option<EmailAddress>,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate a sign-up form.
    ///
    /// # Examples
    /// ```
    /// use lightbox::domain::{Registration, RegistrationValidationError};
    ///
    /// let err = Registration::try_from_parts("ada", None, "longenough", "different")
    ///     .unwrap_err();
    /// assert_eq!(err, RegistrationValidationError::PasswordMismatch);
    /// ```
    pub fn try_from_parts(
        username: &str,
        email: Option<&str>,
        password: &str,
        password_confirmation: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let username = Username::new(username)?;
        let email = EmailAddress::parse_optional(email)?;
        if password.chars().count() < PASSWORD_MIN {
            return Err(RegistrationValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if password != password_confirmation {
            return Err(RegistrationValidationError::PasswordMismatch);
        }
        Ok(Self {
            username,
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
