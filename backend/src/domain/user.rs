//! User account model and its validated components.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors for user fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyUsername,
    UsernameTooShort { min: usize },
    UsernameTooLong { max: usize },
    UsernameInvalidCharacters,
    InvalidEmail,
    PasswordTooShort { min: usize },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooShort { min } => {
                write!(f, "username must be at least {min} characters")
            }
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => {
                write!(f, "username may only contain letters, numbers, or underscores")
            }
            Self::InvalidEmail => write!(f, "email address is not valid"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 32;
/// Minimum allowed length for a raw password.
pub const PASSWORD_MIN: usize = 8;

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length is enforced separately; this constrains allowed characters.
        Regex::new("^[A-Za-z0-9_]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

/// Unique handle identifying a user publicly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        let length = value.chars().count();
        if length < USERNAME_MIN {
            return Err(UserValidationError::UsernameTooShort { min: USERNAME_MIN });
        }
        if length > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !username_regex().is_match(&value) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
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

/// Email address used for login and notifications.
///
/// Validation is structural only (one `@`, non-empty local and domain parts,
/// no whitespace); deliverability is not this layer's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`].
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        if value.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        let Some((local, domain)) = value.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Persisted user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: Username,
    pub email: Email,
    /// Bcrypt digest of the password; never the raw credential.
    pub password_hash: String,
    pub bio: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated registration input, carrying the raw password until the service
/// layer hashes it.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub username: Username,
    pub email: Email,
    pub password: String,
}

impl UserDraft {
    /// Validate registration input.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let password = password.into();
        if password.chars().count() < PASSWORD_MIN {
            return Err(UserValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self {
            username: Username::new(username)?,
            email: Email::new(email)?,
            password,
        })
    }
}

/// Partial update to an existing account; absent fields keep current values.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<Username>,
    pub email: Option<Email>,
    pub password: Option<String>,
    pub bio: Option<String>,
    pub image: Option<Option<String>>,
}

impl UserChanges {
    /// True when no field is set.
    pub const fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.bio.is_none()
            && self.image.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("jake")]
    #[case("jake_92")]
    #[case("J4K")]
    fn username_accepts_valid_handles(#[case] value: &str) {
        assert!(Username::new(value).is_ok());
    }

    #[rstest]
    #[case("", UserValidationError::EmptyUsername)]
    #[case("ab", UserValidationError::UsernameTooShort { min: USERNAME_MIN })]
    #[case("has space", UserValidationError::UsernameInvalidCharacters)]
    #[case("émile", UserValidationError::UsernameInvalidCharacters)]
    fn username_rejects_invalid_handles(
        #[case] value: &str,
        #[case] expected: UserValidationError,
    ) {
        assert_eq!(Username::new(value).unwrap_err(), expected);
    }

    #[rstest]
    fn username_rejects_overlong_handles() {
        let value = "a".repeat(USERNAME_MAX + 1);
        assert_eq!(
            Username::new(value).unwrap_err(),
            UserValidationError::UsernameTooLong { max: USERNAME_MAX }
        );
    }

    #[rstest]
    #[case("jake@example.com")]
    #[case("j.k@sub.example.co")]
    fn email_accepts_plausible_addresses(#[case] value: &str) {
        assert!(Email::new(value).is_ok());
    }

    #[rstest]
    #[case("no-at-sign")]
    #[case("@example.com")]
    #[case("jake@")]
    #[case("jake @example.com")]
    #[case("jake@ex@ample.com")]
    fn email_rejects_malformed_addresses(#[case] value: &str) {
        assert_eq!(
            Email::new(value).unwrap_err(),
            UserValidationError::InvalidEmail
        );
    }

    #[rstest]
    fn draft_rejects_short_passwords() {
        let result = UserDraft::new("jake", "jake@example.com", "short");
        assert_eq!(
            result.unwrap_err(),
            UserValidationError::PasswordTooShort { min: PASSWORD_MIN }
        );
    }

    #[rstest]
    fn draft_accepts_valid_registration() {
        let draft = UserDraft::new("jake", "jake@example.com", "hunter2hunter2").expect("valid");
        assert_eq!(draft.username.as_ref(), "jake");
        assert_eq!(draft.email.as_ref(), "jake@example.com");
    }
}
