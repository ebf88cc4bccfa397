//! User data model.
//!
//! A [`User`] is a persisted row: a store-assigned [`UserId`] and a validated
//! [`UserName`]. Forms work on a [`UserDraft`] instead, which tolerates an
//! unsaved id and a name that has not been validated yet so rejected input can
//! be shown back to the operator.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default lower bound on name length, in characters.
pub const NAME_MIN_LENGTH: usize = 1;
/// Default upper bound on name length, in characters (the `nom` column width).
pub const NAME_MAX_LENGTH: usize = 255;

/// Validation errors for user identifiers and names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    /// The identifier was not a positive integer.
    #[error("user id must be a positive integer, got '{value}'")]
    InvalidId { value: String },
    /// The name was blank once trimmed.
    #[error("name must not be empty")]
    EmptyName,
    /// The name is shorter than the configured minimum.
    #[error("name must be at least {min} characters")]
    NameTooShort { min: usize },
    /// The name is longer than the configured maximum.
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    /// The name contains control characters.
    #[error("name must not contain control characters")]
    NameControlCharacters,
    /// The configured bounds are inconsistent.
    #[error("name length bounds are invalid: min {min}, max {max}")]
    InvalidBounds { min: usize, max: usize },
}

impl UserValidationError {
    /// Stable code reported alongside field errors.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId { .. } => "invalid_id",
            Self::EmptyName => "empty_name",
            Self::NameTooShort { .. } => "name_too_short",
            Self::NameTooLong { .. } => "name_too_long",
            Self::NameControlCharacters => "name_control_characters",
            Self::InvalidBounds { .. } => "invalid_bounds",
        }
    }
}

/// Store-assigned primary key (`id_user`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct UserId(i32);

impl UserId {
    /// Validate a raw key.
    pub fn new(raw: i32) -> Result<Self, UserValidationError> {
        if raw <= 0 {
            return Err(UserValidationError::InvalidId {
                value: raw.to_string(),
            });
        }
        Ok(Self(raw))
    }

    /// Parse the string-encoded `id` request parameter.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::UserId;
    ///
    /// assert_eq!(UserId::parse("42").map(UserId::get), Ok(42));
    /// assert!(UserId::parse("abc").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        let value = raw
            .trim()
            .parse::<i32>()
            .map_err(|_| UserValidationError::InvalidId {
                value: raw.to_owned(),
            })?;
        Self::new(value).map_err(|_| UserValidationError::InvalidId {
            value: raw.to_owned(),
        })
    }

    /// The raw key.
    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for UserId {
    type Error = UserValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for i32 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

/// A user name that satisfied [`NameRules`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    /// Wrap a name read back from storage. Storage only ever receives names
    /// that passed validation, so rows are trusted as they are.
    pub(crate) fn from_storage(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configured constraints on user names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameRules {
    min_length: usize,
    max_length: usize,
}

impl Default for NameRules {
    fn default() -> Self {
        Self {
            min_length: NAME_MIN_LENGTH,
            max_length: NAME_MAX_LENGTH,
        }
    }
}

impl NameRules {
    /// Build rules with explicit bounds; `min_length` must be at least 1 and
    /// not exceed `max_length`, which may not exceed the column width.
    pub fn new(min_length: usize, max_length: usize) -> Result<Self, UserValidationError> {
        if min_length == 0 || min_length > max_length || max_length > NAME_MAX_LENGTH {
            return Err(UserValidationError::InvalidBounds {
                min: min_length,
                max: max_length,
            });
        }
        Ok(Self {
            min_length,
            max_length,
        })
    }

    /// Minimum length in characters.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Maximum length in characters.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Validate submitted input.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::NameRules;
    ///
    /// let rules = NameRules::default();
    /// assert_eq!(rules.check("Nom1").map(|n| n.to_string()), Ok("Nom1".to_owned()));
    /// assert!(rules.check("   ").is_err());
    /// ```
    pub fn check(&self, raw: &str) -> Result<UserName, UserValidationError> {
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if raw.chars().any(char::is_control) {
            return Err(UserValidationError::NameControlCharacters);
        }
        let length = raw.chars().count();
        if length < self.min_length {
            return Err(UserValidationError::NameTooShort {
                min: self.min_length,
            });
        }
        if length > self.max_length {
            return Err(UserValidationError::NameTooLong {
                max: self.max_length,
            });
        }
        Ok(UserName(raw.to_owned()))
    }
}

/// Persisted user.
///
/// ## Invariants
/// - `id` was assigned by the store and never changes.
/// - `name` passed the rules in force when it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    id: UserId,
    name: UserName,
}

impl User {
    /// Combine a key and a validated name.
    pub fn new(id: UserId, name: UserName) -> Self {
        Self { id, name }
    }

    /// Primary key.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }
}

/// Working copy of a user held in the session while a form is open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<UserId>,
    #[serde(default)]
    name: String,
}

impl UserDraft {
    /// An empty, unsaved draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store-assigned key, absent until the draft has been inserted.
    pub fn id(&self) -> Option<UserId> {
        self.id
    }

    /// Name as last submitted.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Copy submitted fields onto the draft; absent fields are left alone.
    pub fn populate(&mut self, name: Option<&str>) {
        if let Some(name) = name {
            self.name = name.to_owned();
        }
    }

    /// Cut the name to at most `max_chars` characters.
    pub fn truncate_name(&mut self, max_chars: usize) {
        if let Some((cut, _)) = self.name.char_indices().nth(max_chars) {
            self.name.truncate(cut);
        }
    }

    /// Record the key the store generated on insert.
    pub fn assign_id(&mut self, id: UserId) {
        self.id = Some(id);
    }

    /// Validate the current name.
    pub fn validate(&self, rules: &NameRules) -> Result<UserName, UserValidationError> {
        rules.check(&self.name)
    }
}

impl From<User> for UserDraft {
    fn from(user: User) -> Self {
        Self {
            id: Some(user.id),
            name: user.name.0,
        }
    }
}
