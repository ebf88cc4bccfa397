//! Back-office operators and login credentials.
//!
//! The portal owns operator accounts; this module only carries what the user
//! pages need at the boundary: who is signed in and which rights they hold.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Right required to use the admin user pages.
pub const MANAGEMENT_RIGHT: &str = "TESTMOUSSIA_MANAGEMENT";

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

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty and kept verbatim; it is zeroed on drop.
///
/// # Examples
/// ```
/// use backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" admin ", "password").unwrap();
/// assert_eq!(creds.username(), "admin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
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

    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// A signed-in back-office operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    login: String,
    rights: Vec<String>,
}

impl Operator {
    pub fn new(login: impl Into<String>, rights: Vec<String>) -> Self {
        Self {
            login: login.into(),
            rights,
        }
    }

    pub fn login(&self) -> &str {
        self.login.as_str()
    }

    /// Whether the operator holds `right`.
    pub fn has_right(&self, right: &str) -> bool {
        self.rights.iter().any(|held| held == right)
    }
}
