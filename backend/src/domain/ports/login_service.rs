//! Driving port for operator authentication.
//!
//! Operator accounts belong to the hosting portal. Inbound adapters call this
//! port to turn credentials into an [`Operator`] without knowing where the
//! accounts live.

use std::fmt;

use async_trait::async_trait;
use constant_time_eq::constant_time_eq;
use zeroize::Zeroizing;

use crate::domain::{Error, LoginCredentials, MANAGEMENT_RIGHT, Operator};

#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the signed-in operator.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Operator, Error>;
}

/// Single built-in operator: `admin` / `password`, holding the management
/// right. Used by tests, and by debug builds without a password file.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Operator, Error> {
        if credentials.username() == "admin" && credentials.password() == "password" {
            Ok(Operator::new("admin", vec![MANAGEMENT_RIGHT.to_owned()]))
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}

/// One operator whose login and password come from deployment settings.
#[derive(Clone)]
pub struct ConfiguredLoginService {
    login: String,
    password: Zeroizing<String>,
}

impl ConfiguredLoginService {
    /// Accept exactly `login` with `password`.
    pub fn new(login: impl Into<String>, password: Zeroizing<String>) -> Self {
        Self {
            login: login.into(),
            password,
        }
    }
}

impl fmt::Debug for ConfiguredLoginService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfiguredLoginService")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl LoginService for ConfiguredLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Operator, Error> {
        let password_matches =
            constant_time_eq(credentials.password().as_bytes(), self.password.as_bytes());
        if credentials.username() == self.login && password_matches {
            Ok(Operator::new(
                self.login.clone(),
                vec![MANAGEMENT_RIGHT.to_owned()],
            ))
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}
