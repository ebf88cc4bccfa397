//! Application settings loaded via OrthoConfig.
//!
//! Values come from `MOUSSIA_*` environment variables, an optional
//! configuration file and command-line flags, in increasing precedence.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{NAME_MAX_LENGTH, NAME_MIN_LENGTH, NameRules, UserValidationError};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_ADMIN_LOGIN: &str = "admin";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid name length bounds: {0}")]
    NameRules(#[from] UserValidationError),
}

/// Runtime configuration for the server binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MOUSSIA")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; without it users are kept in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
    /// File holding the cookie session key.
    pub session_key_file: Option<PathBuf>,
    /// Mark the session cookie `Secure`.
    pub session_cookie_secure: Option<bool>,
    /// Accept a generated session key when the key file is unusable.
    #[ortho_config(default = false)]
    pub allow_ephemeral_session: bool,
    /// Login of the operator allowed to manage users.
    pub admin_login: Option<String>,
    /// File holding that operator's password.
    pub admin_password_file: Option<PathBuf>,
    /// Accept the built-in `admin` / `password` operator when no password
    /// file is configured.
    #[ortho_config(default = false)]
    pub allow_fixture_login: bool,
    /// Shortest accepted user name, in characters.
    pub name_min_length: Option<usize>,
    /// Longest accepted user name, in characters.
    pub name_max_length: Option<usize>,
}

impl AppSettings {
    /// Listening address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// PostgreSQL URL; a blank value counts as unset.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }

    /// Pool size, 10 when unset.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Session key path, `/var/run/secrets/session_key` when unset.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Operator login, `admin` when unset or blank.
    pub fn admin_login(&self) -> &str {
        self.admin_login
            .as_deref()
            .map(str::trim)
            .filter(|login| !login.is_empty())
            .unwrap_or(DEFAULT_ADMIN_LOGIN)
    }

    /// Operator password file, if configured.
    pub fn admin_password_file(&self) -> Option<&Path> {
        self.admin_password_file.as_deref()
    }

    /// Cookies are secure unless explicitly disabled.
    pub fn session_cookie_secure(&self) -> bool {
        self.session_cookie_secure.unwrap_or(true)
    }

    /// Name constraints, defaulting to `1..=255` characters.
    pub fn name_rules(&self) -> Result<NameRules, SettingsError> {
        let rules = NameRules::new(
            self.name_min_length.unwrap_or(NAME_MIN_LENGTH),
            self.name_max_length.unwrap_or(NAME_MAX_LENGTH),
        )?;
        Ok(rules)
    }
}
