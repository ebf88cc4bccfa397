//! Operator credential loading.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;
use zeroize::{Zeroize, Zeroizing};

use crate::domain::ports::{ConfiguredLoginService, FixtureLoginService, LoginService};
use crate::server::session_key::BuildMode;

/// Errors raised while loading operator credentials.
#[derive(thiserror::Error, Debug)]
pub enum OperatorLoginError {
    #[error(
        "no operator password file configured; set MOUSSIA_ADMIN_PASSWORD_FILE \
         or MOUSSIA_ALLOW_FIXTURE_LOGIN"
    )]
    Missing,
    #[error("failed to read operator password at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("operator password at {path} is not valid UTF-8")]
    NotUtf8 { path: PathBuf },
    #[error("operator password at {path} is empty")]
    Empty { path: PathBuf },
}

/// Build the login service for `login`.
///
/// With a password file the operator must present that password; one
/// trailing line break is ignored. Without a file, debug builds and
/// `allow_fixture` fall back to the built-in `admin` / `password` operator,
/// and release builds fail. Password bytes are zeroed once copied.
pub fn load_login_service(
    login: &str,
    password_file: Option<&Path>,
    mode: BuildMode,
    allow_fixture: bool,
) -> Result<Arc<dyn LoginService>, OperatorLoginError> {
    let Some(path) = password_file else {
        if mode == BuildMode::Debug || allow_fixture {
            warn!("no operator password file; using the built-in operator (dev only)");
            return Ok(Arc::new(FixtureLoginService));
        }
        return Err(OperatorLoginError::Missing);
    };

    let bytes = std::fs::read(path).map_err(|source| OperatorLoginError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut password = match String::from_utf8(bytes) {
        Ok(text) => Zeroizing::new(text),
        Err(err) => {
            err.into_bytes().zeroize();
            return Err(OperatorLoginError::NotUtf8 {
                path: path.to_path_buf(),
            });
        }
    };

    let text = password.as_str();
    let kept = text
        .strip_suffix('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .unwrap_or(text)
        .len();
    password.truncate(kept);
    if password.is_empty() {
        return Err(OperatorLoginError::Empty {
            path: path.to_path_buf(),
        });
    }

    Ok(Arc::new(ConfiguredLoginService::new(login, password)))
}
