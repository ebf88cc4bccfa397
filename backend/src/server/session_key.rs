//! Cookie session key loading.

use std::path::{Path, PathBuf};

use actix_web::cookie::Key;
use tracing::warn;
use zeroize::Zeroize;

/// Shortest key material `Key::derive_from` accepts.
pub const SESSION_KEY_MIN_LEN: usize = 32;

/// Build mode for session key validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds fall back to a generated key.
    Debug,
    /// Release builds require a readable key unless explicitly allowed.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Errors raised while loading the session key.
#[derive(thiserror::Error, Debug)]
pub enum SessionKeyError {
    #[error("failed to read session key at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    TooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

/// Load the session key from `path`.
///
/// An unreadable or short file yields a generated key in debug builds or when
/// `allow_ephemeral` is set, and an error otherwise. Key bytes are zeroed
/// once the key is derived.
pub fn load_session_key(
    path: &Path,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionKeyError> {
    let fallback = mode == BuildMode::Debug || allow_ephemeral;
    let mut bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(source) if fallback => {
            warn!(path = %path.display(), error = %source, "using temporary session key (dev only)");
            return Ok(Key::generate());
        }
        Err(source) => {
            return Err(SessionKeyError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let length = bytes.len();
    if length < SESSION_KEY_MIN_LEN {
        bytes.zeroize();
        if fallback {
            warn!(path = %path.display(), length, "session key too short; using temporary key");
            return Ok(Key::generate());
        }
        return Err(SessionKeyError::TooShort {
            path: path.to_path_buf(),
            length,
            min_len: SESSION_KEY_MIN_LEN,
        });
    }

    let key = Key::derive_from(&bytes);
    bytes.zeroize();
    Ok(key)
}
