//! Per-action anti-forgery tokens.
//!
//! A token is issued when a form is rendered and must come back with the
//! submission. Tokens are single use: validation consumes the stored value
//! whether or not the presented one matches.

use constant_time_eq::constant_time_eq;
use rand::RngCore;
use rand::rngs::OsRng;

use super::Error;
use super::ports::FormSession;

const TOKEN_BYTES: usize = 32;

/// Issues and checks anti-forgery tokens stored in a [`FormSession`].
pub struct SecurityTokens;

impl SecurityTokens {
    /// Generate a token for `action`, store it and return it for rendering.
    pub fn issue(session: &dyn FormSession, action: &str) -> Result<String, Error> {
        let mut bytes = [0_u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|err| Error::internal(format!("token generation failed: {err}")))?;
        let token = hex::encode(bytes);
        session.set_token(action, &token)?;
        Ok(token)
    }

    /// Consume the stored token for `action` and compare it with `presented`.
    ///
    /// Returns `Ok(false)` when either side is missing.
    pub fn validate(
        session: &dyn FormSession,
        action: &str,
        presented: Option<&str>,
    ) -> Result<bool, Error> {
        let stored = session.take_token(action)?;
        let valid = match (stored.as_deref(), presented) {
            (Some(stored), Some(presented)) => {
                constant_time_eq(stored.as_bytes(), presented.as_bytes())
            }
            _ => false,
        };
        if !valid {
            tracing::debug!(action, "anti-forgery token rejected");
        }
        Ok(valid)
    }
}
