//! Per-session state used by the user form controller.
//!
//! The HTTP adapter backs this with the cookie session scoped to one surface;
//! [`MemoryFormSession`] backs it with a mutex for domain tests and scripted
//! callers.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::{Error, FlashMessage, UserDraft};

/// Session storage seen by the form controller.
///
/// Methods take `&self`: implementations wrap interior-mutable handles such as
/// `actix_session::Session`.
pub trait FormSession {
    /// The draft held between displaying a form and submitting it.
    fn working_copy(&self) -> Result<Option<UserDraft>, Error>;

    /// Replace the draft.
    fn set_working_copy(&self, draft: &UserDraft) -> Result<(), Error>;

    /// Drop the draft.
    fn clear_working_copy(&self) -> Result<(), Error>;

    /// Store the anti-forgery token for `action`, replacing any previous one.
    fn set_token(&self, action: &str, token: &str) -> Result<(), Error>;

    /// Remove and return the anti-forgery token for `action`.
    fn take_token(&self, action: &str) -> Result<Option<String>, Error>;

    /// Queue a message for the next rendered page.
    fn push_message(&self, message: FlashMessage) -> Result<(), Error>;

    /// Drain queued messages.
    fn take_messages(&self) -> Result<Vec<FlashMessage>, Error>;
}

#[derive(Debug, Default)]
struct MemoryState {
    working_copy: Option<UserDraft>,
    tokens: HashMap<String, String>,
    messages: Vec<FlashMessage>,
}

/// In-process [`FormSession`].
#[derive(Debug, Default)]
pub struct MemoryFormSession {
    state: Mutex<MemoryState>,
}

impl MemoryFormSession {
    /// An empty session.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, Error> {
        self.state
            .lock()
            .map_err(|_| Error::internal("form session lock poisoned"))
    }
}

impl FormSession for MemoryFormSession {
    fn working_copy(&self) -> Result<Option<UserDraft>, Error> {
        Ok(self.lock()?.working_copy.clone())
    }

    fn set_working_copy(&self, draft: &UserDraft) -> Result<(), Error> {
        self.lock()?.working_copy = Some(draft.clone());
        Ok(())
    }

    fn clear_working_copy(&self) -> Result<(), Error> {
        self.lock()?.working_copy = None;
        Ok(())
    }

    fn set_token(&self, action: &str, token: &str) -> Result<(), Error> {
        self.lock()?
            .tokens
            .insert(action.to_owned(), token.to_owned());
        Ok(())
    }

    fn take_token(&self, action: &str) -> Result<Option<String>, Error> {
        Ok(self.lock()?.tokens.remove(action))
    }

    fn push_message(&self, message: FlashMessage) -> Result<(), Error> {
        self.lock()?.messages.push(message);
        Ok(())
    }

    fn take_messages(&self) -> Result<Vec<FlashMessage>, Error> {
        Ok(std::mem::take(&mut self.lock()?.messages))
    }
}
