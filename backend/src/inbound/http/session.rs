//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! [`SessionContext`] wraps the Actix cookie session. It stores the signed-in
//! operator and hands out [`ScopedFormSession`]s, which implement the domain
//! [`FormSession`] port under a per-surface key prefix so the admin and site
//! pages never share a working copy.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::domain::ports::FormSession;
use crate::domain::{Error, FlashMessage, Operator, UserDraft};

pub(crate) const OPERATOR_KEY: &str = "operator";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Record the signed-in operator.
    pub fn persist_operator(&self, operator: &Operator) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(OPERATOR_KEY, operator)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The signed-in operator, if any. Unreadable entries count as signed out.
    pub fn operator(&self) -> Option<Operator> {
        match self.0.get::<Operator>(OPERATOR_KEY) {
            Ok(operator) => operator,
            Err(error) => {
                warn!(%error, "invalid operator in session cookie");
                None
            }
        }
    }

    /// Require a signed-in operator holding `right`.
    ///
    /// `401` without an operator, `403` when the right is missing.
    pub fn require_right(&self, right: &str) -> Result<Operator, Error> {
        let operator = self
            .operator()
            .ok_or_else(|| Error::unauthorized("login required"))?;
        if operator.has_right(right) {
            Ok(operator)
        } else {
            Err(Error::forbidden(format!("missing right {right}")))
        }
    }

    /// Drop everything stored in the session.
    pub fn purge(&self) {
        self.0.purge();
    }

    /// Form state stored under `scope`.
    pub fn form_session(&self, scope: &'static str) -> ScopedFormSession {
        ScopedFormSession {
            session: self.0.clone(),
            scope,
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

/// Cookie-backed [`FormSession`] for one surface.
pub struct ScopedFormSession {
    session: Session,
    scope: &'static str,
}

impl ScopedFormSession {
    fn key(&self, name: &str) -> String {
        format!("{}.{name}", self.scope)
    }

    fn token_key(&self, action: &str) -> String {
        self.key(&format!("token.{action}"))
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.session.get::<T>(key) {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, key, "discarding unreadable session entry");
                self.session.remove(key);
                None
            }
        }
    }

    fn write<T: Serialize>(&self, key: String, value: &T) -> Result<(), Error> {
        self.session
            .insert(key, value)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }
}

impl FormSession for ScopedFormSession {
    fn working_copy(&self) -> Result<Option<UserDraft>, Error> {
        Ok(self.read(&self.key("working_copy")))
    }

    fn set_working_copy(&self, draft: &UserDraft) -> Result<(), Error> {
        self.write(self.key("working_copy"), draft)
    }

    fn clear_working_copy(&self) -> Result<(), Error> {
        self.session.remove(&self.key("working_copy"));
        Ok(())
    }

    fn set_token(&self, action: &str, token: &str) -> Result<(), Error> {
        self.write(self.token_key(action), &token)
    }

    fn take_token(&self, action: &str) -> Result<Option<String>, Error> {
        let key = self.token_key(action);
        let token = self.read::<String>(&key);
        self.session.remove(&key);
        Ok(token)
    }

    fn push_message(&self, message: FlashMessage) -> Result<(), Error> {
        let key = self.key("messages");
        let mut queued: Vec<FlashMessage> = self.read(&key).unwrap_or_default();
        queued.push(message);
        self.write(key, &queued)
    }

    fn take_messages(&self) -> Result<Vec<FlashMessage>, Error> {
        let key = self.key("messages");
        let queued = self.read(&key).unwrap_or_default();
        self.session.remove(&key);
        Ok(queued)
    }
}
