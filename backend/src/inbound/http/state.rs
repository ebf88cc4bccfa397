//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and reach storage only through
//! the form controller and the login port, so tests can swap in the
//! in-memory store or a fixture authenticator.

use std::sync::Arc;

use crate::domain::UserFormController;
use crate::domain::ports::LoginService;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub controller: UserFormController,
    pub login: Arc<dyn LoginService>,
}

impl HttpState {
    pub fn new(controller: UserFormController, login: Arc<dyn LoginService>) -> Self {
        Self { controller, login }
    }
}
