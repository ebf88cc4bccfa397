//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod form_session;
mod login_service;
mod user_store;

pub use form_session::{FormSession, MemoryFormSession};
pub use login_service::{ConfiguredLoginService, FixtureLoginService, LoginService};
#[cfg(test)]
pub use user_store::MockUserStore;
pub use user_store::{ReferenceItem, UserPersistenceError, UserStore};
