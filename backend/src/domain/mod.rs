//! Domain types, ports and services for user management.
//!
//! Purpose: keep the user model, the repository facade and the form state
//! machine free of HTTP and SQL concerns. Adapters live in `inbound` and
//! `outbound`.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User / UserId / UserName / UserDraft / NameRules: the user model.
//! - UserHome: repository facade over the `UserStore` port.
//! - UserFormController: form state machine shared by both surfaces.

pub mod auth;
pub mod error;
pub mod ports;
pub mod security_token;
pub mod trace_id;
pub mod user;
pub mod user_form;
pub mod user_home;

pub use self::auth::{LoginCredentials, LoginValidationError, MANAGEMENT_RIGHT, Operator};
pub use self::error::{Error, ErrorCode};
pub use self::security_token::SecurityTokens;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    NAME_MAX_LENGTH, NAME_MIN_LENGTH, NameRules, User, UserDraft, UserId, UserName,
    UserValidationError,
};
pub use self::user_form::{
    FlashMessage, FormAction, FormOutcome, FormRequest, FormView, MessageLevel, RedirectTarget,
    RemovalPrompt, UserFormController, UserPage,
};
pub use self::user_home::UserHome;
