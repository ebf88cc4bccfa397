//! Form controller shared by the admin and site surfaces.
//!
//! The controller is stateless: the working copy, anti-forgery tokens and
//! queued messages all live in the [`FormSession`] handed to each call. Every
//! operation returns a [`FormOutcome`] that a surface turns into a response.
//!
//! ```text
//! List ──view=createUser──▶ CreateForm ──valid──▶ List
//!   │                          ▲   │
//!   │                          └───┘ invalid name
//!   ├──view=modifyUser──▶ ModifyForm ──valid──▶ List
//!   └──action=confirmRemoveUser──▶ ConfirmRemove ──action=removeUser──▶ List
//! ```

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::FormSession;
use crate::domain::{
    Error, NameRules, SecurityTokens, User, UserDraft, UserHome, UserId, UserValidationError,
};

/// Info message queued after a successful create.
pub const INFO_USER_CREATED: &str = "testmoussia.info.user.created";
/// Info message queued after a successful update.
pub const INFO_USER_UPDATED: &str = "testmoussia.info.user.updated";
/// Info message queued after a delete.
pub const INFO_USER_REMOVED: &str = "testmoussia.info.user.removed";
/// Question shown before a delete.
pub const MESSAGE_CONFIRM_REMOVE_USER: &str = "testmoussia.message.confirmRemoveUser";
/// Prefix of the per-attribute validation message keys.
pub const VALIDATION_ATTRIBUTES_PREFIX: &str = "testmoussia.model.entity.user.attribute.";

const INVALID_TOKEN: &str = "Invalid security token";

/// Mutating actions selected by the `action` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    CreateUser,
    ModifyUser,
    RemoveUser,
    ConfirmRemoveUser,
}

impl FormAction {
    /// Parse the wire name.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "createUser" => Some(Self::CreateUser),
            "modifyUser" => Some(Self::ModifyUser),
            "removeUser" => Some(Self::RemoveUser),
            "confirmRemoveUser" => Some(Self::ConfirmRemoveUser),
            _ => None,
        }
    }

    /// Wire name, also used to scope anti-forgery tokens.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateUser => "createUser",
            Self::ModifyUser => "modifyUser",
            Self::RemoveUser => "removeUser",
            Self::ConfirmRemoveUser => "confirmRemoveUser",
        }
    }
}

/// Pages selected by the `view` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormView {
    ManageUsers,
    CreateUser,
    ModifyUser,
}

impl FormView {
    /// Parse the wire name.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "manageUsers" => Some(Self::ManageUsers),
            "createUser" => Some(Self::CreateUser),
            "modifyUser" => Some(Self::ModifyUser),
            _ => None,
        }
    }

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ManageUsers => "manageUsers",
            Self::CreateUser => "createUser",
            Self::ModifyUser => "modifyUser",
        }
    }
}

/// Request parameters understood by the controller.
///
/// Adapters merge the query string and the urlencoded body into this shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FormRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "nom")]
    pub name: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub view: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    /// Set by the adapter for form posts.
    #[serde(skip)]
    pub submission: bool,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|raw| !raw.is_empty())
}

/// Severity of a queued message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Error,
}

/// Message queued in the session and shown by the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: MessageLevel,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl FlashMessage {
    /// Informational message identified by a localisation key.
    pub fn info(key: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            key: key.into(),
            detail: None,
        }
    }

    /// Error message identified by a localisation key.
    pub fn error(key: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            key: key.into(),
            detail: Some(detail.into()),
        }
    }
}

/// Page content to render.
#[derive(Debug, Clone, PartialEq)]
pub enum UserPage {
    List { users: Vec<User> },
    Create { user: UserDraft, token: String },
    Modify { user: UserDraft, token: String },
}

impl UserPage {
    /// The view this page belongs to.
    pub fn view(&self) -> FormView {
        match self {
            Self::List { .. } => FormView::ManageUsers,
            Self::Create { .. } => FormView::CreateUser,
            Self::Modify { .. } => FormView::ModifyUser,
        }
    }
}

/// Where to send the browser after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    List,
    Create,
    Modify(UserId),
}

/// Question to put to the operator before a delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalPrompt {
    pub message_key: &'static str,
    pub id: UserId,
    pub action: FormAction,
}

/// Result of one controller call.
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    Render {
        page: UserPage,
        messages: Vec<FlashMessage>,
    },
    Redirect(RedirectTarget),
    Confirm(RemovalPrompt),
}

/// CRUD state machine over [`UserHome`].
#[derive(Clone)]
pub struct UserFormController {
    home: UserHome,
    rules: NameRules,
}

impl UserFormController {
    /// Build a controller over `home` validating names with `rules`.
    pub fn new(home: UserHome, rules: NameRules) -> Self {
        Self { home, rules }
    }

    /// The repository facade.
    pub fn home(&self) -> &UserHome {
        &self.home
    }

    /// Route a request to the matching operation.
    ///
    /// `action` wins over `view`; a submission with neither shows the create
    /// form and anything else shows the list.
    pub async fn process(
        &self,
        session: &dyn FormSession,
        request: &FormRequest,
    ) -> Result<FormOutcome, Error> {
        if let Some(raw) = non_empty(request.action.as_ref()) {
            let action = FormAction::parse(raw).ok_or_else(|| {
                Error::invalid_request(format!("unknown action '{raw}'"))
                    .with_details(json!({ "field": "action", "value": raw }))
            })?;
            return match action {
                FormAction::CreateUser => self.submit_create(session, request).await,
                FormAction::ModifyUser => self.submit_modify(session, request).await,
                FormAction::RemoveUser => self.submit_remove(session, request).await,
                FormAction::ConfirmRemoveUser => self.show_confirm_remove(request),
            };
        }

        if let Some(raw) = non_empty(request.view.as_ref()) {
            let view = FormView::parse(raw).ok_or_else(|| {
                Error::invalid_request(format!("unknown view '{raw}'"))
                    .with_details(json!({ "field": "view", "value": raw }))
            })?;
            return match view {
                FormView::ManageUsers => self.show_list(session).await,
                FormView::CreateUser => self.show_create_form(session),
                FormView::ModifyUser => self.show_modify_form(session, request).await,
            };
        }

        if request.submission {
            self.show_create_form(session)
        } else {
            self.show_list(session).await
        }
    }

    /// Render every user and drop any in-flight draft.
    pub async fn show_list(&self, session: &dyn FormSession) -> Result<FormOutcome, Error> {
        session.clear_working_copy()?;
        let users = self.home.get_users_list().await?;
        Ok(FormOutcome::Render {
            page: UserPage::List { users },
            messages: session.take_messages()?,
        })
    }

    /// Render the create form, starting an empty draft unless a create
    /// draft is open. A leftover modify draft is replaced.
    pub fn show_create_form(&self, session: &dyn FormSession) -> Result<FormOutcome, Error> {
        let open = session
            .working_copy()?
            .filter(|draft| draft.id().is_none());
        let user = match open {
            Some(draft) => draft,
            None => {
                let draft = UserDraft::new();
                session.set_working_copy(&draft)?;
                draft
            }
        };
        let token = SecurityTokens::issue(session, FormAction::CreateUser.as_str())?;
        Ok(FormOutcome::Render {
            page: UserPage::Create { user, token },
            messages: session.take_messages()?,
        })
    }

    /// Handle a create submission.
    pub async fn submit_create(
        &self,
        session: &dyn FormSession,
        request: &FormRequest,
    ) -> Result<FormOutcome, Error> {
        Self::check_token(session, FormAction::CreateUser, request)?;

        let mut draft = session
            .working_copy()?
            .filter(|draft| draft.id().is_none())
            .unwrap_or_default();
        draft.populate(request.name.as_deref());

        let name = match draft.validate(&self.rules) {
            Ok(name) => name,
            Err(err) => {
                self.reject_draft(session, draft, &err)?;
                return Ok(FormOutcome::Redirect(RedirectTarget::Create));
            }
        };

        let user = self.home.create(&name).await?;
        draft.assign_id(user.id());
        info!(user_id = ?draft.id(), "user created");
        session.clear_working_copy()?;
        session.push_message(FlashMessage::info(INFO_USER_CREATED))?;
        Ok(FormOutcome::Redirect(RedirectTarget::List))
    }

    /// Ask for confirmation before deleting the user named by `id`.
    pub fn show_confirm_remove(&self, request: &FormRequest) -> Result<FormOutcome, Error> {
        let id = Self::require_id(request)?;
        Ok(FormOutcome::Confirm(RemovalPrompt {
            message_key: MESSAGE_CONFIRM_REMOVE_USER,
            id,
            action: FormAction::RemoveUser,
        }))
    }

    /// Delete the user named by `id`; unknown ids are ignored by the store.
    pub async fn submit_remove(
        &self,
        session: &dyn FormSession,
        request: &FormRequest,
    ) -> Result<FormOutcome, Error> {
        let id = Self::require_id(request)?;
        self.home.remove(id).await?;
        info!(user_id = %id, "user removed");
        session.push_message(FlashMessage::info(INFO_USER_REMOVED))?;
        Ok(FormOutcome::Redirect(RedirectTarget::List))
    }

    /// Render the modify form for `id`.
    ///
    /// An open draft for the same id is reused so a rejected submission shows
    /// the operator's input rather than the stored row.
    pub async fn show_modify_form(
        &self,
        session: &dyn FormSession,
        request: &FormRequest,
    ) -> Result<FormOutcome, Error> {
        let id = Self::require_id(request)?;
        let user = match session.working_copy()? {
            Some(draft) if draft.id() == Some(id) => draft,
            _ => {
                let draft = self.load_draft(id).await?;
                session.set_working_copy(&draft)?;
                draft
            }
        };
        let token = SecurityTokens::issue(session, FormAction::ModifyUser.as_str())?;
        Ok(FormOutcome::Render {
            page: UserPage::Modify { user, token },
            messages: session.take_messages()?,
        })
    }

    /// Handle a modify submission.
    pub async fn submit_modify(
        &self,
        session: &dyn FormSession,
        request: &FormRequest,
    ) -> Result<FormOutcome, Error> {
        Self::check_token(session, FormAction::ModifyUser, request)?;

        let requested = match non_empty(request.id.as_ref()) {
            Some(_) => Some(Self::require_id(request)?),
            None => None,
        };
        let open = session
            .working_copy()?
            .filter(|draft| draft.id().is_some())
            .filter(|draft| requested.is_none() || draft.id() == requested);
        let mut draft = match (open, requested) {
            (Some(draft), _) => draft,
            (None, Some(id)) => self.load_draft(id).await?,
            (None, None) => return Err(Self::missing_id()),
        };
        let Some(id) = draft.id() else {
            return Err(Self::missing_id());
        };
        draft.populate(request.name.as_deref());

        let name = match draft.validate(&self.rules) {
            Ok(name) => name,
            Err(err) => {
                self.reject_draft(session, draft, &err)?;
                return Ok(FormOutcome::Redirect(RedirectTarget::Modify(id)));
            }
        };

        self.home.update(&User::new(id, name)).await?;
        info!(user_id = %id, "user updated");
        session.clear_working_copy()?;
        session.push_message(FlashMessage::info(INFO_USER_UPDATED))?;
        Ok(FormOutcome::Redirect(RedirectTarget::List))
    }

    async fn load_draft(&self, id: UserId) -> Result<UserDraft, Error> {
        self.home
            .find_by_primary_key(id)
            .await?
            .map(UserDraft::from)
            .ok_or_else(|| {
                Error::not_found(format!("user {id} not found")).with_details(json!({ "id": id }))
            })
    }

    fn check_token(
        session: &dyn FormSession,
        action: FormAction,
        request: &FormRequest,
    ) -> Result<(), Error> {
        if SecurityTokens::validate(session, action.as_str(), request.token.as_deref())? {
            Ok(())
        } else {
            Err(Error::forbidden(INVALID_TOKEN))
        }
    }

    /// Keep the rejected input for redisplay. The name is cut one character
    /// past the maximum so the draft still fails validation but always fits
    /// in the session cookie.
    fn reject_draft(
        &self,
        session: &dyn FormSession,
        mut draft: UserDraft,
        err: &UserValidationError,
    ) -> Result<(), Error> {
        debug!(code = err.code(), "user form rejected");
        draft.truncate_name(self.rules.max_length().saturating_add(1));
        session.set_working_copy(&draft)?;
        session.push_message(FlashMessage::error(
            format!("{VALIDATION_ATTRIBUTES_PREFIX}nom"),
            err.to_string(),
        ))
    }

    fn require_id(request: &FormRequest) -> Result<UserId, Error> {
        let raw = non_empty(request.id.as_ref()).ok_or_else(Self::missing_id)?;
        UserId::parse(raw).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "id", "code": err.code() }))
        })
    }

    fn missing_id() -> Error {
        Error::invalid_request("missing user id").with_details(json!({ "field": "id" }))
    }
}
