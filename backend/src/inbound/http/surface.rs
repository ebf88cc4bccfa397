//! Presentation surfaces for the user pages.
//!
//! Both surfaces drive the same [`UserFormController`]; they differ in where
//! they are mounted, who may use them, how a page is described and how the
//! removal question is asked. Pages are JSON view models naming the template
//! and localisation keys a skin would use.
//!
//! [`UserFormController`]: crate::domain::UserFormController

use actix_web::HttpResponse;
use actix_web::http::header::LOCATION;
use serde::Serialize;
use serde_json::{Value, json};
use url::form_urlencoded;

use crate::domain::{
    FlashMessage, FormOutcome, FormView, MANAGEMENT_RIGHT, RedirectTarget, RemovalPrompt,
    UserPage,
};

/// Admin page mount point.
pub const ADMIN_USERS_PATH: &str = "/admin/plugins/testmoussia/users";
/// Public page mount point.
pub const SITE_USERS_PATH: &str = "/site/user";
/// Admin message page used for confirmations.
pub const ADMIN_MESSAGE_PATH: &str = "/admin/message";

/// One presentation front for the user pages.
pub trait Surface {
    /// Path the pages are served from.
    fn base_path(&self) -> &'static str;

    /// Right an operator must hold, or `None` for anonymous access.
    fn required_right(&self) -> Option<&'static str>;

    /// Session key prefix for this surface's form state.
    fn session_scope(&self) -> &'static str;

    /// Describe a page.
    fn render(&self, page: &UserPage, messages: &[FlashMessage]) -> HttpResponse;

    /// Ask whether a removal should go ahead.
    fn confirm(&self, prompt: &RemovalPrompt) -> HttpResponse;

    /// URL for a redirect target.
    fn url_for(&self, target: RedirectTarget) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        match target {
            RedirectTarget::List => {
                query.append_pair("view", FormView::ManageUsers.as_str());
            }
            RedirectTarget::Create => {
                query.append_pair("view", FormView::CreateUser.as_str());
            }
            RedirectTarget::Modify(id) => {
                query
                    .append_pair("view", FormView::ModifyUser.as_str())
                    .append_pair("id", &id.to_string());
            }
        }
        format!("{}?{}", self.base_path(), query.finish())
    }

    /// URL that performs the confirmed removal.
    fn action_url(&self, prompt: &RemovalPrompt) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("action", prompt.action.as_str())
            .append_pair("id", &prompt.id.to_string())
            .finish();
        format!("{}?{}", self.base_path(), query)
    }

    /// Turn a controller outcome into a response.
    fn respond(&self, outcome: FormOutcome) -> HttpResponse {
        match outcome {
            FormOutcome::Render { page, messages } => self.render(&page, &messages),
            FormOutcome::Redirect(target) => found(self.url_for(target)),
            FormOutcome::Confirm(prompt) => self.confirm(&prompt),
        }
    }
}

fn found(location: String) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location))
        .finish()
}

fn page_model(page: &UserPage) -> Value {
    match page {
        UserPage::List { users } => json!({ "user_list": users }),
        UserPage::Create { user, token } | UserPage::Modify { user, token } => {
            json!({ "user": user, "token": token })
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageBody<'a> {
    view: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    xpage: Option<&'static str>,
    template: &'static str,
    model: Value,
    messages: &'a [FlashMessage],
}

/// Back-office pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminSurface;

impl AdminSurface {
    fn title(view: FormView) -> &'static str {
        match view {
            FormView::ManageUsers => "testmoussia.manage_users.pageTitle",
            FormView::CreateUser => "testmoussia.create_user.pageTitle",
            FormView::ModifyUser => "testmoussia.modify_user.pageTitle",
        }
    }

    fn template(view: FormView) -> &'static str {
        match view {
            FormView::ManageUsers => "/admin/plugins/testmoussia/manage_users.html",
            FormView::CreateUser => "/admin/plugins/testmoussia/create_user.html",
            FormView::ModifyUser => "/admin/plugins/testmoussia/modify_user.html",
        }
    }
}

impl Surface for AdminSurface {
    fn base_path(&self) -> &'static str {
        ADMIN_USERS_PATH
    }

    fn required_right(&self) -> Option<&'static str> {
        Some(MANAGEMENT_RIGHT)
    }

    fn session_scope(&self) -> &'static str {
        "admin"
    }

    fn render(&self, page: &UserPage, messages: &[FlashMessage]) -> HttpResponse {
        let view = page.view();
        HttpResponse::Ok().json(PageBody {
            view: view.as_str(),
            title: Some(Self::title(view)),
            xpage: None,
            template: Self::template(view),
            model: page_model(page),
            messages,
        })
    }

    /// Hands the question to the admin message page, which posts back to the
    /// removal action.
    fn confirm(&self, prompt: &RemovalPrompt) -> HttpResponse {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("key", prompt.message_key)
            .append_pair("type", "confirmation")
            .append_pair("target", &self.action_url(prompt))
            .finish();
        found(format!("{ADMIN_MESSAGE_PATH}?{query}"))
    }
}

/// Public front-office pages (xpage `user`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SiteSurface;

impl SiteSurface {
    const XPAGE: &'static str = "user";

    fn template(view: FormView) -> &'static str {
        match view {
            FormView::ManageUsers => "/skin/plugins/testmoussia/manage_users.html",
            FormView::CreateUser => "/skin/plugins/testmoussia/create_user.html",
            FormView::ModifyUser => "/skin/plugins/testmoussia/modify_user.html",
        }
    }
}

impl Surface for SiteSurface {
    fn base_path(&self) -> &'static str {
        SITE_USERS_PATH
    }

    fn required_right(&self) -> Option<&'static str> {
        None
    }

    fn session_scope(&self) -> &'static str {
        "site"
    }

    fn render(&self, page: &UserPage, messages: &[FlashMessage]) -> HttpResponse {
        let view = page.view();
        HttpResponse::Ok().json(PageBody {
            view: view.as_str(),
            title: None,
            xpage: Some(Self::XPAGE),
            template: Self::template(view),
            model: page_model(page),
            messages,
        })
    }

    /// The site has no message page; the question is rendered in place.
    fn confirm(&self, prompt: &RemovalPrompt) -> HttpResponse {
        HttpResponse::Ok().json(json!({
            "xpage": Self::XPAGE,
            "siteMessage": {
                "key": prompt.message_key,
                "type": "confirmation",
                "target": self.action_url(prompt),
            },
        }))
    }
}
