//! User page handlers for both surfaces.
//!
//! ```text
//! GET  /admin/plugins/testmoussia/users?view=modifyUser&id=1
//! POST /admin/plugins/testmoussia/users?action=createUser   nom=Nom1&token=…
//! GET  /site/user?action=confirmRemoveUser&id=1
//! ```
//!
//! Parameters come from the query string and, for posts, the urlencoded body;
//! a field present in both takes the body's value.

use actix_web::{HttpResponse, web};

use crate::domain::FormRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::surface::{
    ADMIN_USERS_PATH, AdminSurface, SITE_USERS_PATH, SiteSurface, Surface,
};

/// Merge query and body parameters; `body` wins field by field.
fn merge_params(query: FormRequest, body: Option<FormRequest>) -> FormRequest {
    match body {
        Some(body) => FormRequest {
            id: body.id.or(query.id),
            name: body.name.or(query.name),
            action: body.action.or(query.action),
            view: body.view.or(query.view),
            token: body.token.or(query.token),
            submission: query.submission,
        },
        None => query,
    }
}

async fn serve<S: Surface>(
    surface: S,
    state: &HttpState,
    session: &SessionContext,
    request: FormRequest,
) -> ApiResult<HttpResponse> {
    if let Some(right) = surface.required_right() {
        session.require_right(right)?;
    }
    let form_session = session.form_session(surface.session_scope());
    let outcome = state.controller.process(&form_session, &request).await?;
    Ok(surface.respond(outcome))
}

/// Merge a post's parameters and flag the request as a form submission.
fn submission(query: web::Query<FormRequest>, body: Option<web::Form<FormRequest>>) -> FormRequest {
    let mut request = merge_params(query.into_inner(), body.map(web::Form::into_inner));
    request.submission = true;
    request
}

/// `GET` on the admin page; needs the management right.
pub async fn admin_page(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<FormRequest>,
) -> ApiResult<HttpResponse> {
    serve(AdminSurface, &state, &session, query.into_inner()).await
}

/// `POST` on the admin page; needs the management right.
pub async fn admin_submit(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<FormRequest>,
    body: Option<web::Form<FormRequest>>,
) -> ApiResult<HttpResponse> {
    let request = submission(query, body);
    serve(AdminSurface, &state, &session, request).await
}

/// `GET` on the public site page.
pub async fn site_page(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<FormRequest>,
) -> ApiResult<HttpResponse> {
    serve(SiteSurface, &state, &session, query.into_inner()).await
}

/// `POST` on the public site page.
pub async fn site_submit(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<FormRequest>,
    body: Option<web::Form<FormRequest>>,
) -> ApiResult<HttpResponse> {
    let request = submission(query, body);
    serve(SiteSurface, &state, &session, request).await
}

/// Mount both surfaces.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use backend::inbound::http::user_pages::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(ADMIN_USERS_PATH)
            .route(web::get().to(admin_page))
            .route(web::post().to(admin_submit)),
    )
    .service(
        web::resource(SITE_USERS_PATH)
            .route(web::get().to(site_page))
            .route(web::post().to(site_submit)),
    );
}
