//! Server construction and middleware wiring.

mod config;
pub mod operator_login;
pub mod session_key;

pub use config::ServerConfig;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use crate::Trace;
use crate::inbound::http::auth::{login, logout};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::user_pages;

fn session_middleware(
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build()
}

/// Assemble the application: tracing, the private cookie session, operator
/// login and both user page surfaces.
pub fn build_app(
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let pages = web::scope("")
        .wrap(session_middleware(key, cookie_secure, same_site))
        .service(login)
        .service(logout)
        .configure(user_pages::configure);

    App::new().app_data(http_state).wrap(Trace).service(pages)
}

/// Construct an Actix HTTP server around `http_state`.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(http_state: HttpState, config: ServerConfig) -> std::io::Result<Server> {
    let http_state = web::Data::new(http_state);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
    } = config;

    let server = HttpServer::new(move || {
        build_app(http_state.clone(), key.clone(), cookie_secure, same_site)
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}
