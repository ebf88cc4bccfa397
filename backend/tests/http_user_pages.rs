//! Request-level tests for the admin and site user pages.
//!
//! The full application is assembled with the in-memory store and driven
//! like a browser: the session cookie from each response is replayed on the
//! next request.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::LOCATION;
use actix_web::{test, web};
use rstest::rstest;
use serde_json::{Value, json};

use backend::domain::ports::FixtureLoginService;
use backend::domain::{NameRules, UserFormController, UserHome};
use backend::inbound::http::state::HttpState;
use backend::outbound::memory::InMemoryUserStore;
use backend::server::build_app;

const ADMIN: &str = "/admin/plugins/testmoussia/users";
const SITE: &str = "/site/user";

fn state() -> web::Data<HttpState> {
    let controller = UserFormController::new(
        UserHome::new(Arc::new(InMemoryUserStore::new())),
        NameRules::default(),
    );
    web::Data::new(HttpState::new(controller, Arc::new(FixtureLoginService)))
}

/// Cookie jar holding the latest session cookie.
#[derive(Default)]
struct Jar(Option<Cookie<'static>>);

impl Jar {
    async fn send<S, B>(&mut self, app: &S, request: test::TestRequest) -> ServiceResponse<B>
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    {
        let request = match &self.0 {
            Some(cookie) => request.cookie(cookie.clone()),
            None => request,
        };
        let res = test::call_service(app, request.to_request()).await;
        if let Some(cookie) = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
        {
            self.0 = Some(cookie.into_owned());
        }
        res
    }

    async fn json<S, B>(&mut self, app: &S, request: test::TestRequest) -> Value
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let res = self.send(app, request).await;
        assert_eq!(res.status(), StatusCode::OK);
        test::read_body_json(res).await
    }
}

fn location<B>(res: &ServiceResponse<B>) -> String {
    res.headers()
        .get(LOCATION)
        .expect("location header")
        .to_str()
        .expect("ascii location")
        .to_owned()
}

fn token_of(page: &Value) -> String {
    page["model"]["token"]
        .as_str()
        .expect("page carries a token")
        .to_owned()
}

async fn sign_in<S, B>(app: &S, jar: &mut Jar)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let res = jar
        .send(
            app,
            test::TestRequest::post()
                .uri("/admin/login")
                .set_json(json!({"username": "admin", "password": "password"})),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[rstest]
#[case(false, StatusCode::UNAUTHORIZED)]
#[case(true, StatusCode::OK)]
#[actix_web::test]
async fn admin_pages_require_a_signed_in_operator(
    #[case] signed_in: bool,
    #[case] expected: StatusCode,
) {
    let app = test::init_service(build_app(state(), Key::generate(), false, SameSite::Lax)).await;
    let mut jar = Jar::default();
    if signed_in {
        sign_in(&app, &mut jar).await;
    }

    let res = jar.send(&app, test::TestRequest::get().uri(ADMIN)).await;
    assert_eq!(res.status(), expected);
}

#[actix_web::test]
async fn admin_create_modify_and_remove_round_trip() {
    let app = test::init_service(build_app(state(), Key::generate(), false, SameSite::Lax)).await;
    let mut jar = Jar::default();
    sign_in(&app, &mut jar).await;

    let form = jar
        .json(
            &app,
            test::TestRequest::get().uri(&format!("{ADMIN}?view=createUser")),
        )
        .await;
    assert_eq!(form["view"], "createUser");
    assert_eq!(form["title"], "testmoussia.create_user.pageTitle");
    let res = jar
        .send(
            &app,
            test::TestRequest::post()
                .uri(&format!("{ADMIN}?action=createUser"))
                .set_form([("nom", "Nom1"), ("token", token_of(&form).as_str())]),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("{ADMIN}?view=manageUsers"));

    let list = jar.json(&app, test::TestRequest::get().uri(ADMIN)).await;
    assert_eq!(list["model"]["user_list"], json!([{"id": 1, "name": "Nom1"}]));
    assert_eq!(list["messages"][0]["key"], "testmoussia.info.user.created");

    let form = jar
        .json(
            &app,
            test::TestRequest::get().uri(&format!("{ADMIN}?view=modifyUser&id=1")),
        )
        .await;
    assert_eq!(form["model"]["user"], json!({"id": 1, "name": "Nom1"}));
    let res = jar
        .send(
            &app,
            test::TestRequest::post()
                .uri(&format!("{ADMIN}?action=modifyUser"))
                .set_form([
                    ("id", "1"),
                    ("nom", "Nom2"),
                    ("token", token_of(&form).as_str()),
                ]),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    let list = jar.json(&app, test::TestRequest::get().uri(ADMIN)).await;
    assert_eq!(list["model"]["user_list"], json!([{"id": 1, "name": "Nom2"}]));

    let res = jar
        .send(
            &app,
            test::TestRequest::get().uri(&format!("{ADMIN}?action=confirmRemoveUser&id=1")),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert!(location(&res).starts_with("/admin/message?key=testmoussia.message.confirmRemoveUser"));

    let res = jar
        .send(
            &app,
            test::TestRequest::post().uri(&format!("{ADMIN}?action=removeUser&id=1")),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    let list = jar.json(&app, test::TestRequest::get().uri(ADMIN)).await;
    assert_eq!(list["model"]["user_list"], json!([]));
    assert_eq!(list["messages"][0]["key"], "testmoussia.info.user.removed");
}

#[rstest]
#[case(None)]
#[case(Some("forged"))]
#[actix_web::test]
async fn site_create_without_a_valid_token_is_forbidden(#[case] token: Option<&str>) {
    let app = test::init_service(build_app(state(), Key::generate(), false, SameSite::Lax)).await;
    let mut jar = Jar::default();
    jar.json(&app, test::TestRequest::get().uri(&format!("{SITE}?view=createUser")))
        .await;

    let mut fields = vec![("nom", "Nom1")];
    fields.extend(token.map(|token| ("token", token)));
    let res = jar
        .send(
            &app,
            test::TestRequest::post()
                .uri(&format!("{SITE}?action=createUser"))
                .set_form(fields),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let list = jar.json(&app, test::TestRequest::get().uri(SITE)).await;
    assert_eq!(list["model"]["user_list"], json!([]));
}

#[actix_web::test]
async fn site_invalid_name_is_redisplayed_with_an_error() {
    let app = test::init_service(build_app(state(), Key::generate(), false, SameSite::Lax)).await;
    let mut jar = Jar::default();
    let form = jar
        .json(&app, test::TestRequest::get().uri(&format!("{SITE}?view=createUser")))
        .await;
    assert_eq!(form["xpage"], "user");

    let res = jar
        .send(
            &app,
            test::TestRequest::post()
                .uri(&format!("{SITE}?action=createUser"))
                .set_form([("nom", "   "), ("token", token_of(&form).as_str())]),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("{SITE}?view=createUser"));

    let form = jar.json(&app, test::TestRequest::get().uri(&location(&res))).await;
    assert_eq!(form["model"]["user"]["name"], "   ");
    assert_eq!(form["messages"][0]["level"], "error");
    assert_eq!(
        form["messages"][0]["key"],
        "testmoussia.model.entity.user.attribute.nom"
    );
}

#[actix_web::test]
async fn over_long_site_name_still_redirects_to_the_form() {
    let app = test::init_service(build_app(state(), Key::generate(), false, SameSite::Lax)).await;
    let mut jar = Jar::default();
    let form = jar
        .json(&app, test::TestRequest::get().uri(&format!("{SITE}?view=createUser")))
        .await;
    let long = "x".repeat(4_000);

    let res = jar
        .send(
            &app,
            test::TestRequest::post()
                .uri(&format!("{SITE}?action=createUser"))
                .set_form([("nom", long.as_str()), ("token", token_of(&form).as_str())]),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("{SITE}?view=createUser"));

    let form = jar.json(&app, test::TestRequest::get().uri(&location(&res))).await;
    let kept = form["model"]["user"]["name"].as_str().expect("name kept");
    assert_eq!(kept.chars().count(), 256);
    assert_eq!(form["messages"][0]["level"], "error");
}

#[actix_web::test]
async fn over_long_admin_rename_still_redirects_to_the_form() {
    let app = test::init_service(build_app(state(), Key::generate(), false, SameSite::Lax)).await;
    let mut jar = Jar::default();
    sign_in(&app, &mut jar).await;
    let form = jar
        .json(&app, test::TestRequest::get().uri(&format!("{ADMIN}?view=createUser")))
        .await;
    jar.send(
        &app,
        test::TestRequest::post()
            .uri(&format!("{ADMIN}?action=createUser"))
            .set_form([("nom", "Nom1"), ("token", token_of(&form).as_str())]),
    )
    .await;

    let form = jar
        .json(
            &app,
            test::TestRequest::get().uri(&format!("{ADMIN}?view=modifyUser&id=1")),
        )
        .await;
    let long = "y".repeat(4_000);
    let res = jar
        .send(
            &app,
            test::TestRequest::post()
                .uri(&format!("{ADMIN}?action=modifyUser"))
                .set_form([
                    ("id", "1"),
                    ("nom", long.as_str()),
                    ("token", token_of(&form).as_str()),
                ]),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("{ADMIN}?view=modifyUser&id=1"));

    let form = jar.json(&app, test::TestRequest::get().uri(&location(&res))).await;
    assert_eq!(form["model"]["user"]["id"], 1);
    assert_eq!(form["model"]["user"]["name"], "y".repeat(256));
}

#[actix_web::test]
async fn site_removal_is_confirmed_inline() {
    let app = test::init_service(build_app(state(), Key::generate(), false, SameSite::Lax)).await;
    let mut jar = Jar::default();

    let prompt = jar
        .json(
            &app,
            test::TestRequest::get().uri(&format!("{SITE}?action=confirmRemoveUser&id=4")),
        )
        .await;
    assert_eq!(prompt["siteMessage"]["target"], "/site/user?action=removeUser&id=4");
}

#[rstest]
#[case("id=abc&view=modifyUser", StatusCode::BAD_REQUEST)]
#[case("id=42&view=modifyUser", StatusCode::NOT_FOUND)]
#[case("view=unknown", StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn bad_parameters_map_to_client_errors(#[case] query: &str, #[case] expected: StatusCode) {
    let app = test::init_service(build_app(state(), Key::generate(), false, SameSite::Lax)).await;
    let mut jar = Jar::default();

    let res = jar
        .send(&app, test::TestRequest::get().uri(&format!("{SITE}?{query}")))
        .await;
    assert_eq!(res.status(), expected);
    assert!(res.headers().contains_key("trace-id"));
}

#[actix_web::test]
async fn admin_and_site_keep_separate_working_copies() {
    let app = test::init_service(build_app(state(), Key::generate(), false, SameSite::Lax)).await;
    let mut jar = Jar::default();
    sign_in(&app, &mut jar).await;

    let admin_form = jar
        .json(&app, test::TestRequest::get().uri(&format!("{ADMIN}?view=createUser")))
        .await;
    jar.send(
        &app,
        test::TestRequest::post()
            .uri(&format!("{ADMIN}?action=createUser"))
            .set_form([("nom", ""), ("token", token_of(&admin_form).as_str())]),
    )
    .await;

    let site_form = jar
        .json(&app, test::TestRequest::get().uri(&format!("{SITE}?view=createUser")))
        .await;
    assert_eq!(site_form["model"]["user"], json!({"name": ""}));
    assert_eq!(site_form["messages"], json!([]));
}
