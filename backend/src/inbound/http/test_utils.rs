//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, test, web};

use crate::domain::ports::{MockLoginService, MockScheduleCommand, MockScheduleQuery};
use crate::domain::{Error, User};

use super::session::SessionContext;
use super::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Mock ports bundled for handler tests.
#[derive(Default)]
pub struct MockPorts {
    pub schedules: MockScheduleCommand,
    pub schedules_query: MockScheduleQuery,
    pub login: MockLoginService,
}

impl MockPorts {
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            Arc::new(self.schedules),
            Arc::new(self.schedules_query),
            Arc::new(self.login),
        ))
    }
}

pub fn user(id: i64, username: &str) -> User {
    User::try_from_parts(id, username).expect("valid test user")
}

/// Route that signs in `/test/sign-in/{id}/{username}` without OAuth.
pub fn sign_in_route() -> actix_web::Route {
    web::get().to(
        |session: SessionContext, path: web::Path<(i64, String)>| async move {
            let (id, username) = path.into_inner();
            let user = User::try_from_parts(id, username)
                .map_err(|err| Error::invalid_request(err.to_string()))?;
            session.persist_user(&user)?;
            Ok::<_, Error>(HttpResponse::Ok().finish())
        },
    )
}

pub const SIGN_IN_PATH: &str = "/test/sign-in/{id}/{username}";

/// Sign in through [`sign_in_route`] and return the session cookie.
pub async fn sign_in<S>(app: &S, user: &User) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::get()
            .uri(&format!(
                "/test/sign-in/{}/{}",
                user.id(),
                user.username()
            ))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "test sign-in failed");
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}
