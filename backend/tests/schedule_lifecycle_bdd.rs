//! Behaviour tests for the schedule lifecycle over real HTTP.
//!
//! The app is served on an ephemeral port with in-memory repositories and the
//! fixture identity provider, so sign-in, page rendering, the JSON endpoints
//! and cascade deletion are exercised end to end without PostgreSQL.
//!
//! Actix spawns tasks with `spawn_local`, so the world owns a current-thread
//! runtime plus a `LocalSet` and drives every request through it.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

use std::cell::RefCell;
use std::net::TcpListener;
use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Key, SameSite, time::Duration as CookieDuration};
use actix_web::dev::ServerHandle;
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
use reqwest::header::{COOKIE, LOCATION, SET_COOKIE};
use reqwest::redirect::Policy;
use reqwest::{Client, Method, Response};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use schedule_arranger::Trace;
use schedule_arranger::domain::ports::{FixtureIdentityProvider, ScheduleRepository};
use schedule_arranger::domain::{OAuthLoginService, ScheduleId, ScheduleService, TRACE_ID_HEADER};
use schedule_arranger::inbound::http::configure;
use schedule_arranger::inbound::http::health::HealthState;
use schedule_arranger::inbound::http::state::HttpState;
use schedule_arranger::test_support::{InMemoryScheduleRepository, InMemoryUserRepository};
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

const FIXTURE_USER_ID: i64 = FixtureIdentityProvider::DEFAULT_USER_ID;

#[derive(Default)]
struct LastResponse {
    status: Option<u16>,
    location: Option<String>,
    trace_id: Option<String>,
    body: String,
}

struct ScheduleWorld {
    runtime: Runtime,
    local: LocalSet,
    base_url: String,
    server: ServerHandle,
    client: Client,
    schedules: InMemoryScheduleRepository,
    session_cookie: RefCell<Option<String>>,
    schedule_id: RefCell<Option<ScheduleId>>,
    last: RefCell<LastResponse>,
}

impl Drop for ScheduleWorld {
    fn drop(&mut self) {
        let server = self.server.clone();
        self.local.block_on(&self.runtime, async move {
            server.stop(true).await;
        });
    }
}

fn test_session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(false)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(PersistentSession::default().session_ttl(CookieDuration::hours(2)))
        .build()
}

fn spawn_app(http_state: HttpState) -> Result<(String, ServerHandle), String> {
    let key = Key::generate();
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let http_data = web::Data::new(http_state);
    let health_data = web::Data::new(HealthState::new());

    let server = HttpServer::new(move || {
        App::new()
            .app_data(health_data.clone())
            .app_data(http_data.clone())
            .wrap(test_session_middleware(key.clone()))
            .wrap(Trace)
            .configure(configure)
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);
    Ok((format!("http://{addr}"), handle))
}

#[fixture]
fn world() -> ScheduleWorld {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();

    let users = InMemoryUserRepository::new();
    let schedules = InMemoryScheduleRepository::new(users.clone());
    let service = Arc::new(ScheduleService::new(
        Arc::new(schedules.clone()),
        Arc::new(DefaultClock),
    ));
    let login = Arc::new(OAuthLoginService::new(
        Arc::new(FixtureIdentityProvider::default()),
        Arc::new(users),
    ));
    let http_state = HttpState::new(service.clone(), service, login);

    let (base_url, server) = local
        .block_on(&runtime, async { spawn_app(http_state) })
        .expect("server starts");
    let client = Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("http client");

    ScheduleWorld {
        runtime,
        local,
        base_url,
        server,
        client,
        schedules,
        session_cookie: RefCell::new(None),
        schedule_id: RefCell::new(None),
        last: RefCell::new(LastResponse::default()),
    }
}

enum Body {
    Empty,
    Form(Vec<(&'static str, String)>),
    Json(Value),
}

impl ScheduleWorld {
    fn request(&self, method: Method, path: &str, body: Body) {
        let url = if path.starts_with("http") {
            path.to_owned()
        } else {
            format!("{}{path}", self.base_url)
        };
        let mut request = self.client.request(method, url);
        if let Some(cookie) = self.session_cookie.borrow().clone() {
            request = request.header(COOKIE, cookie);
        }
        request = match body {
            Body::Empty => request,
            Body::Form(fields) => request.form(&fields),
            Body::Json(value) => request.json(&value),
        };
        let response = self
            .local
            .block_on(&self.runtime, request.send())
            .expect("request succeeds");
        self.record(response);
    }

    fn record(&self, response: Response) {
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(ToOwned::to_owned)
        };
        let status = response.status().as_u16();
        let location = header(LOCATION.as_str());
        let trace_id = header(TRACE_ID_HEADER);
        let session = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .find(|pair| pair.starts_with("session="))
            .map(ToOwned::to_owned);
        if let Some(session) = session {
            *self.session_cookie.borrow_mut() = Some(session);
        }
        let body = self
            .local
            .block_on(&self.runtime, response.text())
            .expect("response body");
        *self.last.borrow_mut() = LastResponse {
            status: Some(status),
            location,
            trace_id,
            body,
        };
    }

    fn get(&self, path: &str) {
        self.request(Method::GET, path, Body::Empty);
    }

    fn last_location(&self) -> String {
        self.last.borrow().location.clone().expect("location header")
    }

    fn last_json(&self) -> Value {
        serde_json::from_str(&self.last.borrow().body).expect("JSON body")
    }

    fn schedule_id(&self) -> ScheduleId {
        self.schedule_id.borrow().expect("a schedule was created")
    }

    fn create_schedule(&self, name: &str, candidates: &str) {
        self.request(
            Method::POST,
            "/schedules",
            Body::Form(vec![
                ("scheduleName", name.to_owned()),
                ("memo", "m1\nm2".to_owned()),
                ("candidates", candidates.replace(',', "\n")),
            ]),
        );
        let location = self.last_location();
        let id = location
            .strip_prefix("/schedules/")
            .and_then(|raw| raw.parse::<ScheduleId>().ok())
            .expect("redirect to a schedule");
        *self.schedule_id.borrow_mut() = Some(id);
    }

    fn first_candidate_id(&self) -> i64 {
        let id = self.schedule_id();
        let candidates = self
            .local
            .block_on(&self.runtime, self.schedules.candidates(&id))
            .expect("candidates");
        candidates.first().expect("candidate").id.value()
    }
}

#[given("a running app with in-memory storage")]
fn a_running_app_with_in_memory_storage(#[from(world)] _world: &ScheduleWorld) {}

#[given("the visitor has signed in")]
fn the_visitor_has_signed_in(world: &ScheduleWorld) {
    world.get("/auth/github");
    assert_eq!(world.last.borrow().status, Some(302));
    let callback = world.last_location();
    world.get(&callback);
    assert_eq!(world.last.borrow().status, Some(302));
    assert_eq!(world.last_location(), "/");
}

#[given("the visitor has created schedule {name} with candidates {candidates}")]
fn the_visitor_has_created_schedule(world: &ScheduleWorld, name: String, candidates: String) {
    world.create_schedule(&name, &candidates);
}

#[given("the visitor has marked and commented on the schedule")]
fn the_visitor_has_marked_and_commented(world: &ScheduleWorld) {
    let id = world.schedule_id();
    let candidate = world.first_candidate_id();
    world.request(
        Method::POST,
        &format!("/schedules/{id}/users/{FIXTURE_USER_ID}/candidates/{candidate}"),
        Body::Json(json!({ "availability": 2 })),
    );
    assert_eq!(world.last.borrow().status, Some(200));
    world.request(
        Method::POST,
        &format!("/schedules/{id}/users/{FIXTURE_USER_ID}/comments"),
        Body::Json(json!({ "comment": "遅れます" })),
    );
    assert_eq!(world.last.borrow().status, Some(200));
}

#[when("the visitor opens the new schedule form")]
fn the_visitor_opens_the_new_schedule_form(world: &ScheduleWorld) {
    world.get("/schedules/new");
}

#[when("the visitor creates schedule {name} with candidates {candidates}")]
fn the_visitor_creates_schedule(world: &ScheduleWorld, name: String, candidates: String) {
    world.create_schedule(&name, &candidates);
}

#[when("the visitor opens the schedule")]
fn the_visitor_opens_the_schedule(world: &ScheduleWorld) {
    world.get(&format!("/schedules/{}", world.schedule_id()));
}

#[when("the visitor marks the first candidate as {value}")]
fn the_visitor_marks_the_first_candidate(world: &ScheduleWorld, value: i64) {
    let id = world.schedule_id();
    let candidate = world.first_candidate_id();
    world.request(
        Method::POST,
        &format!("/schedules/{id}/users/{FIXTURE_USER_ID}/candidates/{candidate}"),
        Body::Json(json!({ "availability": value })),
    );
}

#[when("the visitor comments as user {user_id}")]
fn the_visitor_comments_as_user(world: &ScheduleWorld, user_id: i64) {
    let id = world.schedule_id();
    world.request(
        Method::POST,
        &format!("/schedules/{id}/users/{user_id}/comments"),
        Body::Json(json!({ "comment": "代理です" })),
    );
}

#[when("the visitor deletes the schedule")]
fn the_visitor_deletes_the_schedule(world: &ScheduleWorld) {
    let id = world.schedule_id();
    world.request(Method::POST, &format!("/schedules/{id}/delete"), Body::Empty);
}

#[then("the response redirects to {location}")]
fn the_response_redirects_to(world: &ScheduleWorld, location: String) {
    assert_eq!(world.last.borrow().status, Some(302));
    assert_eq!(world.last_location(), location);
}

#[then("the visitor is redirected to the new schedule")]
fn the_visitor_is_redirected_to_the_new_schedule(world: &ScheduleWorld) {
    assert_eq!(world.last.borrow().status, Some(302));
    assert_eq!(
        world.last_location(),
        format!("/schedules/{}", world.schedule_id())
    );
}

#[then("the page shows the schedule name, memo and candidates {candidates}")]
fn the_page_shows_the_schedule(world: &ScheduleWorld, candidates: String) {
    let last = world.last.borrow();
    assert_eq!(last.status, Some(200));
    assert!(last.body.contains("Launch"));
    assert!(last.body.contains("m1\nm2"));
    assert!(last.body.contains("testuser"));
    for candidate in candidates.split(',') {
        assert!(
            last.body.contains(&format!("<th>{candidate}</th>")),
            "{candidate} should be listed"
        );
    }
    assert_eq!(
        last.body.matches("class=\"availability-toggle\"").count(),
        candidates.split(',').count()
    );
}

#[then("the top page lists {name}")]
fn the_top_page_lists(world: &ScheduleWorld, name: String) {
    world.get("/");
    let last = world.last.borrow();
    assert_eq!(last.status, Some(200));
    assert!(last.body.contains(&name));
    assert!(last.body.contains(&format!("/schedules/{}", world.schedule_id())));
}

#[then("the JSON response is OK with availability {value}")]
fn the_json_response_is_ok(world: &ScheduleWorld, value: i64) {
    assert_eq!(world.last.borrow().status, Some(200));
    let body = world.last_json();
    assert_eq!(body["status"], "OK");
    assert_eq!(body["availability"].as_i64(), Some(value));
}

#[then("the schedule page shows the present label")]
fn the_schedule_page_shows_the_present_label(world: &ScheduleWorld) {
    world.get(&format!("/schedules/{}", world.schedule_id()));
    let last = world.last.borrow();
    assert_eq!(last.status, Some(200));
    assert!(last.body.contains("data-availability=\"2\""));
    assert!(last.body.contains("data-next=\"0\">出</button>"));
}

#[then("the JSON response is an NG envelope with status {status} and the request trace id")]
fn the_json_response_is_an_ng_envelope(world: &ScheduleWorld, status: u16) {
    assert_eq!(world.last.borrow().status, Some(status));
    let trace_id = world.last.borrow().trace_id.clone().expect("trace id header");
    let body = world.last_json();
    assert_eq!(body["status"], "NG");
    assert_eq!(body["errors"][0]["code"], "forbidden");
    assert_eq!(body["errors"][0]["traceId"].as_str(), Some(trace_id.as_str()));
}

#[then("no rows remain for the schedule")]
fn no_rows_remain_for_the_schedule(world: &ScheduleWorld) {
    let counts = world
        .schedules
        .row_counts(&world.schedule_id())
        .expect("row counts");
    assert_eq!(counts, (0, 0, 0, 0));
}

#[then("opening the schedule returns 404")]
fn opening_the_schedule_returns_404(world: &ScheduleWorld) {
    world.get(&format!("/schedules/{}", world.schedule_id()));
    assert_eq!(world.last.borrow().status, Some(404));
}

#[scenario(path = "tests/features/schedule_lifecycle.feature")]
fn schedule_lifecycle_scenarios(world: ScheduleWorld) {
    drop(world);
}
