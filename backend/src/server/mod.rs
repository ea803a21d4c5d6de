//! Server construction and middleware wiring.

mod config;

pub use config::{AppSettings, ServerConfig, SettingsError};

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
use tracing::warn;

use schedule_arranger::Trace;
#[cfg(debug_assertions)]
use schedule_arranger::doc::ApiDoc;
use schedule_arranger::domain::ports::{FixtureIdentityProvider, LoginService};
use schedule_arranger::domain::{OAuthLoginService, ScheduleService};
use schedule_arranger::inbound::http::configure;
use schedule_arranger::inbound::http::health::HealthState;
use schedule_arranger::inbound::http::session_config::BuildMode;
use schedule_arranger::inbound::http::state::HttpState;
use schedule_arranger::outbound::github::{
    GithubEndpoints, GithubIdentityProvider, GithubOAuthCredentials,
};
use schedule_arranger::outbound::persistence::{
    DbPool, DieselScheduleRepository, DieselUserRepository,
};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Pick the identity provider: GitHub when credentials are configured, the
/// fixture user in debug builds otherwise.
///
/// # Errors
/// Returns [`std::io::Error`] when release builds lack GitHub credentials or
/// the HTTP client cannot be built.
fn build_login_service(
    github: Option<GithubOAuthCredentials>,
    users: Arc<DieselUserRepository>,
    mode: BuildMode,
) -> std::io::Result<Arc<dyn LoginService>> {
    match github {
        Some(credentials) => {
            let endpoints = GithubEndpoints::public()
                .map_err(|e| std::io::Error::other(format!("github endpoints: {e}")))?;
            let provider = GithubIdentityProvider::new(credentials, endpoints)
                .map_err(|e| std::io::Error::other(format!("github client: {e}")))?;
            Ok(Arc::new(OAuthLoginService::new(Arc::new(provider), users)))
        }
        None if mode.is_debug() => {
            warn!("GitHub OAuth not configured; signing everyone in as the fixture user");
            Ok(Arc::new(OAuthLoginService::new(
                Arc::new(FixtureIdentityProvider::default()),
                users,
            )))
        }
        None => Err(std::io::Error::other(
            "GitHub OAuth settings are required in release builds",
        )),
    }
}

fn build_http_state(db_pool: &DbPool, login: Arc<dyn LoginService>) -> HttpState {
    let schedules = Arc::new(ScheduleService::new(
        Arc::new(DieselScheduleRepository::new(db_pool.clone())),
        Arc::new(DefaultClock),
    ));
    HttpState::new(schedules.clone(), schedules, login)
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(session)
        .wrap(Trace)
        .configure(configure);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: pre-built [`ServerConfig`] containing session, binding, pool and OAuth settings.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when the identity provider cannot be built,
/// or when binding the socket or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool,
        github,
    } = config;
    let users = Arc::new(DieselUserRepository::new(db_pool.clone()));
    let login = build_login_service(github, users, BuildMode::from_debug_assertions())?;
    let http_state = web::Data::new(build_http_state(&db_pool, login));

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
