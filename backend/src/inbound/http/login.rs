//! Login, logout, and the GitHub OAuth round trip.
//!
//! ```text
//! GET /login[?from=/path]
//! GET /logout
//! GET /auth/github
//! GET /auth/github/callback?code=..&state=..
//! ```

use actix_web::cookie::{Cookie, time::Duration as CookieDuration};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, get, web};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::Error;
use crate::inbound::http::error::PageResult;
use crate::inbound::http::session::{SessionContext, SessionUser};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views;

/// Cookie remembering where to return after signing in.
pub const LOGIN_FROM_COOKIE: &str = "loginFrom";
const LOGIN_FROM_TTL_MINUTES: i64 = 7;
const OAUTH_STATE_LEN: usize = 32;

/// Only same-origin absolute paths are honoured as return targets.
fn is_local_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.starts_with("/\\")
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.to_owned()))
        .finish()
}

fn generate_oauth_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(OAUTH_STATE_LEN)
        .map(char::from)
        .collect()
}

/// Query string accepted by the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    from: Option<String>,
}

#[derive(Serialize)]
struct LoginPage {
    user: Option<SessionUser>,
}

/// Show the login page, remembering `from` for the post-login redirect.
#[get("/login")]
pub async fn login_page(
    session: SessionContext,
    query: web::Query<LoginQuery>,
) -> PageResult<HttpResponse> {
    let user = session.current_user()?;
    let body = views::render(
        "login.html",
        &LoginPage {
            user: user.as_ref().map(SessionUser::from),
        },
    )?;

    let mut response = HttpResponse::Ok();
    response.content_type(header::ContentType::html());
    if let Some(from) = query.from.as_deref().filter(|from| is_local_path(from)) {
        response.cookie(
            Cookie::build(LOGIN_FROM_COOKIE, from.to_owned())
                .path("/")
                .http_only(true)
                .max_age(CookieDuration::minutes(LOGIN_FROM_TTL_MINUTES))
                .finish(),
        );
    }
    Ok(response.body(body))
}

/// Sign out and return to the top page.
#[get("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    redirect("/")
}

/// Start the OAuth round trip.
#[get("/auth/github")]
pub async fn start_oauth(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> PageResult<HttpResponse> {
    let oauth_state = generate_oauth_state();
    session.insert_oauth_state(&oauth_state)?;
    Ok(redirect(&state.login.authorize_url(&oauth_state)))
}

/// Query string the identity provider sends back.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Finish the OAuth round trip and sign the user in.
#[get("/auth/github/callback")]
pub async fn oauth_callback(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<CallbackQuery>,
) -> PageResult<HttpResponse> {
    let CallbackQuery {
        code,
        state: returned_state,
        error,
    } = query.into_inner();
    let expected_state = session.take_oauth_state()?;

    if let Some(error) = error {
        warn!(error = %error, "identity provider reported an error");
        return Err(Error::unauthorized(format!("login was not completed: {error}")).into());
    }
    match (expected_state.as_deref(), returned_state.as_deref()) {
        (Some(expected), Some(returned)) if expected == returned => {}
        _ => {
            warn!("OAuth state mismatch");
            return Err(Error::invalid_request("OAuth state mismatch").into());
        }
    }
    let code = code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| Error::invalid_request("missing authorization code"))?;

    let user = state.login.complete_login(&code).await?;
    session.persist_user(&user)?;
    info!(user_id = %user.id(), "session established");

    let target = req
        .cookie(LOGIN_FROM_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .filter(|from| is_local_path(from))
        .unwrap_or_else(|| "/".to_owned());
    let mut response = redirect(&target);
    let mut removal = Cookie::build(LOGIN_FROM_COOKIE, "").path("/").finish();
    removal.make_removal();
    if let Err(err) = response.add_cookie(&removal) {
        warn!(error = %err, "failed to clear loginFrom cookie");
    }
    Ok(response)
}
