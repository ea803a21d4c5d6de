//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations: remembering the signed-in user, the pending
//! OAuth state, and requiring a login.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

use crate::domain::{Error, User};

use super::error::PageError;

pub(crate) const USER_KEY: &str = "user";
pub(crate) const OAUTH_STATE_KEY: &str = "oauth_state";

/// Signed-in user as stored in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Provider-issued user id.
    pub id: i64,
    /// Provider login name.
    pub username: String,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().value(),
            username: user.username().as_str().to_owned(),
        }
    }
}

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user in the session cookie.
    pub fn persist_user(&self, user: &User) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_KEY, SessionUser::from(user))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current user from the session, if present and well formed.
    pub fn current_user(&self) -> Result<Option<User>, Error> {
        let stored = self
            .0
            .get::<SessionUser>(USER_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match stored {
            Some(SessionUser { id, username }) => match User::try_from_parts(id, username) {
                Ok(user) => Ok(Some(user)),
                Err(error) => {
                    tracing::warn!("invalid user in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Remember the OAuth `state` handed to the identity provider.
    pub fn insert_oauth_state(&self, state: &str) -> Result<(), Error> {
        self.0
            .insert(OAUTH_STATE_KEY, state)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Take the pending OAuth `state`; it can only be used once.
    pub fn take_oauth_state(&self) -> Result<Option<String>, Error> {
        self.0
            .remove_as::<String>(OAUTH_STATE_KEY)
            .transpose()
            .map_err(|raw| Error::internal(format!("malformed OAuth state in session: {raw}")))
    }

    /// Drop everything stored in the session and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

/// Extractor for routes behind the login gate.
///
/// Requests without a signed-in user are redirected to `/login?from=<path>`
/// before the handler runs.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    /// The signed-in user.
    pub fn user(&self) -> &User {
        &self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        let from = req
            .uri()
            .path_and_query()
            .map_or_else(|| req.path().to_owned(), |pq| pq.as_str().to_owned());
        Box::pin(async move {
            let session = SessionContext::new(fut.await?);
            match session.current_user().map_err(PageError::from)? {
                Some(user) => Ok(AuthenticatedUser(user)),
                None => Err(PageError::login_required(from).into()),
            }
        })
    }
}
