//! OAuth login service.
//!
//! Trades the provider's authorization code for a [`User`] and records that
//! user locally so schedules and availability marks can reference them.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    IdentityProvider, IdentityProviderError, LoginService, UserPersistenceError, UserRepository,
};
use crate::domain::{Error, User};

/// Login service backed by an identity provider and a user repository.
#[derive(Clone)]
pub struct OAuthLoginService<P, U> {
    provider: Arc<P>,
    users: Arc<U>,
}

impl<P, U> OAuthLoginService<P, U> {
    /// Create a login service.
    pub fn new(provider: Arc<P>, users: Arc<U>) -> Self {
        Self { provider, users }
    }
}

fn map_provider_error(error: IdentityProviderError) -> Error {
    match error {
        IdentityProviderError::Transport { message } => {
            Error::service_unavailable(format!("identity provider unavailable: {message}"))
        }
        IdentityProviderError::Rejected { message } => {
            Error::unauthorized(format!("login rejected: {message}"))
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

#[async_trait]
impl<P, U> LoginService for OAuthLoginService<P, U>
where
    P: IdentityProvider,
    U: UserRepository,
{
    fn authorize_url(&self, state: &str) -> String {
        self.provider.authorize_url(state)
    }

    async fn complete_login(&self, code: &str) -> Result<User, Error> {
        let user = self.provider.exchange_code(code).await.map_err(|err| {
            warn!(error = %err, "authorization code exchange failed");
            map_provider_error(err)
        })?;
        self.users.upsert(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id(), username = %user.username(), "user signed in");
        Ok(user)
    }
}
