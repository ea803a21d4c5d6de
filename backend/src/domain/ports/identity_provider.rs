//! Driven port for the external OAuth identity provider.
//!
//! The login service asks the provider where to send the browser and later
//! trades the returned authorization code for the signed-in user's identity.

use async_trait::async_trait;

use crate::domain::User;

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// The provider could not be reached or returned an unreadable reply.
        Transport { message: String } => "identity provider unreachable: {message}",
        /// The provider refused the authorization code.
        Rejected { message: String } => "identity provider rejected the login: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL of the provider's consent page carrying `state` for CSRF checks.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an authorization code for the user it identifies.
    async fn exchange_code(&self, code: &str) -> Result<User, IdentityProviderError>;
}

/// Development provider that signs every visitor in as one fixed user.
///
/// The authorize URL points straight back at the local callback so the OAuth
/// round trip works without network access.
#[derive(Debug, Clone)]
pub struct FixtureIdentityProvider {
    user: User,
}

impl FixtureIdentityProvider {
    /// Identifier of the default fixture user.
    pub const DEFAULT_USER_ID: i64 = 0;
    /// Login name of the default fixture user.
    pub const DEFAULT_USERNAME: &'static str = "testuser";

    /// Sign everyone in as `user`.
    #[must_use]
    pub const fn new(user: User) -> Self {
        Self { user }
    }
}

impl Default for FixtureIdentityProvider {
    fn default() -> Self {
        Self::new(User::from_trusted_parts(
            Self::DEFAULT_USER_ID,
            Self::DEFAULT_USERNAME.to_owned(),
        ))
    }
}

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    fn authorize_url(&self, state: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("code", "fixture")
            .append_pair("state", state)
            .finish();
        format!("/auth/github/callback?{query}")
    }

    async fn exchange_code(&self, code: &str) -> Result<User, IdentityProviderError> {
        if code.is_empty() {
            return Err(IdentityProviderError::rejected("empty authorization code"));
        }
        Ok(self.user.clone())
    }
}
