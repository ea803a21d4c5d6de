//! Driving port for the OAuth login use-case.
//!
//! Inbound adapters only see this trait, so handler tests can substitute a
//! double instead of talking to GitHub or the database.

use async_trait::async_trait;

use crate::domain::{Error, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Where to redirect the browser to start signing in.
    fn authorize_url(&self, state: &str) -> String;

    /// Finish signing in with the provider's authorization code and record
    /// the user locally.
    ///
    /// # Errors
    ///
    /// `Unauthorized` when the provider rejects the code,
    /// `ServiceUnavailable` when the provider or database cannot be reached.
    async fn complete_login(&self, code: &str) -> Result<User, Error>;
}
