//! Driven port for GitHub-backed user records.
use async_trait::async_trait;

use crate::domain::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Failures raised by user store adapters.
    pub enum UserPersistenceError {
        /// The store could not be reached.
        Connection { message: String } => "user store unavailable: {message}",
        /// A read or write was rejected.
        Query { message: String } => "user store rejected the operation: {message}",
    }
}

/// Users are keyed by their GitHub numeric id and written on every sign-in,
/// so a renamed GitHub account shows its new login on the next visit.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert the user, or overwrite the stored username.
    async fn upsert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Look a user up by GitHub id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;
}
