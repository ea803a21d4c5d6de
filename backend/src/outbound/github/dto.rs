//! DTOs for decoding GitHub OAuth and user API responses.

use serde::Deserialize;

use crate::domain::{User, UserValidationError};

/// Reply from the access token endpoint.
///
/// GitHub answers `200 OK` for both outcomes and signals failure through the
/// `error` field.
#[derive(Debug, Deserialize)]
pub(super) struct AccessTokenDto {
    pub(super) access_token: Option<String>,
    pub(super) error: Option<String>,
    pub(super) error_description: Option<String>,
}

pub(super) enum TokenOutcome {
    Granted(String),
    Refused(String),
}

impl AccessTokenDto {
    pub(super) fn into_outcome(self) -> TokenOutcome {
        match (self.access_token, self.error) {
            (Some(token), None) if !token.is_empty() => TokenOutcome::Granted(token),
            (_, error) => {
                let reason = self
                    .error_description
                    .or(error)
                    .unwrap_or_else(|| "no access token issued".to_owned());
                TokenOutcome::Refused(reason)
            }
        }
    }
}

/// Subset of the authenticated user resource.
#[derive(Debug, Deserialize)]
pub(super) struct GithubUserDto {
    pub(super) id: i64,
    pub(super) login: String,
}

impl GithubUserDto {
    pub(super) fn into_domain_user(self) -> Result<User, UserValidationError> {
        User::try_from_parts(self.id, self.login)
    }
}
