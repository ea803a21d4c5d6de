//! Reqwest-backed GitHub identity provider.
//!
//! Builds the consent URL, trades authorization codes for access tokens, and
//! reads the signed-in user's id and login from the REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use zeroize::Zeroizing;

use super::dto::{AccessTokenDto, GithubUserDto, TokenOutcome};
use crate::domain::User;
use crate::domain::ports::{IdentityProvider, IdentityProviderError};

const USER_AGENT: &str = "schedule-arranger/0.1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// OAuth application credentials registered with GitHub.
pub struct GithubOAuthCredentials {
    /// OAuth application client id.
    pub client_id: String,
    /// OAuth application client secret.
    pub client_secret: Zeroizing<String>,
    /// Callback URL registered for the application.
    pub redirect_url: Url,
}

/// GitHub endpoints used during sign-in.
#[derive(Debug, Clone)]
pub struct GithubEndpoints {
    /// Consent page the browser is redirected to.
    pub authorize: Url,
    /// Code-for-token exchange endpoint.
    pub access_token: Url,
    /// Authenticated user resource.
    pub user: Url,
}

impl GithubEndpoints {
    /// Public github.com endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error only if the built-in URLs fail to parse.
    pub fn public() -> Result<Self, url::ParseError> {
        Ok(Self {
            authorize: Url::parse("https://github.com/login/oauth/authorize")?,
            access_token: Url::parse("https://github.com/login/oauth/access_token")?,
            user: Url::parse("https://api.github.com/user")?,
        })
    }
}

/// Identity provider adapter talking to GitHub over HTTPS.
pub struct GithubIdentityProvider {
    client: Client,
    credentials: GithubOAuthCredentials,
    endpoints: GithubEndpoints,
}

impl GithubIdentityProvider {
    /// Build an adapter against the given endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        credentials: GithubOAuthCredentials,
        endpoints: GithubEndpoints,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            credentials,
            endpoints,
        })
    }

    async fn request_access_token(
        &self,
        code: &str,
    ) -> Result<Zeroizing<String>, IdentityProviderError> {
        let response = self
            .client
            .post(self.endpoints.access_token.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.credentials.redirect_url.as_str()),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_access_token(body.as_ref())
    }

    async fn fetch_user(&self, token: &str) -> Result<User, IdentityProviderError> {
        let response = self
            .client
            .get(self.endpoints.user.clone())
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .bearer_auth(token)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_user(body.as_ref())
    }
}

#[async_trait]
impl IdentityProvider for GithubIdentityProvider {
    fn authorize_url(&self, state: &str) -> String {
        let mut url = self.endpoints.authorize.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.credentials.client_id)
            .append_pair("redirect_uri", self.credentials.redirect_url.as_str())
            .append_pair("state", state);
        url.into()
    }

    async fn exchange_code(&self, code: &str) -> Result<User, IdentityProviderError> {
        if code.is_empty() {
            return Err(IdentityProviderError::rejected("empty authorization code"));
        }
        let token = self.request_access_token(code).await?;
        self.fetch_user(token.as_str()).await
    }
}

fn parse_access_token(body: &[u8]) -> Result<Zeroizing<String>, IdentityProviderError> {
    let decoded: AccessTokenDto = serde_json::from_slice(body).map_err(|error| {
        IdentityProviderError::transport(format!("invalid token response: {error}"))
    })?;
    match decoded.into_outcome() {
        TokenOutcome::Granted(token) => Ok(Zeroizing::new(token)),
        TokenOutcome::Refused(reason) => Err(IdentityProviderError::rejected(reason)),
    }
}

fn parse_user(body: &[u8]) -> Result<User, IdentityProviderError> {
    let decoded: GithubUserDto = serde_json::from_slice(body).map_err(|error| {
        IdentityProviderError::transport(format!("invalid user response: {error}"))
    })?;
    decoded
        .into_domain_user()
        .map_err(|error| IdentityProviderError::rejected(format!("unusable GitHub user: {error}")))
}

fn map_transport_error(error: reqwest::Error) -> IdentityProviderError {
    IdentityProviderError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    let message = format!("status {}: {}", status.as_u16(), body_preview(body));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            IdentityProviderError::rejected(message)
        }
        _ => IdentityProviderError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    compact.chars().take(PREVIEW_CHAR_LIMIT).collect()
}
