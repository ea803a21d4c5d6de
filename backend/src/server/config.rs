//! Application settings and the HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use reqwest::Url;
use schedule_arranger::outbound::github::GithubOAuthCredentials;
use schedule_arranger::outbound::persistence::DbPool;
use serde::Deserialize;
use zeroize::Zeroizing;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Errors raised while turning [`AppSettings`] into runtime values.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Neither `APP_DATABASE_URL` nor `DATABASE_URL` is set.
    #[error("database URL missing: set APP_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,
    /// The bind address is not `host:port`.
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// Only some of the GitHub OAuth settings are present.
    #[error("incomplete GitHub OAuth settings: {missing} is not set")]
    IncompleteGithub { missing: &'static str },
    /// The OAuth callback URL does not parse.
    #[error("invalid GitHub redirect URL '{value}': {source}")]
    InvalidRedirectUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// Process-wide settings loaded from `APP_*` environment variables, CLI
/// arguments and configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "APP")]
pub struct AppSettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
    /// GitHub OAuth application client id.
    pub github_client_id: Option<String>,
    /// GitHub OAuth application client secret.
    pub github_client_secret: Option<String>,
    /// Callback URL registered with the GitHub OAuth application.
    pub github_redirect_url: Option<String>,
}

impl AppSettings {
    /// Parsed listen address, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBindAddr`] when the value is not a
    /// socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .parse()
            .map_err(|source| SettingsError::InvalidBindAddr {
                value: value.to_owned(),
                source,
            })
    }

    /// Database URL from `APP_DATABASE_URL`, falling back to `fallback`
    /// (normally the conventional `DATABASE_URL`).
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when neither is set.
    pub fn database_url(&self, fallback: Option<String>) -> Result<String, SettingsError> {
        self.database_url
            .clone()
            .or(fallback)
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Maximum pool size, never below one.
    #[must_use]
    pub fn db_max_connections(&self) -> u32 {
        if self.db_max_connections == 0 {
            DEFAULT_DB_MAX_CONNECTIONS
        } else {
            self.db_max_connections
        }
    }

    /// GitHub credentials when all three OAuth settings are present.
    ///
    /// Returns `Ok(None)` when none of them is set.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::IncompleteGithub`] when only some are set, or
    /// [`SettingsError::InvalidRedirectUrl`] when the callback URL is invalid.
    pub fn github_credentials(&self) -> Result<Option<GithubOAuthCredentials>, SettingsError> {
        let (client_id, client_secret, redirect_url) = match (
            &self.github_client_id,
            &self.github_client_secret,
            &self.github_redirect_url,
        ) {
            (None, None, None) => return Ok(None),
            (Some(id), Some(secret), Some(redirect)) => (id, secret, redirect),
            (None, _, _) => {
                return Err(SettingsError::IncompleteGithub {
                    missing: "APP_GITHUB_CLIENT_ID",
                });
            }
            (_, None, _) => {
                return Err(SettingsError::IncompleteGithub {
                    missing: "APP_GITHUB_CLIENT_SECRET",
                });
            }
            (_, _, None) => {
                return Err(SettingsError::IncompleteGithub {
                    missing: "APP_GITHUB_REDIRECT_URL",
                });
            }
        };
        let redirect_url =
            Url::parse(redirect_url).map_err(|source| SettingsError::InvalidRedirectUrl {
                value: redirect_url.clone(),
                source,
            })?;
        Ok(Some(GithubOAuthCredentials {
            client_id: client_id.clone(),
            client_secret: Zeroizing::new(client_secret.clone()),
            redirect_url,
        }))
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) github: Option<GithubOAuthCredentials>,
}

impl ServerConfig {
    /// Construct a server configuration around a database pool.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        db_pool: DbPool,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool,
            github: None,
        }
    }

    /// Sign users in through GitHub instead of the development fixture.
    #[must_use]
    pub fn with_github(mut self, credentials: Option<GithubOAuthCredentials>) -> Self {
        self.github = credentials;
        self
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "APP_BIND_ADDR",
        "APP_DATABASE_URL",
        "APP_DB_MAX_CONNECTIONS",
        "APP_GITHUB_CLIENT_ID",
        "APP_GITHUB_CLIENT_SECRET",
        "APP_GITHUB_REDIRECT_URL",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> AppSettings {
        let _guard = lock_env(VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        }));
        AppSettings::load_from_iter([OsString::from("schedule-arranger")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let settings = load_with(&[]);

        assert_eq!(
            settings.bind_addr().expect("default bind address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("socket address")
        );
        assert_eq!(settings.db_max_connections(), 10);
        assert!(settings.github_credentials().expect("no github").is_none());
        assert!(matches!(
            settings.database_url(None),
            Err(SettingsError::MissingDatabaseUrl)
        ));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("APP_BIND_ADDR", "127.0.0.1:3000"),
            ("APP_DATABASE_URL", "postgres://localhost/schedules"),
            ("APP_DB_MAX_CONNECTIONS", "4"),
        ]);

        assert_eq!(
            settings.bind_addr().expect("bind address").port(),
            3000
        );
        assert_eq!(
            settings
                .database_url(Some("postgres://fallback".to_owned()))
                .expect("database url"),
            "postgres://localhost/schedules"
        );
        assert_eq!(settings.db_max_connections(), 4);
    }

    #[rstest]
    fn database_url_falls_back() {
        let settings = load_with(&[]);

        assert_eq!(
            settings
                .database_url(Some("postgres://fallback".to_owned()))
                .expect("database url"),
            "postgres://fallback"
        );
    }

    #[rstest]
    fn complete_github_settings_yield_credentials() {
        let settings = load_with(&[
            ("APP_GITHUB_CLIENT_ID", "client"),
            ("APP_GITHUB_CLIENT_SECRET", "secret"),
            ("APP_GITHUB_REDIRECT_URL", "http://localhost:8000/auth/github/callback"),
        ]);

        let credentials = settings
            .github_credentials()
            .expect("valid github settings")
            .expect("credentials present");
        assert_eq!(credentials.client_id, "client");
        assert_eq!(credentials.client_secret.as_str(), "secret");
        assert_eq!(credentials.redirect_url.path(), "/auth/github/callback");
    }

    #[rstest]
    #[case(&[("APP_GITHUB_CLIENT_ID", "client")], "APP_GITHUB_CLIENT_SECRET")]
    #[case(&[("APP_GITHUB_CLIENT_SECRET", "secret")], "APP_GITHUB_CLIENT_ID")]
    fn partial_github_settings_are_rejected(
        #[case] overrides: &[(&str, &str)],
        #[case] expected_missing: &str,
    ) {
        let settings = load_with(overrides);

        let Err(SettingsError::IncompleteGithub { missing }) = settings.github_credentials() else {
            panic!("expected incomplete GitHub settings to be rejected");
        };
        assert_eq!(missing, expected_missing);
    }

    #[rstest]
    fn malformed_bind_address_is_reported() {
        let settings = load_with(&[("APP_BIND_ADDR", "localhost")]);

        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::InvalidBindAddr { .. })
        ));
    }
}
