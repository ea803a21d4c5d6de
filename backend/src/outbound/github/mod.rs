//! GitHub OAuth identity provider adapter.

mod dto;
mod http_provider;

pub use http_provider::{GithubEndpoints, GithubIdentityProvider, GithubOAuthCredentials};
