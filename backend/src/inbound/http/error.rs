//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while giving the two
//! kinds of routes their own failure shape. HTML pages answer with a rendered
//! error page (or a redirect to the login page); JSON endpoints answer with a
//! `{"status":"NG","errors":[...]}` envelope.

use actix_web::http::header::{self, ContentType};
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

use super::views;

/// Result alias for JSON handlers.
pub type ApiResult<T> = Result<T, JsonError>;

/// Result alias for HTML handlers.
pub type PageResult<T> = Result<T, PageError>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        error!(message = error.message(), trace_id = ?error.trace_id(), "internal error");
        let mut redacted = Error::internal("Internal server error");
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

/// Failure envelope returned by the JSON endpoints.
#[derive(Debug, Serialize)]
struct JsonErrorBody<'a> {
    status: &'static str,
    errors: [&'a Error; 1],
}

/// Domain error rendered as a JSON `NG` envelope.
#[derive(Debug)]
pub struct JsonError(pub Error);

impl From<Error> for JsonError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        status_for(self.0.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.0.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        let redacted = redact_if_internal(&self.0);
        builder.json(JsonErrorBody {
            status: "NG",
            errors: [&redacted],
        })
    }
}

/// Failure of an HTML route.
#[derive(Debug)]
pub enum PageError {
    /// No signed-in user; the browser is sent to the login page and comes
    /// back to `from` afterwards.
    LoginRequired {
        /// Path to return to after signing in.
        from: String,
    },
    /// Any other domain failure, shown as an error page.
    Domain(Error),
}

impl PageError {
    /// Redirect to the login page, remembering `from`.
    pub fn login_required(from: impl Into<String>) -> Self {
        Self::LoginRequired { from: from.into() }
    }

    fn login_location(from: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("from", from)
            .finish();
        format!("/login?{query}")
    }
}

impl From<Error> for PageError {
    fn from(error: Error) -> Self {
        Self::Domain(error)
    }
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoginRequired { from } => write!(f, "login required for {from}"),
            Self::Domain(error) => error.fmt(f),
        }
    }
}

impl ResponseError for PageError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::LoginRequired { .. } => StatusCode::FOUND,
            // Pages never reveal that a schedule exists but belongs to
            // someone else.
            Self::Domain(error) if error.code() == ErrorCode::Forbidden => StatusCode::NOT_FOUND,
            Self::Domain(error) => status_for(error.code()),
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::LoginRequired { from } => HttpResponse::Found()
                .insert_header((header::LOCATION, Self::login_location(from)))
                .finish(),
            Self::Domain(error) => {
                let status = self.status_code();
                let shown = match error.code() {
                    ErrorCode::Forbidden | ErrorCode::NotFound => {
                        Error::not_found("ページが見つかりません")
                    }
                    _ => redact_if_internal(error),
                };
                let mut builder = HttpResponse::build(status);
                if let Some(id) = error.trace_id() {
                    builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
                }
                match views::render_error_page(status, &shown) {
                    Ok(body) => builder.content_type(ContentType::html()).body(body),
                    Err(render_error) => {
                        error!(error = %render_error, "failed to render error page");
                        builder
                            .content_type(ContentType::plaintext())
                            .body(shown.message().to_owned())
                    }
                }
            }
        }
    }
}
