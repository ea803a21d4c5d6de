//! Server-rendered HTML pages.
//!
//! Templates are compiled into the binary and parsed once on first use.
//! File names end in `.html`, so Tera escapes every interpolated value.

use std::sync::LazyLock;

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tera::{Context, Tera};

use crate::domain::Error;

static TEMPLATES: LazyLock<Result<Tera, tera::Error>> = LazyLock::new(load_templates);

fn load_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("layout.html", include_str!("../../../templates/layout.html")),
        ("index.html", include_str!("../../../templates/index.html")),
        ("login.html", include_str!("../../../templates/login.html")),
        ("new.html", include_str!("../../../templates/new.html")),
        ("show.html", include_str!("../../../templates/show.html")),
        ("edit.html", include_str!("../../../templates/edit.html")),
        ("error.html", include_str!("../../../templates/error.html")),
    ])?;
    Ok(tera)
}

fn templates() -> Result<&'static Tera, &'static tera::Error> {
    TEMPLATES.as_ref()
}

/// Parse the embedded templates so syntax errors surface at startup.
///
/// # Errors
///
/// Returns the Tera parse error for the first broken template.
pub fn ensure_templates_loaded() -> Result<(), String> {
    templates().map(|_| ()).map_err(ToString::to_string)
}

fn render_context(template: &str, context: &Context) -> Result<String, tera::Error> {
    match templates() {
        Ok(tera) => tera.render(template, context),
        Err(error) => Err(tera::Error::msg(format!("templates unavailable: {error}"))),
    }
}

/// Render `template` with a serialisable context.
///
/// # Errors
///
/// Returns an internal error when the context cannot be serialised or the
/// template fails to render.
pub fn render<T: Serialize>(template: &str, context: &T) -> Result<String, Error> {
    let context = Context::from_serialize(context)
        .map_err(|err| Error::internal(format!("invalid context for {template}: {err}")))?;
    render_context(template, &context)
        .map_err(|err| Error::internal(format!("failed to render {template}: {err}")))
}

/// Render `template` into a `200 OK` HTML response.
///
/// # Errors
///
/// See [`render`].
pub fn page<T: Serialize>(template: &str, context: &T) -> Result<HttpResponse, Error> {
    let body = render(template, context)?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body))
}

/// Timestamp as shown in schedule lists and pages.
pub(crate) fn display_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y/%m/%d %H:%M:%S").to_string()
}

#[derive(Serialize)]
struct ErrorPage<'a> {
    status: u16,
    message: &'a str,
    trace_id: Option<&'a str>,
}

pub(crate) fn render_error_page(status: StatusCode, error: &Error) -> Result<String, tera::Error> {
    let context = Context::from_serialize(ErrorPage {
        status: status.as_u16(),
        message: error.message(),
        trace_id: error.trace_id(),
    })?;
    render_context("error.html", &context)
}
