//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] covers the JSON surface only: the two attendance endpoints
//! driven by the schedule page and the health probes. HTML pages and the
//! OAuth redirects are not documented here.
//!
//! The generated document is served by Swagger UI in debug builds.

use crate::inbound::http::availabilities::{AvailabilityRequestBody, AvailabilityResponseBody};
use crate::inbound::http::comments::{CommentRequestBody, CommentResponseBody};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, NgEnvelopeSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued after GET /auth/github/callback.",
            ))),
        );
    }
}

/// OpenAPI document for the JSON endpoints.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Schedule arranger API",
        description = "Attendance endpoints used by the schedule page, plus health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::availabilities::set_availability,
        crate::inbound::http::comments::set_comment,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        AvailabilityRequestBody,
        AvailabilityResponseBody,
        CommentRequestBody,
        CommentResponseBody,
        NgEnvelopeSchema,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "attendance", description = "Availability marks and comments"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
