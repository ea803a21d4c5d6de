//! Availability mark endpoint.
//!
//! ```text
//! POST /schedules/{scheduleId}/users/{userId}/candidates/{candidateId}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::ports::SetAvailabilityRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::NgEnvelopeSchema;
use crate::inbound::http::session::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    parse_availability, parse_candidate_id, parse_schedule_id, parse_user_id,
};

/// Request payload for an availability mark.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct AvailabilityRequestBody {
    /// 0 absent, 1 unknown, 2 present. Omitted means 0.
    #[serde(default)]
    #[schema(value_type = Option<i32>, minimum = 0, maximum = 2, example = 2)]
    pub availability: Option<Value>,
}

/// Response payload echoing the stored mark.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityResponseBody {
    /// Always `OK`.
    #[schema(example = "OK")]
    pub status: String,
    /// Stored value.
    #[schema(example = 2)]
    pub availability: i16,
}

/// Record the signed-in user's availability for one candidate.
#[utoipa::path(
    post,
    path = "/schedules/{scheduleId}/users/{userId}/candidates/{candidateId}",
    params(
        ("scheduleId" = String, Path, description = "Schedule UUID"),
        ("userId" = i64, Path, description = "Must be the signed-in user"),
        ("candidateId" = i64, Path, description = "Candidate of the schedule")
    ),
    request_body = AvailabilityRequestBody,
    responses(
        (status = 200, description = "Mark stored", body = AvailabilityResponseBody),
        (status = 302, description = "Login required"),
        (status = 400, description = "Invalid request", body = NgEnvelopeSchema),
        (status = 403, description = "Marking for another user", body = NgEnvelopeSchema),
        (status = 404, description = "Unknown schedule or candidate", body = NgEnvelopeSchema),
        (status = 503, description = "Service unavailable", body = NgEnvelopeSchema)
    ),
    tags = ["attendance"],
    operation_id = "setAvailability",
    security(("SessionCookie" = []))
)]
#[post("/schedules/{schedule_id}/users/{user_id}/candidates/{candidate_id}")]
pub async fn set_availability(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<(String, String, String)>,
    payload: web::Json<AvailabilityRequestBody>,
) -> ApiResult<web::Json<AvailabilityResponseBody>> {
    let (schedule_id, user_id, candidate_id) = path.into_inner();
    let request = SetAvailabilityRequest {
        requester: user.user().id(),
        schedule_id: parse_schedule_id(&schedule_id)?,
        target_user: parse_user_id(&user_id)?,
        candidate_id: parse_candidate_id(&candidate_id)?,
        availability: parse_availability(payload.availability.as_ref())?,
    };

    let stored = state.schedules.set_availability(request).await?;
    Ok(web::Json(AvailabilityResponseBody {
        status: "OK".to_owned(),
        availability: stored.value(),
    }))
}

#[cfg(test)]
#[path = "availabilities_tests.rs"]
mod tests;
