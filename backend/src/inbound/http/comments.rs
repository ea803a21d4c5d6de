//! Comment endpoint.
//!
//! ```text
//! POST /schedules/{scheduleId}/users/{userId}/comments
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::ports::SetCommentRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::NgEnvelopeSchema;
use crate::inbound::http::session::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_comment, parse_schedule_id, parse_user_id};

/// Request payload for a comment.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CommentRequestBody {
    /// Free text; longer input is cut to 255 characters.
    #[serde(default)]
    #[schema(value_type = String, example = "遅れて参加します")]
    pub comment: Option<Value>,
}

/// Response payload echoing the stored comment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentResponseBody {
    /// Always `OK`.
    #[schema(example = "OK")]
    pub status: String,
    /// Stored text after truncation.
    pub comment: String,
}

/// Record the signed-in user's comment on a schedule.
#[utoipa::path(
    post,
    path = "/schedules/{scheduleId}/users/{userId}/comments",
    params(
        ("scheduleId" = String, Path, description = "Schedule UUID"),
        ("userId" = i64, Path, description = "Must be the signed-in user")
    ),
    request_body = CommentRequestBody,
    responses(
        (status = 200, description = "Comment stored", body = CommentResponseBody),
        (status = 302, description = "Login required"),
        (status = 400, description = "Invalid request", body = NgEnvelopeSchema),
        (status = 403, description = "Commenting for another user", body = NgEnvelopeSchema),
        (status = 404, description = "Unknown schedule", body = NgEnvelopeSchema),
        (status = 503, description = "Service unavailable", body = NgEnvelopeSchema)
    ),
    tags = ["attendance"],
    operation_id = "setComment",
    security(("SessionCookie" = []))
)]
#[post("/schedules/{schedule_id}/users/{user_id}/comments")]
pub async fn set_comment(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<(String, String)>,
    payload: web::Json<CommentRequestBody>,
) -> ApiResult<web::Json<CommentResponseBody>> {
    let (schedule_id, user_id) = path.into_inner();
    let request = SetCommentRequest {
        requester: user.user().id(),
        schedule_id: parse_schedule_id(&schedule_id)?,
        target_user: parse_user_id(&user_id)?,
        comment: parse_comment(payload.comment.as_ref())?,
    };

    let stored = state.schedules.set_comment(request).await?;
    Ok(web::Json(CommentResponseBody {
        status: "OK".to_owned(),
        comment: stored.as_str().to_owned(),
    }))
}
