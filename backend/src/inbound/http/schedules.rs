//! Schedule pages and form submissions.
//!
//! ```text
//! GET  /schedules/new
//! POST /schedules
//! GET  /schedules/{scheduleId}
//! GET  /schedules/{scheduleId}/edit
//! POST /schedules/{scheduleId}/update
//! POST /schedules/{scheduleId}/delete
//! ```
//!
//! Every route requires a signed-in user. Forbidden results are rendered as
//! the not-found page by [`PageError`](super::PageError).

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{CreateScheduleRequest, UpdateScheduleRequest};
use crate::domain::{AttendanceGrid, Availability, Candidate, ScheduleId, User, is_owner};
use crate::inbound::http::error::PageResult;
use crate::inbound::http::session::{AuthenticatedUser, SessionUser};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_schedule_id;
use crate::inbound::http::views;

/// Fields posted by the create and edit forms.
#[derive(Debug, Default, Deserialize)]
pub struct ScheduleForm {
    #[serde(rename = "scheduleName", default)]
    schedule_name: String,
    #[serde(default)]
    memo: String,
    /// Newline-separated candidate names.
    #[serde(default)]
    candidates: String,
}

fn see_schedule(schedule_id: ScheduleId) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, format!("/schedules/{schedule_id}")))
        .finish()
}

#[derive(Serialize)]
struct NewPage {
    user: SessionUser,
}

/// Show the creation form.
#[get("/schedules/new")]
pub async fn new_schedule(user: AuthenticatedUser) -> PageResult<HttpResponse> {
    Ok(views::page(
        "new.html",
        &NewPage {
            user: SessionUser::from(user.user()),
        },
    )?)
}

/// Create a schedule and redirect to it.
#[post("/schedules")]
pub async fn create_schedule(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    form: web::Form<ScheduleForm>,
) -> PageResult<HttpResponse> {
    let ScheduleForm {
        schedule_name,
        memo,
        candidates,
    } = form.into_inner();
    let schedule = state
        .schedules
        .create_schedule(CreateScheduleRequest {
            owner: user.0,
            name: schedule_name,
            memo,
            candidates,
        })
        .await?;
    Ok(see_schedule(schedule.id))
}

#[derive(Serialize)]
struct ScheduleView {
    id: String,
    name: String,
    memo: String,
    updated_at: String,
    is_owner: bool,
}

#[derive(Serialize)]
struct CellView {
    user_id: i64,
    value: i16,
    next: i16,
    label: &'static str,
    is_self: bool,
}

/// One entry of the cycle the grid buttons step through, indexed by value.
#[derive(Serialize)]
struct AvailabilityStep {
    value: i16,
    next: i16,
    label: &'static str,
}

impl From<Availability> for AvailabilityStep {
    fn from(mark: Availability) -> Self {
        Self {
            value: mark.value(),
            next: mark.next().value(),
            label: mark.label(),
        }
    }
}

#[derive(Serialize)]
struct CandidateRowView {
    id: i64,
    name: String,
    cells: Vec<CellView>,
}

#[derive(Serialize)]
struct ParticipantView {
    id: i64,
    username: String,
    is_self: bool,
    comment: String,
}

#[derive(Serialize)]
struct ShowPage {
    user: SessionUser,
    schedule: ScheduleView,
    candidates: Vec<CandidateRowView>,
    participants: Vec<ParticipantView>,
    availability_steps: Vec<AvailabilityStep>,
}

impl ShowPage {
    fn new(grid: &AttendanceGrid, viewer: &User) -> Self {
        let schedule = grid.schedule();
        let participants = grid.participants();
        let candidates = grid
            .candidates()
            .iter()
            .map(|candidate| CandidateRowView {
                id: candidate.id.value(),
                name: candidate.name.as_str().to_owned(),
                cells: participants
                    .iter()
                    .map(|participant| {
                        let mark = grid.availability(participant.user.id(), candidate.id);
                        CellView {
                            user_id: participant.user.id().value(),
                            value: mark.value(),
                            next: mark.next().value(),
                            label: mark.label(),
                            is_self: participant.is_self,
                        }
                    })
                    .collect(),
            })
            .collect();
        let participants = participants
            .iter()
            .map(|participant| ParticipantView {
                id: participant.user.id().value(),
                username: participant.user.username().as_str().to_owned(),
                is_self: participant.is_self,
                comment: grid
                    .comment(participant.user.id())
                    .map(|comment| comment.as_str().to_owned())
                    .unwrap_or_default(),
            })
            .collect();

        Self {
            user: SessionUser::from(viewer),
            schedule: ScheduleView {
                id: schedule.id.to_string(),
                name: schedule.name.as_str().to_owned(),
                memo: schedule.memo.clone(),
                updated_at: views::display_timestamp(&schedule.updated_at),
                is_owner: is_owner(viewer.id(), schedule),
            },
            candidates,
            participants,
            availability_steps: Availability::ALL
                .into_iter()
                .map(AvailabilityStep::from)
                .collect(),
        }
    }
}

/// Show the attendance grid of a schedule.
#[get("/schedules/{schedule_id}")]
pub async fn show_schedule(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> PageResult<HttpResponse> {
    let schedule_id = parse_schedule_id(&path.into_inner())?;
    let grid = state
        .schedules_query
        .attendance_grid(user.user(), schedule_id)
        .await?;
    Ok(views::page("show.html", &ShowPage::new(&grid, user.user()))?)
}

#[derive(Serialize)]
struct EditCandidateView {
    name: String,
}

impl From<&Candidate> for EditCandidateView {
    fn from(candidate: &Candidate) -> Self {
        Self {
            name: candidate.name.as_str().to_owned(),
        }
    }
}

#[derive(Serialize)]
struct EditScheduleView {
    id: String,
    name: String,
    memo: String,
}

#[derive(Serialize)]
struct EditPage {
    user: SessionUser,
    schedule: EditScheduleView,
    candidates: Vec<EditCandidateView>,
}

/// Show the edit form to the schedule's owner.
#[get("/schedules/{schedule_id}/edit")]
pub async fn edit_schedule(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> PageResult<HttpResponse> {
    let schedule_id = parse_schedule_id(&path.into_inner())?;
    let editable = state
        .schedules_query
        .editable_schedule(user.user().id(), schedule_id)
        .await?;
    let page = EditPage {
        user: SessionUser::from(user.user()),
        schedule: EditScheduleView {
            id: editable.schedule.id.to_string(),
            name: editable.schedule.name.as_str().to_owned(),
            memo: editable.schedule.memo.clone(),
        },
        candidates: editable
            .candidates
            .iter()
            .map(EditCandidateView::from)
            .collect(),
    };
    Ok(views::page("edit.html", &page)?)
}

/// Apply the edit form and redirect back to the schedule.
#[post("/schedules/{schedule_id}/update")]
pub async fn update_schedule(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    form: web::Form<ScheduleForm>,
) -> PageResult<HttpResponse> {
    let schedule_id = parse_schedule_id(&path.into_inner())?;
    let ScheduleForm {
        schedule_name,
        memo,
        candidates,
    } = form.into_inner();
    let schedule = state
        .schedules
        .update_schedule(UpdateScheduleRequest {
            requester: user.user().id(),
            schedule_id,
            name: schedule_name,
            memo,
            new_candidates: candidates,
        })
        .await?;
    Ok(see_schedule(schedule.id))
}

/// Delete a schedule and everything attached to it.
#[post("/schedules/{schedule_id}/delete")]
pub async fn delete_schedule(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> PageResult<HttpResponse> {
    let schedule_id = parse_schedule_id(&path.into_inner())?;
    state
        .schedules
        .delete_schedule(user.user().id(), schedule_id)
        .await?;
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .finish())
}

#[cfg(test)]
#[path = "schedules_tests.rs"]
mod tests;
