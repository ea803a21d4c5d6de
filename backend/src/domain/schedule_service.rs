//! Schedule domain service.
//!
//! Implements [`ScheduleCommand`] and [`ScheduleQuery`] on top of a
//! [`ScheduleRepository`]. Input normalisation, ownership checks, and
//! timestamping happen here; the repository only stores what it is given.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    CreateScheduleRequest, EditableSchedule, ScheduleCommand, ScheduleQuery, ScheduleRepository,
    ScheduleRepositoryError, SetAvailabilityRequest, SetCommentRequest, UpdateScheduleRequest,
};
use crate::domain::{
    AttendanceGrid, AttendanceRows, Availability, AvailabilityMark, CommentText, Error, Schedule,
    ScheduleComment, ScheduleId, ScheduleName, User, UserId, build_attendance_grid, is_owner,
    parse_candidate_names,
};

/// Schedule service implementing the schedule driving ports.
#[derive(Clone)]
pub struct ScheduleService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ScheduleService<R> {
    /// Create a new service with the given repository and clock.
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

fn map_repository_error(error: ScheduleRepositoryError) -> Error {
    match error {
        ScheduleRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("schedule repository unavailable: {message}"))
        }
        ScheduleRepositoryError::Query { message } => {
            Error::internal(format!("schedule repository error: {message}"))
        }
    }
}

fn schedule_not_found(schedule_id: ScheduleId) -> Error {
    Error::not_found("schedule not found").with_details(json!({
        "scheduleId": schedule_id.to_string(),
        "code": "schedule_not_found",
    }))
}

fn ensure_acting_for_self(requester: UserId, target_user: UserId) -> Result<(), Error> {
    if requester == target_user {
        Ok(())
    } else {
        Err(Error::forbidden("cannot respond on behalf of another user"))
    }
}

impl<R> ScheduleService<R>
where
    R: ScheduleRepository,
{
    async fn load_schedule(&self, schedule_id: ScheduleId) -> Result<Schedule, Error> {
        self.repo
            .find_by_id(&schedule_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| schedule_not_found(schedule_id))
    }

    async fn load_owned_schedule(
        &self,
        requester: UserId,
        schedule_id: ScheduleId,
    ) -> Result<Schedule, Error> {
        let schedule = self.load_schedule(schedule_id).await?;
        if is_owner(requester, &schedule) {
            Ok(schedule)
        } else {
            Err(Error::forbidden("only the schedule owner may change it"))
        }
    }
}

#[async_trait]
impl<R> ScheduleCommand for ScheduleService<R>
where
    R: ScheduleRepository,
{
    async fn create_schedule(&self, request: CreateScheduleRequest) -> Result<Schedule, Error> {
        let CreateScheduleRequest {
            owner,
            name,
            memo,
            candidates,
        } = request;
        let schedule = Schedule {
            id: ScheduleId::random(),
            name: ScheduleName::from_input(&name),
            memo,
            created_by: owner.id(),
            updated_at: self.clock.utc(),
        };
        let candidate_names = parse_candidate_names(&candidates);

        let stored = self
            .repo
            .create(&schedule, &candidate_names)
            .await
            .map_err(map_repository_error)?;
        info!(
            schedule_id = %schedule.id,
            owner = %schedule.created_by,
            candidates = stored.len(),
            "schedule created"
        );
        Ok(schedule)
    }

    async fn update_schedule(&self, request: UpdateScheduleRequest) -> Result<Schedule, Error> {
        let UpdateScheduleRequest {
            requester,
            schedule_id,
            name,
            memo,
            new_candidates,
        } = request;
        let existing = self.load_owned_schedule(requester, schedule_id).await?;
        let schedule = Schedule {
            name: ScheduleName::from_input(&name),
            memo,
            updated_at: self.clock.utc(),
            ..existing
        };
        let appended = parse_candidate_names(&new_candidates);

        let stored = self
            .repo
            .update(&schedule, &appended)
            .await
            .map_err(map_repository_error)?;
        info!(
            schedule_id = %schedule.id,
            appended = stored.len(),
            "schedule updated"
        );
        Ok(schedule)
    }

    async fn set_availability(
        &self,
        request: SetAvailabilityRequest,
    ) -> Result<Availability, Error> {
        let SetAvailabilityRequest {
            requester,
            schedule_id,
            target_user,
            candidate_id,
            availability,
        } = request;
        ensure_acting_for_self(requester, target_user)?;
        self.load_schedule(schedule_id).await?;
        let candidates = self
            .repo
            .candidates(&schedule_id)
            .await
            .map_err(map_repository_error)?;
        if !candidates.iter().any(|candidate| candidate.id == candidate_id) {
            return Err(Error::not_found("candidate not found").with_details(json!({
                "candidateId": candidate_id.value(),
                "code": "candidate_not_found",
            })));
        }

        self.repo
            .upsert_availability(&AvailabilityMark {
                schedule_id,
                candidate_id,
                user_id: target_user,
                availability,
            })
            .await
            .map_err(map_repository_error)?;
        Ok(availability)
    }

    async fn set_comment(&self, request: SetCommentRequest) -> Result<CommentText, Error> {
        let SetCommentRequest {
            requester,
            schedule_id,
            target_user,
            comment,
        } = request;
        ensure_acting_for_self(requester, target_user)?;
        self.load_schedule(schedule_id).await?;

        let comment = CommentText::from_input(&comment);
        self.repo
            .upsert_comment(&ScheduleComment {
                schedule_id,
                user_id: target_user,
                comment: comment.clone(),
            })
            .await
            .map_err(map_repository_error)?;
        Ok(comment)
    }

    async fn delete_schedule(
        &self,
        requester: UserId,
        schedule_id: ScheduleId,
    ) -> Result<(), Error> {
        self.load_owned_schedule(requester, schedule_id).await?;
        self.repo
            .delete_aggregate(&schedule_id)
            .await
            .map_err(map_repository_error)?;
        info!(schedule_id = %schedule_id, "schedule deleted");
        Ok(())
    }
}

#[async_trait]
impl<R> ScheduleQuery for ScheduleService<R>
where
    R: ScheduleRepository,
{
    async fn owned_schedules(&self, owner: UserId) -> Result<Vec<Schedule>, Error> {
        self.repo
            .list_by_owner(owner)
            .await
            .map_err(map_repository_error)
    }

    async fn attendance_grid(
        &self,
        viewer: &User,
        schedule_id: ScheduleId,
    ) -> Result<AttendanceGrid, Error> {
        let schedule = self.load_schedule(schedule_id).await?;
        let candidates = self
            .repo
            .candidates(&schedule_id)
            .await
            .map_err(map_repository_error)?;
        let availabilities = self
            .repo
            .availabilities(&schedule_id)
            .await
            .map_err(map_repository_error)?;
        let comments = self
            .repo
            .comments(&schedule_id)
            .await
            .map_err(map_repository_error)?;

        Ok(build_attendance_grid(
            AttendanceRows {
                schedule,
                candidates,
                availabilities,
                comments,
            },
            viewer,
        ))
    }

    async fn editable_schedule(
        &self,
        requester: UserId,
        schedule_id: ScheduleId,
    ) -> Result<EditableSchedule, Error> {
        let schedule = self.load_owned_schedule(requester, schedule_id).await?;
        let candidates = self
            .repo
            .candidates(&schedule_id)
            .await
            .map_err(map_repository_error)?;
        Ok(EditableSchedule {
            schedule,
            candidates,
        })
    }
}

#[cfg(test)]
#[path = "schedule_service_tests.rs"]
mod tests;
