//! Driving port for schedule mutations.
//!
//! HTTP handlers call [`ScheduleCommand`] with raw form input; the domain
//! service normalises it, enforces ownership, and commits the change.

use async_trait::async_trait;

use crate::domain::{
    Availability, CandidateId, CommentText, Error, Schedule, ScheduleId, User, UserId,
};

/// Raw input for creating a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateScheduleRequest {
    pub owner: User,
    pub name: String,
    pub memo: String,
    /// Newline-separated candidate names.
    pub candidates: String,
}

/// Raw input for editing a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateScheduleRequest {
    pub requester: UserId,
    pub schedule_id: ScheduleId,
    pub name: String,
    pub memo: String,
    /// Newline-separated names appended after the existing candidates.
    pub new_candidates: String,
}

/// A user's availability for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetAvailabilityRequest {
    pub requester: UserId,
    pub schedule_id: ScheduleId,
    pub target_user: UserId,
    pub candidate_id: CandidateId,
    pub availability: Availability,
}

/// A user's comment on a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCommentRequest {
    pub requester: UserId,
    pub schedule_id: ScheduleId,
    pub target_user: UserId,
    pub comment: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleCommand: Send + Sync {
    /// Create a schedule with its candidates.
    async fn create_schedule(&self, request: CreateScheduleRequest) -> Result<Schedule, Error>;

    /// Rename a schedule, replace its memo, and append candidates.
    ///
    /// # Errors
    ///
    /// `NotFound` when the schedule is absent, `Forbidden` unless the
    /// requester owns it.
    async fn update_schedule(&self, request: UpdateScheduleRequest) -> Result<Schedule, Error>;

    /// Record an availability mark, overwriting any previous one.
    ///
    /// # Errors
    ///
    /// `Forbidden` when the requester marks on behalf of another user,
    /// `NotFound` when the schedule or candidate is absent.
    async fn set_availability(&self, request: SetAvailabilityRequest)
    -> Result<Availability, Error>;

    /// Record a comment, overwriting any previous one.
    ///
    /// # Errors
    ///
    /// `Forbidden` when the requester comments on behalf of another user,
    /// `NotFound` when the schedule is absent.
    async fn set_comment(&self, request: SetCommentRequest) -> Result<CommentText, Error>;

    /// Delete a schedule with all of its candidates, marks, and comments.
    ///
    /// # Errors
    ///
    /// `NotFound` when the schedule is absent, `Forbidden` unless the
    /// requester owns it.
    async fn delete_schedule(&self, requester: UserId, schedule_id: ScheduleId)
    -> Result<(), Error>;
}
