//! Driven port for schedule persistence.
//!
//! One repository covers the whole schedule aggregate (schedule, candidates,
//! availability marks, comments) so multi-table mutations can be committed in
//! a single transaction by the adapter.

use async_trait::async_trait;

use crate::domain::{
    AvailabilityEntry, AvailabilityMark, Candidate, CandidateName, CommentText, Schedule,
    ScheduleComment, ScheduleId, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by schedule repository adapters.
    pub enum ScheduleRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "schedule repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "schedule repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Insert a schedule together with its initial candidates, atomically.
    ///
    /// Returns the stored candidates in insertion order.
    async fn create(
        &self,
        schedule: &Schedule,
        candidates: &[CandidateName],
    ) -> Result<Vec<Candidate>, ScheduleRepositoryError>;

    /// Update name, memo and timestamp, then append `appended` candidates,
    /// atomically. Existing candidates are left untouched.
    async fn update(
        &self,
        schedule: &Schedule,
        appended: &[CandidateName],
    ) -> Result<Vec<Candidate>, ScheduleRepositoryError>;

    /// Fetch a schedule by identifier.
    async fn find_by_id(&self, id: &ScheduleId)
    -> Result<Option<Schedule>, ScheduleRepositoryError>;

    /// Schedules created by `owner`, most recently updated first.
    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Schedule>, ScheduleRepositoryError>;

    /// Candidates of a schedule ordered by identifier.
    async fn candidates(&self, id: &ScheduleId) -> Result<Vec<Candidate>, ScheduleRepositoryError>;

    /// Availability rows of a schedule with their users, ordered by user then
    /// candidate.
    async fn availabilities(
        &self,
        id: &ScheduleId,
    ) -> Result<Vec<AvailabilityEntry>, ScheduleRepositoryError>;

    /// Comments of a schedule, ordered by user.
    async fn comments(
        &self,
        id: &ScheduleId,
    ) -> Result<Vec<(UserId, CommentText)>, ScheduleRepositoryError>;

    /// Create or overwrite the mark keyed by candidate and user.
    async fn upsert_availability(
        &self,
        mark: &AvailabilityMark,
    ) -> Result<(), ScheduleRepositoryError>;

    /// Create or overwrite the comment keyed by schedule and user.
    async fn upsert_comment(&self, comment: &ScheduleComment)
    -> Result<(), ScheduleRepositoryError>;

    /// Remove availability marks, candidates, comments and the schedule in one
    /// transaction.
    async fn delete_aggregate(&self, id: &ScheduleId) -> Result<(), ScheduleRepositoryError>;
}
