//! Driving port for read-only schedule views.

use async_trait::async_trait;

use crate::domain::{AttendanceGrid, Candidate, Error, Schedule, ScheduleId, User, UserId};

/// A schedule with its candidates, as shown on the edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableSchedule {
    pub schedule: Schedule,
    pub candidates: Vec<Candidate>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleQuery: Send + Sync {
    /// Schedules created by `owner`, most recently updated first.
    async fn owned_schedules(&self, owner: UserId) -> Result<Vec<Schedule>, Error>;

    /// The attendance grid of a schedule as seen by `viewer`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the schedule is absent.
    async fn attendance_grid(
        &self,
        viewer: &User,
        schedule_id: ScheduleId,
    ) -> Result<AttendanceGrid, Error>;

    /// Load a schedule for editing.
    ///
    /// # Errors
    ///
    /// `NotFound` when the schedule is absent, `Forbidden` unless the
    /// requester owns it.
    async fn editable_schedule(
        &self,
        requester: UserId,
        schedule_id: ScheduleId,
    ) -> Result<EditableSchedule, Error>;
}
