//! Attendance grid view model.
//!
//! [`build_attendance_grid`] joins a schedule's candidates, availability marks
//! and comments into a dense candidates × users table. It performs no I/O so
//! the join can be tested in isolation; the query service loads the rows and
//! hands them over.

use std::collections::HashMap;

use super::{
    Availability, AvailabilityEntry, Candidate, CandidateId, CommentText, Schedule, User, UserId,
};

/// Rows loaded for one schedule, in storage order.
#[derive(Debug, Clone)]
pub struct AttendanceRows {
    pub schedule: Schedule,
    /// Candidates ordered by identifier.
    pub candidates: Vec<Candidate>,
    /// Availability marks with their users.
    pub availabilities: Vec<AvailabilityEntry>,
    /// `(user, comment)` pairs.
    pub comments: Vec<(UserId, CommentText)>,
}

/// A user shown as a grid column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub user: User,
    /// True for the viewer; exactly one participant has it set.
    pub is_self: bool,
}

/// Dense attendance table for one schedule.
#[derive(Debug, Clone)]
pub struct AttendanceGrid {
    schedule: Schedule,
    candidates: Vec<Candidate>,
    participants: Vec<Participant>,
    availability: HashMap<UserId, HashMap<CandidateId, Availability>>,
    comments: HashMap<UserId, CommentText>,
}

impl AttendanceGrid {
    /// The schedule being shown.
    #[must_use]
    pub const fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Candidates in display order.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Participants in display order; the viewer comes first.
    #[must_use]
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Availability of `user` for `candidate`.
    ///
    /// Every participant/candidate pair is populated, so the fallback only
    /// applies to users outside the grid.
    #[must_use]
    pub fn availability(&self, user: UserId, candidate: CandidateId) -> Availability {
        self.availability
            .get(&user)
            .and_then(|row| row.get(&candidate))
            .copied()
            .unwrap_or_default()
    }

    /// Comment left by `user`, if any.
    #[must_use]
    pub fn comment(&self, user: UserId) -> Option<&CommentText> {
        self.comments.get(&user)
    }
}

/// Build the attendance grid for `viewer`.
///
/// Participants are the viewer plus every user with at least one mark,
/// deduplicated and ordered by first appearance after the viewer. Missing
/// cells are filled with [`Availability::Absent`]. Comments carry no default.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use schedule_arranger::domain::{
///     AttendanceRows, Availability, Candidate, CandidateId, CandidateName, Schedule,
///     ScheduleId, ScheduleName, User, build_attendance_grid,
/// };
///
/// let viewer = User::try_from_parts(1, "alice").expect("valid user");
/// let schedule = Schedule {
///     id: ScheduleId::random(),
///     name: ScheduleName::from_input("Launch"),
///     memo: String::new(),
///     created_by: viewer.id(),
///     updated_at: Utc::now(),
/// };
/// let candidate = Candidate {
///     id: CandidateId::new(10),
///     schedule_id: schedule.id,
///     name: CandidateName::from_stored("Monday".into()),
/// };
/// let grid = build_attendance_grid(
///     AttendanceRows {
///         schedule,
///         candidates: vec![candidate],
///         availabilities: Vec::new(),
///         comments: Vec::new(),
///     },
///     &viewer,
/// );
/// assert_eq!(grid.participants().len(), 1);
/// assert_eq!(
///     grid.availability(viewer.id(), CandidateId::new(10)),
///     Availability::Absent
/// );
/// ```
#[must_use]
pub fn build_attendance_grid(rows: AttendanceRows, viewer: &User) -> AttendanceGrid {
    let AttendanceRows {
        schedule,
        candidates,
        availabilities,
        comments,
    } = rows;

    let mut participants = vec![Participant {
        user: viewer.clone(),
        is_self: true,
    }];
    let mut availability: HashMap<UserId, HashMap<CandidateId, Availability>> = HashMap::new();

    for entry in availabilities {
        let user_id = entry.user.id();
        if !participants.iter().any(|p| p.user.id() == user_id) {
            participants.push(Participant {
                user: entry.user,
                is_self: false,
            });
        }
        availability
            .entry(user_id)
            .or_default()
            .insert(entry.candidate_id, entry.availability);
    }

    for participant in &participants {
        let row = availability.entry(participant.user.id()).or_default();
        for candidate in &candidates {
            row.entry(candidate.id).or_default();
        }
    }

    AttendanceGrid {
        schedule,
        candidates,
        participants,
        availability,
        comments: comments.into_iter().collect(),
    }
}
