//! Attendance responses: availability marks and per-schedule comments.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::schedule::{TEXT_MAX_CHARS, truncate_chars};
use super::{CandidateId, ScheduleId, User, UserId};

/// A user's answer for one candidate.
///
/// Stored and transmitted as `0`, `1`, or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Availability {
    /// Not attending. Also the reading of a missing mark.
    #[default]
    Absent,
    /// Undecided.
    Unknown,
    /// Attending.
    Present,
}

/// Raised when a numeric availability falls outside `0..=2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("availability must be 0, 1, or 2 (got {0})")]
pub struct AvailabilityOutOfRange(pub i64);

impl Availability {
    /// Every value, in wire order.
    pub const ALL: [Self; 3] = [Self::Absent, Self::Unknown, Self::Present];

    /// Numeric wire and storage value.
    #[must_use]
    pub const fn value(self) -> i16 {
        match self {
            Self::Absent => 0,
            Self::Unknown => 1,
            Self::Present => 2,
        }
    }

    /// Short label rendered in the attendance grid.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Absent => "欠",
            Self::Unknown => "？",
            Self::Present => "出",
        }
    }

    /// Next value in the absent → unknown → present cycle used by the grid
    /// buttons.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Absent => Self::Unknown,
            Self::Unknown => Self::Present,
            Self::Present => Self::Absent,
        }
    }
}

impl TryFrom<i64> for Availability {
    type Error = AvailabilityOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Absent),
            1 => Ok(Self::Unknown),
            2 => Ok(Self::Present),
            other => Err(AvailabilityOutOfRange(other)),
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Comment text, truncated to the column width.
///
/// # Examples
/// ```
/// use schedule_arranger::domain::{CommentText, TEXT_MAX_CHARS};
///
/// let long = "x".repeat(TEXT_MAX_CHARS + 1);
/// assert_eq!(CommentText::from_input(&long).as_str().len(), TEXT_MAX_CHARS);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentText(String);

impl CommentText {
    /// Normalise user input by truncating it.
    #[must_use]
    pub fn from_input(raw: &str) -> Self {
        Self(truncate_chars(raw, TEXT_MAX_CHARS))
    }

    /// Rehydrate stored text.
    #[must_use]
    pub const fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// Borrow the text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CommentText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One availability row to upsert, keyed by candidate and user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityMark {
    pub schedule_id: ScheduleId,
    pub candidate_id: CandidateId,
    pub user_id: UserId,
    pub availability: Availability,
}

/// A stored availability row joined with the user who made it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityEntry {
    pub user: User,
    pub candidate_id: CandidateId,
    pub availability: Availability,
}

/// One comment row, keyed by schedule and user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleComment {
    pub schedule_id: ScheduleId,
    pub user_id: UserId,
    pub comment: CommentText,
}
