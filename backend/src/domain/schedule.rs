//! Schedule aggregate: the event being organised and its candidate dates.
//!
//! Input normalisation lives here so every adapter applies the same rules:
//! schedule names are truncated to the column width, a blank name becomes
//! [`DEFAULT_SCHEDULE_NAME`], and candidate text is split one option per line.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Maximum length, in characters, of schedule names and comments.
pub const TEXT_MAX_CHARS: usize = 255;

/// Label stored when a schedule is created or renamed without a name.
pub const DEFAULT_SCHEDULE_NAME: &str = "（名称未設定）";

/// Keep at most `max` characters of `value`.
pub(crate) fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Schedule identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleId(Uuid);

impl ScheduleId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::str::FromStr for ScheduleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display name of a schedule.
///
/// # Examples
/// ```
/// use schedule_arranger::domain::{DEFAULT_SCHEDULE_NAME, ScheduleName};
///
/// assert_eq!(ScheduleName::from_input("  Launch  ").as_str(), "Launch");
/// assert_eq!(ScheduleName::from_input("   ").as_str(), DEFAULT_SCHEDULE_NAME);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleName(String);

impl ScheduleName {
    /// Normalise user input: trim, truncate, and default when empty.
    #[must_use]
    pub fn from_input(raw: &str) -> Self {
        let truncated = truncate_chars(raw.trim(), TEXT_MAX_CHARS);
        if truncated.is_empty() {
            Self(DEFAULT_SCHEDULE_NAME.to_owned())
        } else {
            Self(truncated)
        }
    }

    /// Rehydrate a stored name without re-normalising it.
    #[must_use]
    pub const fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ScheduleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Candidate identifier assigned by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(i64);

impl CandidateId {
    /// Wrap a stored identifier.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Raw numeric identifier.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl std::str::FromStr for CandidateId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self)
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Label of a single candidate date or option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateName(String);

impl CandidateName {
    /// Rehydrate a stored name.
    #[must_use]
    pub const fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CandidateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split the candidate textarea into names.
///
/// One candidate per line; lines are trimmed, blank lines dropped, order kept.
/// Duplicates are preserved.
///
/// # Examples
/// ```
/// use schedule_arranger::domain::parse_candidate_names;
///
/// let names = parse_candidate_names("C1\r\n\r\n  C2 \nC1");
/// let names: Vec<_> = names.iter().map(|n| n.as_str()).collect();
/// assert_eq!(names, ["C1", "C2", "C1"]);
/// ```
#[must_use]
pub fn parse_candidate_names(raw: &str) -> Vec<CandidateName> {
    raw.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| CandidateName(line.to_owned()))
        .collect()
}

/// A schedule row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: ScheduleId,
    pub name: ScheduleName,
    pub memo: String,
    pub created_by: UserId,
    pub updated_at: DateTime<Utc>,
}

/// A candidate belonging to a schedule, in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: CandidateId,
    pub schedule_id: ScheduleId,
    pub name: CandidateName,
}

/// Whether `user_id` may edit or delete `schedule`.
///
/// This is the only ownership rule in the application; every mutation that
/// requires ownership goes through it.
#[must_use]
pub fn is_owner(user_id: UserId, schedule: &Schedule) -> bool {
    schedule.created_by == user_id
}
