//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{availabilities, candidates, comments, schedules, users};

// ---------------------------------------------------------------------------
// User models
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub user_id: i64,
    pub username: String,
}

/// Insertable struct for creating or refreshing user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub user_id: i64,
    pub username: &'a str,
}

// ---------------------------------------------------------------------------
// Schedule models
// ---------------------------------------------------------------------------

/// Row struct for reading from the schedules table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schedules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ScheduleRow {
    pub schedule_id: Uuid,
    pub schedule_name: String,
    pub memo: String,
    pub created_by: i64,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for new schedules.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schedules)]
pub(crate) struct NewScheduleRow<'a> {
    pub schedule_id: Uuid,
    pub schedule_name: &'a str,
    pub memo: &'a str,
    pub created_by: i64,
    pub updated_at: DateTime<Utc>,
}

/// Changeset applied when the owner edits a schedule.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schedules)]
pub(crate) struct ScheduleUpdate<'a> {
    pub schedule_name: &'a str,
    pub memo: &'a str,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Candidate models
// ---------------------------------------------------------------------------

/// Row struct for reading from the candidates table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = candidates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CandidateRow {
    pub candidate_id: i64,
    pub candidate_name: String,
    pub schedule_id: Uuid,
}

/// Insertable struct for new candidates; the id comes from the sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = candidates)]
pub(crate) struct NewCandidateRow<'a> {
    pub candidate_name: &'a str,
    pub schedule_id: Uuid,
}

// ---------------------------------------------------------------------------
// Availability and comment models
// ---------------------------------------------------------------------------

/// Availability joined with the owning user's name.
#[derive(Debug, Clone, Queryable)]
pub(crate) struct AvailabilityWithUserRow {
    pub user_id: i64,
    pub username: String,
    pub candidate_id: i64,
    pub availability: i16,
}

/// Insertable struct for availability upserts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = availabilities)]
pub(crate) struct NewAvailabilityRow {
    pub candidate_id: i64,
    pub user_id: i64,
    pub availability: i16,
    pub schedule_id: Uuid,
}

/// Row struct for reading from the comments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub user_id: i64,
    pub comment: String,
}

/// Insertable struct for comment upserts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub(crate) struct NewCommentRow<'a> {
    pub schedule_id: Uuid,
    pub user_id: i64,
    pub comment: &'a str,
}
