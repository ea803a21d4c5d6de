//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`.
//! `diesel print-schema` regenerates them from a live database.

diesel::table! {
    /// Users who have signed in through the identity provider.
    users (user_id) {
        /// Provider-issued numeric identifier.
        user_id -> Int8,
        /// Provider login name, refreshed on every sign-in.
        username -> Varchar,
    }
}

diesel::table! {
    /// Schedules created by signed-in users.
    schedules (schedule_id) {
        schedule_id -> Uuid,
        schedule_name -> Varchar,
        memo -> Text,
        /// Owner of the schedule.
        created_by -> Int8,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Date or time options offered by a schedule.
    candidates (candidate_id) {
        /// Database-assigned, increasing in insertion order.
        candidate_id -> Int8,
        candidate_name -> Text,
        schedule_id -> Uuid,
    }
}

diesel::table! {
    /// One attendance mark per user and candidate.
    availabilities (candidate_id, user_id) {
        candidate_id -> Int8,
        user_id -> Int8,
        /// 0 absent, 1 unknown, 2 present.
        availability -> Int2,
        /// Denormalised owner schedule for per-schedule reads and deletes.
        schedule_id -> Uuid,
    }
}

diesel::table! {
    /// One free-text comment per user and schedule.
    comments (schedule_id, user_id) {
        schedule_id -> Uuid,
        user_id -> Int8,
        comment -> Varchar,
    }
}

diesel::joinable!(schedules -> users (created_by));
diesel::joinable!(candidates -> schedules (schedule_id));
diesel::joinable!(availabilities -> users (user_id));
diesel::joinable!(availabilities -> candidates (candidate_id));
diesel::joinable!(comments -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    availabilities,
    candidates,
    comments,
    schedules,
    users,
);
