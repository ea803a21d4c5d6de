//! PostgreSQL-backed `ScheduleRepository` implementation using Diesel ORM.
//!
//! Multi-table writes (schedule plus candidates, and the cascading delete)
//! run inside a single transaction so readers never observe half an
//! aggregate.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ScheduleRepository, ScheduleRepositoryError};
use crate::domain::{
    Availability, AvailabilityEntry, AvailabilityMark, Candidate, CandidateId, CandidateName,
    CommentText, Schedule, ScheduleComment, ScheduleId, ScheduleName, User, UserId,
};

use super::error_mapping::{diesel_failure, pool_failure};
use super::models::{
    AvailabilityWithUserRow, CandidateRow, CommentRow, NewAvailabilityRow, NewCandidateRow,
    NewCommentRow, NewScheduleRow, ScheduleRow, ScheduleUpdate,
};
use super::pool::{DbPool, PoolError};
use super::schema::{availabilities, candidates, comments, schedules, users};

/// Diesel-backed implementation of the schedule repository port.
#[derive(Clone)]
pub struct DieselScheduleRepository {
    pool: DbPool,
}

impl DieselScheduleRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ScheduleRepositoryError {
    pool_failure(error)
}

fn map_diesel_error(error: diesel::result::Error) -> ScheduleRepositoryError {
    diesel_failure(error)
}

fn row_to_schedule(row: ScheduleRow) -> Result<Schedule, ScheduleRepositoryError> {
    let ScheduleRow {
        schedule_id,
        schedule_name,
        memo,
        created_by,
        updated_at,
    } = row;
    let created_by = UserId::new(created_by)
        .map_err(|err| ScheduleRepositoryError::query(format!("invalid schedule owner: {err}")))?;

    Ok(Schedule {
        id: ScheduleId::from_uuid(schedule_id),
        name: ScheduleName::from_stored(schedule_name),
        memo,
        created_by,
        updated_at,
    })
}

fn row_to_candidate(row: CandidateRow) -> Candidate {
    Candidate {
        id: CandidateId::new(row.candidate_id),
        schedule_id: ScheduleId::from_uuid(row.schedule_id),
        name: CandidateName::from_stored(row.candidate_name),
    }
}

fn row_to_availability(
    row: AvailabilityWithUserRow,
) -> Result<AvailabilityEntry, ScheduleRepositoryError> {
    let user = User::try_from_parts(row.user_id, row.username)
        .map_err(|err| ScheduleRepositoryError::query(format!("invalid stored user: {err}")))?;
    let availability = Availability::try_from(i64::from(row.availability))
        .map_err(|err| ScheduleRepositoryError::query(err.to_string()))?;

    Ok(AvailabilityEntry {
        user,
        candidate_id: CandidateId::new(row.candidate_id),
        availability,
    })
}

fn row_to_comment(row: CommentRow) -> Result<(UserId, CommentText), ScheduleRepositoryError> {
    let user_id = UserId::new(row.user_id)
        .map_err(|err| ScheduleRepositoryError::query(format!("invalid comment author: {err}")))?;
    Ok((user_id, CommentText::from_stored(row.comment)))
}

/// Append candidates in the given order and return them as stored.
async fn insert_candidates(
    conn: &mut AsyncPgConnection,
    schedule_id: Uuid,
    names: &[CandidateName],
) -> Result<Vec<CandidateRow>, diesel::result::Error> {
    if names.is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<NewCandidateRow<'_>> = names
        .iter()
        .map(|name| NewCandidateRow {
            candidate_name: name.as_str(),
            schedule_id,
        })
        .collect();

    let mut stored: Vec<CandidateRow> = diesel::insert_into(candidates::table)
        .values(&rows)
        .returning(CandidateRow::as_returning())
        .get_results(conn)
        .await?;
    stored.sort_by_key(|row| row.candidate_id);
    Ok(stored)
}

#[async_trait]
impl ScheduleRepository for DieselScheduleRepository {
    async fn create(
        &self,
        schedule: &Schedule,
        candidate_names: &[CandidateName],
    ) -> Result<Vec<Candidate>, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let schedule_id = *schedule.id.as_uuid();
        let new_row = NewScheduleRow {
            schedule_id,
            schedule_name: schedule.name.as_str(),
            memo: &schedule.memo,
            created_by: schedule.created_by.value(),
            updated_at: schedule.updated_at,
        };

        let stored = conn
            .transaction(|conn| {
                async move {
                    diesel::insert_into(schedules::table)
                        .values(&new_row)
                        .execute(conn)
                        .await?;
                    insert_candidates(conn, schedule_id, candidate_names).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(stored.into_iter().map(row_to_candidate).collect())
    }

    async fn update(
        &self,
        schedule: &Schedule,
        new_candidates: &[CandidateName],
    ) -> Result<Vec<Candidate>, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let schedule_id = *schedule.id.as_uuid();
        let changes = ScheduleUpdate {
            schedule_name: schedule.name.as_str(),
            memo: &schedule.memo,
            updated_at: schedule.updated_at,
        };

        let stored = conn
            .transaction(|conn| {
                async move {
                    diesel::update(schedules::table.filter(schedules::schedule_id.eq(schedule_id)))
                        .set(&changes)
                        .execute(conn)
                        .await?;
                    insert_candidates(conn, schedule_id, new_candidates).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(stored.into_iter().map(row_to_candidate).collect())
    }

    async fn find_by_id(
        &self,
        schedule_id: &ScheduleId,
    ) -> Result<Option<Schedule>, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = schedules::table
            .filter(schedules::schedule_id.eq(schedule_id.as_uuid()))
            .select(ScheduleRow::as_select())
            .first::<ScheduleRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_schedule).transpose()
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Schedule>, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ScheduleRow> = schedules::table
            .filter(schedules::created_by.eq(owner.value()))
            .order((schedules::updated_at.desc(), schedules::schedule_id.asc()))
            .select(ScheduleRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_schedule).collect()
    }

    async fn candidates(
        &self,
        schedule_id: &ScheduleId,
    ) -> Result<Vec<Candidate>, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CandidateRow> = candidates::table
            .filter(candidates::schedule_id.eq(schedule_id.as_uuid()))
            .order(candidates::candidate_id.asc())
            .select(CandidateRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_candidate).collect())
    }

    async fn availabilities(
        &self,
        schedule_id: &ScheduleId,
    ) -> Result<Vec<AvailabilityEntry>, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AvailabilityWithUserRow> = availabilities::table
            .inner_join(users::table)
            .filter(availabilities::schedule_id.eq(schedule_id.as_uuid()))
            .order((
                availabilities::user_id.asc(),
                availabilities::candidate_id.asc(),
            ))
            .select((
                users::user_id,
                users::username,
                availabilities::candidate_id,
                availabilities::availability,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_availability).collect()
    }

    async fn comments(
        &self,
        schedule_id: &ScheduleId,
    ) -> Result<Vec<(UserId, CommentText)>, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CommentRow> = comments::table
            .filter(comments::schedule_id.eq(schedule_id.as_uuid()))
            .order(comments::user_id.asc())
            .select(CommentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_comment).collect()
    }

    async fn upsert_availability(
        &self,
        mark: &AvailabilityMark,
    ) -> Result<(), ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewAvailabilityRow {
            candidate_id: mark.candidate_id.value(),
            user_id: mark.user_id.value(),
            availability: mark.availability.value(),
            schedule_id: *mark.schedule_id.as_uuid(),
        };

        diesel::insert_into(availabilities::table)
            .values(&row)
            .on_conflict((availabilities::candidate_id, availabilities::user_id))
            .do_update()
            .set(availabilities::availability.eq(excluded(availabilities::availability)))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn upsert_comment(
        &self,
        comment: &ScheduleComment,
    ) -> Result<(), ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewCommentRow {
            schedule_id: *comment.schedule_id.as_uuid(),
            user_id: comment.user_id.value(),
            comment: comment.comment.as_str(),
        };

        diesel::insert_into(comments::table)
            .values(&row)
            .on_conflict((comments::schedule_id, comments::user_id))
            .do_update()
            .set(comments::comment.eq(excluded(comments::comment)))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete_aggregate(
        &self,
        schedule_id: &ScheduleId,
    ) -> Result<(), ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let schedule_id = *schedule_id.as_uuid();

        conn.transaction(|conn| {
            async move {
                diesel::delete(
                    availabilities::table.filter(availabilities::schedule_id.eq(schedule_id)),
                )
                .execute(conn)
                .await?;
                diesel::delete(candidates::table.filter(candidates::schedule_id.eq(schedule_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(comments::table.filter(comments::schedule_id.eq(schedule_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(schedules::table.filter(schedules::schedule_id.eq(schedule_id)))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    #[rstest]
    fn schedule_rows_map_to_domain() {
        let id = Uuid::new_v4();
        let updated_at = Utc
            .with_ymd_and_hms(2026, 2, 3, 4, 5, 6)
            .single()
            .expect("valid timestamp");
        let schedule = row_to_schedule(ScheduleRow {
            schedule_id: id,
            schedule_name: "Launch".to_owned(),
            memo: "m1".to_owned(),
            created_by: 42,
            updated_at,
        })
        .expect("row converts");

        assert_eq!(schedule.id, ScheduleId::from_uuid(id));
        assert_eq!(schedule.name.as_str(), "Launch");
        assert_eq!(schedule.created_by.value(), 42);
        assert_eq!(schedule.updated_at, updated_at);
    }

    #[rstest]
    #[case(0, Availability::Absent)]
    #[case(1, Availability::Unknown)]
    #[case(2, Availability::Present)]
    fn availability_rows_decode_stored_values(#[case] stored: i16, #[case] expected: Availability) {
        let entry = row_to_availability(AvailabilityWithUserRow {
            user_id: 7,
            username: "octocat".to_owned(),
            candidate_id: 3,
            availability: stored,
        })
        .expect("row converts");

        assert_eq!(entry.availability, expected);
        assert_eq!(entry.user.username().as_str(), "octocat");
    }

    #[rstest]
    fn corrupt_availability_values_are_query_errors() {
        let err = row_to_availability(AvailabilityWithUserRow {
            user_id: 7,
            username: "octocat".to_owned(),
            candidate_id: 3,
            availability: 9,
        })
        .expect_err("out of range");

        assert!(matches!(err, ScheduleRepositoryError::Query { .. }));
    }
}
