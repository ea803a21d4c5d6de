//! In-memory repositories for integration tests.
//!
//! Compiled only with the `test-support` feature. Both repositories honour
//! the same ordering and upsert contracts as the Diesel adapters so HTTP
//! behaviour tests can run without PostgreSQL.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    ScheduleRepository, ScheduleRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AvailabilityEntry, AvailabilityMark, Candidate, CandidateId, CandidateName, CommentText,
    Schedule, ScheduleComment, ScheduleId, User, UserId,
};

/// Users keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<BTreeMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    /// Empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup(&self, id: UserId) -> Option<User> {
        self.users
            .lock()
            .ok()
            .and_then(|users| users.get(&id).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn upsert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| UserPersistenceError::query("user store poisoned"))?;
        users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let users = self
            .users
            .lock()
            .map_err(|_| UserPersistenceError::query("user store poisoned"))?;
        Ok(users.get(&id).cloned())
    }
}

#[derive(Debug, Default)]
struct ScheduleTables {
    schedules: Vec<Schedule>,
    candidates: Vec<Candidate>,
    next_candidate_id: i64,
    availabilities: BTreeMap<(CandidateId, UserId), AvailabilityMark>,
    comments: BTreeMap<(UserId, String), ScheduleComment>,
}

impl ScheduleTables {
    fn append_candidates(
        &mut self,
        schedule_id: ScheduleId,
        names: &[CandidateName],
    ) -> Vec<Candidate> {
        names
            .iter()
            .map(|name| {
                self.next_candidate_id += 1;
                let candidate = Candidate {
                    id: CandidateId::new(self.next_candidate_id),
                    schedule_id,
                    name: name.clone(),
                };
                self.candidates.push(candidate.clone());
                candidate
            })
            .collect()
    }
}

fn comment_key(schedule_id: ScheduleId, user_id: UserId) -> (UserId, String) {
    (user_id, schedule_id.to_string())
}

/// Schedule aggregate store sharing its user table with an
/// [`InMemoryUserRepository`] so availability rows can be joined to users.
#[derive(Debug, Clone)]
pub struct InMemoryScheduleRepository {
    users: InMemoryUserRepository,
    tables: Arc<Mutex<ScheduleTables>>,
}

impl InMemoryScheduleRepository {
    /// Empty store joined against `users`.
    #[must_use]
    pub fn new(users: InMemoryUserRepository) -> Self {
        Self {
            users,
            tables: Arc::default(),
        }
    }

    fn tables(&self) -> Result<MutexGuard<'_, ScheduleTables>, ScheduleRepositoryError> {
        self.tables
            .lock()
            .map_err(|_| ScheduleRepositoryError::query("schedule store poisoned"))
    }

    /// Row counts for one schedule: `(schedules, candidates, availabilities, comments)`.
    ///
    /// # Errors
    ///
    /// Fails only when the store mutex is poisoned.
    pub fn row_counts(
        &self,
        id: &ScheduleId,
    ) -> Result<(usize, usize, usize, usize), ScheduleRepositoryError> {
        let tables = self.tables()?;
        Ok((
            tables.schedules.iter().filter(|s| s.id == *id).count(),
            tables.candidates.iter().filter(|c| c.schedule_id == *id).count(),
            tables
                .availabilities
                .values()
                .filter(|mark| mark.schedule_id == *id)
                .count(),
            tables
                .comments
                .values()
                .filter(|comment| comment.schedule_id == *id)
                .count(),
        ))
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryScheduleRepository {
    async fn create(
        &self,
        schedule: &Schedule,
        candidates: &[CandidateName],
    ) -> Result<Vec<Candidate>, ScheduleRepositoryError> {
        let mut tables = self.tables()?;
        tables.schedules.push(schedule.clone());
        Ok(tables.append_candidates(schedule.id, candidates))
    }

    async fn update(
        &self,
        schedule: &Schedule,
        appended: &[CandidateName],
    ) -> Result<Vec<Candidate>, ScheduleRepositoryError> {
        let mut tables = self.tables()?;
        let Some(stored) = tables.schedules.iter_mut().find(|s| s.id == schedule.id) else {
            return Err(ScheduleRepositoryError::query("schedule vanished during update"));
        };
        stored.name = schedule.name.clone();
        stored.memo = schedule.memo.clone();
        stored.updated_at = schedule.updated_at;
        Ok(tables.append_candidates(schedule.id, appended))
    }

    async fn find_by_id(
        &self,
        id: &ScheduleId,
    ) -> Result<Option<Schedule>, ScheduleRepositoryError> {
        let tables = self.tables()?;
        Ok(tables.schedules.iter().find(|s| s.id == *id).cloned())
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Schedule>, ScheduleRepositoryError> {
        let tables = self.tables()?;
        let mut owned: Vec<Schedule> = tables
            .schedules
            .iter()
            .filter(|s| s.created_by == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(owned)
    }

    async fn candidates(&self, id: &ScheduleId) -> Result<Vec<Candidate>, ScheduleRepositoryError> {
        let tables = self.tables()?;
        let mut candidates: Vec<Candidate> = tables
            .candidates
            .iter()
            .filter(|c| c.schedule_id == *id)
            .cloned()
            .collect();
        candidates.sort_by_key(|c| c.id);
        Ok(candidates)
    }

    async fn availabilities(
        &self,
        id: &ScheduleId,
    ) -> Result<Vec<AvailabilityEntry>, ScheduleRepositoryError> {
        let marks: Vec<AvailabilityMark> = {
            let tables = self.tables()?;
            tables
                .availabilities
                .values()
                .filter(|mark| mark.schedule_id == *id)
                .cloned()
                .collect()
        };
        let mut entries: Vec<AvailabilityEntry> = marks
            .into_iter()
            .filter_map(|mark| {
                self.users.lookup(mark.user_id).map(|user| AvailabilityEntry {
                    user,
                    candidate_id: mark.candidate_id,
                    availability: mark.availability,
                })
            })
            .collect();
        entries.sort_by_key(|entry| (entry.user.id(), entry.candidate_id));
        Ok(entries)
    }

    async fn comments(
        &self,
        id: &ScheduleId,
    ) -> Result<Vec<(UserId, CommentText)>, ScheduleRepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .comments
            .values()
            .filter(|comment| comment.schedule_id == *id)
            .map(|comment| (comment.user_id, comment.comment.clone()))
            .collect())
    }

    async fn upsert_availability(
        &self,
        mark: &AvailabilityMark,
    ) -> Result<(), ScheduleRepositoryError> {
        let mut tables = self.tables()?;
        tables
            .availabilities
            .insert((mark.candidate_id, mark.user_id), mark.clone());
        Ok(())
    }

    async fn upsert_comment(
        &self,
        comment: &ScheduleComment,
    ) -> Result<(), ScheduleRepositoryError> {
        let mut tables = self.tables()?;
        tables.comments.insert(
            comment_key(comment.schedule_id, comment.user_id),
            comment.clone(),
        );
        Ok(())
    }

    async fn delete_aggregate(&self, id: &ScheduleId) -> Result<(), ScheduleRepositoryError> {
        let mut tables = self.tables()?;
        tables.availabilities.retain(|_, mark| mark.schedule_id != *id);
        tables.candidates.retain(|c| c.schedule_id != *id);
        tables.comments.retain(|_, comment| comment.schedule_id != *id);
        tables.schedules.retain(|s| s.id != *id);
        Ok(())
    }
}
