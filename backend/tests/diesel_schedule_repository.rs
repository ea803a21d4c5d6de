//! Integration tests for the Diesel schedule and user repositories against
//! embedded PostgreSQL.
//!
//! Each test gets its own database cloned from a migrated template. Async
//! repository calls run on a runtime owned by the test context.

use chrono::{Duration, TimeZone, Utc};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use schedule_arranger::domain::ports::{ScheduleRepository, UserRepository};
use schedule_arranger::domain::{
    Availability, AvailabilityMark, CandidateName, CommentText, Schedule, ScheduleComment,
    ScheduleId, ScheduleName, User,
};
use schedule_arranger::outbound::persistence::{
    DbPool, DieselScheduleRepository, DieselUserRepository, PoolConfig,
};
use tokio::runtime::Runtime;

mod support;

use support::embedded_postgres::{count_schedule_rows, shared_cluster};
use support::{handle_cluster_setup_failure, provision_template_database};

struct TestContext {
    runtime: Runtime,
    schedules: DieselScheduleRepository,
    users: DieselUserRepository,
    database_url: String,
    _database: TemporaryDatabase,
}

fn setup_test_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let database = provision_template_database(cluster)?;
    let database_url = database.url().to_string();

    let config = PoolConfig::new(&database_url)
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        schedules: DieselScheduleRepository::new(pool.clone()),
        users: DieselUserRepository::new(pool),
        database_url,
        _database: database,
    })
}

#[fixture]
fn context() -> Option<TestContext> {
    match setup_test_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn owner() -> User {
    User::try_from_parts(1001, "octocat").expect("valid user")
}

fn participant() -> User {
    User::try_from_parts(1002, "hubot").expect("valid user")
}

fn schedule_for(user: &User, offset_hours: i64) -> Schedule {
    Schedule {
        id: ScheduleId::random(),
        name: ScheduleName::from_input("Launch"),
        memo: "m1\nm2".to_owned(),
        created_by: user.id(),
        updated_at: Utc
            .with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("fixture timestamp")
            + Duration::hours(offset_hours),
    }
}

fn names(raw: &[&str]) -> Vec<CandidateName> {
    raw.iter()
        .map(|name| CandidateName::from_stored((*name).to_owned()))
        .collect()
}

#[rstest]
fn create_and_append_keep_insertion_order(context: Option<TestContext>) {
    let Some(ctx) = context else {
        eprintln!("SKIP-TEST-CLUSTER: create_and_append_keep_insertion_order skipped");
        return;
    };

    ctx.runtime.block_on(async {
        ctx.users.upsert(&owner()).await.expect("owner stored");
        let mut schedule = schedule_for(&owner(), 0);
        ctx.schedules
            .create(&schedule, &names(&["C1", "C2", "C3"]))
            .await
            .expect("schedule created");

        schedule.name = ScheduleName::from_input("Renamed");
        schedule.updated_at += Duration::hours(1);
        let long_name = "e".repeat(300);
        let appended = ctx
            .schedules
            .update(&schedule, &names(&[long_name.as_str()]))
            .await
            .expect("schedule updated");
        assert_eq!(appended.len(), 1);

        let stored = ctx
            .schedules
            .find_by_id(&schedule.id)
            .await
            .expect("fetch")
            .expect("schedule exists");
        assert_eq!(stored.name.as_str(), "Renamed");
        assert_eq!(stored.memo, "m1\nm2");

        let candidates = ctx.schedules.candidates(&schedule.id).await.expect("candidates");
        let listed: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(listed, ["C1", "C2", "C3", long_name.as_str()]);
    });
}

#[rstest]
fn owner_listing_is_most_recent_first(context: Option<TestContext>) {
    let Some(ctx) = context else {
        eprintln!("SKIP-TEST-CLUSTER: owner_listing_is_most_recent_first skipped");
        return;
    };

    ctx.runtime.block_on(async {
        ctx.users.upsert(&owner()).await.expect("owner stored");
        ctx.users.upsert(&participant()).await.expect("participant stored");
        let older = schedule_for(&owner(), 0);
        let newer = schedule_for(&owner(), 2);
        let foreign = schedule_for(&participant(), 5);
        for schedule in [&older, &newer, &foreign] {
            ctx.schedules.create(schedule, &[]).await.expect("created");
        }

        let listed = ctx
            .schedules
            .list_by_owner(owner().id())
            .await
            .expect("listing");
        let ids: Vec<ScheduleId> = listed.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    });
}

#[rstest]
fn upserts_keep_the_last_write(context: Option<TestContext>) {
    let Some(ctx) = context else {
        eprintln!("SKIP-TEST-CLUSTER: upserts_keep_the_last_write skipped");
        return;
    };

    ctx.runtime.block_on(async {
        ctx.users.upsert(&owner()).await.expect("owner stored");
        ctx.users.upsert(&participant()).await.expect("participant stored");
        let schedule = schedule_for(&owner(), 0);
        let candidates = ctx
            .schedules
            .create(&schedule, &names(&["C1"]))
            .await
            .expect("created");
        let candidate_id = candidates.first().expect("candidate").id;

        for availability in [Availability::Present, Availability::Unknown] {
            ctx.schedules
                .upsert_availability(&AvailabilityMark {
                    schedule_id: schedule.id,
                    candidate_id,
                    user_id: participant().id(),
                    availability,
                })
                .await
                .expect("mark stored");
        }
        for text in ["first", "second"] {
            ctx.schedules
                .upsert_comment(&ScheduleComment {
                    schedule_id: schedule.id,
                    user_id: participant().id(),
                    comment: CommentText::from_input(text),
                })
                .await
                .expect("comment stored");
        }

        let marks = ctx
            .schedules
            .availabilities(&schedule.id)
            .await
            .expect("marks");
        assert_eq!(marks.len(), 1);
        let mark = marks.first().expect("mark");
        assert_eq!(mark.availability, Availability::Unknown);
        assert_eq!(mark.user.username().as_str(), "hubot");

        let comments = ctx.schedules.comments(&schedule.id).await.expect("comments");
        assert_eq!(comments.len(), 1);
        assert_eq!(
            comments.first().map(|(_, text)| text.as_str()),
            Some("second")
        );
    });
}

#[rstest]
fn delete_aggregate_removes_every_row(context: Option<TestContext>) {
    let Some(ctx) = context else {
        eprintln!("SKIP-TEST-CLUSTER: delete_aggregate_removes_every_row skipped");
        return;
    };

    let schedule = schedule_for(&owner(), 0);
    ctx.runtime.block_on(async {
        ctx.users.upsert(&owner()).await.expect("owner stored");
        let candidates = ctx
            .schedules
            .create(&schedule, &names(&["C1", "C2"]))
            .await
            .expect("created");
        for candidate in &candidates {
            ctx.schedules
                .upsert_availability(&AvailabilityMark {
                    schedule_id: schedule.id,
                    candidate_id: candidate.id,
                    user_id: owner().id(),
                    availability: Availability::Present,
                })
                .await
                .expect("mark stored");
        }
        ctx.schedules
            .upsert_comment(&ScheduleComment {
                schedule_id: schedule.id,
                user_id: owner().id(),
                comment: CommentText::from_input("see you"),
            })
            .await
            .expect("comment stored");

        ctx.schedules
            .delete_aggregate(&schedule.id)
            .await
            .expect("deleted");
        assert!(
            ctx.schedules
                .find_by_id(&schedule.id)
                .await
                .expect("fetch")
                .is_none()
        );
    });

    for table in ["availabilities", "candidates", "comments", "schedules"] {
        let rows = count_schedule_rows(&ctx.database_url, table, *schedule.id.as_uuid())
            .expect("row count");
        assert_eq!(rows, 0, "{table} should be empty");
    }
}

#[rstest]
fn user_upsert_refreshes_username(context: Option<TestContext>) {
    let Some(ctx) = context else {
        eprintln!("SKIP-TEST-CLUSTER: user_upsert_refreshes_username skipped");
        return;
    };

    ctx.runtime.block_on(async {
        ctx.users.upsert(&owner()).await.expect("first upsert");
        let renamed = User::try_from_parts(1001, "octocat-renamed").expect("valid user");
        ctx.users.upsert(&renamed).await.expect("second upsert");

        let stored = ctx
            .users
            .find_by_id(owner().id())
            .await
            .expect("fetch")
            .expect("user exists");
        assert_eq!(stored.username().as_str(), "octocat-renamed");
        assert!(
            ctx.users
                .find_by_id(participant().id())
                .await
                .expect("fetch")
                .is_none()
        );
    });
}
