//! Domain primitives, aggregates, and services.
//!
//! Purpose: define the scheduling model (schedules, candidates, availability
//! marks, comments, users) independently of HTTP and storage, together with
//! the services that implement the driving ports.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failures.
//! - [`Schedule`], [`Candidate`], [`Availability`], [`CommentText`], [`User`]:
//!   the data model, with input normalisation on the constructors.
//! - [`build_attendance_grid`]: the pure aggregation behind the schedule page.
//! - [`ScheduleService`] and [`OAuthLoginService`]: port implementations.

pub mod attendance;
pub mod availability;
pub mod error;
pub mod login_service;
pub mod ports;
pub mod schedule;
pub mod schedule_service;
pub mod trace_id;
pub mod user;

pub use self::attendance::{AttendanceGrid, AttendanceRows, Participant, build_attendance_grid};
pub use self::availability::{
    Availability, AvailabilityEntry, AvailabilityMark, AvailabilityOutOfRange, CommentText,
    ScheduleComment,
};
pub use self::error::{Error, ErrorCode};
pub use self::login_service::OAuthLoginService;
pub use self::schedule::{
    Candidate, CandidateId, CandidateName, DEFAULT_SCHEDULE_NAME, Schedule, ScheduleId,
    ScheduleName, TEXT_MAX_CHARS, is_owner, parse_candidate_names,
};
pub use self::schedule_service::ScheduleService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{User, UserId, UserValidationError, Username};
