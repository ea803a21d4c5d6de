//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports ([`ScheduleCommand`], [`ScheduleQuery`], [`LoginService`])
//! are called by inbound adapters. Driven ports ([`ScheduleRepository`],
//! [`UserRepository`], [`IdentityProvider`]) are implemented by outbound
//! adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod identity_provider;
mod login_service;
mod schedule_command;
mod schedule_query;
mod schedule_repository;
mod user_repository;

#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{FixtureIdentityProvider, IdentityProvider, IdentityProviderError};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use schedule_command::MockScheduleCommand;
pub use schedule_command::{
    CreateScheduleRequest, ScheduleCommand, SetAvailabilityRequest, SetCommentRequest,
    UpdateScheduleRequest,
};
#[cfg(test)]
pub use schedule_query::MockScheduleQuery;
pub use schedule_query::{EditableSchedule, ScheduleQuery};
#[cfg(test)]
pub use schedule_repository::MockScheduleRepository;
pub use schedule_repository::{ScheduleRepository, ScheduleRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
