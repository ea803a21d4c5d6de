//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{LoginService, ScheduleCommand, ScheduleQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Schedule mutations.
    pub schedules: Arc<dyn ScheduleCommand>,
    /// Schedule reads.
    pub schedules_query: Arc<dyn ScheduleQuery>,
    /// OAuth sign-in.
    pub login: Arc<dyn LoginService>,
}

impl HttpState {
    /// Bundle the driving ports.
    pub fn new(
        schedules: Arc<dyn ScheduleCommand>,
        schedules_query: Arc<dyn ScheduleQuery>,
        login: Arc<dyn LoginService>,
    ) -> Self {
        Self {
            schedules,
            schedules_query,
            login,
        }
    }
}
