//! Schedule arranger: a small web app for polling attendance across candidate
//! dates.
//!
//! The crate follows a hexagonal layout. [`domain`] holds the model and the
//! services behind the driving ports, [`inbound`] adapts HTTP onto those
//! ports, and [`outbound`] implements the driven ports against PostgreSQL and
//! GitHub OAuth.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(feature = "test-support")]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
