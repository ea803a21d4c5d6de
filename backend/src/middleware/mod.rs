//! Actix middleware shared by every route.
//!
//! Only [`Trace`] lives here; session handling is provided by
//! `actix-session` and configured in the server module.

pub mod trace;

pub use trace::Trace;
