//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **github**: GitHub OAuth identity provider over reqwest
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod github;
pub mod persistence;
