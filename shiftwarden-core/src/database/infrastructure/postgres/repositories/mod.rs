//! PostgreSQL-backed repository implementations.

pub mod assignments;
pub mod directory;
pub mod notifications;
