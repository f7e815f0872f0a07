//! Repository ports (interfaces) consumed by the expiry job.
//!
//! The job only ever talks to these traits. Postgres adapters live under
//! `database::infrastructure::postgres`; in-memory adapters live in
//! `database::memory`.

pub mod assignments;
pub mod directory;
pub mod notifications;
