//! Storage ports and their adapters.
//!
//! The expiry job depends only on the traits in [`ports`]. Production wiring
//! uses the Postgres adapters; tests and dry runs use [`memory`].

pub mod infrastructure;
pub mod memory;
pub mod ports;

pub use infrastructure::postgres::{
    PostgresAssignmentRepository, PostgresDirectoryStore, PostgresNotificationRepository,
};
pub use memory::{InMemoryAssignmentRepository, InMemoryDirectory, InMemoryNotificationRepository};
pub use ports::assignments::{AssignmentRepository, ExpiryScanQuery};
pub use ports::directory::{DirectoryStore, Document, DocumentQuery, FieldFilter};
pub use ports::notifications::NotificationRepository;
