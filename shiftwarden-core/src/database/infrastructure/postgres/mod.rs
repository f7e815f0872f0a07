//! PostgreSQL infrastructure adapters implementing the database ports.

pub mod repositories;

pub use repositories::assignments::PostgresAssignmentRepository;
pub use repositories::directory::PostgresDirectoryStore;
pub use repositories::notifications::PostgresNotificationRepository;
