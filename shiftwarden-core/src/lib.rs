//! # Shiftwarden Core
//!
//! Core library for Shiftwarden, the background service that warns people
//! before their shift assignments run out.
//!
//! ## Overview
//!
//! - **Expiry job** ([`expiry`]): guarded, sequential scan-and-notify runs
//!   with per-assignment locks, run-scoped existence checks and same-day
//!   duplicate suppression.
//! - **Recipient discovery** ([`directory`]): finds active oversight (HR)
//!   identities across the differently shaped collections of the identity
//!   directory.
//! - **Storage** ([`database`]): repository ports with PostgreSQL and
//!   in-memory adapters.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use shiftwarden_core::database::{
//!     InMemoryAssignmentRepository, InMemoryDirectory, InMemoryNotificationRepository,
//! };
//! use shiftwarden_core::directory::DirectorySettings;
//! use shiftwarden_core::expiry::{ExpiryJobConfig, ExpiryNotificationJob, JobDependencies};
//! use shiftwarden_core::time::SystemClock;
//!
//! async fn run_once() {
//!     let job = ExpiryNotificationJob::new(
//!         JobDependencies {
//!             assignments: Arc::new(InMemoryAssignmentRepository::new()),
//!             notifications: Arc::new(InMemoryNotificationRepository::new()),
//!             directory: Some(Arc::new(InMemoryDirectory::new())),
//!             directory_settings: Arc::new(DirectorySettings::default()),
//!             clock: Arc::new(SystemClock),
//!         },
//!         ExpiryJobConfig::default(),
//!     );
//!
//!     if let Some(summary) = job.run().await.summary() {
//!         println!("created {} notifications", summary.created);
//!     }
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod database;
pub mod directory;
pub mod error;
pub mod expiry;
pub mod time;
pub mod types;

pub use error::{NotifyError, Result};

/// Embedded migrations for the assignment, notification and directory tables.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
