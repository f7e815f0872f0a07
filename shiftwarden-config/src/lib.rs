//! Configuration for the shiftwarden service.
//!
//! Values come from an optional TOML file, the process environment (with
//! `.env` support) and built-in defaults. The environment overrides the file,
//! which overrides the defaults.

pub mod constants;
pub mod loader;
pub mod models;
pub mod util;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, ConfigLoaderOptions, error::ConfigLoadError};
pub use models::{
    CalendarConfig, Config, ConfigMetadata, DatabaseConfig, DirectoryConfig, LoggingConfig,
    NotificationConfig, ScheduleConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
