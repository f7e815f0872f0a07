pub mod db_url;
pub mod error;

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::constants::{
    DEFAULT_ACTIVE_STATUS, DEFAULT_DAILY_AT, DEFAULT_DIRECTORY_SCAN_LIMIT, DEFAULT_LEAD_DAYS,
    DEFAULT_LOG_FILTER, DEFAULT_MAX_CONNECTIONS, DEFAULT_OVERSIGHT_ROLES,
    DEFAULT_PROFILE_COLLECTION, DEFAULT_ROLE_ASSIGNMENT_COLLECTION,
};
use crate::models::{
    CalendarConfig, Config, ConfigMetadata, DatabaseConfig, DirectoryConfig, LoggingConfig,
    NotificationConfig, ScheduleConfig,
    sources::{EnvConfig, FileConfig},
};
use crate::validation::{self, ConfigGuardRailError, ConfigWarnings};

pub use error::ConfigLoadError;

fn default_config_locations() -> [PathBuf; 2] {
    [
        PathBuf::from("shiftwarden.toml"),
        PathBuf::from("config/shiftwarden.toml"),
    ]
}

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Load `.env`, read the process environment and compose the final
    /// configuration.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(|err| match err {
                dotenvy::Error::Io(_) => Ok(false),
                _ => Err(err),
            })?,
            None => dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                dotenvy::Error::Io(_) => Ok(false),
                _ => Err(err),
            })?,
        };

        let mut load = self.load_with_env(EnvConfig::gather())?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Compose from an explicit environment snapshot. The process
    /// environment is not consulted.
    pub fn load_with_env(&self, env: EnvConfig) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let (config, warnings) = compose_config(file_config, env, config_path)?;
        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let mut source = ConfigPathSource::default();

        if let Some(explicit) = &self.options.config_path {
            source.explicit = Some(explicit.clone());
        } else if let Some(from_env) = &env.config_path {
            source.env = Some(from_env.clone());
        } else {
            source.default = default_config_locations()
                .into_iter()
                .find(|candidate| candidate.exists());
        }

        let Some((path, provenance)) = source.resolved_path() else {
            return Ok((None, None));
        };

        if !path.exists() {
            if provenance.is_explicit() {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    config_path: Option<PathBuf>,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if config_path.is_none() {
        warnings.push_with_hint(
            "No shiftwarden.toml detected; using environment variables and defaults",
            "Pass --config or set SHIFTWARDEN_CONFIG to point at a configuration file",
        );
    }

    let FileConfig {
        database: file_database,
        directory: file_directory,
        notifications: file_notifications,
        schedule: file_schedule,
        calendar: file_calendar,
        logging: file_logging,
    } = file_config.unwrap_or_default();

    let max_connections = match env.database_max_connections.as_deref() {
        Some(raw) => validation::positive::<u32>("max_connections", raw)?,
        None => match file_database.max_connections {
            Some(0) => {
                return Err(ConfigGuardRailError::InvalidPositive {
                    field: "max_connections",
                    value: "0".into(),
                }
                .into());
            }
            Some(value) => value,
            None => DEFAULT_MAX_CONNECTIONS,
        },
    };
    let database = DatabaseConfig {
        primary_url: db_url::resolve_database_url(&env, &file_database)?,
        max_connections,
    };

    let scan_limit = match file_directory.scan_limit {
        Some(limit) if limit <= 0 => {
            return Err(ConfigGuardRailError::InvalidPositive {
                field: "scan_limit",
                value: limit.to_string(),
            }
            .into());
        }
        Some(limit) => limit,
        None => DEFAULT_DIRECTORY_SCAN_LIMIT,
    };
    let directory = DirectoryConfig {
        url: db_url::resolve_directory_url(&env, file_directory.url.as_deref())?,
        profile_collection: env
            .directory_profile_collection
            .or(file_directory.profile_collection)
            .unwrap_or_else(|| DEFAULT_PROFILE_COLLECTION.to_string()),
        role_assignment_collection: env
            .directory_role_assignment_collection
            .or(file_directory.role_assignment_collection)
            .unwrap_or_else(|| DEFAULT_ROLE_ASSIGNMENT_COLLECTION.to_string()),
        oversight_roles: env
            .oversight_roles
            .or(file_directory.oversight_roles)
            .unwrap_or_else(|| DEFAULT_OVERSIGHT_ROLES.iter().map(|s| s.to_string()).collect()),
        active_status: env
            .directory_active_status
            .or(file_directory.active_status)
            .unwrap_or_else(|| DEFAULT_ACTIVE_STATUS.to_string()),
        scan_limit,
    };

    let lead_days = match (env.lead_days, file_notifications.lead_days) {
        (Some(raw), _) => validation::lead_days(&raw)?,
        (None, Some(days)) => validation::lead_days(&days.to_string())?,
        (None, None) => DEFAULT_LEAD_DAYS,
    };

    let daily_at = validation::daily_at(
        env.daily_at
            .as_deref()
            .or(file_schedule.daily_at.as_deref())
            .unwrap_or(DEFAULT_DAILY_AT),
    )?;
    let schedule = ScheduleConfig {
        daily_at,
        run_on_startup: env
            .run_on_startup
            .or(file_schedule.run_on_startup)
            .unwrap_or(true),
    };

    let utc_offset = env
        .utc_offset
        .or(file_calendar.utc_offset)
        .map(|raw| validation::utc_offset(&raw))
        .transpose()?;

    let config = Config {
        database,
        directory,
        notifications: NotificationConfig { lead_days },
        schedule,
        calendar: CalendarConfig { utc_offset },
        logging: LoggingConfig {
            filter: env
                .log_filter
                .or(file_logging.filter)
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        },
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded: false,
        },
    };

    warnings.extend(validation::apply_guard_rails(&config)?);
    Ok((config, warnings))
}

#[derive(Debug, Default)]
struct ConfigPathSource {
    explicit: Option<PathBuf>,
    env: Option<PathBuf>,
    default: Option<PathBuf>,
}

impl ConfigPathSource {
    fn resolved_path(&self) -> Option<(PathBuf, ConfigPathProvenance)> {
        if let Some(path) = &self.explicit {
            return Some((path.clone(), ConfigPathProvenance::Explicit));
        }
        if let Some(path) = &self.env {
            return Some((path.clone(), ConfigPathProvenance::Env));
        }
        self.default
            .clone()
            .map(|path| (path, ConfigPathProvenance::Default))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigPathProvenance {
    Explicit,
    Env,
    Default,
}

impl ConfigPathProvenance {
    fn is_explicit(self) -> bool {
        matches!(self, ConfigPathProvenance::Explicit | ConfigPathProvenance::Env)
    }
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}
