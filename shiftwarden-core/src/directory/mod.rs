//! Oversight recipient discovery.
//!
//! Identity and role data may live in more than one shape depending on which
//! system wrote it. Each shape gets its own [`RecipientSource`]; the
//! [`RecipientDirectory`] tries them in priority order and takes the first
//! non-empty answer. Discovery never fails the caller: an unreachable or
//! empty directory yields no recipients and a warning.

pub mod diagnostics;
pub mod labels;
pub mod profile_roles;
pub mod records;
pub mod role_assignments;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::database::ports::directory::DirectoryStore;
use crate::error::Result;
use crate::types::OversightRecipient;

pub use diagnostics::{CollectionSummary, DirectorySnapshot};
pub use labels::{RoleLabels, normalize};
pub use profile_roles::ProfileRoleSource;
pub use records::{DirectoryRecord, ProfileRoleRecord, RoleAssignmentRecord};
pub use role_assignments::RoleAssignmentSource;

pub const DEFAULT_PROFILE_COLLECTION: &str = "profiles";
pub const DEFAULT_ROLE_ASSIGNMENT_COLLECTION: &str = "role_assignments";
pub const DEFAULT_ACTIVE_STATUS: &str = "active";
pub const DEFAULT_SCAN_LIMIT: i64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySettings {
    /// Collection holding one document per identity, keyed by identity id.
    /// Also the source of truth for existence checks.
    pub profile_collection: String,
    pub role_assignment_collection: String,
    pub oversight_roles: RoleLabels,
    /// Status value that marks a record as active.
    pub active_status: String,
    /// Upper bound on documents read per strategy.
    pub scan_limit: i64,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            profile_collection: DEFAULT_PROFILE_COLLECTION.to_string(),
            role_assignment_collection: DEFAULT_ROLE_ASSIGNMENT_COLLECTION.to_string(),
            oversight_roles: RoleLabels::default(),
            active_status: DEFAULT_ACTIVE_STATUS.to_string(),
            scan_limit: DEFAULT_SCAN_LIMIT,
        }
    }
}

/// One way of finding active oversight recipients.
#[async_trait]
pub trait RecipientSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn recipients(&self) -> Result<Vec<OversightRecipient>>;
}

pub struct RecipientDirectory {
    sources: Vec<Box<dyn RecipientSource>>,
    store: Option<Arc<dyn DirectoryStore>>,
}

impl fmt::Debug for RecipientDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources: Vec<&str> = self.sources.iter().map(|s| s.name()).collect();
        f.debug_struct("RecipientDirectory")
            .field("sources", &sources)
            .field("connected", &self.store.is_some())
            .finish()
    }
}

impl RecipientDirectory {
    /// Profile-embedded roles first, then the role-assignment collection.
    pub fn new(store: Arc<dyn DirectoryStore>, settings: Arc<DirectorySettings>) -> Self {
        let sources: Vec<Box<dyn RecipientSource>> = vec![
            Box::new(ProfileRoleSource::new(store.clone(), settings.clone())),
            Box::new(RoleAssignmentSource::new(store.clone(), settings)),
        ];
        Self {
            sources,
            store: Some(store),
        }
    }

    pub fn with_sources(
        sources: Vec<Box<dyn RecipientSource>>,
        store: Option<Arc<dyn DirectoryStore>>,
    ) -> Self {
        Self { sources, store }
    }

    /// Directory for a process without a directory connection.
    pub fn unavailable() -> Self {
        Self {
            sources: Vec::new(),
            store: None,
        }
    }

    #[instrument(skip(self))]
    pub async fn discover(&self) -> Vec<OversightRecipient> {
        if self.sources.is_empty() {
            warn!("Directory unavailable; only subjects will be notified");
            return Vec::new();
        }

        for source in &self.sources {
            match source.recipients().await {
                Ok(found) => {
                    let found = dedupe(found);
                    if !found.is_empty() {
                        info!(
                            strategy = source.name(),
                            recipients = found.len(),
                            "Resolved oversight recipients"
                        );
                        return found;
                    }
                    debug!(strategy = source.name(), "Strategy returned no recipients");
                }
                Err(e) if e.is_unavailable() => {
                    warn!(
                        strategy = source.name(),
                        error = %e,
                        "Directory unavailable; only subjects will be notified"
                    );
                    return Vec::new();
                }
                Err(e) => {
                    warn!(strategy = source.name(), error = %e, "Recipient strategy failed");
                }
            }
        }

        warn!("No oversight recipients found; only subjects will be notified");
        self.log_diagnostics().await;
        Vec::new()
    }

    async fn log_diagnostics(&self) {
        let Some(store) = &self.store else {
            return;
        };
        match DirectorySnapshot::collect(store.as_ref()).await {
            Ok(snapshot) => snapshot.log(),
            Err(e) => debug!(error = %e, "Could not collect directory diagnostics"),
        }
    }
}

fn dedupe(recipients: Vec<OversightRecipient>) -> Vec<OversightRecipient> {
    let mut seen = HashSet::new();
    recipients
        .into_iter()
        .filter(|recipient| recipient.active)
        .filter(|recipient| seen.insert(recipient.identity))
        .collect()
}
