use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::records::{CONTACT_FIELDS, DirectoryRecord, ROLE_FIELDS, STATUS_FIELD};
use super::{DirectorySettings, RecipientSource};
use crate::database::ports::directory::{DirectoryStore, DocumentQuery};
use crate::error::Result;
use crate::types::OversightRecipient;

/// Oversight roles embedded on the general profile collection.
pub struct ProfileRoleSource {
    store: Arc<dyn DirectoryStore>,
    settings: Arc<DirectorySettings>,
}

impl fmt::Debug for ProfileRoleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileRoleSource")
            .field("collection", &self.settings.profile_collection)
            .finish_non_exhaustive()
    }
}

impl ProfileRoleSource {
    pub fn new(store: Arc<dyn DirectoryStore>, settings: Arc<DirectorySettings>) -> Self {
        Self { store, settings }
    }

    // Role labels are filtered in the store so the scan limit only counts
    // candidate profiles. Status is still decided per record.
    fn query(&self) -> DocumentQuery {
        DocumentQuery::new(&self.settings.profile_collection)
            .any_label(ROLE_FIELDS, self.settings.oversight_roles.iter())
            .project(
                ROLE_FIELDS
                    .iter()
                    .chain(CONTACT_FIELDS.iter())
                    .chain(std::iter::once(&STATUS_FIELD))
                    .copied(),
            )
            .limit(self.settings.scan_limit)
    }
}

#[async_trait]
impl RecipientSource for ProfileRoleSource {
    fn name(&self) -> &'static str {
        "profile_roles"
    }

    async fn recipients(&self) -> Result<Vec<OversightRecipient>> {
        let documents = self.store.find(&self.query()).await?;
        if documents.len() as i64 >= self.settings.scan_limit {
            warn!(
                collection = %self.settings.profile_collection,
                limit = self.settings.scan_limit,
                "Oversight candidates reached the scan limit; some may be missing"
            );
        }

        let mut recipients = Vec::new();
        for document in &documents {
            let record = match DirectoryRecord::from_profile(document) {
                Ok(record) => record,
                Err(e) => {
                    warn!(document_id = %document.id, error = %e, "Skipping malformed profile");
                    continue;
                }
            };
            match record.recipient(&self.settings.oversight_roles, &self.settings.active_status) {
                Ok(Some(recipient)) => recipients.push(recipient),
                Ok(None) => {}
                Err(e) => {
                    warn!(document_id = %document.id, error = %e, "Skipping unusable profile");
                }
            }
        }

        Ok(recipients)
    }
}
