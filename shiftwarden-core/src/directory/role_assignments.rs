use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::records::{
    ACTIVE_FLAG_FIELDS, CONTACT_FIELDS, DirectoryRecord, LINKED_PROFILE_FIELDS, ROLE_FIELDS,
    STATUS_FIELD,
};
use super::{DirectorySettings, RecipientSource};
use crate::database::ports::directory::{DirectoryStore, DocumentQuery};
use crate::error::Result;
use crate::types::OversightRecipient;

/// Oversight roles granted through the dedicated role-assignment
/// collection. A missing status counts as active.
pub struct RoleAssignmentSource {
    store: Arc<dyn DirectoryStore>,
    settings: Arc<DirectorySettings>,
}

impl fmt::Debug for RoleAssignmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleAssignmentSource")
            .field("collection", &self.settings.role_assignment_collection)
            .finish_non_exhaustive()
    }
}

impl RoleAssignmentSource {
    pub fn new(store: Arc<dyn DirectoryStore>, settings: Arc<DirectorySettings>) -> Self {
        Self { store, settings }
    }

    fn query(&self) -> DocumentQuery {
        let fields = ROLE_FIELDS
            .iter()
            .chain(ACTIVE_FLAG_FIELDS.iter())
            .chain(LINKED_PROFILE_FIELDS.iter())
            .chain(CONTACT_FIELDS.iter())
            .chain(std::iter::once(&STATUS_FIELD))
            .copied();

        DocumentQuery::new(&self.settings.role_assignment_collection)
            .any_label(ROLE_FIELDS, self.settings.oversight_roles.iter())
            .project(fields)
            .limit(self.settings.scan_limit)
    }
}

#[async_trait]
impl RecipientSource for RoleAssignmentSource {
    fn name(&self) -> &'static str {
        "role_assignments"
    }

    async fn recipients(&self) -> Result<Vec<OversightRecipient>> {
        let documents = self.store.find(&self.query()).await?;
        if documents.len() as i64 >= self.settings.scan_limit {
            warn!(
                collection = %self.settings.role_assignment_collection,
                limit = self.settings.scan_limit,
                "Oversight candidates reached the scan limit; some may be missing"
            );
        }

        let mut recipients = Vec::new();
        for document in &documents {
            let record = match DirectoryRecord::from_role_assignment(document) {
                Ok(record) => record,
                Err(e) => {
                    warn!(document_id = %document.id, error = %e, "Skipping malformed role assignment");
                    continue;
                }
            };
            match record.recipient(&self.settings.oversight_roles, &self.settings.active_status) {
                Ok(Some(recipient)) => recipients.push(recipient),
                Ok(None) => {}
                Err(e) => {
                    warn!(document_id = %document.id, error = %e, "Skipping unusable role assignment");
                }
            }
        }

        Ok(recipients)
    }
}
