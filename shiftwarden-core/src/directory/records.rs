//! Typed views over raw directory documents.
//!
//! Everything that inspects document fields lives here. Callers above this
//! module only ever see [`DirectoryRecord`] and [`OversightRecipient`].

use serde_json::Value;

use super::labels::{RoleLabels, normalize};
use crate::database::ports::directory::Document;
use crate::error::{NotifyError, Result};
use crate::types::{IdentityId, OversightRecipient};

pub(crate) const ROLE_FIELDS: [&str; 2] = ["role", "roleName"];
pub(crate) const STATUS_FIELD: &str = "status";
pub(crate) const ACTIVE_FLAG_FIELDS: [&str; 2] = ["isActive", "active"];
pub(crate) const LINKED_PROFILE_FIELDS: [&str; 2] = ["profileId", "userId"];
pub(crate) const CONTACT_FIELDS: [&str; 2] = ["email", "contact"];

/// Profile carrying its role inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRoleRecord {
    pub identity: IdentityId,
    pub roles: Vec<String>,
    pub status: Option<String>,
    pub contact: Option<String>,
}

/// Row of the dedicated role-assignment collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignmentRecord {
    pub record_id: String,
    pub linked_profile: Option<IdentityId>,
    pub role: String,
    pub active_flag: Option<bool>,
    pub status: Option<String>,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryRecord {
    Profile(ProfileRoleRecord),
    RoleAssignment(RoleAssignmentRecord),
}

impl DirectoryRecord {
    pub fn from_profile(document: &Document) -> Result<Self> {
        let identity = IdentityId::parse(&document.id)?;
        let roles = ROLE_FIELDS
            .iter()
            .filter_map(|field| document.get(field))
            .flat_map(role_values)
            .collect::<Vec<_>>();

        Ok(DirectoryRecord::Profile(ProfileRoleRecord {
            identity,
            roles,
            status: document.str_field(STATUS_FIELD).map(str::to_string),
            contact: first_str(document, &CONTACT_FIELDS),
        }))
    }

    pub fn from_role_assignment(document: &Document) -> Result<Self> {
        let role = first_str(document, &ROLE_FIELDS).ok_or_else(|| {
            NotifyError::InvalidRecord(format!(
                "role assignment '{}' has no role label",
                document.id
            ))
        })?;

        let linked_profile = match first_str(document, &LINKED_PROFILE_FIELDS) {
            Some(raw) => Some(IdentityId::parse(&raw)?),
            None => None,
        };

        Ok(DirectoryRecord::RoleAssignment(RoleAssignmentRecord {
            record_id: document.id.clone(),
            linked_profile,
            role,
            active_flag: ACTIVE_FLAG_FIELDS
                .iter()
                .find_map(|field| document.bool_field(field)),
            status: document.str_field(STATUS_FIELD).map(str::to_string),
            contact: first_str(document, &CONTACT_FIELDS),
        }))
    }

    /// The notify target, when this record grants an active oversight role.
    pub fn recipient(
        &self,
        labels: &RoleLabels,
        active_status: &str,
    ) -> Result<Option<OversightRecipient>> {
        match self {
            DirectoryRecord::Profile(profile) => {
                let has_role = profile.roles.iter().any(|role| labels.contains(role));
                let active = profile
                    .status
                    .as_deref()
                    .is_some_and(|status| status_matches(status, active_status));
                if !(has_role && active) {
                    return Ok(None);
                }
                Ok(Some(OversightRecipient::active(
                    profile.identity,
                    profile.contact.clone(),
                )))
            }
            DirectoryRecord::RoleAssignment(assignment) => {
                if !labels.contains(&assignment.role) {
                    return Ok(None);
                }
                let active = assignment.active_flag == Some(true)
                    || match assignment.status.as_deref() {
                        Some(status) => status_matches(status, active_status),
                        None => true,
                    };
                if !active {
                    return Ok(None);
                }

                let identity = match assignment.linked_profile {
                    Some(profile) => profile,
                    None => IdentityId::parse(&assignment.record_id)?,
                };
                Ok(Some(OversightRecipient::active(
                    identity,
                    assignment.contact.clone(),
                )))
            }
        }
    }
}

fn status_matches(status: &str, sentinel: &str) -> bool {
    normalize(status) == normalize(sentinel)
}

fn first_str(document: &Document, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|field| document.str_field(field))
        .map(str::to_string)
}

fn role_values(value: &Value) -> Vec<String> {
    match value {
        Value::String(role) if !role.trim().is_empty() => vec![role.trim().to_string()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|role| !role.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
