use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::NotifyError;

/// Strongly typed ID for a person known to the identity directory.
///
/// Both assignment subjects and oversight recipients use this type so the
/// self-exclusion check is a plain equality.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct IdentityId(pub Uuid);

impl IdentityId {
    pub fn new() -> Self {
        IdentityId(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Parse an identity from a loosely typed directory field.
    pub fn parse(raw: &str) -> Result<Self, NotifyError> {
        Uuid::parse_str(raw.trim())
            .map(IdentityId)
            .map_err(|e| NotifyError::InvalidRecord(format!("invalid identity '{raw}': {e}")))
    }
}

impl Default for IdentityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for IdentityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly typed ID for a shift assignment.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct AssignmentId(pub Uuid);

impl AssignmentId {
    pub fn new() -> Self {
        AssignmentId(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AssignmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct NotificationId(pub Uuid);

impl NotificationId {
    pub fn new() -> Self {
        NotificationId(Uuid::now_v7())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_parse_accepts_padded_uuid() {
        let raw = " 7d3f1c52-5d0a-4c7e-9c55-2f1f0b7a9e10 ";
        let id = IdentityId::parse(raw).expect("valid uuid");
        assert_eq!(id.to_string(), raw.trim());
    }

    #[test]
    fn identity_parse_rejects_garbage() {
        let err = IdentityId::parse("not-an-id").unwrap_err();
        assert!(matches!(err, NotifyError::InvalidRecord(_)));
    }
}
