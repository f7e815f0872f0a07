use serde::{Deserialize, Serialize};

use super::ids::IdentityId;

/// An identity holding an oversight role, entitled to expiry notices for
/// other people's assignments. Sourced from the directory on every run and
/// never persisted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OversightRecipient {
    pub identity: IdentityId,
    pub contact: Option<String>,
    pub active: bool,
}

impl OversightRecipient {
    pub fn active(identity: IdentityId, contact: Option<String>) -> Self {
        Self {
            identity,
            contact,
            active: true,
        }
    }
}
