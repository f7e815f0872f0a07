use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::Assignment;

/// Inclusive end-date range selected by one expiry scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryScanQuery {
    pub ends_from: DateTime<Utc>,
    pub ends_until: DateTime<Utc>,
}

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Return pending or approved assignments whose end falls inside the
    /// query range, ordered by end ascending and then by id ascending.
    async fn find_expiring(&self, query: &ExpiryScanQuery) -> Result<Vec<Assignment>>;
}
