use async_trait::async_trait;

use crate::error::Result;
use crate::types::{NewNotification, NotificationFilter, NotificationRecord};

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// True when at least one stored record satisfies every field of
    /// `filter`, including the creation-time range.
    async fn exists_matching(&self, filter: &NotificationFilter) -> Result<bool>;

    /// Append a record. Notifications are never updated or deleted by the
    /// job.
    async fn create(&self, notification: NewNotification) -> Result<NotificationRecord>;
}
