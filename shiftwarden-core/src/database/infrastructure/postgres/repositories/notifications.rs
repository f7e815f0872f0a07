use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::database::ports::notifications::NotificationRepository;
use crate::error::{NotifyError, Result};
use crate::types::{
    IdentityId, NewNotification, NotificationFilter, NotificationId, NotificationKind,
    NotificationMetadata, NotificationRecord,
};

#[derive(Debug, Clone)]
pub struct PostgresNotificationRepository {
    pool: PgPool,
}

impl PostgresNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(row: &PgRow) -> Result<NotificationRecord> {
        let id: Uuid = row
            .try_get("id")
            .map_err(|e| NotifyError::Internal(format!("Failed to read notification id: {e}")))?;
        let recipient_id: Uuid = row
            .try_get("recipient_id")
            .map_err(|e| NotifyError::Internal(format!("Failed to read recipient_id: {e}")))?;
        let kind: String = row
            .try_get("kind")
            .map_err(|e| NotifyError::Internal(format!("Failed to read kind: {e}")))?;
        let message: String = row
            .try_get("message")
            .map_err(|e| NotifyError::Internal(format!("Failed to read message: {e}")))?;
        let Json(metadata): Json<NotificationMetadata> = row
            .try_get("metadata")
            .map_err(|e| NotifyError::Internal(format!("Failed to read metadata: {e}")))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| NotifyError::Internal(format!("Failed to read created_at: {e}")))?;

        let kind = NotificationKind::from_tag(&kind).ok_or_else(|| {
            NotifyError::InvalidRecord(format!("unknown notification kind '{kind}'"))
        })?;

        Ok(NotificationRecord {
            id: NotificationId(id),
            recipient_id: IdentityId(recipient_id),
            kind,
            message,
            metadata,
            created_at,
        })
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn exists_matching(&self, filter: &NotificationFilter) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM notifications
                WHERE recipient_id = $1
                  AND kind = $2
                  AND metadata ->> 'assignmentId' = $3
                  AND (metadata ->> 'shiftStartDate') IS NOT DISTINCT FROM $4::text
                  AND (metadata ->> 'shiftEndDate') IS NOT DISTINCT FROM $5::text
                  AND created_at >= $6
                  AND created_at <= $7
            )
            "#,
        )
        .bind(filter.recipient_id.as_uuid())
        .bind(filter.kind.tag())
        .bind(filter.assignment_id.to_string())
        .bind(filter.window_start.as_deref())
        .bind(filter.window_end.as_deref())
        .bind(filter.created_from)
        .bind(filter.created_until)
        .fetch_one(self.pool())
        .await
        .map_err(|e| NotifyError::from_sqlx("Failed to check existing notifications", e))?;

        Ok(exists)
    }

    async fn create(&self, notification: NewNotification) -> Result<NotificationRecord> {
        let id = NotificationId::new();
        let row = sqlx::query(
            r#"
            INSERT INTO notifications (id, recipient_id, kind, message, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, recipient_id, kind, message, metadata, created_at
            "#,
        )
        .bind(id.0)
        .bind(notification.recipient_id.as_uuid())
        .bind(notification.kind.tag())
        .bind(&notification.message)
        .bind(Json(&notification.metadata))
        .bind(notification.created_at)
        .fetch_one(self.pool())
        .await
        .map_err(|e| NotifyError::from_sqlx("Failed to create notification", e))?;

        Self::map_row(&row)
    }
}
