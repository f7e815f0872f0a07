use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::database::ports::assignments::{AssignmentRepository, ExpiryScanQuery};
use crate::error::{NotifyError, Result};
use crate::types::{Assignment, AssignmentId, AssignmentState, IdentityId};

#[derive(Debug, Clone)]
pub struct PostgresAssignmentRepository {
    pool: PgPool,
}

impl PostgresAssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(row: &PgRow) -> Result<Assignment> {
        let id: Uuid = row
            .try_get("id")
            .map_err(|e| NotifyError::Internal(format!("Failed to read assignment id: {e}")))?;
        let subject_id: Option<Uuid> = row
            .try_get("subject_id")
            .map_err(|e| NotifyError::Internal(format!("Failed to read subject_id: {e}")))?;
        let starts_at: Option<DateTime<Utc>> = row
            .try_get("starts_at")
            .map_err(|e| NotifyError::Internal(format!("Failed to read starts_at: {e}")))?;
        let ends_at: Option<DateTime<Utc>> = row
            .try_get("ends_at")
            .map_err(|e| NotifyError::Internal(format!("Failed to read ends_at: {e}")))?;
        let state: String = row
            .try_get("state")
            .map_err(|e| NotifyError::Internal(format!("Failed to read state: {e}")))?;

        Ok(Assignment {
            id: AssignmentId(id),
            subject_id: subject_id.map(IdentityId),
            starts_at,
            ends_at,
            state: AssignmentState::from(state.as_str()),
        })
    }
}

#[async_trait]
impl AssignmentRepository for PostgresAssignmentRepository {
    async fn find_expiring(&self, query: &ExpiryScanQuery) -> Result<Vec<Assignment>> {
        let eligible: Vec<String> = AssignmentState::ELIGIBLE_LABELS
            .iter()
            .map(|label| label.to_string())
            .collect();

        let rows = sqlx::query(
            r#"
            SELECT id, subject_id, starts_at, ends_at, state
            FROM shift_assignments
            WHERE ends_at >= $1
              AND ends_at <= $2
              AND lower(state) = ANY($3)
            ORDER BY ends_at ASC, id ASC
            "#,
        )
        .bind(query.ends_from)
        .bind(query.ends_until)
        .bind(&eligible)
        .fetch_all(self.pool())
        .await
        .map_err(|e| NotifyError::from_sqlx("Failed to scan expiring assignments", e))?;

        rows.iter().map(Self::map_row).collect()
    }
}
