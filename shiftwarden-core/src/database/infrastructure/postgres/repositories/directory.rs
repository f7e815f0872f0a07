use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use tracing::warn;

use crate::database::ports::directory::{Document, DocumentQuery, DirectoryStore, FieldFilter};
use crate::error::{NotifyError, Result};

/// Directory backed by the `directory_documents` table: one JSONB body per
/// `(collection, id)`.
#[derive(Debug, Clone)]
pub struct PostgresDirectoryStore {
    pool: PgPool,
}

impl PostgresDirectoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(row: &PgRow) -> Result<Document> {
        let id: String = row
            .try_get("id")
            .map_err(|e| NotifyError::Internal(format!("Failed to read document id: {e}")))?;
        let body: Value = row
            .try_get("body")
            .map_err(|e| NotifyError::Internal(format!("Failed to read document body: {e}")))?;

        match body {
            Value::Object(map) => Ok(Document::new(id, map)),
            other => Err(NotifyError::InvalidRecord(format!(
                "directory document '{id}' is not an object: {other}"
            ))),
        }
    }

    fn build_find<'a>(query: &'a DocumentQuery) -> QueryBuilder<'a, Postgres> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT id, ");

        match &query.projection {
            Some(fields) => {
                builder.push(
                    "CASE WHEN jsonb_typeof(body) = 'object' THEN \
                     (SELECT COALESCE(jsonb_object_agg(key, value), '{}'::jsonb) \
                     FROM jsonb_each(body) WHERE key = ANY(",
                );
                builder.push_bind(fields.clone());
                builder.push(")) ELSE body END AS body");
            }
            None => {
                builder.push("body");
            }
        }

        // Rows written by other systems are not guaranteed to be objects.
        builder.push(" FROM directory_documents WHERE collection = ");
        builder.push_bind(query.collection.as_str());
        builder.push(" AND jsonb_typeof(body) = 'object'");

        for filter in &query.filters {
            match filter {
                FieldFilter::Exists(field) => {
                    builder.push(" AND body ? ");
                    builder.push_bind(field.as_str());
                }
                FieldFilter::Equals(field, value) => {
                    builder.push(" AND body -> ");
                    builder.push_bind(field.as_str());
                    builder.push(" = ");
                    builder.push_bind(Json(value.clone()));
                }
                FieldFilter::AnyLabel { fields, labels } => {
                    // Same folding as `labels::normalize`, so the limit
                    // applies to matching rows only.
                    builder.push(" AND EXISTS (SELECT 1 FROM unnest(");
                    builder.push_bind(fields.clone());
                    builder.push(
                        "::text[]) AS f(name), \
                         LATERAL jsonb_array_elements(CASE jsonb_typeof(body -> f.name) \
                         WHEN 'array' THEN body -> f.name \
                         ELSE jsonb_build_array(body -> f.name) END) AS v(label) \
                         WHERE jsonb_typeof(v.label) = 'string' \
                         AND lower(regexp_replace(v.label #>> '{}', '[[:space:]_-]+', '', 'g')) = ANY(",
                    );
                    builder.push_bind(labels.clone());
                    builder.push("::text[]))");
                }
            }
        }

        builder.push(" ORDER BY id ASC");

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }

        builder
    }
}

#[async_trait]
impl DirectoryStore for PostgresDirectoryStore {
    async fn collections(&self) -> Result<Vec<String>> {
        sqlx::query_scalar(
            "SELECT DISTINCT collection FROM directory_documents ORDER BY collection",
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| NotifyError::from_sqlx("Failed to list directory collections", e))
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM directory_documents WHERE collection = $1")
                .bind(collection)
                .fetch_one(self.pool())
                .await
                .map_err(|e| NotifyError::from_sqlx("Failed to count directory documents", e))?;

        Ok(count.max(0) as u64)
    }

    async fn find(&self, query: &DocumentQuery) -> Result<Vec<Document>> {
        let mut builder = Self::build_find(query);
        let rows = builder
            .build()
            .fetch_all(self.pool())
            .await
            .map_err(|e| {
                NotifyError::from_sqlx(
                    &format!("Failed to query collection '{}'", query.collection),
                    e,
                )
            })?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in &rows {
            match Self::map_row(row) {
                Ok(document) => documents.push(document),
                Err(NotifyError::InvalidRecord(reason)) => {
                    warn!(collection = %query.collection, %reason, "Skipping directory document");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(documents)
    }

    async fn find_one(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let row = sqlx::query(
            r#"
            SELECT id, body
            FROM directory_documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| NotifyError::from_sqlx("Failed to load directory document", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        // The row is still proof that the identity exists, whatever its body.
        match Self::map_row(&row) {
            Ok(document) => Ok(Some(document)),
            Err(NotifyError::InvalidRecord(reason)) => {
                warn!(collection, id, %reason, "Directory document has an unreadable body");
                Ok(Some(Document::new(id, Map::new())))
            }
            Err(e) => Err(e),
        }
    }

    async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<Value>> {
        sqlx::query_scalar(
            r#"
            SELECT DISTINCT body -> $2
            FROM directory_documents
            WHERE collection = $1 AND jsonb_typeof(body) = 'object' AND body ? $2
            ORDER BY 1
            "#,
        )
        .bind(collection)
        .bind(field)
        .fetch_all(self.pool())
        .await
        .map_err(|e| NotifyError::from_sqlx("Failed to list distinct directory values", e))
    }
}
