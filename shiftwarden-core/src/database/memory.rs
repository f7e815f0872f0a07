//! In-memory adapters for every port. Used by tests and by dry runs, where
//! nothing may be written to the real notification table.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::database::ports::assignments::{AssignmentRepository, ExpiryScanQuery};
use crate::database::ports::directory::{DirectoryStore, Document, DocumentQuery};
use crate::database::ports::notifications::NotificationRepository;
use crate::error::{NotifyError, Result};
use crate::types::{
    Assignment, NewNotification, NotificationFilter, NotificationId, NotificationRecord,
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryAssignmentRepository {
    assignments: Arc<Mutex<Vec<Assignment>>>,
}

impl InMemoryAssignmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, assignment: Assignment) {
        let mut guard = self.assignments.lock().await;
        guard.retain(|existing| existing.id != assignment.id);
        guard.push(assignment);
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryAssignmentRepository {
    async fn find_expiring(&self, query: &ExpiryScanQuery) -> Result<Vec<Assignment>> {
        let guard = self.assignments.lock().await;
        let mut selected: Vec<Assignment> = guard
            .iter()
            .filter(|assignment| assignment.state.is_eligible())
            .filter(|assignment| {
                assignment
                    .ends_at
                    .is_some_and(|end| end >= query.ends_from && end <= query.ends_until)
            })
            .cloned()
            .collect();

        selected.sort_by(|a, b| a.ends_at.cmp(&b.ends_at).then_with(|| a.id.cmp(&b.id)));
        Ok(selected)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationRepository {
    records: Arc<Mutex<Vec<NotificationRecord>>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far, in insertion order.
    pub async fn records(&self) -> Vec<NotificationRecord> {
        self.records.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn exists_matching(&self, filter: &NotificationFilter) -> Result<bool> {
        let guard = self.records.lock().await;
        Ok(guard.iter().any(|record| filter.matches(record)))
    }

    async fn create(&self, notification: NewNotification) -> Result<NotificationRecord> {
        let record = notification.into_record(NotificationId::new());
        self.records.lock().await.push(record.clone());
        Ok(record)
    }
}

/// Directory collections held as `collection -> id -> document`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    collections: Arc<Mutex<BTreeMap<String, BTreeMap<String, Document>>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, collection: &str, document: Document) {
        let mut guard = self.collections.lock().await;
        guard
            .entry(collection.to_string())
            .or_default()
            .insert(document.id.clone(), document);
    }

    /// Insert a JSON object as a document body.
    pub async fn insert_json(&self, collection: &str, id: &str, body: Value) -> Result<()> {
        match body {
            Value::Object(map) => {
                self.insert(collection, Document::new(id, map)).await;
                Ok(())
            }
            other => Err(NotifyError::InvalidRecord(format!(
                "directory document '{id}' is not an object: {other}"
            ))),
        }
    }

    pub async fn remove(&self, collection: &str, id: &str) -> Option<Document> {
        let mut guard = self.collections.lock().await;
        let documents = guard.get_mut(collection)?;
        let removed = documents.remove(id);
        if documents.is_empty() {
            guard.remove(collection);
        }
        removed
    }
}

#[async_trait]
impl DirectoryStore for InMemoryDirectory {
    async fn collections(&self) -> Result<Vec<String>> {
        Ok(self.collections.lock().await.keys().cloned().collect())
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let guard = self.collections.lock().await;
        Ok(guard.get(collection).map_or(0, |docs| docs.len() as u64))
    }

    async fn find(&self, query: &DocumentQuery) -> Result<Vec<Document>> {
        let guard = self.collections.lock().await;
        let Some(documents) = guard.get(&query.collection) else {
            return Ok(Vec::new());
        };

        let limit = query
            .limit
            .map_or(usize::MAX, |limit| limit.max(0) as usize);

        Ok(documents
            .values()
            .filter(|document| query.matches(document))
            .take(limit)
            .map(|document| query.project_document(document))
            .collect())
    }

    async fn find_one(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let guard = self.collections.lock().await;
        Ok(guard
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<Value>> {
        let guard = self.collections.lock().await;
        let mut values: Vec<Value> = Vec::new();
        if let Some(documents) = guard.get(collection) {
            for value in documents.values().filter_map(|document| document.get(field)) {
                if !values.contains(value) {
                    values.push(value.clone());
                }
            }
        }
        values.sort_by_key(|value| value.to_string());
        Ok(values)
    }
}
