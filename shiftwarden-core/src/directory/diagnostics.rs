//! Snapshot of what the directory actually holds, logged when no strategy
//! produced a recipient.

use serde_json::Value;
use tracing::debug;

use super::records::ROLE_FIELDS;
use crate::database::ports::directory::DirectoryStore;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionSummary {
    pub name: String,
    pub documents: u64,
    pub role_labels: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectorySnapshot {
    pub collections: Vec<CollectionSummary>,
}

impl DirectorySnapshot {
    pub async fn collect(store: &dyn DirectoryStore) -> Result<Self> {
        let mut collections = Vec::new();
        for name in store.collections().await? {
            let documents = store.count(&name).await?;
            let mut role_labels = Vec::new();
            for field in ROLE_FIELDS {
                for value in store.distinct(&name, field).await? {
                    collect_labels(&value, &mut role_labels);
                }
            }
            role_labels.sort();
            role_labels.dedup();
            collections.push(CollectionSummary {
                name,
                documents,
                role_labels,
            });
        }
        Ok(Self { collections })
    }

    pub fn log(&self) {
        if self.collections.is_empty() {
            debug!("Directory holds no collections");
            return;
        }
        for collection in &self.collections {
            debug!(
                collection = %collection.name,
                documents = collection.documents,
                role_labels = ?collection.role_labels,
                "Directory collection summary"
            );
        }
    }
}

fn collect_labels(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(label) => out.push(label.clone()),
        Value::Array(items) => items.iter().for_each(|item| collect_labels(item, out)),
        _ => {}
    }
}
