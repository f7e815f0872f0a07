use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::directory::labels::normalize;
use crate::error::Result;

/// A schema-less directory document: a stable id plus whatever fields the
/// owning system happened to write. Only directory adapters look inside
/// `body`; nothing loosely typed travels further than that.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, body: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            body,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.body.get(field)
    }

    /// String value of `field`, ignoring non-string and blank values.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.body
            .get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn bool_field(&self, field: &str) -> Option<bool> {
        self.body.get(field).and_then(Value::as_bool)
    }
}

/// Predicate on a top-level document field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldFilter {
    /// The field is present (any value, including `null`).
    Exists(String),
    /// The field equals the given JSON value.
    Equals(String, Value),
    /// One of `fields` holds a string, or an array containing a string,
    /// whose normalized form is in `labels`. `labels` are already
    /// normalized.
    AnyLabel { fields: Vec<String>, labels: Vec<String> },
}

/// Filtered read against one collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentQuery {
    pub collection: String,
    pub filters: Vec<FieldFilter>,
    /// When set, only these fields are returned in each document body.
    pub projection: Option<Vec<String>>,
    pub limit: Option<i64>,
}

impl DocumentQuery {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Default::default()
        }
    }

    pub fn exists(mut self, field: impl Into<String>) -> Self {
        self.filters.push(FieldFilter::Exists(field.into()));
        self
    }

    pub fn equals(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters
            .push(FieldFilter::Equals(field.into(), value.into()));
        self
    }

    pub fn any_label<F, L>(mut self, fields: F, labels: L) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        L: IntoIterator,
        L::Item: Into<String>,
    {
        self.filters.push(FieldFilter::AnyLabel {
            fields: fields.into_iter().map(Into::into).collect(),
            labels: labels.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn project<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Apply the filters to an in-memory document.
    pub fn matches(&self, document: &Document) -> bool {
        self.filters.iter().all(|filter| match filter {
            FieldFilter::Exists(field) => document.body.contains_key(field),
            FieldFilter::Equals(field, value) => document.body.get(field) == Some(value),
            FieldFilter::AnyLabel { fields, labels } => fields
                .iter()
                .filter_map(|field| document.body.get(field))
                .any(|value| label_values(value).any(|label| labels.contains(&normalize(label)))),
        })
    }

    /// Apply the projection to an in-memory document.
    pub fn project_document(&self, document: &Document) -> Document {
        match &self.projection {
            None => document.clone(),
            Some(fields) => {
                let body = document
                    .body
                    .iter()
                    .filter(|(key, _)| fields.iter().any(|field| field == *key))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                Document::new(document.id.clone(), body)
            }
        }
    }
}

fn label_values(value: &Value) -> Box<dyn Iterator<Item = &str> + '_> {
    match value {
        Value::String(label) => Box::new(std::iter::once(label.as_str())),
        Value::Array(items) => Box::new(items.iter().filter_map(Value::as_str)),
        _ => Box::new(std::iter::empty()),
    }
}

/// Read-only access to the identity/role directory.
///
/// The directory is a set of named collections of [`Document`]s whose shape
/// depends on which system (and which migration state) produced them.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Names of all collections that currently hold documents.
    async fn collections(&self) -> Result<Vec<String>>;

    async fn count(&self, collection: &str) -> Result<u64>;

    async fn find(&self, query: &DocumentQuery) -> Result<Vec<Document>>;

    async fn find_one(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Distinct values stored under `field` across a collection. Used for
    /// diagnostics when recipient discovery comes back empty.
    async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<Value>>;
}
