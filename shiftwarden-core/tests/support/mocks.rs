use async_trait::async_trait;
use mockall::mock;
use serde_json::Value;

use shiftwarden_core::Result;
use shiftwarden_core::database::{
    AssignmentRepository, DirectoryStore, Document, DocumentQuery, ExpiryScanQuery,
    NotificationRepository,
};
use shiftwarden_core::types::{
    Assignment, NewNotification, NotificationFilter, NotificationRecord,
};

mock! {
    pub Assignments {}

    #[async_trait]
    impl AssignmentRepository for Assignments {
        async fn find_expiring(&self, query: &ExpiryScanQuery) -> Result<Vec<Assignment>>;
    }
}

mock! {
    pub Notifications {}

    #[async_trait]
    impl NotificationRepository for Notifications {
        async fn exists_matching(&self, filter: &NotificationFilter) -> Result<bool>;
        async fn create(&self, notification: NewNotification) -> Result<NotificationRecord>;
    }
}

mock! {
    pub Directory {}

    #[async_trait]
    impl DirectoryStore for Directory {
        async fn collections(&self) -> Result<Vec<String>>;
        async fn count(&self, collection: &str) -> Result<u64>;
        async fn find(&self, query: &DocumentQuery) -> Result<Vec<Document>>;
        async fn find_one(&self, collection: &str, id: &str) -> Result<Option<Document>>;
        async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<Value>>;
    }
}
