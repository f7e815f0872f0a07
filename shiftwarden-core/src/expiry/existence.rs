use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::warn;

use crate::database::ports::directory::DirectoryStore;
use crate::error::Result;
use crate::types::IdentityId;

/// Run-scoped memo of "does this identity still have a profile".
///
/// Unconfirmed existence counts as absent: with no directory, or with the
/// directory unreachable, every lookup answers `false`.
pub struct ExistenceCache {
    store: Option<Arc<dyn DirectoryStore>>,
    collection: String,
    known: Mutex<HashMap<IdentityId, bool>>,
    lookups: AtomicUsize,
}

impl fmt::Debug for ExistenceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExistenceCache")
            .field("collection", &self.collection)
            .field("connected", &self.store.is_some())
            .field("lookups", &self.lookups.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl ExistenceCache {
    pub fn new(store: Option<Arc<dyn DirectoryStore>>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            known: Mutex::new(HashMap::new()),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn clear(&self) {
        self.known.lock().clear();
        self.lookups.store(0, Ordering::Relaxed);
    }

    /// Store lookups issued since the last [`clear`](Self::clear).
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    pub async fn exists(&self, identity: IdentityId) -> Result<bool> {
        if let Some(known) = self.known.lock().get(&identity).copied() {
            return Ok(known);
        }

        let exists = match &self.store {
            None => {
                warn!(identity = %identity, "No directory connection; treating identity as absent");
                false
            }
            Some(store) => {
                self.lookups.fetch_add(1, Ordering::Relaxed);
                match store.find_one(&self.collection, &identity.to_string()).await {
                    Ok(found) => found.is_some(),
                    Err(e) if e.is_unavailable() => {
                        warn!(
                            identity = %identity,
                            error = %e,
                            "Directory unavailable; treating identity as absent"
                        );
                        false
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        self.known.lock().insert(identity, exists);
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::InMemoryDirectory;
    use serde_json::json;

    #[tokio::test]
    async fn lookups_are_memoized_until_cleared() {
        let directory = Arc::new(InMemoryDirectory::new());
        let present = IdentityId::new();
        directory
            .insert_json("profiles", &present.to_string(), json!({ "name": "Ada" }))
            .await
            .unwrap();

        let cache = ExistenceCache::new(Some(directory.clone()), "profiles");
        assert!(cache.exists(present).await.unwrap());
        assert!(cache.exists(present).await.unwrap());
        assert!(!cache.exists(IdentityId::new()).await.unwrap());
        assert_eq!(cache.lookups(), 2);

        directory.remove("profiles", &present.to_string()).await;
        assert!(cache.exists(present).await.unwrap());

        cache.clear();
        assert!(!cache.exists(present).await.unwrap());
        assert_eq!(cache.lookups(), 1);
    }

    #[tokio::test]
    async fn missing_directory_fails_closed() {
        let cache = ExistenceCache::new(None, "profiles");
        assert!(!cache.exists(IdentityId::new()).await.unwrap());
        assert_eq!(cache.lookups(), 0);
    }
}
