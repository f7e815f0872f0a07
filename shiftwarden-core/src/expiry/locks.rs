use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::types::AssignmentId;

/// Assignments currently being processed. Guards against handling the same
/// assignment twice within one run; says nothing about other processes.
#[derive(Debug, Clone, Default)]
pub struct AssignmentLocks {
    held: Arc<Mutex<HashSet<AssignmentId>>>,
}

impl AssignmentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when `id` is already held.
    pub fn acquire(&self, id: AssignmentId) -> Option<AssignmentLock> {
        if !self.held.lock().insert(id) {
            return None;
        }
        Some(AssignmentLock {
            id,
            held: Arc::clone(&self.held),
        })
    }

    pub fn is_locked(&self, id: AssignmentId) -> bool {
        self.held.lock().contains(&id)
    }

    pub fn len(&self) -> usize {
        self.held.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.lock().is_empty()
    }
}

#[derive(Debug)]
#[must_use = "dropping the lock immediately releases the assignment"]
pub struct AssignmentLock {
    id: AssignmentId,
    held: Arc<Mutex<HashSet<AssignmentId>>>,
}

impl AssignmentLock {
    pub fn id(&self) -> AssignmentId {
        self.id
    }
}

impl Drop for AssignmentLock {
    fn drop(&mut self) {
        self.held.lock().remove(&self.id);
    }
}
