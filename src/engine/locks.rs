//! Per-user write serialization

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Hands out one lock per user id.
///
/// Mutating operations for the same user serialize on that user's slot;
/// operations for distinct users share nothing and proceed in parallel.
#[derive(Default)]
pub struct UserLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock slot for one user. The caller holds the returned mutex for
    /// the duration of its unit of work.
    pub fn slot(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut inner = self.inner.lock().expect("user lock table poisoned");
        inner
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
