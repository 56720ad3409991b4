//! Named mutual-exclusion registry.
//!
//! The output locator's newest-mtime heuristic is only correct when at
//! most one job per model is in flight, and repository mutations (stage,
//! delete, archive build) on the same track name must never interleave.
//! Both concerns are served by handing out one mutex per name.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Registry of named locks.
///
/// `acquire` returns a shared handle to the mutex for a name; callers
/// lock the handle for the duration of their critical section:
///
/// ```
/// use stemster_core::locks::NamedLocks;
///
/// let locks = NamedLocks::new();
/// let lock = locks.acquire("model:htdemucs");
/// let _guard = lock.lock();
/// // exclusive for this name until the guard drops
/// ```
#[derive(Default)]
pub struct NamedLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl NamedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the lock for `name`, creating it on first use.
    pub fn acquire(&self, name: &str) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock();
        Arc::clone(
            map.entry(name.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Number of distinct names seen so far.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
