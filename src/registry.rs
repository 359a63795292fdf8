//! Process-wide single-flight cache, keyed by dataset root address
//! (spec.md §4.H/§9 "Global `RESOURCES` registry").
//!
//! The library only supplies this generic primitive; the policy of "one
//! [`crate::resource::EptResource`] per dataset URL, lifetime = process"
//! lives in the `ept-cli` server binary that owns a `Registry<String,
//! EptResource>`, grounded on `original_source/ept-server.py`'s
//! module-level `RESOURCES: dict[str, EPTResource]`.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

/// A thread-safe `K -> V` map where concurrent `get_or_try_init` calls for
/// the same key coalesce onto one initialization future, rather than
/// racing to construct `V` twice. Entries are never evicted — grounded on
/// the teacher's `cache.rs` `DirectoryCacheV2::get_dir_entry_or_insert`
/// request-coalescing shape, generalized from "offset -> Directory" to an
/// arbitrary key/value pair.
pub struct Registry<K, V> {
    slots: Mutex<HashMap<K, Arc<OnceCell<Arc<V>>>>>,
}

impl<K, V> Default for Registry<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone, V> Registry<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, running `init` to produce it on
    /// the first request only. A concurrent second request for the same
    /// key while `init` is still running awaits the same in-flight result
    /// rather than starting a second one.
    pub async fn get_or_try_init<F, Fut, E>(&self, key: K, init: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = {
            let mut slots = self.slots.lock().expect("registry mutex poisoned");
            slots
                .entry(key)
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        slot.get_or_try_init(|| async { init().await.map(Arc::new) })
            .await
            .map(Arc::clone)
    }

    /// Number of entries currently registered (for diagnostics/tests).
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().expect("registry mutex poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_single_key_initializes_once() {
        let registry: Registry<String, u32> = Registry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let calls = calls.clone();
            registry
                .get_or_try_init("a".to_string(), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, std::convert::Infallible>(42u32)
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_initialize_independently() {
        let registry: Registry<String, u32> = Registry::new();
        let a = registry
            .get_or_try_init("a".to_string(), || async { Ok::<_, std::convert::Infallible>(1u32) })
            .await
            .unwrap();
        let b = registry
            .get_or_try_init("b".to_string(), || async { Ok::<_, std::convert::Infallible>(2u32) })
            .await
            .unwrap();
        assert_eq!(*a, 1);
        assert_eq!(*b, 2);
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_requests_coalesce() {
        let registry: Arc<Registry<String, u32>> = Arc::new(Registry::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = registry.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                registry
                    .get_or_try_init("shared".to_string(), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        Ok::<_, std::convert::Infallible>(7u32)
                    })
                    .await
                    .unwrap()
            }));
        }
        for h in handles {
            assert_eq!(*h.await.unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
