//! Breadth-first fetch of a sparse, chunked hierarchy index into one flat
//! `key -> count` map.

use std::collections::HashMap;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use serde_json::Value;

use crate::error::{EptError, EptResult};
use crate::key::KeyId;
use crate::source::Source;

/// Default bound on concurrent chunk fetches within one frontier.
///
/// spec.md allows an unbounded frontier fetch ("implementers should
/// introduce a semaphore" for very wide archives); this loader always
/// bounds it, reusing the same knob as [`crate::fetch::fetch_tiles`]'s
/// concurrency, since an unbounded `buffer_unordered` over a frontier of
/// thousands of continuation chunks is an operational hazard in practice.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// The full, flattened hierarchy of an EPT dataset: `"d-x-y-z" -> count`.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    counts: HashMap<String, u64>,
}

impl Hierarchy {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<u64> {
        self.counts.get(key).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Builds a `Hierarchy` directly from a flat map, bypassing the loader.
    /// Only used by tests of downstream consumers (e.g. `overlap.rs`) that
    /// need hand-built fixtures rather than a fetched dataset.
    #[cfg(test)]
    pub(crate) fn from_map(counts: HashMap<String, u64>) -> Self {
        Self { counts }
    }
}

/// Loads the full hierarchy of a dataset with `hierarchyStep = step`,
/// rooted at `h/0-0-0-0.json`.
///
/// Algorithm (spec.md §4.D): maintain a frontier of chunk root keys,
/// starting at the dataset root. For each frontier, fetch all its chunks
/// concurrently (bounded by `concurrency`); every `(key, count)` entry is
/// recorded, and any entry whose depth is a continuation pointer
/// (`step > 0 && depth > chunk_root_depth && depth % step == 0`) seeds the
/// next frontier. A single chunk fetch failure fails the whole load.
pub async fn load_hierarchy(
    source: &Source,
    hierarchy_step: u32,
    concurrency: usize,
) -> EptResult<Hierarchy> {
    let mut counts = HashMap::new();
    let mut frontier = vec!["0-0-0-0".to_string()];

    let _scope = source.scope();

    while !frontier.is_empty() {
        log::debug!("fetching hierarchy frontier of {} chunk(s)", frontier.len());

        let chunks: Vec<(String, Value)> = stream::iter(frontier.iter().cloned())
            .map(|root_key| async move {
                let path = format!("h/{root_key}.json");
                let value = source.get_json(&path).await?;
                Ok::<_, EptError>((root_key, value))
            })
            .buffer_unordered(concurrency.max(1))
            .try_collect()
            .await?;

        let mut next_frontier = Vec::new();

        for (root_key, chunk) in chunks {
            let root_depth = root_key
                .parse::<KeyId>()
                .map_err(|_| EptError::MalformedHierarchy(root_key.clone()))?
                .d;

            let object = chunk
                .as_object()
                .ok_or_else(|| EptError::MalformedHierarchy(root_key.clone()))?;

            for (key, count_value) in object {
                let count = count_value
                    .as_u64()
                    .ok_or_else(|| EptError::MalformedHierarchy(key.clone()))?;

                counts.insert(key.clone(), count);

                let entry_depth = key
                    .parse::<KeyId>()
                    .map_err(|_| EptError::MalformedHierarchy(key.clone()))?
                    .d;

                let is_continuation = hierarchy_step > 0
                    && entry_depth > root_depth
                    && entry_depth % hierarchy_step == 0;

                if is_continuation {
                    next_frontier.push(key.clone());
                }
            }
        }

        frontier = next_frontier;
    }

    Ok(Hierarchy { counts })
}
