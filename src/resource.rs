//! Façade composing [`crate::source`], [`crate::hierarchy`],
//! [`crate::overlap`], [`crate::fetch`], and [`crate::pointcloud`] into one
//! query entry point per dataset (spec.md §4.H).

use bytes::Bytes;
use tokio::sync::OnceCell;

use crate::error::EptResult;
use crate::fetch::{self, DEFAULT_CONCURRENCY};
use crate::hierarchy::{self, Hierarchy};
use crate::info::Info;
use crate::key::Key;
use crate::overlap;
use crate::pointcloud::PointCloud;
use crate::query::QueryParams;
use crate::source::Source;

/// One dataset's fetch/traversal/query façade. Cheap to construct — many
/// resources may coexist, one per dataset (spec.md §4.H) — and owns its
/// [`Source`] exclusively. `info` and `hierarchy` are fetched once and
/// memoized for this resource's lifetime via single-flight
/// `tokio::sync::OnceCell`s, so concurrent first callers coalesce onto one
/// fetch instead of racing (spec.md §5 "Must be protected against
/// concurrent initialization (single-flight)").
pub struct EptResource {
    source: Source,
    concurrency: usize,
    info: OnceCell<Info>,
    hierarchy: OnceCell<Hierarchy>,
}

impl EptResource {
    /// Opens a resource rooted at `uri`, dispatched by [`Source::open`],
    /// with the default tile/frontier fetch concurrency.
    pub fn open(uri: &str) -> EptResult<Self> {
        Self::with_concurrency(uri, DEFAULT_CONCURRENCY)
    }

    /// As [`Self::open`], with an explicit fetch concurrency bound.
    pub fn with_concurrency(uri: &str, concurrency: usize) -> EptResult<Self> {
        Ok(Self {
            source: Source::open(uri)?,
            concurrency,
            info: OnceCell::new(),
            hierarchy: OnceCell::new(),
        })
    }

    /// The dataset's `entwine.json`, fetched and memoized on first use.
    pub async fn info(&self) -> EptResult<&Info> {
        self.info
            .get_or_try_init(|| async {
                log::warn!("info cache miss, fetching entwine.json");
                let raw = self.source.get_json("entwine.json").await?;
                Info::from_value(raw)
            })
            .await
    }

    /// The dataset's flattened hierarchy, fetched and memoized on first use.
    pub async fn hierarchy(&self) -> EptResult<&Hierarchy> {
        let step = self.info().await?.hierarchy_step();
        self.hierarchy
            .get_or_try_init(|| async {
                log::warn!("hierarchy cache miss, loading hierarchy chunks");
                hierarchy::load_hierarchy(&self.source, step, self.concurrency).await
            })
            .await
    }

    /// Computes the overlap set for `params` and downloads the raw `.laz`
    /// bytes of every tile in it, paired with the tile's own key string, in
    /// overlap order. Shared by [`Self::query_tile_bytes`] (which drops the
    /// keys) and [`Self::query`] (which needs them to label decode errors).
    async fn query_tiles_with_keys(&self, params: &QueryParams) -> EptResult<Vec<(String, Bytes)>> {
        let info = self.info().await?;
        let hierarchy = self.hierarchy().await?;

        let bounds = params.ensure_3d_bounds(info.bounds());
        let root = Key::root(info.bounds());
        let keys = overlap::select(hierarchy, root, params, bounds);

        log::debug!("overlap set has {} key(s)", keys.len());
        let bytes = fetch::fetch_tiles(&self.source, &keys, self.concurrency).await?;
        Ok(keys.into_iter().zip(bytes).collect())
    }

    /// Computes the overlap set for `params` and downloads the raw `.laz`
    /// bytes of every tile in it, in overlap order (spec.md §4.H
    /// `query_tile_bytes`). Stops before decode — useful when a caller,
    /// e.g. a server offloading decode to a separate worker process, wants
    /// the tile bytes directly.
    pub async fn query_tile_bytes(&self, params: &QueryParams) -> EptResult<Vec<Bytes>> {
        Ok(self
            .query_tiles_with_keys(params)
            .await?
            .into_iter()
            .map(|(_, bytes)| bytes)
            .collect())
    }

    /// Runs the full pipeline: overlap select, fetch, decode, merge, clip —
    /// returning one merged, spatially clipped point cloud. An empty
    /// overlap set is a success with an empty cloud, not an error
    /// (spec.md §8 scenario 5).
    pub async fn query(&self, params: &QueryParams) -> EptResult<PointCloud> {
        let bounds = params.ensure_3d_bounds(self.info().await?.bounds());
        let tiles = self.query_tiles_with_keys(params).await?;

        if tiles.is_empty() {
            return Ok(PointCloud::empty());
        }

        // Decode is CPU-bound (spec.md §4.G/§5): dispatch each tile to the
        // blocking pool and decode concurrently, then merge and clip on
        // the same pool. Each decode is labeled with its own tile key (not
        // a positional index) so a `DecodeFailed` error identifies which
        // tile actually failed, per spec.md §7. A worker panic (e.g. the
        // `las`/`laz` decoder panicking on malformed input instead of
        // returning `Err`) is surfaced as `DecodeFailed` too, rather than
        // re-panicking the caller, consistently across decode/merge/clip.
        let decode_futures = tiles.into_iter().map(|(key, bytes)| {
            let label = key.clone();
            async move {
                match tokio::task::spawn_blocking(move || PointCloud::decode(&key, &bytes)).await {
                    Ok(result) => result,
                    Err(cause) => Err(worker_panicked(&label, cause)),
                }
            }
        });
        let decoded = futures_util::future::try_join_all(decode_futures).await?;

        let merged = tokio::task::spawn_blocking(move || PointCloud::merge(decoded))
            .await
            .map_err(|cause| worker_panicked("<merge>", cause))?;

        tokio::task::spawn_blocking(move || merged.clip(&bounds))
            .await
            .map_err(|cause| worker_panicked("<clip>", cause))
    }

    /// A thin blocking facade over the async core (spec.md §9: "Model as
    /// one async core; expose a thin blocking facade... Do not duplicate
    /// logic"). Owns a dedicated current-thread runtime and calls
    /// `block_on` into the methods above — no separate synchronous
    /// algorithm exists.
    #[must_use]
    pub fn blocking(&self) -> BlockingEptResource<'_> {
        BlockingEptResource { inner: self }
    }
}

// `spawn_blocking`'s `JoinError` only occurs on panic/cancellation, which
// this crate has no dedicated `EptError` variant for (spec.md §7 lists
// decode/fetch/malformed-data failures, not worker-pool panics); treat it
// as a decode failure labeled with whichever stage (or tile key) panicked,
// so `query`'s signature stays `EptResult` end to end.
fn worker_panicked(key: &str, cause: tokio::task::JoinError) -> crate::error::EptError {
    crate::error::EptError::DecodeFailed {
        key: key.to_string(),
        cause: Box::new(cause),
    }
}

/// Blocking facade returned by [`EptResource::blocking`]. Holds no state of
/// its own beyond a dedicated single-threaded runtime used to drive the
/// async methods to completion.
pub struct BlockingEptResource<'r> {
    inner: &'r EptResource,
}

impl BlockingEptResource<'_> {
    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to start blocking runtime")
    }

    /// Blocking equivalent of [`EptResource::query`].
    pub fn query(&self, params: &QueryParams) -> EptResult<PointCloud> {
        Self::runtime().block_on(self.inner.query(params))
    }

    /// Blocking equivalent of [`EptResource::query_tile_bytes`].
    pub fn query_tile_bytes(&self, params: &QueryParams) -> EptResult<Vec<Bytes>> {
        Self::runtime().block_on(self.inner.query_tile_bytes(params))
    }
}
