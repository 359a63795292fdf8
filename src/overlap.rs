//! Pruned octree descent producing the tile-key set for a query.

use crate::bbox::BoundingBox3D;
use crate::hierarchy::Hierarchy;
use crate::key::Key;
use crate::query::QueryParams;

/// Computes the ordered list of tile keys whose contents may intersect
/// `query`, given the dataset's flattened `hierarchy` and its root `Key`.
///
/// Implemented as an **iterative, stack-based** DFS (spec.md §9 REDESIGN
/// FLAG: the naive recursive form risks stack exhaustion on deep
/// hierarchies). `query.bounds()` must already be 3D — callers resolve a
/// 2D query via [`QueryParams::ensure_3d_bounds`] before calling this.
#[must_use]
pub fn select(hierarchy: &Hierarchy, root: Key, query: &QueryParams, bounds: BoundingBox3D) -> Vec<String> {
    let mut emitted = Vec::new();
    // A stack of keys yet to be visited. Children are pushed in
    // descending direction order (7..0) so that popping (LIFO) visits
    // them in ascending order 0..7, matching the DFS order the recursive
    // reference form produces.
    let mut stack = vec![root];

    while let Some(key) = stack.pop() {
        if !key.bounds().overlaps(&bounds) {
            continue;
        }

        let Some(count) = hierarchy.get(&key.to_string()) else {
            continue;
        };
        if count == 0 {
            continue;
        }

        emitted.push(key.to_string());

        if query.depth_range().is_deeper(key.d()) {
            continue;
        }

        for direction in (0u8..8).rev() {
            stack.push(key.bisect(direction));
        }
    }

    emitted
}

/// A straightforward recursive reference form of [`select`], kept only to
/// exercise testable property 5 (DFS/iterative equivalence) and never
/// reachable from production code paths.
#[cfg(test)]
fn select_recursive(
    hierarchy: &Hierarchy,
    key: Key,
    query: &QueryParams,
    bounds: BoundingBox3D,
    out: &mut Vec<String>,
) {
    if !key.bounds().overlaps(&bounds) {
        return;
    }
    let Some(count) = hierarchy.get(&key.to_string()) else {
        return;
    };
    if count == 0 {
        return;
    }
    out.push(key.to_string());
    if query.depth_range().is_deeper(key.d()) {
        return;
    }
    for direction in 0u8..8 {
        select_recursive(hierarchy, key.bisect(direction), query, bounds, out);
    }
}
