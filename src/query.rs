//! Query bounds (auto-promoted 2D -> 3D) and depth range.

use crate::bbox::{BoundingBox2D, BoundingBox3D};
use crate::error::{EptError, EptResult};

/// A depth range with an inclusive `end`: depth `end` itself is the last
/// depth still emitted, only its children are pruned (see
/// [`DepthRange::is_deeper`]); unbounded above if `end` is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthRange {
    begin: u32,
    end: Option<u32>,
}

impl DepthRange {
    /// Builds a range; fails if either bound underflows (callers pass
    /// signed input at the CLI boundary, so a negative depth is a real
    /// possibility there).
    pub fn new(begin: i64, end: Option<i64>) -> EptResult<Self> {
        if begin < 0 || end.is_some_and(|e| e < 0) {
            return Err(EptError::InvalidDepth(format!(
                "begin={begin}, end={end:?}"
            )));
        }
        Ok(Self {
            begin: begin as u32,
            end: end.map(|e| e as u32),
        })
    }

    /// The unbounded-above default range `[0, inf)`.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            begin: 0,
            end: None,
        }
    }

    #[must_use]
    pub fn begin(&self) -> u32 {
        self.begin
    }

    #[must_use]
    pub fn end(&self) -> Option<u32> {
        self.end
    }

    /// True iff `d > end` when `end` is set; false otherwise.
    ///
    /// Equality with `end` is *not* deeper — depth `end` is still emitted,
    /// only its children are pruned. This is the only depth predicate the
    /// overlap selector consults; `DepthRange` intentionally has no
    /// `contains`/`Range`-style membership test, since the half-open form
    /// such a test would naturally take disagrees with `is_deeper` at the
    /// boundary and nothing in this crate needs it.
    #[must_use]
    pub fn is_deeper(&self, d: u32) -> bool {
        match self.end {
            Some(end) => d > end,
            None => false,
        }
    }
}

impl Default for DepthRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

// `begin` above is typed `i64` at the constructor boundary but stored as
// `u32`; this private helper keeps the struct itself simple.
impl From<(u32, Option<u32>)> for DepthRange {
    fn from((begin, end): (u32, Option<u32>)) -> Self {
        Self { begin, end }
    }
}

/// Query bounds, either supplied as a flat 2D rectangle (to be promoted
/// once the dataset's z range is known) or already 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryBounds {
    Two(BoundingBox2D),
    Three(BoundingBox3D),
}

/// A spatial + depth query against an EPT dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryParams {
    bounds: QueryBounds,
    depth_range: DepthRange,
}

impl QueryParams {
    #[must_use]
    pub fn new(bounds: QueryBounds, depth_range: DepthRange) -> Self {
        Self {
            bounds,
            depth_range,
        }
    }

    #[must_use]
    pub fn from_3d(bounds: BoundingBox3D) -> Self {
        Self::new(QueryBounds::Three(bounds), DepthRange::default())
    }

    #[must_use]
    pub fn bounds(&self) -> QueryBounds {
        self.bounds
    }

    #[must_use]
    pub fn depth_range(&self) -> DepthRange {
        self.depth_range
    }

    /// Promotes a 2D query box to 3D by inheriting `zmin`/`zmax` from the
    /// dataset's own bounds. Idempotent if already 3D.
    #[must_use]
    pub fn ensure_3d_bounds(&self, dataset_bounds: BoundingBox3D) -> BoundingBox3D {
        match self.bounds {
            QueryBounds::Three(b) => b,
            QueryBounds::Two(b) => BoundingBox3D {
                xmin: b.xmin,
                ymin: b.ymin,
                zmin: dataset_bounds.zmin,
                xmax: b.xmax,
                ymax: b.ymax,
                zmax: dataset_bounds.zmax,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, false)]
    #[case(1, false)]
    #[case(2, true)]
    #[case(100, true)]
    fn test_is_deeper_boundary(#[case] depth: u32, #[case] expected: bool) {
        let r = DepthRange::new(0, Some(1)).unwrap();
        assert_eq!(r.is_deeper(depth), expected);
    }

    #[test]
    fn test_unbounded_never_deeper() {
        let r = DepthRange::unbounded();
        assert!(!r.is_deeper(1_000_000));
    }

    #[test]
    fn test_negative_depth_rejected() {
        assert!(DepthRange::new(-1, None).is_err());
    }

    #[test]
    fn test_ensure_3d_bounds_promotion() {
        // Scenario 6 of the concrete test suite.
        let dataset = BoundingBox3D::from_corners(0.0, 0.0, -50.0, 10.0, 10.0, 50.0).unwrap();
        let q = QueryParams::new(
            QueryBounds::Two(BoundingBox2D::from_corners(1.0, 2.0, 3.0, 4.0).unwrap()),
            DepthRange::default(),
        );
        let promoted = q.ensure_3d_bounds(dataset);
        assert_eq!(
            promoted,
            BoundingBox3D::from_corners(1.0, 2.0, -50.0, 3.0, 4.0, 50.0).unwrap()
        );
    }

    #[test]
    fn test_ensure_3d_bounds_idempotent() {
        let dataset = BoundingBox3D::from_corners(0.0, 0.0, -50.0, 10.0, 10.0, 50.0).unwrap();
        let three = BoundingBox3D::from_corners(1.0, 2.0, 3.0, 4.0, 5.0, 6.0).unwrap();
        let q = QueryParams::from_3d(three);
        assert_eq!(q.ensure_3d_bounds(dataset), three);
        // Calling it again (simulating a second "first use") still yields the same box.
        assert_eq!(q.ensure_3d_bounds(dataset), three);
    }
}
