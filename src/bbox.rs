//! Axis-aligned bounding box algebra (2D and 3D).
//!
//! Unlike the geographic `BoundingBox` used elsewhere for tile pyramids,
//! these are plain Cartesian boxes in the dataset's native coordinate
//! system (the units EPT point clouds are stored in).

use crate::error::{EptError, EptResult};

/// An axis-aligned 2D rectangle with invariant `xmin <= xmax && ymin <= ymax`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox2D {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox2D {
    /// Builds a box from its four corners, validating `min <= max`.
    pub fn from_corners(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> EptResult<Self> {
        if xmin > xmax || ymin > ymax {
            return Err(EptError::InvalidBounds(
                [xmin, ymin, 0.0],
                [xmax, ymax, 0.0],
            ));
        }
        Ok(Self {
            xmin,
            ymin,
            xmax,
            ymax,
        })
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            self.xmin + self.width() / 2.0,
            self.ymin + self.height() / 2.0,
        )
    }

    /// True if width or height is approximately zero.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.width().abs() < 1e-9 || self.height().abs() < 1e-9
    }

    /// Closed-interval overlap test, symmetric.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.xmin <= other.xmax
            && other.xmin <= self.xmax
            && self.ymin <= other.ymax
            && other.ymin <= self.ymax
    }

    /// Whether every corner of `other` lies within `self`'s closed interval.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.xmin <= other.xmin
            && other.xmax <= self.xmax
            && self.ymin <= other.ymin
            && other.ymax <= self.ymax
    }

    /// Returns the intersection box, or `None` if the overlap is empty/degenerate.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        let xmin = self.xmin.max(other.xmin);
        let ymin = self.ymin.max(other.ymin);
        let xmax = self.xmax.min(other.xmax);
        let ymax = self.ymax.min(other.ymax);
        Self::from_corners(xmin, ymin, xmax, ymax)
            .ok()
            .filter(|b| !b.is_null())
    }
}

/// An axis-aligned 3D box extending [`BoundingBox2D`] with a z interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox3D {
    pub xmin: f64,
    pub ymin: f64,
    pub zmin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub zmax: f64,
}

impl BoundingBox3D {
    /// Builds a box from its six corners, validating `min <= max` per axis.
    pub fn from_corners(
        xmin: f64,
        ymin: f64,
        zmin: f64,
        xmax: f64,
        ymax: f64,
        zmax: f64,
    ) -> EptResult<Self> {
        if xmin > xmax || ymin > ymax || zmin > zmax {
            return Err(EptError::InvalidBounds(
                [xmin, ymin, zmin],
                [xmax, ymax, zmax],
            ));
        }
        Ok(Self {
            xmin,
            ymin,
            zmin,
            xmax,
            ymax,
            zmax,
        })
    }

    /// Builds a box from a minimum corner and a per-axis size.
    pub fn from_min_size(min: [f64; 3], size: [f64; 3]) -> EptResult<Self> {
        Self::from_corners(
            min[0],
            min[1],
            min[2],
            min[0] + size[0],
            min[1] + size[1],
            min[2] + size[2],
        )
    }

    /// Parses the 6-element `[xmin,ymin,zmin,xmax,ymax,zmax]` array EPT's
    /// `entwine.json` `bounds` field uses.
    pub fn from_array(bounds: [f64; 6]) -> EptResult<Self> {
        Self::from_corners(
            bounds[0], bounds[1], bounds[2], bounds[3], bounds[4], bounds[5],
        )
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    #[must_use]
    pub fn depth(&self) -> f64 {
        self.zmax - self.zmin
    }

    #[must_use]
    pub fn center(&self) -> (f64, f64, f64) {
        (
            self.xmin + self.width() / 2.0,
            self.ymin + self.height() / 2.0,
            self.zmin + self.depth() / 2.0,
        )
    }

    /// True if width, height, or depth is approximately zero.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.width().abs() < 1e-9 || self.height().abs() < 1e-9 || self.depth().abs() < 1e-9
    }

    /// Overlap is the conjunction of per-axis closed-interval overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.xmin <= other.xmax
            && other.xmin <= self.xmax
            && self.ymin <= other.ymax
            && other.ymin <= self.ymax
            && self.zmin <= other.zmax
            && other.zmin <= self.zmax
    }

    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.xmin <= other.xmin
            && other.xmax <= self.xmax
            && self.ymin <= other.ymin
            && other.ymax <= self.ymax
            && self.zmin <= other.zmin
            && other.zmax <= self.zmax
    }

    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        Self::from_corners(
            self.xmin.max(other.xmin),
            self.ymin.max(other.ymin),
            self.zmin.max(other.zmin),
            self.xmax.min(other.xmax),
            self.ymax.min(other.ymax),
            self.zmax.min(other.zmax),
        )
        .ok()
        .filter(|b| !b.is_null())
    }
}
