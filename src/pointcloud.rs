//! Decode, merge, and spatial clip of point tiles (spec.md §4.G).
//!
//! The LAZ/LAS codec is an external collaborator in spec.md's own words,
//! but this crate needs one real implementation to be runnable end to
//! end, so it is built directly on the `las` crate (with its `laz`
//! feature), grounded on `pka-copc-rs`'s use of `las::{Reader, Writer,
//! Point, Builder}` for reading and writing point records.

use std::io::Cursor;

use bytes::Bytes;
use las::{Builder, Point, Read as LasRead, Reader, Write as LasWrite, Writer};

use crate::bbox::BoundingBox3D;
use crate::error::{EptError, EptResult};

/// A decoded, in-memory point cloud: a flat point array plus the header
/// metadata needed to re-encode it. Per spec.md §3, the core only ever
/// touches per-axis coordinates and a retention mask — this crate's only
/// codec collaborator stores the full `las::Point`, but nothing above
/// this module inspects anything but `x`/`y`/`z`.
pub struct PointCloud {
    header: las::Header,
    points: Vec<Point>,
}

impl PointCloud {
    /// Decodes one tile's LAZ (or plain LAS) bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EptError::DecodeFailed`] if the decoder rejects the bytes.
    pub fn decode(key: &str, bytes: &Bytes) -> EptResult<Self> {
        let wrap_err = |cause: las::Error| EptError::DecodeFailed {
            key: key.to_string(),
            cause: Box::new(cause),
        };

        let mut reader = Reader::new(Cursor::new(bytes.clone())).map_err(wrap_err)?;
        let header = reader.header().clone();
        let points = reader
            .points()
            .collect::<Result<Vec<Point>, las::Error>>()
            .map_err(wrap_err)?;

        log::debug!("decoded {} point(s) from tile {key}", points.len());
        Ok(Self { header, points })
    }

    /// Merges several decoded tiles into one point cloud (spec.md §4.G
    /// stage 2, the single aggregation point). The first cloud's header is
    /// kept as the merged header — EPT tiles of one dataset share scale,
    /// offset, and point format, so no reconciliation beyond "keep one" is
    /// needed for a spatial-only read path. Merging zero clouds yields an
    /// empty cloud, not an error (spec.md §8 scenario 5).
    pub fn merge(clouds: Vec<PointCloud>) -> Self {
        let mut iter = clouds.into_iter();
        let Some(mut first) = iter.next() else {
            return Self::empty();
        };
        for cloud in iter {
            first.points.extend(cloud.points);
        }
        first
    }

    /// An empty point cloud with a default header, used when the overlap
    /// set (and therefore the tile fetch) was empty.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            header: Builder::default()
                .into_header()
                .expect("a default-built header is always valid"),
            points: Vec::new(),
        }
    }

    /// Retains points with `xmin <= x <= xmax && ymin <= y <= ymax && zmin
    /// <= z <= zmax` (closed intervals, per-axis, spec.md §4.G stage 3).
    /// Axis order is immaterial; this computes all three conditions in one
    /// pass over the point array rather than three separate filters
    /// (grounded on `original_source/ept/queryparams.py`'s
    /// `sync_filter_las_points`, which applies the mask as one per-axis
    /// AND chain rather than filtering during decode).
    #[must_use]
    pub fn clip(mut self, bounds: &BoundingBox3D) -> Self {
        self.points.retain(|p| {
            p.x >= bounds.xmin
                && p.x <= bounds.xmax
                && p.y >= bounds.ymin
                && p.y <= bounds.ymax
                && p.z >= bounds.zmin
                && p.z <= bounds.zmax
        });
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Re-encodes the point cloud as LAZ (`compressed = true`) or plain
    /// LAS bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the `las` writer rejects the header or a point.
    pub fn encode(self, compressed: bool) -> EptResult<Bytes> {
        let mut builder = Builder::from(self.header);
        builder.point_format.is_compressed = compressed;
        let header = builder.into_header()?;

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = Writer::new(&mut cursor, header)?;
            for point in self.points {
                writer.write_point(point)?;
            }
        }
        Ok(Bytes::from(cursor.into_inner()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64, z: f64) -> Point {
        Point {
            x,
            y,
            z,
            ..Default::default()
        }
    }

    fn encode_las(points: Vec<Point>) -> Bytes {
        let header = Builder::default().into_header().unwrap();
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = Writer::new(&mut cursor, header).unwrap();
            for p in points {
                writer.write_point(p).unwrap();
            }
        }
        Bytes::from(cursor.into_inner())
    }

    #[test]
    fn test_decode_reports_point_count() {
        let bytes = encode_las(vec![point(1.0, 1.0, 1.0), point(2.0, 2.0, 2.0)]);
        let cloud = PointCloud::decode("0-0-0-0", &bytes).unwrap();
        assert_eq!(cloud.len(), 2);
    }

    #[test]
    fn test_clip_retains_only_in_bounds_points() {
        let bytes = encode_las(vec![point(1.0, 1.0, 1.0), point(100.0, 100.0, 100.0)]);
        let cloud = PointCloud::decode("k", &bytes).unwrap();
        let bounds = BoundingBox3D::from_corners(0.0, 0.0, 0.0, 10.0, 10.0, 10.0).unwrap();
        let clipped = cloud.clip(&bounds);
        assert_eq!(clipped.len(), 1);
    }

    #[test]
    fn test_clip_is_idempotent() {
        let bytes = encode_las(vec![point(1.0, 1.0, 1.0), point(100.0, 100.0, 100.0)]);
        let cloud = PointCloud::decode("k", &bytes).unwrap();
        let bounds = BoundingBox3D::from_corners(0.0, 0.0, 0.0, 10.0, 10.0, 10.0).unwrap();
        let once = cloud.clip(&bounds).len();
        let cloud = PointCloud::decode("k", &bytes).unwrap();
        let twice = cloud.clip(&bounds).clip(&bounds).len();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_concatenates_points() {
        let a = PointCloud::decode("a", &encode_las(vec![point(1.0, 1.0, 1.0)])).unwrap();
        let b = PointCloud::decode("b", &encode_las(vec![point(2.0, 2.0, 2.0)])).unwrap();
        let merged = PointCloud::merge(vec![a, b]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merge_of_no_clouds_is_empty_not_error() {
        let merged = PointCloud::merge(vec![]);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_encode_decode_round_trip_preserves_point_count() {
        let bytes = encode_las(vec![point(1.0, 2.0, 3.0), point(4.0, 5.0, 6.0)]);
        let cloud = PointCloud::decode("k", &bytes).unwrap();
        let reencoded = cloud.encode(false).unwrap();
        let roundtrip = PointCloud::decode("k2", &reencoded).unwrap();
        assert_eq!(roundtrip.len(), 2);
    }
}
