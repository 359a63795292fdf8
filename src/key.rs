//! Octree node identity and the `bisect` child-derivation algorithm.

use std::fmt;
use std::str::FromStr;

use crate::bbox::BoundingBox3D;
use crate::error::EptError;

/// An octree node identity `(d, x, y, z)` paired with the bounding box of
/// the cube it addresses.
///
/// The string form `"d-x-y-z"` is the canonical hierarchy-map key and is
/// produced by [`Key`]'s `Display` impl.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Key {
    d: u32,
    x: u32,
    y: u32,
    z: u32,
    bounds: BoundingBox3D,
}

impl Key {
    /// The root key `(0,0,0,0)` covering the dataset's full bounds.
    #[must_use]
    pub fn root(bounds: BoundingBox3D) -> Self {
        Self {
            d: 0,
            x: 0,
            y: 0,
            z: 0,
            bounds,
        }
    }

    #[must_use]
    pub fn d(&self) -> u32 {
        self.d
    }

    #[must_use]
    pub fn x(&self) -> u32 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> u32 {
        self.y
    }

    #[must_use]
    pub fn z(&self) -> u32 {
        self.z
    }

    #[must_use]
    pub fn bounds(&self) -> BoundingBox3D {
        self.bounds
    }

    /// Derives one of the 8 children of this node.
    ///
    /// `direction`'s bit `i` selects the positive half on axis `i` (bit 0 =
    /// `+x`, bit 1 = `+y`, bit 2 = `+z`). Only the low 3 bits are
    /// considered.
    #[must_use]
    pub fn bisect(&self, direction: u8) -> Self {
        let bit_x = direction & 0b001 != 0;
        let bit_y = direction & 0b010 != 0;
        let bit_z = direction & 0b100 != 0;

        let mid_x = (self.bounds.xmin + self.bounds.xmax) / 2.0;
        let mid_y = (self.bounds.ymin + self.bounds.ymax) / 2.0;
        let mid_z = (self.bounds.zmin + self.bounds.zmax) / 2.0;

        let (xmin, xmax) = if bit_x {
            (mid_x, self.bounds.xmax)
        } else {
            (self.bounds.xmin, mid_x)
        };
        let (ymin, ymax) = if bit_y {
            (mid_y, self.bounds.ymax)
        } else {
            (self.bounds.ymin, mid_y)
        };
        let (zmin, zmax) = if bit_z {
            (mid_z, self.bounds.zmax)
        } else {
            (self.bounds.zmin, mid_z)
        };

        Self {
            d: self.d + 1,
            x: 2 * self.x + u32::from(bit_x),
            y: 2 * self.y + u32::from(bit_y),
            z: 2 * self.z + u32::from(bit_z),
            // `from_corners` cannot fail here: each child interval is a
            // proper half of a valid parent interval.
            bounds: BoundingBox3D::from_corners(xmin, ymin, zmin, xmax, ymax, zmax)
                .expect("bisected bounds are always valid"),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}-{}", self.d, self.x, self.y, self.z)
    }
}

/// Parses a bare `"d-x-y-z"` string into `(d, x, y, z)`, without a bounding
/// box (the box is only recoverable by walking from the dataset root via
/// `bisect`, so this is primarily for hierarchy-map key comparisons).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyId {
    pub d: u32,
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}-{}", self.d, self.x, self.y, self.z)
    }
}

impl FromStr for KeyId {
    type Err = EptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('-');
        let mut next = |part: Option<&str>| -> Result<u32, EptError> {
            part.and_then(|p| p.parse::<u32>().ok())
                .ok_or_else(|| EptError::MalformedHierarchy(s.to_string()))
        };
        let d = next(parts.next())?;
        let x = next(parts.next())?;
        let y = next(parts.next())?;
        let z = next(parts.next())?;
        if parts.next().is_some() {
            return Err(EptError::MalformedHierarchy(s.to_string()));
        }
        Ok(Self { d, x, y, z })
    }
}

impl From<&Key> for KeyId {
    fn from(key: &Key) -> Self {
        Self {
            d: key.d,
            x: key.x,
            y: key.y,
            z: key.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Key {
        Key::root(BoundingBox3D::from_corners(0.0, 0.0, 0.0, 8.0, 8.0, 8.0).unwrap())
    }

    #[test]
    fn test_display_form() {
        let k = root();
        assert_eq!(k.to_string(), "0-0-0-0");
        assert_eq!(k.bisect(7).to_string(), "1-1-1-1");
    }

    #[test]
    fn test_keyid_roundtrip() {
        let id: KeyId = "3-2-1-0".parse().unwrap();
        assert_eq!(id.to_string(), "3-2-1-0");
    }

    #[test]
    fn test_bisect_child_is_contained_and_half_size() {
        let k = root();
        for dir in 0u8..8 {
            let child = k.bisect(dir);
            assert!(k.bounds().contains(&child.bounds()));
            assert!((child.bounds().width() - k.bounds().width() / 2.0).abs() < 1e-6);
            assert!((child.bounds().height() - k.bounds().height() / 2.0).abs() < 1e-6);
            assert!((child.bounds().depth() - k.bounds().depth() / 2.0).abs() < 1e-6);
            assert_eq!(child.d(), k.d() + 1);
        }
    }

    #[test]
    fn test_children_are_pairwise_disjoint_and_tile_parent() {
        let k = root();
        let children: Vec<_> = (0u8..8).map(|d| k.bisect(d)).collect();
        for i in 0..children.len() {
            for j in (i + 1)..children.len() {
                let a = children[i].bounds();
                let b = children[j].bounds();
                // Interior-disjoint: any intersection is degenerate (zero volume).
                if let Some(overlap) = a.intersection(&b) {
                    assert!(overlap.is_null());
                }
            }
        }
        let total_volume: f64 = children
            .iter()
            .map(|c| c.bounds().width() * c.bounds().height() * c.bounds().depth())
            .sum();
        let parent_volume = k.bounds().width() * k.bounds().height() * k.bounds().depth();
        assert!((total_volume - parent_volume).abs() < 1e-6);
    }
}
