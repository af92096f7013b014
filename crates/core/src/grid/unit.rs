//! Basic position types for the half-tile grid. See the parent module
//! documentation for a description of the coordinate system.

use anyhow::anyhow;
use derive_more::{Add, AddAssign, Display, Mul, Neg, Sub};
use fnv::FnvBuildHasher;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A point on the half-tile grid. Tile centers, side midpoints and corners are
/// all [GridPoint]s.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    Serialize,
    Deserialize,
)]
#[display(fmt = "({}, {}, {})", x, y, z)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridPoint {
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    /// Construct a point from half-tile components
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Construct a point from unit (whole tile) coordinates. Every component
    /// must be a multiple of one half, otherwise the point is off the grid
    /// and this returns an error.
    pub fn from_units(x: f64, y: f64, z: f64) -> anyhow::Result<Self> {
        fn to_halves(component: f64) -> anyhow::Result<i32> {
            let doubled = component * 2.0;
            if doubled.is_finite()
                && doubled.fract() == 0.0
                && doubled.abs() <= i32::MAX as f64
            {
                Ok(doubled as i32)
            } else {
                Err(anyhow!(
                    "coordinate {} is not a multiple of one half",
                    component
                ))
            }
        }

        Ok(Self::new(to_halves(x)?, to_halves(y)?, to_halves(z)?))
    }

    /// Convert to unit coordinates, e.g. for rendering
    pub fn to_units(self) -> Vector3<f32> {
        Vector3::new(self.x as f32, self.y as f32, self.z as f32) / 2.0
    }

    /// The parity of each component: `true` for odd. Used to tell which plane
    /// family a tile center belongs to.
    pub fn parity(self) -> (bool, bool, bool) {
        (self.x % 2 != 0, self.y % 2 != 0, self.z % 2 != 0)
    }

    pub fn translate(self, vector: GridVector) -> Self {
        Self::new(self.x + vector.x, self.y + vector.y, self.z + vector.z)
    }

    /// Vector pointing from `other` to this point
    pub fn offset_from(self, other: Self) -> GridVector {
        GridVector::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

/// A translation on the half-tile grid. Tile frame vectors are unit vectors
/// here, i.e. they move half a tile: from a tile center to one of its side
/// midpoints.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    Add,
    AddAssign,
    Sub,
    Neg,
    Mul,
    Serialize,
    Deserialize,
)]
#[display(fmt = "<{}, {}, {}>", x, y, z)]
pub struct GridVector {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridVector {
    pub const ZERO: Self = Self::new(0, 0, 0);
    pub const X: Self = Self::new(1, 0, 0);
    pub const Y: Self = Self::new(0, 1, 0);
    pub const Z: Self = Self::new(0, 0, 1);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn negate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }

    pub const fn plus(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn to_f32(self) -> Vector3<f32> {
        Vector3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

/// A set of grid points
pub type GridPointSet = HashSet<GridPoint, FnvBuildHasher>;
/// A map of grid points to some `T`
pub type GridPointMap<T> = HashMap<GridPoint, T, FnvBuildHasher>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_units() {
        assert_eq!(
            GridPoint::from_units(0.0, 0.0, 0.0).unwrap(),
            GridPoint::ORIGIN
        );
        assert_eq!(
            GridPoint::from_units(1.0, -0.5, 0.5).unwrap(),
            GridPoint::new(2, -1, 1)
        );
        assert!(GridPoint::from_units(0.25, 0.0, 0.0).is_err());
        assert!(GridPoint::from_units(f64::NAN, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_to_units() {
        let units = GridPoint::new(3, -2, 0).to_units();
        assert_eq!(units, Vector3::new(1.5, -1.0, 0.0));
    }

    #[test]
    fn test_translate_offset() {
        let point = GridPoint::new(2, 0, 0);
        let moved = point.translate(GridVector::X + GridVector::Y);
        assert_eq!(moved, GridPoint::new(3, 1, 0));
        assert_eq!(moved.offset_from(point), GridVector::new(1, 1, 0));
    }

    #[test]
    fn test_parity() {
        assert_eq!(GridPoint::new(-1, 2, 3).parity(), (true, false, true));
        assert_eq!(GridPoint::ORIGIN.parity(), (false, false, false));
    }
}
