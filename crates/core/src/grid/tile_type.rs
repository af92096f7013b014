use crate::{
    gpu::Color3,
    grid::{GridPoint, GridVector},
    tnav::{LocalDirection, MapType},
};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The plane family a tile lies in, ignoring which way it faces. Every tile
/// pair has exactly one super type.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SuperTileType {
    Xy,
    Xz,
    Yz,
}

impl SuperTileType {
    pub fn front(self) -> TileType {
        match self {
            Self::Xy => TileType::XyFront,
            Self::Xz => TileType::XzFront,
            Self::Yz => TileType::YzFront,
        }
    }

    pub fn back(self) -> TileType {
        self.front().sibling()
    }

    /// Get the super type whose tiles can be centered at this position, or
    /// `None` if the position isn't a tile center at all. See the module docs
    /// for the lattice rules.
    pub fn from_position(position: GridPoint) -> Option<Self> {
        match position.parity() {
            (false, false, false) => Some(Self::Xy),
            (false, true, true) => Some(Self::Xz),
            (true, false, true) => Some(Self::Yz),
            _ => None,
        }
    }

    /// Can a tile of this type sit centered at the given position?
    pub fn accepts(self, position: GridPoint) -> bool {
        Self::from_position(position) == Some(self)
    }

    /// Offsets from a tile center to the 8 nodes around it, in the front
    /// tile's frame: the 4 side nodes in orthogonal direction order, then the
    /// 4 corners in diagonal direction order.
    pub fn node_position_offsets(self) -> [GridVector; 8] {
        let front = self.front();
        let dirs = LocalDirection::ORTHOGONALS
            .into_iter()
            .chain(LocalDirection::DIAGONALS);
        let mut offsets = [GridVector::ZERO; 8];
        for (offset, dir) in offsets.iter_mut().zip(dirs) {
            *offset = front.direction_vector(dir);
        }
        offsets
    }
}

/// One of the 6 oriented tile types. See the module docs for the frame of
/// each type.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TileType {
    XyFront,
    XyBack,
    XzFront,
    XzBack,
    YzFront,
    YzBack,
}

impl TileType {
    pub fn new(super_type: SuperTileType, front: bool) -> Self {
        if front {
            super_type.front()
        } else {
            super_type.back()
        }
    }

    pub fn super_type(self) -> SuperTileType {
        match self {
            Self::XyFront | Self::XyBack => SuperTileType::Xy,
            Self::XzFront | Self::XzBack => SuperTileType::Xz,
            Self::YzFront | Self::YzBack => SuperTileType::Yz,
        }
    }

    pub fn is_front(self) -> bool {
        matches!(self, Self::XyFront | Self::XzFront | Self::YzFront)
    }

    /// The type of this tile's sibling: same plane, facing the other way
    pub fn sibling(self) -> Self {
        match self {
            Self::XyFront => Self::XyBack,
            Self::XyBack => Self::XyFront,
            Self::XzFront => Self::XzBack,
            Self::XzBack => Self::XzFront,
            Self::YzFront => Self::YzBack,
            Self::YzBack => Self::YzFront,
        }
    }

    /// The local frame `(u, v, normal)` of this type, as grid unit vectors
    pub fn frame(self) -> (GridVector, GridVector, GridVector) {
        let (x, y, z) = (GridVector::X, GridVector::Y, GridVector::Z);
        match self {
            Self::XyFront => (x, y, z),
            Self::XyBack => (y, x, z.negate()),
            Self::XzFront => (z, x, y),
            Self::XzBack => (x, z, y.negate()),
            Self::YzFront => (y, z, x),
            Self::YzBack => (z, y, x.negate()),
        }
    }

    /// The direction this tile faces
    pub fn normal(self) -> GridVector {
        self.frame().2
    }

    /// Get the tile type that faces along the given normal. `None` if the
    /// vector isn't an axis unit vector.
    pub fn from_normal(normal: GridVector) -> Option<Self> {
        match (normal.x, normal.y, normal.z) {
            (0, 0, 1) => Some(Self::XyFront),
            (0, 0, -1) => Some(Self::XyBack),
            (0, 1, 0) => Some(Self::XzFront),
            (0, -1, 0) => Some(Self::XzBack),
            (1, 0, 0) => Some(Self::YzFront),
            (-1, 0, 0) => Some(Self::YzBack),
            _ => None,
        }
    }

    /// Grid offset from this tile's center to the node in the given local
    /// direction: a side midpoint for orthogonals, a corner for diagonals,
    /// zero for [LocalDirection::Static].
    pub fn direction_vector(self, dir: LocalDirection) -> GridVector {
        let (u, v, _) = self.frame();
        let orthogonal = |dir: LocalDirection| match dir {
            LocalDirection::D0 => u,
            LocalDirection::D1 => v,
            LocalDirection::D2 => u.negate(),
            LocalDirection::D3 => v.negate(),
            _ => GridVector::ZERO,
        };
        let (first, second) = dir.components();
        if dir.is_diagonal() {
            orthogonal(first).plus(orthogonal(second))
        } else {
            orthogonal(first)
        }
    }

    /// Convert a direction in this tile's frame to the equivalent direction in
    /// the sibling's frame. Siblings share the same square, so they agree on
    /// the world-space vector but not the local index.
    pub fn sibling_direction(self, dir: LocalDirection) -> LocalDirection {
        // Front and back frames have u and v swapped, i.e. they're mirrored
        // across the 0_1 diagonal
        MapType::FlipAcross01.map(dir)
    }

    /// Vector (in tile units) from this tile's center to the center of the
    /// coplanar neighbor in the given direction
    pub fn center_to_neighbor_vec(self, dir: LocalDirection) -> Vector3<f32> {
        self.direction_vector(dir).to_f32()
    }

    /// Unit normal as a float vector, for rendering
    pub fn normal_f32(self) -> Vector3<f32> {
        self.normal().to_f32()
    }

    /// Offsets (in tile units) from the center to the 4 corners, in diagonal
    /// direction order, i.e. counter-clockwise when viewed from the front
    pub fn vertex_positions(self) -> [Vector3<f32>; 4] {
        let mut vertices = [Vector3::zeros(); 4];
        for (vertex, dir) in vertices.iter_mut().zip(LocalDirection::DIAGONALS)
        {
            *vertex = self.direction_vector(dir).to_f32() / 2.0;
        }
        vertices
    }

    /// Deterministic color for debug rendering, keyed by type
    pub fn debug_color(self) -> Color3 {
        match self {
            Self::XyFront => Color3::new_int(230, 80, 80),
            Self::XyBack => Color3::new_int(120, 40, 40),
            Self::XzFront => Color3::new_int(80, 200, 90),
            Self::XzBack => Color3::new_int(40, 100, 45),
            Self::YzFront => Color3::new_int(80, 120, 230),
            Self::YzBack => Color3::new_int(40, 60, 120),
        }
    }

    /// How this tile relates to another tile hanging off its `side` edge,
    /// judged by tile types alone (the other tile is assumed to share that
    /// edge). See [ConnectionPriority].
    pub fn relation(
        self,
        side: LocalDirection,
        other: Self,
    ) -> ConnectionPriority {
        let side_vec = self.direction_vector(side);
        let normal = self.normal();
        let other_normal = other.normal();
        if !side.is_orthogonal() {
            ConnectionPriority::Impossible
        } else if other_normal == side_vec.negate() {
            ConnectionPriority::Inner
        } else if other_normal == normal {
            ConnectionPriority::Flat
        } else if other_normal == side_vec {
            ConnectionPriority::Outer
        } else if other_normal == normal.negate() {
            ConnectionPriority::Sibling
        } else {
            ConnectionPriority::Impossible
        }
    }

    /// Like [Self::relation], but also checks that the other tile actually
    /// sits where that relation requires. This is what decides which tile
    /// gets wired to a shared edge.
    pub fn connection_priority(
        self,
        position: GridPoint,
        side: LocalDirection,
        other: Self,
        other_position: GridPoint,
    ) -> ConnectionPriority {
        let side_vec = self.direction_vector(side);
        let edge = position.translate(side_vec);
        let edge_to_other = other_position.offset_from(edge);
        let normal = self.normal();
        match self.relation(side, other) {
            ConnectionPriority::Inner if edge_to_other == normal => {
                ConnectionPriority::Inner
            }
            ConnectionPriority::Flat if edge_to_other == side_vec => {
                ConnectionPriority::Flat
            }
            ConnectionPriority::Outer if edge_to_other == normal.negate() => {
                ConnectionPriority::Outer
            }
            ConnectionPriority::Sibling if other_position == position => {
                ConnectionPriority::Sibling
            }
            _ => ConnectionPriority::Impossible,
        }
    }
}

/// Ranking of the candidate tiles that can take one edge of a tile. Lower is
/// better: a tile always connects to the tile that wraps around it most
/// tightly. Picture walking off the edge of a tile: an inner corner (a wall
/// rising in front of you) wins over continuing flat, which wins over an
/// outer corner (the ground dropping away), which wins over wrapping around
/// to your own sibling.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionPriority {
    Inner,
    Flat,
    Outer,
    Sibling,
    Impossible,
}

impl ConnectionPriority {
    /// The inverse ranking on a 0-4 scale, where higher is better and 0 is
    /// impossible
    pub fn visibility(self) -> u8 {
        match self {
            Self::Inner => 4,
            Self::Flat => 3,
            Self::Outer => 2,
            Self::Sibling => 1,
            Self::Impossible => 0,
        }
    }
}

/// Which of several candidate tiles should win the connection on one side of
/// `subject`: 4 for an inner corner, 3 flat, 2 outer corner, 1 sibling wrap,
/// 0 impossible.
pub fn tile_visibility(
    subject: TileType,
    side: LocalDirection,
    other: TileType,
) -> u8 {
    subject.relation(side, other).visibility()
}
