//! This module holds the 3D embedding of the tile world: integer positions
//! and the six oriented tile types.
//!
//! ## Coordinate System
//!
//! Every tile is a unit square lying in one of the three axis planes (XY, XZ
//! or YZ). Tiles always come in pairs: a front tile and a back tile occupying
//! the same square, facing opposite ways. The graph that connects tiles needs
//! positions for three kinds of points:
//!
//! - Tile centers
//! - Side midpoints, where two tiles share an edge
//! - Corners, where tile quadrants meet
//!
//! Those points sit on a half-tile grid, so all positions are stored as
//! integers in **half-tile units**. A tile at unit position `(1, 0, 0)` has a
//! [GridPoint] of `(2, 0, 0)`, its `+x` side midpoint is at `(3, 0, 0)`, and
//! so on. This keeps every position exact and hashable.
//!
//! ### The Tile Lattice
//!
//! Tiles can't sit just anywhere. The lattice is chosen so that tiles of all
//! three plane families share edges and corners:
//!
//! | Super type | Center (half units)  |
//! | ---------- | -------------------- |
//! | XY         | (even, even, even)   |
//! | XZ         | (even, odd, odd)     |
//! | YZ         | (odd, even, odd)     |
//!
//! E.g. the XY tile at `(0, 0, 0)` and the YZ tile at `(1, 0, 1)` meet along
//! the edge whose midpoint is `(1, 0, 0)`, forming an inner corner.
//!
//! ### Local Frames
//!
//! Each oriented [TileType] has a local frame `(u, v, normal)` with
//! `u × v = normal`. Local direction 0 is `+u`, 1 is `+v`, 2 is `-u` and 3 is
//! `-v`, so the four directions run counter-clockwise when viewed from the
//! side the normal points to. Front and back tiles of a pair swap `u` and `v`,
//! which flips the normal while keeping that counter-clockwise rule. Because
//! every frame follows the same rule, every remap between neighboring tiles is
//! a rotation.

mod tile_type;
mod unit;

pub use self::{tile_type::*, unit::*};
