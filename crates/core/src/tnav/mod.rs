//! Tile navigation: the direction algebra every other module is built on.
//!
//! Each tile has its own frame, so "up" on one tile may be "left" on its
//! neighbor. A [LocalDirection] names one of 8 directions in a single tile's
//! frame, and a [MapType] converts directions from one frame into another.
//! Everything here is a table lookup over small closed enums, with no state.
//!
//! Conversions between tile types (front/back, super types) live on
//! [TileType](crate::TileType) and [SuperTileType](crate::SuperTileType).

mod direction;
mod map_type;

pub use self::{direction::LocalDirection, map_type::MapType};

/// Translate a direction through a chain of maps, applied in order
pub fn map_through(
    dir: LocalDirection,
    maps: impl IntoIterator<Item = MapType>,
) -> LocalDirection {
    maps.into_iter().fold(dir, |dir, map| map.map(dir))
}
