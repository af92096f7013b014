use crate::{
    arena_handle,
    gpu::Color3,
    grid::{GridPoint, TileType},
    network::NodeId,
    tnav::{LocalDirection, MapType},
};
use serde::{Deserialize, Serialize};

arena_handle!(
    /// Handle to a [Tile] in a [TileNodeNetwork](crate::TileNodeNetwork)
    TileId
);

/// A cached link from a tile to the tile across one of its edges
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileLink {
    pub tile: TileId,
    /// Converts directions in this tile's frame into the neighbor's frame
    pub map: MapType,
}

/// The renderable unit: one oriented square on the grid. Tiles always exist
/// in front/back pairs on the same square, created and destroyed together by
/// the network.
///
/// Connectivity lives in the node graph. The tile keeps a flattened copy of
/// its 4 edge neighbors, refreshed by the network whenever the graph around
/// the tile changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    tile_type: TileType,
    position: GridPoint,
    center: NodeId,
    sibling: TileId,
    color: Color3,
    neighbors: [Option<TileLink>; 4],
}

impl Tile {
    pub(crate) fn new(
        tile_type: TileType,
        position: GridPoint,
        center: NodeId,
        sibling: TileId,
        color: Color3,
    ) -> Self {
        Self {
            tile_type,
            position,
            center,
            sibling,
            color,
            neighbors: [None; 4],
        }
    }

    pub fn tile_type(&self) -> TileType {
        self.tile_type
    }

    /// Center of the tile, in half-tile units
    pub fn position(&self) -> GridPoint {
        self.position
    }

    /// The center node that represents this tile in the node graph
    pub fn center(&self) -> NodeId {
        self.center
    }

    /// The tile on the same square, facing the other way
    pub fn sibling(&self) -> TileId {
        self.sibling
    }

    pub fn color(&self) -> Color3 {
        self.color
    }

    pub fn set_color(&mut self, color: Color3) {
        self.color = color;
    }

    /// Cached neighbor across each orthogonal edge, in direction order
    pub fn neighbors(&self) -> &[Option<TileLink>; 4] {
        &self.neighbors
    }

    /// Cached neighbor across one edge. `None` for non-orthogonal directions.
    pub fn neighbor(&self, dir: LocalDirection) -> Option<TileLink> {
        if dir.is_orthogonal() {
            self.neighbors[dir.index()]
        } else {
            None
        }
    }

    pub(crate) fn set_neighbors(&mut self, neighbors: [Option<TileLink>; 4]) {
        self.neighbors = neighbors;
    }
}
