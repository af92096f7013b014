//! Plain data structs for uploading network state to a GPU buffer. These are
//! `#[repr(C)]` with explicit padding so each one is a valid `std430` struct
//! and can be cast to bytes with [bytemuck]. Handles are flattened to their
//! slot index, with [GPU_NONE] standing in for a missing link.

use crate::{
    entity::{Entity, EntityInfo, InfoSlot},
    network::{NodeNeighbors, TileNodeNetwork},
    tile::Tile,
    util::arena::ArenaHandle,
};
use serde::{Deserialize, Serialize};

/// Stand-in for a missing index
pub const GPU_NONE: u32 = u32::MAX;

/// An RGB color. Values are stored as floats between 0 and 1 (inclusive).
/// This uses f32 because the extra precision from f64 is pointless.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color3 {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Color3 {
    pub const WHITE: Self = Self {
        red: 1.0,
        green: 1.0,
        blue: 1.0,
    };

    /// Create a new RGB color with components in the range [0.0, 1.0]. Panic
    /// if any of the components are out of range
    pub fn new(red: f32, green: f32, blue: f32) -> Self {
        fn check_component(component_name: &str, value: f32) -> f32 {
            if (0.0..=1.0).contains(&value) {
                value
            } else {
                panic!(
                    "Color component {} must be in [0, 1], but was {}",
                    component_name, value
                )
            }
        }

        Self {
            red: check_component("red", red),
            green: check_component("green", green),
            blue: check_component("blue", blue),
        }
    }

    /// Create a new RGB color from integer components in the [0,255] range.
    pub fn new_int(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
        }
    }

    /// Convert this number to a set of 3 bytes: `(red, green, blue)`
    pub fn to_ints(self) -> (u8, u8, u8) {
        (
            (self.red * 255.0).round() as u8,
            (self.green * 255.0).round() as u8,
            (self.blue * 255.0).round() as u8,
        )
    }

    /// Convert this color to an HTML color code: `#rrggbb`
    pub fn to_html(self) -> String {
        let (r, g, b) = self.to_ints();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// RGBA with full opacity, the layout shaders expect
    pub fn to_rgba(self) -> [f32; 4] {
        [self.red, self.green, self.blue, 1.0]
    }
}

impl Default for Color3 {
    fn default() -> Self {
        Self::WHITE
    }
}

/// One tile, with its flattened neighbor cache
#[repr(C)]
#[derive(
    Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable, Serialize,
)]
pub struct GpuTile {
    pub color: [f32; 4],
    /// Center in tile units, `w` is always 1
    pub position: [f32; 4],
    /// `w` is always 0
    pub normal: [f32; 4],
    pub neighbors: [u32; 4],
    pub neighbor_maps: [u32; 4],
    pub tile_type: u32,
    pub center_node: u32,
    pub sibling: u32,
    pub _padding: u32,
}

impl GpuTile {
    pub fn new(tile: &Tile) -> Self {
        let position = tile.position().to_units();
        let normal = tile.tile_type().normal_f32();
        let mut neighbors = [GPU_NONE; 4];
        let mut neighbor_maps = [GPU_NONE; 4];
        for (i, link) in tile.neighbors().iter().enumerate() {
            if let Some(link) = link {
                neighbors[i] = link.tile.slot();
                neighbor_maps[i] = link.map.index() as u32;
            }
        }

        Self {
            color: tile.color().to_rgba(),
            position: [position.x, position.y, position.z, 1.0],
            normal: [normal.x, normal.y, normal.z, 0.0],
            neighbors,
            neighbor_maps,
            tile_type: tile.tile_type() as u32,
            center_node: tile.center().slot(),
            sibling: tile.sibling().slot(),
            _padding: 0,
        }
    }
}

/// The node graph as seen from one tile's center node
#[repr(C)]
#[derive(
    Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable, Serialize,
)]
pub struct GpuTileNodeInfo {
    pub center_node: u32,
    pub tile: u32,
    /// Index of the [LocalDirection](crate::LocalDirection) held in the
    /// node's force block, or [GPU_NONE] if the flags don't form a direction
    pub force: u32,
    pub _padding: u32,
    pub neighbors: [u32; 8],
    pub neighbor_maps: [u32; 8],
    /// See [NodeKind](crate::NodeKind), by discriminant
    pub neighbor_kinds: [u32; 8],
}

impl GpuTileNodeInfo {
    /// Build the info for a tile's center node. Returns `None` if the tile's
    /// center node is missing.
    pub fn new(network: &TileNodeNetwork, tile: &Tile) -> Option<Self> {
        let center = network.node(tile.center())?.as_center()?;
        let mut neighbors = [GPU_NONE; 8];
        let mut neighbor_maps = [GPU_NONE; 8];
        let mut neighbor_kinds = [GPU_NONE; 8];
        for (i, link) in center.links().iter().enumerate() {
            if let Some(link) = link {
                neighbors[i] = link.node.slot();
                neighbor_maps[i] = link.map.index() as u32;
                neighbor_kinds[i] = network
                    .node(link.node)
                    .map_or(GPU_NONE, |node| node.kind() as u32);
            }
        }

        Some(Self {
            center_node: tile.center().slot(),
            tile: center.tile().slot(),
            force: network
                .forces()
                .get_force(center.force())
                .map_or(GPU_NONE, |dir| dir.index() as u32),
            _padding: 0,
            neighbors,
            neighbor_maps,
            neighbor_kinds,
        })
    }
}

/// One entity, with both of its info slots. The leaving slot is filled with
/// [GPU_NONE] unless the entity is crossing an edge.
#[repr(C)]
#[derive(
    Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable, Serialize,
)]
pub struct EntityGpuInfo {
    pub color: [f32; 4],
    pub tiles: [u32; 2],
    pub positions: [u32; 2],
    pub directions: [u32; 2],
    pub orientations: [u32; 2],
    pub kind: u32,
    pub _padding: [u32; 3],
}

impl EntityGpuInfo {
    pub fn new(entity: &Entity) -> Self {
        let mut info = Self {
            color: entity.color().to_rgba(),
            tiles: [GPU_NONE; 2],
            positions: [GPU_NONE; 2],
            directions: [GPU_NONE; 2],
            orientations: [GPU_NONE; 2],
            kind: entity.kind() as u32,
            _padding: [0; 3],
        };
        for slot in [InfoSlot::Arriving, InfoSlot::Leaving] {
            if let Some(EntityInfo {
                tile,
                position,
                direction,
                orientation,
            }) = entity.info(slot)
            {
                let i = slot as usize;
                info.tiles[i] = tile.slot();
                info.positions[i] = position.index() as u32;
                info.directions[i] = direction.index() as u32;
                info.orientations[i] = orientation.index() as u32;
            }
        }
        info
    }
}
