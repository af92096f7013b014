//! Perspective is a tile puzzle world where flat square tiles fold into 3D
//! surfaces. This crate contains the core topology: the graph that connects
//! tiles across edges and corners, along with the direction algebra that
//! keeps "which way is forward" consistent as you walk across folds.
//! Presentation layers (rendering, input) are implemented elsewhere and only
//! consume the GPU transfer buffers built here.
//!
//! ```
//! use perspective::{
//!     GridPoint, LocalDirection, NetworkConfig, SuperTileType,
//!     TileNodeNetwork,
//! };
//!
//! let mut network = TileNodeNetwork::new(NetworkConfig::default()).unwrap();
//! let floor = network
//!     .create_tile_pair(GridPoint::ORIGIN, SuperTileType::Xy)
//!     .unwrap();
//! // A wall rising from the +x edge of the floor
//! let wall = network
//!     .create_tile_pair(GridPoint::new(1, 0, 1), SuperTileType::Yz)
//!     .unwrap();
//!
//! let link = network
//!     .tile(floor)
//!     .unwrap()
//!     .neighbor(LocalDirection::D0)
//!     .unwrap();
//! assert_ne!(link.tile, floor);
//! network.check_consistency().unwrap();
//! # let _ = wall;
//! ```
//!
//! See [TileNodeNetwork] for how the graph is built and maintained, and
//! [tnav] for the direction algebra.

mod config;
pub mod entity;
mod force;
mod gpu;
mod grid;
mod network;
mod scenario;
mod tile;
pub mod tnav;
mod util;

pub use crate::{
    config::NetworkConfig,
    entity::{
        Entity, EntityInfo, EntityKind, EntityList, EntityOccupancy, InfoSlot,
        LocalPosition,
    },
    force::{ForceIndex, ForceList},
    gpu::{Color3, EntityGpuInfo, GpuTile, GpuTileNodeInfo, GPU_NONE},
    grid::{
        tile_visibility, ConnectionPriority, GridPoint, GridPointMap,
        GridPointSet, GridVector, SuperTileType, TileType,
    },
    network::{
        CenterNode, ComponentPair, CornerMember, CornerNode,
        DegenerateCornerNode, NetworkSnapshot, NodeId, NodeKind, NodeLink,
        NodeNeighbors, SideNode, TileNode, TileNodeNetwork,
    },
    scenario::{Scenario, ScenarioOutput, ScenarioStep},
    tile::{Tile, TileId, TileLink},
    tnav::{LocalDirection, MapType},
    util::arena::ArenaHandle,
};
