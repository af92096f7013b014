//! Entities are the movable occupants of the tile surface. An entity sits
//! either at a tile's center or on one of its edges. While on an edge it
//! straddles two tiles, so it carries two infos: the arriving info in the
//! tile it's moving into, and the leaving info in the tile it came from.

pub mod navigation;

use crate::{
    gpu::{Color3, EntityGpuInfo},
    network::TileNodeNetwork,
    tile::TileId,
    tnav::LocalDirection,
};
use fnv::FnvBuildHasher;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumIter, EnumString};

/// A spot inside a tile: the center, the middle of an edge, or a corner.
/// Entities only ever stand on centers and edges, but queries can start from
/// or pass through corners.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LocalPosition {
    Edge0 = 0,
    Edge1 = 1,
    Edge2 = 2,
    Edge3 = 3,
    Center = 4,
    Corner01 = 5,
    Corner12 = 6,
    Corner23 = 7,
    Corner30 = 8,
}

impl LocalPosition {
    const EDGES: [Self; 4] =
        [Self::Edge0, Self::Edge1, Self::Edge2, Self::Edge3];
    const CORNERS: [Self; 4] =
        [Self::Corner01, Self::Corner12, Self::Corner23, Self::Corner30];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The spot in a direction from the center: an edge for an orthogonal, a
    /// corner for a diagonal and the center itself for `Static`
    pub fn from_direction(dir: LocalDirection) -> Option<Self> {
        if dir.is_orthogonal() {
            Some(Self::EDGES[dir.index()])
        } else if dir.is_diagonal() {
            Some(Self::CORNERS[dir.index() % 4])
        } else if dir == LocalDirection::Static {
            Some(Self::Center)
        } else {
            None
        }
    }

    /// Direction from the tile center to this position. `Static` for the
    /// center itself.
    pub fn direction(self) -> LocalDirection {
        match self {
            Self::Center => LocalDirection::Static,
            corner if corner.is_corner() => LocalDirection::diagonal(
                corner.index() - Self::Corner01.index(),
            ),
            edge => LocalDirection::orthogonal(edge.index()),
        }
    }

    pub fn is_center(self) -> bool {
        self == Self::Center
    }

    pub fn is_edge(self) -> bool {
        self.index() < Self::Center.index()
    }

    pub fn is_corner(self) -> bool {
        self.index() > Self::Center.index()
    }
}

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
pub enum EntityKind {
    Player,
    Block,
    Wall,
}

impl EntityKind {
    pub fn default_color(self) -> Color3 {
        match self {
            Self::Player => Color3::new_int(250, 210, 60),
            Self::Block => Color3::new_int(170, 110, 60),
            Self::Wall => Color3::new_int(90, 90, 90),
        }
    }
}

/// An entity's placement within a single tile, in that tile's frame
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityInfo {
    pub tile: TileId,
    pub position: LocalPosition,
    /// The way the entity is moving (`Static` if it isn't)
    pub direction: LocalDirection,
    /// The way the entity is facing
    pub orientation: LocalDirection,
}

/// Which of an entity's two infos
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InfoSlot {
    Arriving = 0,
    Leaving = 1,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    kind: EntityKind,
    color: Color3,
    arriving: EntityInfo,
    /// Only set while the entity is on an edge
    leaving: Option<EntityInfo>,
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn color(&self) -> Color3 {
        self.color
    }

    pub fn set_color(&mut self, color: Color3) {
        self.color = color;
    }

    pub fn arriving(&self) -> EntityInfo {
        self.arriving
    }

    pub fn leaving(&self) -> Option<EntityInfo> {
        self.leaving
    }

    pub fn info(&self, slot: InfoSlot) -> Option<EntityInfo> {
        match slot {
            InfoSlot::Arriving => Some(self.arriving),
            InfoSlot::Leaving => self.leaving,
        }
    }

    /// Every tile this entity touches
    pub fn tiles(&self) -> impl Iterator<Item = TileId> {
        std::iter::once(self.arriving.tile)
            .chain(self.leaving.map(|info| info.tile))
    }

    pub(crate) fn set_infos(
        &mut self,
        arriving: EntityInfo,
        leaving: Option<EntityInfo>,
    ) {
        self.arriving = arriving;
        self.leaving = leaving;
    }
}

/// All entities, densely packed. Removal swaps the last entity into the
/// freed index, so indices are only stable until the next removal.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EntityList {
    entities: Vec<Entity>,
}

impl EntityList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an entity at the center of a tile. Entities can only spawn at
    /// a center, so that two new entities never contend for the same edge.
    /// Returns `None` if the tile doesn't exist.
    pub fn create(
        &mut self,
        network: &TileNodeNetwork,
        kind: EntityKind,
        tile: TileId,
        direction: LocalDirection,
        orientation: LocalDirection,
    ) -> Option<usize> {
        if network.tile(tile).is_none() {
            warn!("Cannot create {} entity on dead tile {}", kind, tile);
            return None;
        }
        let index = self.entities.len();
        self.entities.push(Entity {
            kind,
            color: kind.default_color(),
            arriving: EntityInfo {
                tile,
                position: LocalPosition::Center,
                direction,
                orientation,
            },
            leaving: None,
        });
        debug!("Created {} entity {} on tile {}", kind, index, tile);
        Some(index)
    }

    /// Remove an entity by swapping the last one into its place. Returns the
    /// old index of the entity that moved, if one did.
    pub fn remove(&mut self, index: usize) -> Option<usize> {
        if index >= self.entities.len() {
            return None;
        }
        let last = self.entities.len() - 1;
        self.entities.swap_remove(index);
        if index == last {
            None
        } else {
            Some(last)
        }
    }

    /// Remove every entity standing on a tile that no longer exists. Returns
    /// how many were removed.
    pub fn prune(&mut self, network: &TileNodeNetwork) -> usize {
        let before = self.entities.len();
        self.entities.retain(|entity| {
            entity.tiles().all(|tile| network.tile(tile).is_some())
        });
        before - self.entities.len()
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Entity> {
        self.entities.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Move an entity half a step. Returns `false` (and leaves the entity
    /// alone) if the entity doesn't exist or the step isn't possible from
    /// where it stands. See [navigation::step_info].
    pub fn step(
        &mut self,
        network: &TileNodeNetwork,
        index: usize,
        dir: LocalDirection,
    ) -> bool {
        let entity = match self.entities.get_mut(index) {
            Some(entity) => entity,
            None => return false,
        };
        match navigation::step_info(network, entity, dir) {
            Some((arriving, leaving)) => {
                entity.set_infos(arriving, leaving);
                true
            }
            None => false,
        }
    }

    pub fn gpu_infos(&self) -> Vec<EntityGpuInfo> {
        self.entities.iter().map(EntityGpuInfo::new).collect()
    }
}

/// Lookup from a spot on the surface to the entity standing there. An entity
/// on an edge shows up under both tiles, once per info slot.
#[derive(Clone, Debug, Default)]
pub struct EntityOccupancy {
    spots: HashMap<(TileId, LocalPosition), (usize, InfoSlot), FnvBuildHasher>,
}

impl EntityOccupancy {
    pub fn new(entities: &EntityList) -> Self {
        let mut occupancy = Self::default();
        for (index, entity) in entities.iter().enumerate() {
            for slot in [InfoSlot::Arriving, InfoSlot::Leaving] {
                if let Some(info) = entity.info(slot) {
                    occupancy
                        .spots
                        .insert((info.tile, info.position), (index, slot));
                }
            }
        }
        occupancy
    }

    /// The entity (and which of its infos) at a spot
    pub fn get(
        &self,
        tile: TileId,
        position: LocalPosition,
    ) -> Option<(usize, InfoSlot)> {
        self.spots.get(&(tile, position)).copied()
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }
}
