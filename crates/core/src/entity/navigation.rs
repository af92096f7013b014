//! Next-entity queries: "standing here and looking that way, who is in the
//! next spot over?" Every query is a fixed path of half steps walked across
//! the tile graph, remapping the asker's direction into each tile's frame
//! along the way. Spots form a half-tile lattice: a tile's center, the
//! midpoints of its edges and its corners. A half step moves to the next
//! spot over, which may belong to a neighboring tile.

use crate::{
    entity::{Entity, EntityInfo, EntityOccupancy, InfoSlot, LocalPosition},
    network::TileNodeNetwork,
    tile::TileId,
    tnav::{LocalDirection, MapType},
};
use serde::Serialize;

/// Take one half step from `position` in `dir`, both in `tile`'s frame.
/// Returns where the step lands, along with the map from `tile`'s frame into
/// the frame of the tile it lands on.
///
/// From a center any direction leads to an edge or a corner. From an edge,
/// orthogonal steps lead back to the center, across into the neighbor's
/// center, or along the edge to one of its corners. From a corner, the
/// diagonal steps lead back to the center or across the corner into the
/// diagonal neighbor's center, and orthogonal steps run along an edge, either
/// back to its midpoint or out onto the neighbor's edge. Stepping across a
/// degenerate corner isn't possible, since there is no tile on the other
/// side. `None` for any other step, or if there is no neighbor.
pub fn half_step(
    network: &TileNodeNetwork,
    tile: TileId,
    position: LocalPosition,
    dir: LocalDirection,
) -> Option<(TileId, LocalPosition, MapType)> {
    let stay = |position| Some((tile, position, MapType::Identity));
    let at = position.direction();

    if position.is_center() {
        if dir == LocalDirection::Static {
            return None;
        }
        return stay(LocalPosition::from_direction(dir)?);
    }
    if dir == at.inverse() {
        return stay(LocalPosition::Center);
    }

    if position.is_edge() {
        if dir == at {
            let link = network.tile(tile)?.neighbor(dir)?;
            return Some((link.tile, LocalPosition::Center, link.map));
        }
        return stay(LocalPosition::from_direction(at.combine(dir)?)?);
    }

    if dir == at {
        let center = network.tile(tile)?.center();
        let (node, map) = network.diagonal_neighbor(center, dir)?;
        let across = network.node(node)?.as_center()?.tile();
        return Some((across, LocalPosition::Center, map));
    }
    if let Some(along) = at.other_component(dir) {
        // Out over one of the corner's edges
        let link = network.tile(tile)?.neighbor(dir)?;
        let edge = LocalPosition::from_direction(link.map.map(along))?;
        return Some((link.tile, edge, link.map));
    }
    let along = at.other_component(dir.inverse())?;
    stay(LocalPosition::from_direction(along)?)
}

/// A position on the surface, plus the map from the frame a walk started in
/// into the current tile's frame
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Walker {
    pub tile: TileId,
    pub position: LocalPosition,
    pub map: MapType,
}

impl Walker {
    pub fn new(tile: TileId, position: LocalPosition) -> Self {
        Self {
            tile,
            position,
            map: MapType::Identity,
        }
    }

    /// Walk a path of half steps, given in the starting frame
    pub fn walk(
        network: &TileNodeNetwork,
        tile: TileId,
        position: LocalPosition,
        path: &[LocalDirection],
    ) -> Option<Self> {
        path.iter()
            .try_fold(Self::new(tile, position), |walker, dir| {
                walker.step(network, *dir)
            })
    }

    /// Half step in a direction given in the walk's starting frame
    pub fn step(
        self,
        network: &TileNodeNetwork,
        dir: LocalDirection,
    ) -> Option<Self> {
        let (tile, position, hop) =
            half_step(network, self.tile, self.position, self.map.map(dir))?;
        Some(Self {
            tile,
            position,
            map: self.map.combine(hop),
        })
    }
}

/// How far ahead to look, relative to a direction `d`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "side", rename_all = "snake_case")]
pub enum Offset {
    /// One half step: `[d]`
    Direct,
    /// `[d, d]`
    OffsetOne,
    /// `[d, d, d]`
    OffsetTwo,
    /// Two half steps ahead, then two to the given side: `[d, d, s, s]`
    Corner(LocalDirection),
    /// Straight over the corner between `d` and the given side: `[q, q]`
    /// where `q` is the diagonal between them
    Diagonal(LocalDirection),
}

impl Offset {
    /// The half steps for this offset, in the asker's frame. `None` if `dir`
    /// isn't orthogonal, or a side isn't perpendicular to it.
    pub fn path(self, dir: LocalDirection) -> Option<Vec<LocalDirection>> {
        if !dir.is_orthogonal() {
            return None;
        }
        match self {
            Self::Direct => Some(vec![dir]),
            Self::OffsetOne => Some(vec![dir; 2]),
            Self::OffsetTwo => Some(vec![dir; 3]),
            Self::Corner(side) => {
                // Combining only succeeds for adjacent orthogonals
                dir.combine(side)?;
                Some(vec![dir, dir, side, side])
            }
            Self::Diagonal(side) => Some(vec![dir.combine(side)?; 2]),
        }
    }
}

/// An entity found by a query
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct NextEntity {
    /// Index into the [EntityList](super::EntityList)
    pub entity: usize,
    /// Which of the entity's infos is in the spot that was found
    pub slot: InfoSlot,
    /// The asker's direction, in the frame of the tile the entity was found
    /// in
    pub direction: LocalDirection,
}

/// Walk a path of half steps (in the asker's frame) and report the entity at
/// the end of it, if any. The asker is taken to be looking along the first
/// step, so the path must not be empty.
pub fn look_ahead(
    network: &TileNodeNetwork,
    occupancy: &EntityOccupancy,
    tile: TileId,
    position: LocalPosition,
    path: &[LocalDirection],
) -> Option<NextEntity> {
    let heading = *path.first()?;
    let walker = Walker::walk(network, tile, position, path)?;
    found(occupancy, walker, heading)
}

fn found(
    occupancy: &EntityOccupancy,
    walker: Walker,
    heading: LocalDirection,
) -> Option<NextEntity> {
    let (entity, slot) = occupancy.get(walker.tile, walker.position)?;
    Some(NextEntity {
        entity,
        slot,
        direction: walker.map.map(heading),
    })
}

/// The entity at `offset` from an asker standing at `position` of `tile` and
/// looking in `dir`
pub fn next_entity(
    network: &TileNodeNetwork,
    occupancy: &EntityOccupancy,
    tile: TileId,
    position: LocalPosition,
    dir: LocalDirection,
    offset: Offset,
) -> Option<NextEntity> {
    let path = offset.path(dir)?;
    let walker = Walker::walk(network, tile, position, &path)?;
    found(occupancy, walker, dir)
}

/// Who is in the way of an entity that wants to move in `dir` (in the frame
/// of its arriving tile)
pub fn next_entity_for(
    network: &TileNodeNetwork,
    occupancy: &EntityOccupancy,
    entity: &Entity,
    dir: LocalDirection,
    offset: Offset,
) -> Option<NextEntity> {
    let info = entity.arriving();
    next_entity(network, occupancy, info.tile, info.position, dir, offset)
}

/// The infos an entity would have after a half step in `dir` (in the frame
/// of its arriving tile), as `(arriving, leaving)`. Stepping off a center
/// puts the entity on the edge, arriving in the neighbor and leaving this
/// tile. Stepping off an edge lands on one of the two centers it straddles.
/// Entities don't stop on corners. `None` if the step isn't possible.
pub fn step_info(
    network: &TileNodeNetwork,
    entity: &Entity,
    dir: LocalDirection,
) -> Option<(EntityInfo, Option<EntityInfo>)> {
    if !dir.is_orthogonal() {
        return None;
    }
    let current = entity.arriving();

    if current.position.is_center() {
        let link = network.tile(current.tile)?.neighbor(dir)?;
        let heading = link.map.map(dir);
        let leaving = EntityInfo {
            tile: current.tile,
            position: LocalPosition::from_direction(dir)?,
            direction: dir,
            orientation: current.orientation,
        };
        let arriving = EntityInfo {
            tile: link.tile,
            position: LocalPosition::from_direction(heading.inverse())?,
            direction: heading,
            orientation: link.map.map(current.orientation),
        };
        return Some((arriving, Some(leaving)));
    }

    if !current.position.is_edge() {
        return None;
    }
    let edge = current.position.direction();
    if dir == edge.inverse() {
        // Finish crossing into the arriving tile
        Some((
            EntityInfo {
                position: LocalPosition::Center,
                direction: dir,
                ..current
            },
            None,
        ))
    } else if dir == edge {
        // Back out into the tile the entity came from
        let link = network.tile(current.tile)?.neighbor(dir)?;
        Some((
            EntityInfo {
                tile: link.tile,
                position: LocalPosition::Center,
                direction: link.map.map(dir),
                orientation: link.map.map(current.orientation),
            },
            None,
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::NetworkConfig,
        entity::{EntityKind, EntityList},
        grid::{GridPoint, SuperTileType},
    };

    /// A row of 3 floor tiles along +x
    fn row() -> (TileNodeNetwork, Vec<TileId>) {
        let mut network =
            TileNodeNetwork::new(NetworkConfig::default()).unwrap();
        let tiles = (0..3)
            .map(|i| {
                network
                    .create_tile_pair(
                        GridPoint::new(i * 2, 0, 0),
                        SuperTileType::Xy,
                    )
                    .unwrap()
            })
            .collect();
        (network, tiles)
    }

    fn spawn(
        network: &TileNodeNetwork,
        entities: &mut EntityList,
        tile: TileId,
    ) -> usize {
        entities
            .create(
                network,
                EntityKind::Block,
                tile,
                LocalDirection::Static,
                LocalDirection::D1,
            )
            .unwrap()
    }

    #[test]
    fn test_half_step() {
        let (network, tiles) = row();
        let center = LocalPosition::Center;
        assert_eq!(
            half_step(&network, tiles[0], center, LocalDirection::D0),
            Some((tiles[0], LocalPosition::Edge0, MapType::Identity))
        );
        assert_eq!(
            half_step(
                &network,
                tiles[0],
                LocalPosition::Edge0,
                LocalDirection::D0
            ),
            Some((tiles[1], center, MapType::Identity))
        );
        assert_eq!(
            half_step(
                &network,
                tiles[0],
                LocalPosition::Edge0,
                LocalDirection::D2
            ),
            Some((tiles[0], center, MapType::Identity))
        );
        // Along an edge to its corner, and from there out onto the next
        // tile's edge or back to the middle of this one
        assert_eq!(
            half_step(
                &network,
                tiles[0],
                LocalPosition::Edge0,
                LocalDirection::D1
            ),
            Some((tiles[0], LocalPosition::Corner01, MapType::Identity))
        );
        assert_eq!(
            half_step(
                &network,
                tiles[0],
                LocalPosition::Corner01,
                LocalDirection::D0
            ),
            Some((tiles[1], LocalPosition::Edge1, MapType::Identity))
        );
        assert_eq!(
            half_step(
                &network,
                tiles[0],
                LocalPosition::Corner01,
                LocalDirection::D3
            ),
            Some((tiles[0], LocalPosition::Edge0, MapType::Identity))
        );
        assert_eq!(
            half_step(&network, tiles[0], center, LocalDirection::D01),
            Some((tiles[0], LocalPosition::Corner01, MapType::Identity))
        );
        assert_eq!(
            half_step(
                &network,
                tiles[0],
                LocalPosition::Corner12,
                LocalDirection::D30
            ),
            Some((tiles[0], center, MapType::Identity))
        );
        // The far end of the row only has degenerate corners, with nothing
        // across them
        assert_eq!(
            half_step(
                &network,
                tiles[0],
                LocalPosition::Corner12,
                LocalDirection::D12
            ),
            None
        );
        assert_eq!(
            half_step(
                &network,
                tiles[0],
                LocalPosition::Edge0,
                LocalDirection::D01
            ),
            None
        );
        assert_eq!(
            half_step(&network, tiles[0], center, LocalDirection::Static),
            None
        );
    }

    #[test]
    fn test_offsets() {
        let (network, tiles) = row();
        let mut entities = EntityList::new();
        let neighbor = spawn(&network, &mut entities, tiles[1]);
        let occupancy = EntityOccupancy::new(&entities);
        let ask = |offset| {
            next_entity(
                &network,
                &occupancy,
                tiles[0],
                LocalPosition::Center,
                LocalDirection::D0,
                offset,
            )
        };

        assert_eq!(ask(Offset::Direct), None);
        assert_eq!(
            ask(Offset::OffsetOne),
            Some(NextEntity {
                entity: neighbor,
                slot: InfoSlot::Arriving,
                direction: LocalDirection::D0,
            })
        );
        assert_eq!(ask(Offset::OffsetTwo), None);
        let backwards = Offset::Corner(LocalDirection::D2);
        assert_eq!(backwards.path(LocalDirection::D0), None);
        assert_eq!(
            Offset::Diagonal(LocalDirection::D3).path(LocalDirection::D0),
            Some(vec![LocalDirection::D30; 2])
        );
    }

    #[test]
    fn test_step_across_edge() {
        let (network, tiles) = row();
        let mut entities = EntityList::new();
        let index = spawn(&network, &mut entities, tiles[0]);

        assert!(entities.step(&network, index, LocalDirection::D0));
        let entity = entities.get(index).unwrap();
        assert_eq!(entity.arriving().tile, tiles[1]);
        assert_eq!(entity.arriving().position, LocalPosition::Edge2);
        let leaving = entity.leaving().unwrap();
        assert_eq!(leaving.tile, tiles[0]);
        assert_eq!(leaving.position, LocalPosition::Edge0);

        // Mid-crossing, the entity is visible from both sides of the edge
        let occupancy = EntityOccupancy::new(&entities);
        let found = next_entity(
            &network,
            &occupancy,
            tiles[2],
            LocalPosition::Center,
            LocalDirection::D2,
            Offset::OffsetTwo,
        )
        .unwrap();
        assert_eq!((found.entity, found.slot), (index, InfoSlot::Arriving));

        // Sideways is not allowed on an edge
        let entity = entities.get(index).unwrap();
        assert_eq!(step_info(&network, entity, LocalDirection::D1), None);

        assert!(entities.step(&network, index, LocalDirection::D0));
        let entity = entities.get(index).unwrap();
        assert_eq!(entity.arriving().tile, tiles[1]);
        assert!(entity.arriving().position.is_center());
        assert_eq!(entity.leaving(), None);
    }

    #[test]
    fn test_step_wraps_onto_back() {
        let mut network =
            TileNodeNetwork::new(NetworkConfig::default()).unwrap();
        let front = network
            .create_tile_pair(GridPoint::ORIGIN, SuperTileType::Xy)
            .unwrap();
        let back = network.tile(front).unwrap().sibling();
        let mut entities = EntityList::new();
        let index = spawn(&network, &mut entities, front);

        // Off the +x edge of the front face and onto the back face, where +x
        // is +v and the entity keeps moving along -v
        assert!(entities.step(&network, index, LocalDirection::D0));
        assert!(entities.step(&network, index, LocalDirection::D3));
        let arriving = entities.get(index).unwrap().arriving();
        assert_eq!(arriving.tile, back);
        assert_eq!(arriving.position, LocalPosition::Center);
        assert_eq!(arriving.direction, LocalDirection::D3);
    }
}
