//! The tile/node network: every tile pair and the graph of nodes that
//! connects them.
//!
//! ## Node Graph
//!
//! Each tile gets a [CenterNode]. Tiles that share an edge are connected
//! through a [SideNode] sitting on that edge, and tile quadrants that meet at
//! a vertex share a [CornerNode] (a closed loop of exactly 4 quadrants) or
//! a [DegenerateCornerNode] (anything else). Every link carries a
//! [MapType](crate::MapType) that converts directions from the linking
//! node's frame into the linked node's frame, so anything walking the graph
//! can keep track of "which way is forward" across folds and seams.
//!
//! ## Edge Ownership
//!
//! Any number of tiles can hang off one edge (up to 4 tile pairs in
//! different planes). Each side node connects exactly two tiles, so the
//! tiles around an edge are paired up by angular order: every tile connects
//! to the tile that wraps around it most tightly, see
//! [ConnectionPriority](crate::ConnectionPriority). A lone tile pair wraps
//! around to itself: the front tile's edge connects to the back tile.
//!
//! ## Corners
//!
//! Walking around a vertex through side links visits a closed cycle of tile
//! quadrants, which is how corner membership is defined. Corner nodes are
//! kept in sync with those cycles whenever tiles come and go.

mod check;
mod connect;
mod corner;
mod node;
mod propagate;

pub use self::{corner::CornerMember, node::*};

use crate::{
    config::NetworkConfig,
    force::ForceList,
    gpu::{Color3, GpuTile, GpuTileNodeInfo},
    grid::{GridPoint, GridPointMap, SuperTileType},
    tile::{Tile, TileId, TileLink},
    tnav::{LocalDirection, MapType},
    unwrap,
    util::arena::Arena,
};
use anyhow::Context;
use fnv::FnvBuildHasher;
use indexmap::IndexSet;
use log::{debug, info, warn};
use serde::Serialize;
use validator::Validate;

/// An insertion-ordered set of handles, used to queue follow-up work
/// deterministically
type HandleSet<H> = IndexSet<H, FnvBuildHasher>;

/// See [TileNodeNetwork::snapshot]
#[derive(Clone, Debug, Serialize)]
pub struct NetworkSnapshot<'a> {
    pub config: &'a NetworkConfig,
    pub tiles: Vec<(TileId, &'a Tile)>,
    pub nodes: Vec<(NodeId, &'a TileNode)>,
    /// Force flags, 4 per block
    pub forces: &'a [bool],
}

/// Owns every tile and node, and keeps the graph between them consistent.
/// All mutation goes through [Self::create_tile_pair] and
/// [Self::remove_tile_pair], each of which leaves the network fully
/// connected before returning.
#[derive(Clone, Debug)]
pub struct TileNodeNetwork {
    config: NetworkConfig,
    tiles: Arena<TileId, Tile>,
    nodes: Arena<NodeId, TileNode>,
    forces: ForceList,
    /// Front tile of the pair at each occupied position
    tile_positions: GridPointMap<TileId>,
    /// Every node at each position. Side nodes can stack up when several
    /// tile pairs share an edge, same for corners at a shared vertex.
    node_positions: GridPointMap<Vec<NodeId>>,
}

impl TileNodeNetwork {
    /// Create an empty network. Returns an error if the config is invalid.
    pub fn new(config: NetworkConfig) -> anyhow::Result<Self> {
        config.validate().context("invalid config")?;
        info!("Creating tile network with config {:?}", config);

        let capacity = config.initial_capacity;
        Ok(Self {
            config,
            tiles: Arena::with_capacity(capacity * 2),
            nodes: Arena::with_capacity(capacity * 8),
            forces: ForceList::with_capacity(capacity * 8),
            tile_positions: GridPointMap::with_capacity_and_hasher(
                capacity,
                FnvBuildHasher::default(),
            ),
            node_positions: GridPointMap::with_capacity_and_hasher(
                capacity * 8,
                FnvBuildHasher::default(),
            ),
        })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn tile(&self, tile: TileId) -> Option<&Tile> {
        self.tiles.get(tile)
    }

    pub fn tile_mut(&mut self, tile: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(tile)
    }

    /// Every live tile, in slot order
    pub fn tiles(&self) -> impl Iterator<Item = (TileId, &Tile)> {
        self.tiles.iter()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// The front tile of the pair at a position, if the position is occupied
    pub fn tile_at(&self, position: GridPoint) -> Option<TileId> {
        self.tile_positions.get(&position).copied()
    }

    pub fn node(&self, node: NodeId) -> Option<&TileNode> {
        self.nodes.get(node)
    }

    /// Every live node, in slot order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &TileNode)> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every node at a position
    pub fn nodes_at(&self, position: GridPoint) -> &[NodeId] {
        self.node_positions
            .get(&position)
            .map_or(&[], |nodes| nodes.as_slice())
    }

    pub fn forces(&self) -> &ForceList {
        &self.forces
    }

    /// Direct access to the force flags. Blocks are owned by nodes, so
    /// adding or removing blocks through here will desync the network; only
    /// read and write flags.
    pub fn forces_mut(&mut self) -> &mut ForceList {
        &mut self.forces
    }

    /// The force on a tile's center node
    pub fn tile_force(&self, tile: TileId) -> Option<LocalDirection> {
        let center = self.center_of(tile)?;
        self.forces.get_force(center.force())
    }

    /// Set the force on a tile's center node. Returns `false` if the tile
    /// doesn't exist.
    pub fn set_tile_force(
        &mut self,
        tile: TileId,
        direction: LocalDirection,
    ) -> bool {
        match self.center_of(tile).map(|center| center.force()) {
            Some(force) => {
                self.forces.set_force(force, direction);
                true
            }
            None => false,
        }
    }

    fn center_of(&self, tile: TileId) -> Option<&CenterNode> {
        let tile = self.tiles.get(tile)?;
        self.nodes.get(tile.center())?.as_center()
    }

    /// Create a front/back tile pair on the square centered at `position`,
    /// and connect it into the graph. Returns the front tile, or `None` if
    /// the position is already occupied or isn't on the lattice for the
    /// given super type.
    pub fn create_tile_pair(
        &mut self,
        position: GridPoint,
        super_type: SuperTileType,
    ) -> Option<TileId> {
        if !super_type.accepts(position) {
            warn!(
                "Cannot place {} tile at {}, position is off the lattice",
                super_type, position
            );
            return None;
        }
        if let Some(existing) = self.tile_at(position) {
            warn!(
                "Cannot place {} tile at {}, occupied by tile {}",
                super_type, position, existing
            );
            return None;
        }

        let front_type = super_type.front();
        let back_type = super_type.back();
        let front_tile = self.tiles.reserve();
        let back_tile = self.tiles.reserve();
        let front = self.add_node(|force| {
            CenterNode::new(position, front_type, front_tile, force).into()
        });
        let back = self.add_node(|force| {
            CenterNode::new(position, back_type, back_tile, force).into()
        });
        let (front_color, back_color) = if self.config.debug_colors {
            (front_type.debug_color(), back_type.debug_color())
        } else {
            (Color3::WHITE, Color3::WHITE)
        };
        self.tiles.fill(
            front_tile,
            Tile::new(front_type, position, front, back_tile, front_color),
        );
        self.tiles.fill(
            back_tile,
            Tile::new(back_type, position, back, front_tile, back_color),
        );
        self.tile_positions.insert(position, front_tile);
        debug!(
            "Created {} tile pair {}/{} at {}",
            super_type, front_tile, back_tile, position
        );

        let mut dirty_tiles = self.connect_tile_pair(front, back);
        self.reconnect_corner_nodes([front, back]);

        dirty_tiles.insert(front_tile);
        dirty_tiles.insert(back_tile);
        for tile in dirty_tiles {
            self.reconnect_tile(tile);
        }
        Some(front_tile)
    }

    /// Remove a tile pair, given either of its tiles. The tiles that were
    /// connected through the pair get connected to each other instead.
    /// Returns `false` if the tile doesn't exist.
    pub fn remove_tile_pair(&mut self, tile: TileId) -> bool {
        let (front_tile, back_tile, position) = match self.tiles.get(tile) {
            Some(tile_ref) if tile_ref.tile_type().is_front() => {
                (tile, tile_ref.sibling(), tile_ref.position())
            }
            Some(tile_ref) => (tile_ref.sibling(), tile, tile_ref.position()),
            None => {
                warn!("Cannot remove tile {}, it doesn't exist", tile);
                return false;
            }
        };
        let front = self.tile_ref(front_tile).center();
        let back = self.tile_ref(back_tile).center();
        let front_type = self.center(front).tile_type();

        // Detach the pair from every corner it's part of
        let mut touched: HandleSet<NodeId> = HandleSet::default();
        for center in [front, back] {
            for diagonal in LocalDirection::DIAGONALS {
                if let Some(link) = self.center(center).neighbor(diagonal) {
                    touched.extend(self.detach_from_corner(
                        link.node,
                        front,
                        back,
                    ));
                }
            }
        }

        // Bridge each edge over the removed pair
        let mut dirty_tiles: HandleSet<TileId> = HandleSet::default();
        for dir in LocalDirection::ORTHOGONALS {
            let back_dir = front_type.sibling_direction(dir);
            let front_side = self.link_from(front, dir).node;
            let back_side = self.link_from(back, back_dir).node;
            if front_side == back_side {
                // The pair wrapped around to itself here
                self.free_node(front_side);
                continue;
            }

            let (front_neighbor, front_neighbor_dir) =
                self.other_endpoint(front_side, front);
            let (back_neighbor, back_neighbor_dir) =
                self.other_endpoint(back_side, back);
            self.free_node(front_side);
            self.free_node(back_side);
            self.create_side(
                front_neighbor,
                front_neighbor_dir,
                back_neighbor,
                back_neighbor_dir,
            );
            for neighbor in [front_neighbor, back_neighbor] {
                touched.insert(neighbor);
                dirty_tiles.insert(self.center(neighbor).tile());
            }
        }

        self.free_node(front);
        self.free_node(back);
        self.tiles.remove(front_tile);
        self.tiles.remove(back_tile);
        self.tile_positions.remove(&position);
        debug!(
            "Removed tile pair {}/{} at {}",
            front_tile, back_tile, position
        );

        let touched: Vec<NodeId> = touched
            .into_iter()
            .filter(|node| self.nodes.contains(*node))
            .collect();
        self.reconnect_corner_nodes(touched);
        for tile in dirty_tiles {
            if self.tiles.contains(tile) {
                self.reconnect_tile(tile);
            }
        }
        true
    }

    /// Walk from a center node through the side node in `dir` to the center
    /// node on the other side. Returns that center, and the map from this
    /// center's frame into its frame. `None` if `dir` isn't orthogonal or the
    /// node isn't a connected center.
    pub fn second_neighbor(
        &self,
        center: NodeId,
        dir: LocalDirection,
    ) -> Option<(NodeId, MapType)> {
        let first = self.nodes.get(center)?.as_center()?.neighbor(dir)?;
        let side = self.nodes.get(first.node)?.as_side()?;
        let second = side.neighbor(first.map.map(dir))?;
        Some((second.node, first.map.combine(second.map)))
    }

    /// Walk from a center node through the corner node at `diagonal` to the
    /// center node across the corner. `None` if there's no full corner there
    /// (e.g. a degenerate corner).
    pub fn diagonal_neighbor(
        &self,
        center: NodeId,
        diagonal: LocalDirection,
    ) -> Option<(NodeId, MapType)> {
        if !diagonal.is_diagonal() {
            return None;
        }
        let first = self.nodes.get(center)?.as_center()?.neighbor(diagonal)?;
        let corner = self.nodes.get(first.node)?.as_corner()?;
        let second = corner.neighbor(first.map.map(diagonal))?;
        Some((second.node, first.map.combine(second.map)))
    }

    /// Rebuild a tile's cached neighbor links from the node graph
    fn reconnect_tile(&mut self, tile: TileId) {
        let center = self.tile_ref(tile).center();
        let mut neighbors = [None; 4];
        for (slot, dir) in neighbors.iter_mut().zip(LocalDirection::ORTHOGONALS)
        {
            *slot = self.second_neighbor(center, dir).map(|(node, map)| {
                TileLink {
                    tile: self.center(node).tile(),
                    map,
                }
            });
        }
        unwrap!(self.tiles.get_mut(tile), "missing tile {}", tile)
            .set_neighbors(neighbors);
    }

    /// GPU buffer of every tile, in slot order
    pub fn gpu_tiles(&self) -> Vec<GpuTile> {
        self.tiles.iter().map(|(_, tile)| GpuTile::new(tile)).collect()
    }

    /// GPU buffer of every tile's center node info, in tile slot order
    pub fn gpu_node_infos(&self) -> Vec<GpuTileNodeInfo> {
        self.tiles
            .iter()
            .filter_map(|(_, tile)| GpuTileNodeInfo::new(self, tile))
            .collect()
    }

    /// A read-only view of every tile, node and force flag, for dumping the
    /// network to external tools
    pub fn snapshot(&self) -> NetworkSnapshot<'_> {
        NetworkSnapshot {
            config: &self.config,
            tiles: self.tiles.iter().collect(),
            nodes: self.nodes.iter().collect(),
            forces: self.forces.flags(),
        }
    }

    /// Serialize a [NetworkSnapshot] of this network as JSON. The snapshot
    /// can't be loaded back into a network, rebuild from a
    /// [Scenario](crate::Scenario) instead.
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string(&self.snapshot())
            .context("error serializing network")
    }

    // ===== Internal helpers =====

    /// Allocate a node along with its force block
    fn add_node(
        &mut self,
        build: impl FnOnce(crate::force::ForceIndex) -> TileNode,
    ) -> NodeId {
        let id = self.nodes.reserve();
        let force = self.forces.add_force(LocalDirection::Static, id);
        let node = build(force);
        self.node_positions
            .entry(node.position())
            .or_default()
            .push(id);
        self.nodes.fill(id, node);
        id
    }

    /// Free a node and its force block. Links pointing at the node are not
    /// touched.
    fn free_node(&mut self, id: NodeId) -> TileNode {
        let node = unwrap!(self.nodes.remove(id), "cannot free node {}", id);
        self.forces.remove_force(node.force());
        let position = node.position();
        if let Some(nodes) = self.node_positions.get_mut(&position) {
            nodes.retain(|other| *other != id);
            if nodes.is_empty() {
                self.node_positions.remove(&position);
            }
        }
        node
    }

    fn tile_ref(&self, tile: TileId) -> &Tile {
        unwrap!(self.tiles.get(tile), "missing tile {}", tile)
    }

    fn node_ref(&self, node: NodeId) -> &TileNode {
        unwrap!(self.nodes.get(node), "missing node {}", node)
    }

    fn node_mut(&mut self, node: NodeId) -> &mut TileNode {
        unwrap!(self.nodes.get_mut(node), "missing node {}", node)
    }

    fn center(&self, node: NodeId) -> &CenterNode {
        unwrap!(
            self.node_ref(node).as_center(),
            "node {} is not a center node",
            node
        )
    }

    /// A link that must exist
    fn link_from(&self, node: NodeId, dir: LocalDirection) -> NodeLink {
        unwrap!(
            self.node_ref(node).neighbor(dir),
            "node {} has no neighbor in direction {}",
            node,
            dir
        )
    }

    /// Connect a side node slot to a center node slot, in both directions
    fn link_side(
        &mut self,
        side: NodeId,
        side_dir: LocalDirection,
        center: NodeId,
        center_dir: LocalDirection,
    ) {
        let map = unwrap!(
            MapType::neighbor_map(side_dir, center_dir),
            "cannot link side {} ({}) to center {} ({})",
            side,
            side_dir,
            center,
            center_dir
        );
        self.node_mut(side)
            .set_neighbor(side_dir, NodeLink::new(center, map));
        self.node_mut(center)
            .set_neighbor(center_dir, NodeLink::new(side, map.inverse()));
    }

    /// Create a side node on the edge in direction `a_dir` of center `a`,
    /// connecting it to center `b` through `b`'s side `b_dir`. The new node
    /// borrows `a`'s frame.
    fn create_side(
        &mut self,
        a: NodeId,
        a_dir: LocalDirection,
        b: NodeId,
        b_dir: LocalDirection,
    ) -> NodeId {
        let a_center = self.center(a);
        let position = a_center
            .position()
            .translate(a_center.tile_type().direction_vector(a_dir));
        let horizontal =
            matches!(a_dir, LocalDirection::D0 | LocalDirection::D2);
        let side = self.add_node(|force| {
            SideNode::new(position, horizontal, force).into()
        });
        self.link_side(side, a_dir.inverse(), a, a_dir);
        self.link_side(side, a_dir, b, b_dir);
        side
    }

    /// The two centers a side node connects, as
    /// `(side slot direction, center, center's direction to the side)`
    fn side_endpoints(
        &self,
        side: NodeId,
    ) -> [(LocalDirection, NodeId, LocalDirection); 2] {
        let node = unwrap!(
            self.node_ref(side).as_side(),
            "node {} is not a side node",
            side
        );
        node.axis().map(|slot_dir| {
            let link = unwrap!(
                node.neighbor(slot_dir),
                "side node {} is missing its {} link",
                side,
                slot_dir
            );
            (slot_dir, link.node, link.map.map(slot_dir.inverse()))
        })
    }

    /// The endpoint of a side node that isn't `center`
    fn other_endpoint(
        &self,
        side: NodeId,
        center: NodeId,
    ) -> (NodeId, LocalDirection) {
        let [(_, a, a_dir), (_, b, b_dir)] = self.side_endpoints(side);
        if a == center {
            (b, b_dir)
        } else {
            (a, a_dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileType;

    fn network() -> TileNodeNetwork {
        TileNodeNetwork::new(NetworkConfig::default()).unwrap()
    }

    #[test]
    fn test_single_pair() {
        let mut network = network();
        let front = network
            .create_tile_pair(GridPoint::ORIGIN, SuperTileType::Xy)
            .unwrap();
        let tile = network.tile(front).unwrap();
        assert_eq!(tile.tile_type(), TileType::XyFront);
        let back = tile.sibling();
        assert_eq!(network.tile(back).unwrap().sibling(), front);

        // 2 centers, 4 sides, 4 degenerate corners
        assert_eq!(network.tile_count(), 2);
        assert_eq!(network.node_count(), 10);
        assert_eq!(network.forces().len(), 10);

        // Every edge wraps around to the sibling
        for dir in LocalDirection::ORTHOGONALS {
            let link = network.tile(front).unwrap().neighbor(dir).unwrap();
            assert_eq!(link.tile, back);
        }
        network.check_consistency().unwrap();
    }

    #[test]
    fn test_occupied_and_off_lattice() {
        let mut network = network();
        assert!(network
            .create_tile_pair(GridPoint::ORIGIN, SuperTileType::Xy)
            .is_some());
        assert!(network
            .create_tile_pair(GridPoint::ORIGIN, SuperTileType::Xy)
            .is_none());
        assert!(network
            .create_tile_pair(GridPoint::new(1, 0, 0), SuperTileType::Xy)
            .is_none());
        assert_eq!(network.tile_count(), 2);
    }

    #[test]
    fn test_flat_neighbors() {
        let mut network = network();
        let left = network
            .create_tile_pair(GridPoint::ORIGIN, SuperTileType::Xy)
            .unwrap();
        let right = network
            .create_tile_pair(GridPoint::new(2, 0, 0), SuperTileType::Xy)
            .unwrap();
        let link = network
            .tile(left)
            .unwrap()
            .neighbor(LocalDirection::D0)
            .unwrap();
        assert_eq!(link.tile, right);
        assert_eq!(link.map, MapType::Identity);
        assert_eq!(network.nodes_at(GridPoint::new(1, 0, 0)).len(), 2);
        network.check_consistency().unwrap();
    }

    #[test]
    fn test_remove_restores_wrap() {
        let mut network = network();
        let left = network
            .create_tile_pair(GridPoint::ORIGIN, SuperTileType::Xy)
            .unwrap();
        let right = network
            .create_tile_pair(GridPoint::new(2, 0, 0), SuperTileType::Xy)
            .unwrap();
        assert!(network.remove_tile_pair(right));
        assert!(!network.remove_tile_pair(right));

        let back = network.tile(left).unwrap().sibling();
        let link = network
            .tile(left)
            .unwrap()
            .neighbor(LocalDirection::D0)
            .unwrap();
        assert_eq!(link.tile, back);
        assert_eq!(network.node_count(), 10);
        assert_eq!(network.tile_at(GridPoint::new(2, 0, 0)), None);
        network.check_consistency().unwrap();
    }

    #[test]
    fn test_remove_by_back_tile() {
        let mut network = network();
        let position = GridPoint::new(1, 0, 1);
        let front = network
            .create_tile_pair(position, SuperTileType::Yz)
            .unwrap();
        let back = network.tile(front).unwrap().sibling();
        assert_eq!(network.tile(back).unwrap().tile_type(), TileType::YzBack);
        assert!(network.remove_tile_pair(back));
        assert_eq!(network.tile_count(), 0);
        assert_eq!(network.node_count(), 0);
        assert!(network.forces().is_empty());
        assert!(network.nodes_at(position).is_empty());
    }

    #[test]
    fn test_invalid_config() {
        let config = NetworkConfig {
            max_corner_valence: 4,
            ..NetworkConfig::default()
        };
        assert!(TileNodeNetwork::new(config).is_err());
    }

    #[test]
    fn test_snapshot() {
        let mut network = network();
        network
            .create_tile_pair(GridPoint::ORIGIN, SuperTileType::Xy)
            .unwrap();
        let snapshot = network.snapshot();
        assert_eq!(snapshot.tiles.len(), 2);
        assert_eq!(snapshot.nodes.len(), 10);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["nodes"][0][1]["kind"], "center");
    }
}
