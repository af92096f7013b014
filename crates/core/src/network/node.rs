use crate::{
    arena_handle,
    force::ForceIndex,
    grid::{GridPoint, TileType},
    tile::TileId,
    tnav::{LocalDirection, MapType},
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

arena_handle!(
    /// Handle to a [TileNode] in a [TileNodeNetwork](super::TileNodeNetwork)
    NodeId
);

/// A directed edge in the node graph. A link and its map are always set
/// together, so a slot is either fully connected or empty.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeLink {
    pub node: NodeId,
    /// Converts directions in the owning node's frame into the linked
    /// node's frame
    pub map: MapType,
}

impl NodeLink {
    pub fn new(node: NodeId, map: MapType) -> Self {
        Self { node, map }
    }
}

/// The uniform neighbor interface shared by every node kind. Each kind has a
/// different valence and accepts a different set of directions: center
/// nodes take all 8, side nodes the 2 along their axis, corner nodes the 4
/// diagonals, and degenerate corners none at all (their membership lives in
/// [ComponentPair]s instead).
pub trait NodeNeighbors {
    /// The slot that holds the neighbor in `dir`, or `None` if this node
    /// doesn't track that direction
    fn slot_index(&self, dir: LocalDirection) -> Option<usize>;

    /// The direction that a slot index represents. Inverse of
    /// [Self::slot_index].
    fn slot_direction(&self, slot: usize) -> Option<LocalDirection>;

    fn links(&self) -> &[Option<NodeLink>];

    fn links_mut(&mut self) -> &mut [Option<NodeLink>];

    fn neighbor(&self, dir: LocalDirection) -> Option<NodeLink> {
        self.slot_index(dir).and_then(|slot| self.links()[slot])
    }

    fn neighbor_index(&self, dir: LocalDirection) -> Option<NodeId> {
        self.neighbor(dir).map(|link| link.node)
    }

    fn neighbor_map(&self, dir: LocalDirection) -> Option<MapType> {
        self.neighbor(dir).map(|link| link.map)
    }

    /// Connect a slot. Returns `false` (and changes nothing) if this node
    /// doesn't track `dir`.
    fn set_neighbor(&mut self, dir: LocalDirection, link: NodeLink) -> bool {
        match self.slot_index(dir) {
            Some(slot) => {
                self.links_mut()[slot] = Some(link);
                true
            }
            None => false,
        }
    }

    /// Disconnect a slot, returning whatever it held
    fn clear_neighbor(&mut self, dir: LocalDirection) -> Option<NodeLink> {
        let slot = self.slot_index(dir)?;
        self.links_mut()[slot].take()
    }

    /// Project a direction from this node's frame into the frame of the
    /// neighbor in `dir`
    fn map_to_neighbor(
        &self,
        alignment: LocalDirection,
        dir: LocalDirection,
    ) -> Option<LocalDirection> {
        self.neighbor_map(dir).map(|map| map.map(alignment))
    }

    /// Every connected slot, as `(direction, link)`
    fn connections(&self) -> Vec<(LocalDirection, NodeLink)> {
        self.links()
            .iter()
            .enumerate()
            .filter_map(|(slot, link)| {
                Some((self.slot_direction(slot)?, (*link)?))
            })
            .collect()
    }

    /// Disconnect every slot
    fn wipe(&mut self) {
        for link in self.links_mut() {
            *link = None;
        }
    }
}

/// The node at a tile's center. Links to the 4 side nodes around the tile
/// and the 4 corner (or degenerate corner) nodes at its diagonals, indexed by
/// [LocalDirection].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CenterNode {
    position: GridPoint,
    tile_type: TileType,
    tile: TileId,
    force: ForceIndex,
    links: [Option<NodeLink>; 8],
}

impl CenterNode {
    pub(crate) fn new(
        position: GridPoint,
        tile_type: TileType,
        tile: TileId,
        force: ForceIndex,
    ) -> Self {
        Self {
            position,
            tile_type,
            tile,
            force,
            links: [None; 8],
        }
    }

    pub fn position(&self) -> GridPoint {
        self.position
    }

    /// The frame of this node is the frame of its tile
    pub fn tile_type(&self) -> TileType {
        self.tile_type
    }

    pub fn tile(&self) -> TileId {
        self.tile
    }

    pub fn force(&self) -> ForceIndex {
        self.force
    }
}

impl NodeNeighbors for CenterNode {
    fn slot_index(&self, dir: LocalDirection) -> Option<usize> {
        if dir == LocalDirection::Static {
            None
        } else {
            Some(dir.index())
        }
    }

    fn slot_direction(&self, slot: usize) -> Option<LocalDirection> {
        LocalDirection::from_index(slot)
            .filter(|dir| *dir != LocalDirection::Static)
    }

    fn links(&self) -> &[Option<NodeLink>] {
        &self.links
    }

    fn links_mut(&mut self) -> &mut [Option<NodeLink>] {
        &mut self.links
    }
}

/// The node on an edge shared by two tiles. Its frame is borrowed from the
/// first tile it was created for, and it only tracks the two directions along
/// the axis that crosses the edge: `D0`/`D2` when horizontal, `D1`/`D3` when
/// vertical.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SideNode {
    position: GridPoint,
    horizontal: bool,
    force: ForceIndex,
    links: [Option<NodeLink>; 2],
}

impl SideNode {
    pub(crate) fn new(
        position: GridPoint,
        horizontal: bool,
        force: ForceIndex,
    ) -> Self {
        Self {
            position,
            horizontal,
            force,
            links: [None; 2],
        }
    }

    pub fn position(&self) -> GridPoint {
        self.position
    }

    pub fn is_horizontal(&self) -> bool {
        self.horizontal
    }

    pub fn force(&self) -> ForceIndex {
        self.force
    }

    /// The two directions this node tracks
    pub fn axis(&self) -> [LocalDirection; 2] {
        if self.horizontal {
            [LocalDirection::D0, LocalDirection::D2]
        } else {
            [LocalDirection::D1, LocalDirection::D3]
        }
    }
}

impl NodeNeighbors for SideNode {
    fn slot_index(&self, dir: LocalDirection) -> Option<usize> {
        self.axis().iter().position(|axis_dir| *axis_dir == dir)
    }

    fn slot_direction(&self, slot: usize) -> Option<LocalDirection> {
        self.axis().get(slot).copied()
    }

    fn links(&self) -> &[Option<NodeLink>] {
        &self.links
    }

    fn links_mut(&mut self) -> &mut [Option<NodeLink>] {
        &mut self.links
    }
}

/// The node where exactly 4 tile quadrants meet. Links to the 4 center
/// nodes, one per diagonal direction, with the maps chosen so that walking
/// around the corner composes to the identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CornerNode {
    position: GridPoint,
    force: ForceIndex,
    links: [Option<NodeLink>; 4],
}

impl CornerNode {
    pub(crate) fn new(position: GridPoint, force: ForceIndex) -> Self {
        Self {
            position,
            force,
            links: [None; 4],
        }
    }

    pub fn position(&self) -> GridPoint {
        self.position
    }

    pub fn force(&self) -> ForceIndex {
        self.force
    }
}

impl NodeNeighbors for CornerNode {
    fn slot_index(&self, dir: LocalDirection) -> Option<usize> {
        if dir.is_diagonal() {
            Some(dir.index() - 4)
        } else {
            None
        }
    }

    fn slot_direction(&self, slot: usize) -> Option<LocalDirection> {
        LocalDirection::DIAGONALS.get(slot).copied()
    }

    fn links(&self) -> &[Option<NodeLink>] {
        &self.links
    }

    fn links_mut(&mut self) -> &mut [Option<NodeLink>] {
        &mut self.links
    }
}

/// One tile quadrant attached to a [DegenerateCornerNode]: the center node,
/// the diagonal of that center pointing into the corner, and the flat
/// indices of the two force flags (the diagonal's components) that point
/// into the corner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentPair {
    pub center: NodeId,
    pub diagonal: LocalDirection,
    pub components: [usize; 2],
}

/// A corner where some number of quadrants other than 4 meet, e.g. the outer
/// corner of a lone tile pair (2 quadrants) or the inside of a box corner
/// (3 quadrants). There is no consistent frame around such a corner, so
/// instead of links this tracks the force components that point into it.
/// Centers link here with the identity map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DegenerateCornerNode {
    position: GridPoint,
    force: ForceIndex,
    pairs: Vec<ComponentPair>,
}

impl DegenerateCornerNode {
    pub(crate) fn new(position: GridPoint, force: ForceIndex) -> Self {
        Self {
            position,
            force,
            pairs: Vec::new(),
        }
    }

    pub fn position(&self) -> GridPoint {
        self.position
    }

    pub fn force(&self) -> ForceIndex {
        self.force
    }

    pub fn pairs(&self) -> &[ComponentPair] {
        &self.pairs
    }

    /// Number of tracked force components, 2 per quadrant
    pub fn component_count(&self) -> usize {
        self.pairs.len() * 2
    }

    pub(crate) fn add_degen_pair(&mut self, pair: ComponentPair) {
        self.pairs.push(pair);
    }

    /// Drop every pair matching the predicate, returning the dropped pairs
    pub(crate) fn remove_pairs(
        &mut self,
        predicate: impl Fn(&ComponentPair) -> bool,
    ) -> Vec<ComponentPair> {
        let (removed, kept) = self.pairs.drain(..).partition(predicate);
        self.pairs = kept;
        removed
    }
}

impl NodeNeighbors for DegenerateCornerNode {
    fn slot_index(&self, _dir: LocalDirection) -> Option<usize> {
        None
    }

    fn slot_direction(&self, _slot: usize) -> Option<LocalDirection> {
        None
    }

    fn links(&self) -> &[Option<NodeLink>] {
        &[]
    }

    fn links_mut(&mut self) -> &mut [Option<NodeLink>] {
        &mut []
    }
}

/// Discriminant of a [TileNode]
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumIter, Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Center,
    Side,
    Corner,
    Degenerate,
}

/// Any node in the graph
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TileNode {
    Center(CenterNode),
    Side(SideNode),
    Corner(CornerNode),
    Degenerate(DegenerateCornerNode),
}

macro_rules! dispatch {
    ($node:expr, $inner:ident => $body:expr) => {
        match $node {
            TileNode::Center($inner) => $body,
            TileNode::Side($inner) => $body,
            TileNode::Corner($inner) => $body,
            TileNode::Degenerate($inner) => $body,
        }
    };
}

impl TileNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Center(_) => NodeKind::Center,
            Self::Side(_) => NodeKind::Side,
            Self::Corner(_) => NodeKind::Corner,
            Self::Degenerate(_) => NodeKind::Degenerate,
        }
    }

    pub fn position(&self) -> GridPoint {
        dispatch!(self, node => node.position())
    }

    pub fn force(&self) -> ForceIndex {
        dispatch!(self, node => node.force())
    }

    pub fn as_center(&self) -> Option<&CenterNode> {
        match self {
            Self::Center(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_center_mut(&mut self) -> Option<&mut CenterNode> {
        match self {
            Self::Center(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_side(&self) -> Option<&SideNode> {
        match self {
            Self::Side(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_corner(&self) -> Option<&CornerNode> {
        match self {
            Self::Corner(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_degenerate(&self) -> Option<&DegenerateCornerNode> {
        match self {
            Self::Degenerate(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_degenerate_mut(&mut self) -> Option<&mut DegenerateCornerNode> {
        match self {
            Self::Degenerate(node) => Some(node),
            _ => None,
        }
    }
}

impl NodeNeighbors for TileNode {
    fn slot_index(&self, dir: LocalDirection) -> Option<usize> {
        dispatch!(self, node => node.slot_index(dir))
    }

    fn slot_direction(&self, slot: usize) -> Option<LocalDirection> {
        dispatch!(self, node => node.slot_direction(slot))
    }

    fn links(&self) -> &[Option<NodeLink>] {
        dispatch!(self, node => node.links())
    }

    fn links_mut(&mut self) -> &mut [Option<NodeLink>] {
        dispatch!(self, node => node.links_mut())
    }
}

impl From<CenterNode> for TileNode {
    fn from(node: CenterNode) -> Self {
        Self::Center(node)
    }
}

impl From<SideNode> for TileNode {
    fn from(node: SideNode) -> Self {
        Self::Side(node)
    }
}

impl From<CornerNode> for TileNode {
    fn from(node: CornerNode) -> Self {
        Self::Corner(node)
    }
}

impl From<DegenerateCornerNode> for TileNode {
    fn from(node: DegenerateCornerNode) -> Self {
        Self::Degenerate(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::arena::ArenaHandle;

    fn force(index: usize) -> ForceIndex {
        ForceIndex::new(index)
    }

    fn link(slot: u32, map: MapType) -> NodeLink {
        NodeLink::new(NodeId::from_parts(slot, 0), map)
    }

    #[test]
    fn test_side_node_slots() {
        let mut side = SideNode::new(GridPoint::new(1, 0, 0), true, force(0));
        let identity = |slot| link(slot, MapType::Identity);
        assert!(side.set_neighbor(LocalDirection::D2, identity(1)));
        assert!(!side.set_neighbor(LocalDirection::D1, identity(2)));
        assert_eq!(
            side.neighbor_index(LocalDirection::D2),
            Some(NodeId::from_parts(1, 0))
        );
        assert_eq!(side.neighbor(LocalDirection::D0), None);
        assert_eq!(side.neighbor(LocalDirection::D1), None);

        let vertical = SideNode::new(GridPoint::new(0, 1, 0), false, force(1));
        assert_eq!(vertical.slot_index(LocalDirection::D3), Some(1));
        assert_eq!(vertical.slot_index(LocalDirection::D0), None);
    }

    #[test]
    fn test_map_to_neighbor() {
        let mut center = CenterNode::new(
            GridPoint::ORIGIN,
            TileType::XyFront,
            TileId::from_parts(0, 0),
            force(0),
        );
        center.set_neighbor(LocalDirection::D1, link(3, MapType::Rotate90));
        assert_eq!(
            center.map_to_neighbor(LocalDirection::D0, LocalDirection::D1),
            Some(LocalDirection::D1)
        );
        assert_eq!(
            center.map_to_neighbor(LocalDirection::D0, LocalDirection::D2),
            None
        );
        assert_eq!(center.neighbor(LocalDirection::Static), None);
    }

    #[test]
    fn test_corner_slots_and_wipe() {
        let mut corner: TileNode =
            CornerNode::new(GridPoint::new(1, 1, 0), force(0)).into();
        let rotated = link(4, MapType::Rotate180);
        assert!(corner.set_neighbor(LocalDirection::D23, rotated));
        assert!(!corner.set_neighbor(LocalDirection::D0, rotated));
        assert_eq!(corner.connections(), vec![(LocalDirection::D23, rotated)]);
        corner.wipe();
        assert!(corner.connections().is_empty());
        assert_eq!(corner.kind(), NodeKind::Corner);
    }

    #[test]
    fn test_degenerate_pairs() {
        let mut degen =
            DegenerateCornerNode::new(GridPoint::new(1, 1, 0), force(0));
        let pair = |slot, diagonal| ComponentPair {
            center: NodeId::from_parts(slot, 0),
            diagonal,
            components: [0, 1],
        };
        degen.add_degen_pair(pair(1, LocalDirection::D01));
        degen.add_degen_pair(pair(2, LocalDirection::D23));
        assert_eq!(degen.component_count(), 4);
        assert_eq!(degen.neighbor(LocalDirection::D01), None);

        let removed = degen.remove_pairs(|pair| pair.center.slot() == 1);
        assert_eq!(removed, vec![pair(1, LocalDirection::D01)]);
        assert_eq!(degen.pairs(), &[pair(2, LocalDirection::D23)]);
    }
}
