//! Corner bookkeeping. Corner membership is defined by walking around a
//! vertex: from a tile quadrant, step across one of the quadrant's two edges
//! and continue around the vertex until the walk comes back to where it
//! started. A walk of exactly 4 quadrants gets a [CornerNode]. Otherwise the
//! walk is cut wherever it wraps over a free edge onto the other face of the
//! same tile, and each run gets its own [DegenerateCornerNode], so the top
//! and bottom of a surface keep separate corners. The walk of a lone tile
//! pair (front, then back) isn't cut.

use super::{
    ComponentPair, CornerNode, DegenerateCornerNode, NodeId, NodeKind,
    NodeLink, NodeNeighbors, TileNode, TileNodeNetwork,
};
use crate::{
    grid::GridPoint,
    tnav::{LocalDirection, MapType},
    unwrap,
};
use fnv::FnvHashSet;
use log::trace;
use serde::Serialize;
use std::collections::VecDeque;

/// A tile quadrant: a center node plus the diagonal pointing at the vertex
type Quadrant = (NodeId, LocalDirection);

/// One quadrant on the walk around a vertex
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CornerMember {
    pub center: NodeId,
    pub diagonal: LocalDirection,
    /// Map from the frame of the first member of the walk into this
    /// member's frame
    pub map: MapType,
}

impl CornerMember {
    fn quadrant(&self) -> Quadrant {
        (self.center, self.diagonal)
    }
}

impl TileNodeNetwork {
    /// Walk around the vertex at one diagonal of a center node, returning
    /// every quadrant that meets there, starting with the given one. `None`
    /// if the node isn't a center or the direction isn't a diagonal.
    pub fn trace_corner(
        &self,
        center: NodeId,
        diagonal: LocalDirection,
    ) -> Option<Vec<CornerMember>> {
        self.nodes.get(center)?.as_center()?;
        if diagonal.is_diagonal() {
            Some(self.trace(center, diagonal))
        } else {
            None
        }
    }

    pub(super) fn trace(
        &self,
        start: NodeId,
        start_diagonal: LocalDirection,
    ) -> Vec<CornerMember> {
        let max_valence = self.config.max_corner_valence;
        let mut members = Vec::with_capacity(4);
        let mut center = start;
        let mut diagonal = start_diagonal;
        let mut cross = start_diagonal.components().0;
        let mut map = MapType::Identity;

        loop {
            members.push(CornerMember {
                center,
                diagonal,
                map,
            });
            let along = unwrap!(
                diagonal.other_component(cross),
                "{} is not a component of {}",
                cross,
                diagonal
            );
            let (next, hop) = unwrap!(
                self.second_neighbor(center, cross),
                "center {} has no neighbor in direction {}",
                center,
                cross
            );

            // The edge we crossed is now behind us, and the edge we walked
            // along is the next one to cross
            let next_cross = hop.map(along);
            diagonal = unwrap!(
                hop.map(cross).inverse().combine(next_cross),
                "walk around corner of {} lost its quadrant",
                start
            );
            cross = next_cross;
            map = map.combine(hop);
            center = next;

            if center == start && diagonal == start_diagonal {
                break;
            }
            assert!(
                members.len() < max_valence,
                "corner at {} ({}) has more than {} quadrants",
                start,
                start_diagonal,
                max_valence
            );
        }

        if members.len() == 4 {
            assert_eq!(
                map,
                MapType::Identity,
                "walk around corner at {} ({}) does not close",
                start,
                start_diagonal
            );
        }
        members
    }

    /// The quadrants that share a corner node with the given one, and
    /// whether they make up a full corner
    pub(super) fn corner_group(
        &self,
        start: NodeId,
        start_diagonal: LocalDirection,
    ) -> (Vec<CornerMember>, bool) {
        let members = self.trace(start, start_diagonal);
        let len = members.len();
        if len == 2 || len == 4 {
            return (members, len == 4);
        }

        // A hop wraps when it lands on the other face of the same tile
        let wraps: Vec<bool> = (0..len)
            .map(|i| {
                let next = members[(i + 1) % len].center;
                self.center(members[i].center).position()
                    == self.center(next).position()
            })
            .collect();
        if !wraps.contains(&true) {
            return (members, false);
        }

        let mut first = 0;
        while !wraps[(first + len - 1) % len] {
            first = (first + len - 1) % len;
        }
        let mut group = Vec::new();
        let mut i = first;
        loop {
            group.push(members[i]);
            if wraps[i] {
                break;
            }
            i = (i + 1) % len;
        }
        (group, false)
    }

    /// The quadrants currently attached to a corner or degenerate corner
    pub(super) fn corner_quadrants(&self, node: NodeId) -> Vec<Quadrant> {
        match self.node_ref(node) {
            TileNode::Degenerate(degen) => degen
                .pairs()
                .iter()
                .map(|pair| (pair.center, pair.diagonal))
                .collect(),
            TileNode::Corner(corner) => corner
                .connections()
                .into_iter()
                .map(|(slot, link)| (link.node, link.map.map(slot.inverse())))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn add_degen_node(
        &mut self,
        position: GridPoint,
        quadrants: &[Quadrant],
    ) -> NodeId {
        let degen = self.add_node(|force| {
            DegenerateCornerNode::new(position, force).into()
        });
        for (center, diagonal) in quadrants {
            self.add_degen_pair(degen, *center, *diagonal);
        }
        degen
    }

    fn add_degen_pair(
        &mut self,
        degen: NodeId,
        center: NodeId,
        diagonal: LocalDirection,
    ) {
        let force = self.center(center).force();
        let (first, second) = diagonal.components();
        let component = |dir| {
            unwrap!(
                force.component(dir),
                "{} is not an orthogonal direction",
                dir
            )
        };
        let pair = ComponentPair {
            center,
            diagonal,
            components: [component(first), component(second)],
        };
        unwrap!(
            self.node_mut(degen).as_degenerate_mut(),
            "node {} is not a degenerate corner",
            degen
        )
        .add_degen_pair(pair);
        self.node_mut(center)
            .set_neighbor(diagonal, NodeLink::new(degen, MapType::Identity));
    }

    /// Replace a corner node with a degenerate corner holding the same
    /// quadrants
    fn demote_corner(&mut self, corner: NodeId) -> NodeId {
        let quadrants = self.corner_quadrants(corner);
        let position = self.free_node(corner).position();
        let degen = self.add_degen_node(position, &quadrants);
        trace!("Demoted corner {} at {} to {}", corner, position, degen);
        degen
    }

    /// Replace a degenerate corner with a full corner node. The degenerate
    /// node must hold one quadrant of a closed walk of 4.
    fn promote_degenerate(&mut self, degen: NodeId) -> NodeId {
        let first = unwrap!(
            self.node_ref(degen)
                .as_degenerate()
                .and_then(|node| node.pairs().first().copied()),
            "cannot promote {}, it has no quadrants",
            degen
        );
        let members = self.trace(first.center, first.diagonal);
        assert_eq!(members.len(), 4, "cannot promote {}", degen);

        let position = self.free_node(degen).position();
        let corner =
            self.add_node(|force| CornerNode::new(position, force).into());
        for member in &members {
            let slot = member.map.inverse().map(member.diagonal.inverse());
            self.node_mut(corner)
                .set_neighbor(slot, NodeLink::new(member.center, member.map));
            self.node_mut(member.center).set_neighbor(
                member.diagonal,
                NodeLink::new(corner, member.map.inverse()),
            );
        }
        trace!("Promoted {} at {} to corner {}", degen, position, corner);
        corner
    }

    /// Delete a corner node of either kind, unlinking every quadrant that
    /// pointed at it. Returns those quadrants.
    fn dissolve_corner(&mut self, node: NodeId) -> Vec<Quadrant> {
        let quadrants = self.corner_quadrants(node);
        for (center, diagonal) in &quadrants {
            self.node_mut(*center).clear_neighbor(*diagonal);
        }
        self.free_node(node);
        quadrants
    }

    /// Drop a dying tile pair's quadrants from a corner. The corner is
    /// demoted first (a corner missing quadrants can't stay a full corner),
    /// and freed if nothing is left. Returns the centers still attached, so
    /// their corners can be rebuilt.
    pub(super) fn detach_from_corner(
        &mut self,
        node: NodeId,
        front: NodeId,
        back: NodeId,
    ) -> Vec<NodeId> {
        let degen = if self.node_ref(node).kind() == NodeKind::Corner {
            self.demote_corner(node)
        } else {
            node
        };
        let node = unwrap!(
            self.node_mut(degen).as_degenerate_mut(),
            "node {} is not a corner",
            degen
        );
        let removed = node.remove_pairs(|pair| {
            pair.center == front || pair.center == back
        });
        let remaining: Vec<NodeId> =
            node.pairs().iter().map(|pair| pair.center).collect();

        for pair in removed {
            self.node_mut(pair.center).clear_neighbor(pair.diagonal);
        }
        if remaining.is_empty() {
            self.free_node(degen);
        }
        remaining
    }

    /// Bring the corner nodes around the given centers in line with the
    /// current side links. Every diagonal of every seed is walked; any corner
    /// that doesn't match its group is patched or rebuilt, and quadrants
    /// orphaned by a rebuild are walked in turn.
    pub(super) fn reconnect_corner_nodes(
        &mut self,
        seeds: impl IntoIterator<Item = NodeId>,
    ) {
        let mut queue: VecDeque<Quadrant> = seeds
            .into_iter()
            .flat_map(|center| {
                LocalDirection::DIAGONALS.map(|diagonal| (center, diagonal))
            })
            .collect();

        while let Some((center, diagonal)) = queue.pop_front() {
            if !self.nodes.contains(center) {
                continue;
            }
            let (members, is_full) = self.corner_group(center, diagonal);
            let cycle: FnvHashSet<Quadrant> =
                members.iter().map(CornerMember::quadrant).collect();

            let mut linked: Vec<NodeId> = Vec::new();
            for member in &members {
                if let Some(link) =
                    self.center(member.center).neighbor(member.diagonal)
                {
                    if !linked.contains(&link.node) {
                        linked.push(link.node);
                    }
                }
            }

            // One existing node that covers part of the group can be patched
            if let &[node] = linked.as_slice() {
                let existing = self.corner_quadrants(node);
                if existing.iter().all(|quadrant| cycle.contains(quadrant)) {
                    let is_corner =
                        self.node_ref(node).kind() == NodeKind::Corner;
                    if existing.len() == cycle.len() && is_corner == is_full
                    {
                        continue;
                    }

                    let degen = if is_corner {
                        self.demote_corner(node)
                    } else {
                        node
                    };
                    for member in &members {
                        if !existing.contains(&member.quadrant()) {
                            self.add_degen_pair(
                                degen,
                                member.center,
                                member.diagonal,
                            );
                        }
                    }
                    if is_full {
                        self.promote_degenerate(degen);
                    }
                    continue;
                }
            }

            // Otherwise tear down everything the group touches and start over
            for node in linked {
                for quadrant in self.dissolve_corner(node) {
                    if !cycle.contains(&quadrant) {
                        queue.push_back(quadrant);
                    }
                }
            }
            let position = {
                let center = self.center(center);
                center
                    .position()
                    .translate(center.tile_type().direction_vector(diagonal))
            };
            let quadrants: Vec<Quadrant> =
                members.iter().map(CornerMember::quadrant).collect();
            let degen = self.add_degen_node(position, &quadrants);
            if is_full {
                self.promote_degenerate(degen);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config::NetworkConfig,
        grid::{GridPoint, SuperTileType},
        network::{NodeKind, NodeNeighbors, TileNodeNetwork},
        tile::TileId,
        tnav::{LocalDirection, MapType},
    };

    fn network() -> TileNodeNetwork {
        TileNodeNetwork::new(NetworkConfig::default()).unwrap()
    }

    fn corner_kind(
        network: &TileNodeNetwork,
        tile: TileId,
        diagonal: LocalDirection,
    ) -> NodeKind {
        let center = network.tile(tile).unwrap().center();
        let link = network
            .node(center)
            .unwrap()
            .neighbor(diagonal)
            .unwrap();
        network.node(link.node).unwrap().kind()
    }

    #[test]
    fn test_lone_pair_corners() {
        let mut network = network();
        let front = network
            .create_tile_pair(GridPoint::ORIGIN, SuperTileType::Xy)
            .unwrap();
        let center = network.tile(front).unwrap().center();
        for diagonal in LocalDirection::DIAGONALS {
            let members = network.trace_corner(center, diagonal).unwrap();
            // Front quadrant, then the back quadrant under it
            assert_eq!(members.len(), 2);
            assert_eq!(members[0].map, MapType::Identity);
            assert_eq!(
                corner_kind(&network, front, diagonal),
                NodeKind::Degenerate
            );
        }
        assert_eq!(network.trace_corner(center, LocalDirection::D0), None);
    }

    #[test]
    fn test_four_tiles_share_corner() {
        let mut network = network();
        let tiles: Vec<TileId> = [(0, 0), (2, 0), (0, 2), (2, 2)]
            .iter()
            .map(|(x, y)| {
                let position = GridPoint::new(*x, *y, 0);
                network
                    .create_tile_pair(position, SuperTileType::Xy)
                    .unwrap()
            })
            .collect();
        assert_eq!(
            corner_kind(&network, tiles[0], LocalDirection::D01),
            NodeKind::Corner
        );
        let center = network.tile(tiles[0]).unwrap().center();
        let members = network
            .trace_corner(center, LocalDirection::D01)
            .unwrap();
        assert_eq!(members.len(), 4);
        assert!(members.iter().all(|member| member.map == MapType::Identity));
        network.check_consistency().unwrap();
    }

    #[test]
    fn test_notch_keeps_faces_apart() {
        let mut network = network();
        let tiles: Vec<TileId> = [(0, 0), (2, 0), (0, 2)]
            .iter()
            .map(|(x, y)| {
                let position = GridPoint::new(*x, *y, 0);
                network
                    .create_tile_pair(position, SuperTileType::Xy)
                    .unwrap()
            })
            .collect();
        network.check_consistency().unwrap();

        // One walk covers both faces, but each face gets its own corner
        let center = network.tile(tiles[0]).unwrap().center();
        let back = network.tile(tiles[0]).unwrap().sibling();
        let back_center = network.tile(back).unwrap().center();
        assert_eq!(
            network.trace_corner(center, LocalDirection::D01).unwrap().len(),
            6
        );
        let (front_group, full) =
            network.corner_group(center, LocalDirection::D01);
        assert!(!full);
        assert_eq!(front_group.len(), 3);
        assert!(front_group.iter().all(|member| network
            .center(member.center)
            .tile_type()
            .is_front()));

        let front_corner = network.center(center).neighbor(LocalDirection::D01);
        let back_corner =
            network.center(back_center).neighbor(LocalDirection::D01);
        assert_ne!(front_corner.unwrap().node, back_corner.unwrap().node);
    }
}
