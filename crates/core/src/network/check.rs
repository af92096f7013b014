use super::{NodeId, NodeKind, NodeNeighbors, TileNode, TileNodeNetwork};
use crate::{
    tile::{TileId, TileLink},
    timed,
    tnav::{LocalDirection, MapType},
};
use anyhow::{anyhow, bail, ensure, Context};
use fnv::FnvHashSet;

impl TileNodeNetwork {
    /// Verify every structural invariant of the network: tile pairing, link
    /// symmetry, no dangling handles, corner membership matching the walks
    /// around each vertex, and tile neighbor caches. Returns the first
    /// violation found. This walks the whole graph, so it's meant for tests
    /// and debugging, not for every frame.
    pub fn check_consistency(&self) -> anyhow::Result<()> {
        timed!("Consistency check", log::Level::Trace, {
            for (id, node) in self.nodes.iter() {
                self.check_node(id, node).with_context(|| {
                    format!("in node {} ({})", id, node.kind())
                })?;
            }
            self.check_tiles()?;
            self.check_corners()
        })
    }

    fn check_tiles(&self) -> anyhow::Result<()> {
        for (id, tile) in self.tiles.iter() {
            let sibling = self
                .tile(tile.sibling())
                .ok_or_else(|| anyhow!("tile {} has a dead sibling", id))?;
            ensure!(
                sibling.sibling() == id,
                "tile {} is not its sibling's sibling",
                id
            );
            ensure!(
                sibling.tile_type() == tile.tile_type().sibling()
                    && sibling.position() == tile.position(),
                "tile {} and its sibling don't share a square",
                id
            );
            if tile.tile_type().is_front() {
                ensure!(
                    self.tile_at(tile.position()) == Some(id),
                    "tile {} is missing from the position index",
                    id
                );
            }

            let center = self
                .node(tile.center())
                .and_then(TileNode::as_center)
                .ok_or_else(|| anyhow!("tile {} has no center node", id))?;
            ensure!(
                center.tile() == id && center.tile_type() == tile.tile_type(),
                "tile {} and its center node disagree",
                id
            );

            let expected = self.expected_tile_neighbors(tile.center());
            ensure!(
                tile.neighbors() == &expected,
                "tile {} has stale neighbors {:?}, expected {:?}",
                id,
                tile.neighbors(),
                expected
            );
        }
        Ok(())
    }

    fn expected_tile_neighbors(
        &self,
        center: NodeId,
    ) -> [Option<TileLink>; 4] {
        LocalDirection::ORTHOGONALS.map(|dir| {
            let (node, map) = self.second_neighbor(center, dir)?;
            let tile = self.node(node)?.as_center()?.tile();
            Some(TileLink { tile, map })
        })
    }

    fn check_node(&self, id: NodeId, node: &TileNode) -> anyhow::Result<()> {
        ensure!(
            self.nodes_at(node.position()).contains(&id),
            "node is missing from the position index at {}",
            node.position()
        );
        ensure!(
            self.forces.owner(node.force()) == Some(id),
            "force block {} is owned by {:?}",
            node.force(),
            self.forces.owner(node.force())
        );

        for (dir, link) in node.connections() {
            let other = self.node(link.node).ok_or_else(|| {
                anyhow!("link {} points at dead node {}", dir, link.node)
            })?;
            if let Some(degen) = other.as_degenerate() {
                ensure!(
                    node.kind() == NodeKind::Center
                        && link.map == MapType::Identity,
                    "bad link {} into degenerate corner {}",
                    dir,
                    link.node
                );
                ensure!(
                    degen.pairs().iter().any(|pair| pair.center == id
                        && pair.diagonal == dir),
                    "degenerate corner {} doesn't track quadrant {}",
                    link.node,
                    dir
                );
                continue;
            }

            let back_dir = link.map.map(dir.inverse());
            let back = other.neighbor(back_dir);
            ensure!(
                back.map(|back| (back.node, back.map))
                    == Some((id, link.map.inverse())),
                "link {} to {} is not mirrored, {} has {:?} at {}",
                dir,
                link.node,
                link.node,
                back,
                back_dir
            );
        }

        match node {
            TileNode::Center(center) => {
                ensure!(
                    center.links().iter().all(Option::is_some),
                    "center node is not fully connected"
                );
            }
            TileNode::Side(side) => {
                ensure!(
                    side.links().iter().all(Option::is_some),
                    "side node is missing an endpoint"
                );
                for (dir, link) in side.connections() {
                    ensure!(
                        self.node(link.node).map(TileNode::kind)
                            == Some(NodeKind::Center),
                        "side link {} doesn't lead to a center",
                        dir
                    );
                }
            }
            TileNode::Corner(corner) => {
                ensure!(
                    corner.links().iter().all(Option::is_some),
                    "corner node is missing a quadrant"
                );
            }
            TileNode::Degenerate(degen) => {
                ensure!(
                    !degen.pairs().is_empty(),
                    "degenerate corner has no quadrants"
                );
                for pair in degen.pairs() {
                    let center = self
                        .node(pair.center)
                        .and_then(TileNode::as_center)
                        .ok_or_else(|| {
                            anyhow!("quadrant of dead center {}", pair.center)
                        })?;
                    let force = center.force();
                    let (first, second) = pair.diagonal.components();
                    let [first_index, second_index] = pair.components;
                    ensure!(
                        force.component(first) == Some(first_index)
                            && force.component(second) == Some(second_index),
                        "quadrant {} ({}) has wrong force components",
                        pair.center,
                        pair.diagonal
                    );
                    let link = center.neighbor(pair.diagonal);
                    ensure!(
                        link.map(|link| (link.node, link.map))
                            == Some((id, MapType::Identity)),
                        "quadrant {} ({}) doesn't link back",
                        pair.center,
                        pair.diagonal
                    );
                }
            }
        }
        Ok(())
    }

    /// Every corner must hold exactly the quadrants of its group around the
    /// vertex, and be a full corner exactly when the group closes in 4
    fn check_corners(&self) -> anyhow::Result<()> {
        for (id, node) in self.nodes.iter() {
            let center = match node.as_center() {
                Some(center) => center,
                None => continue,
            };
            for diagonal in LocalDirection::DIAGONALS {
                let corner = match center.neighbor(diagonal) {
                    Some(link) => link.node,
                    None => {
                        bail!("center {} has no corner at {}", id, diagonal)
                    }
                };
                let (members, is_full) = self.corner_group(id, diagonal);
                let walk: FnvHashSet<(NodeId, LocalDirection)> = members
                    .iter()
                    .map(|member| (member.center, member.diagonal))
                    .collect();
                let kind = self.node(corner).map(TileNode::kind);
                ensure!(
                    matches!(
                        kind,
                        Some(NodeKind::Corner | NodeKind::Degenerate)
                    ),
                    "center {} links to {:?} at {}",
                    id,
                    kind,
                    diagonal
                );
                let tracked: FnvHashSet<(NodeId, LocalDirection)> =
                    self.corner_quadrants(corner).into_iter().collect();
                ensure!(
                    walk == tracked,
                    "corner {} at {} ({}) tracks {:?}, expected {:?}",
                    corner,
                    id,
                    diagonal,
                    tracked,
                    walk
                );
                let is_corner = kind == Some(NodeKind::Corner);
                ensure!(
                    is_corner == is_full,
                    "corner {} has the wrong kind for {} quadrants",
                    corner,
                    members.len()
                );
            }
        }
        Ok(())
    }

    /// Tiles whose cached neighbors disagree with the node graph. Always
    /// empty for a consistent network.
    pub fn stale_tiles(&self) -> Vec<TileId> {
        self.tiles
            .iter()
            .filter(|(_, tile)| {
                let expected = self.expected_tile_neighbors(tile.center());
                tile.neighbors() != &expected
            })
            .map(|(id, _)| id)
            .collect()
    }
}
