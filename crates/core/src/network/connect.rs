use super::{HandleSet, NodeId, NodeKind, TileNodeNetwork};
use crate::{
    grid::ConnectionPriority, tile::TileId, tnav::LocalDirection,
};
use log::{trace, warn};

/// A center node along with its direction towards some edge
type EdgeEnd = (NodeId, LocalDirection);

impl TileNodeNetwork {
    /// Wire up all 4 edges of a freshly created tile pair. On each edge the
    /// pair either wraps around to itself, or gets spliced into the side node
    /// whose two tiles it sits between. Returns the other tiles whose
    /// neighbors changed.
    pub(super) fn connect_tile_pair(
        &mut self,
        front: NodeId,
        back: NodeId,
    ) -> HandleSet<TileId> {
        let (position, front_type) = {
            let center = self.center(front);
            (center.position(), center.tile_type())
        };
        let mut dirty_tiles = HandleSet::default();

        for dir in LocalDirection::ORTHOGONALS {
            let back_dir = front_type.sibling_direction(dir);
            let edge = position.translate(front_type.direction_vector(dir));
            let sides: Vec<NodeId> = self
                .nodes_at(edge)
                .iter()
                .copied()
                .filter(|node| self.node_ref(*node).kind() == NodeKind::Side)
                .collect();

            let mut spliced = false;
            for side in &sides {
                if let Some(tiles) =
                    self.splice_side(*side, (front, dir), (back, back_dir))
                {
                    dirty_tiles.extend(tiles);
                    spliced = true;
                    break;
                }
            }

            if !spliced {
                if !sides.is_empty() {
                    warn!(
                        "No side node at {} accepts the tile pair at {}, \
                        wrapping it around to itself",
                        edge, position
                    );
                }
                self.create_side(front, dir, back, back_dir);
            }
        }
        dirty_tiles
    }

    /// Try to fit a new tile pair between the two tiles of an existing side
    /// node. If one of the new tiles wraps around the side's first endpoint
    /// more tightly than its current partner does, the side gets relinked to
    /// that tile, and the other new tile gets a new side to the old partner.
    /// Returns the tiles of both old endpoints if the splice happened.
    fn splice_side(
        &mut self,
        side: NodeId,
        front: EdgeEnd,
        back: EdgeEnd,
    ) -> Option<[TileId; 2]> {
        let [(_, anchor, anchor_dir), (partner_slot, partner, partner_dir)] =
            self.side_endpoints(side);
        let priority = |other: NodeId| -> ConnectionPriority {
            let anchor = self.center(anchor);
            let other = self.center(other);
            anchor.tile_type().connection_priority(
                anchor.position(),
                anchor_dir,
                other.tile_type(),
                other.position(),
            )
        };
        let current = priority(partner);
        let front_priority = priority(front.0);
        let back_priority = priority(back.0);

        // Ties go to the front tile
        let (winner, winner_priority, loser) = if back_priority < front_priority
        {
            (back, back_priority, front)
        } else {
            (front, front_priority, back)
        };
        if winner_priority >= current {
            return None;
        }

        trace!(
            "Splicing side node {}: {} ({}) beats {} ({})",
            side,
            winner.0,
            winner_priority,
            partner,
            current
        );
        self.link_side(side, partner_slot, winner.0, winner.1);
        self.create_side(loser.0, loser.1, partner, partner_dir);
        Some([self.center(anchor).tile(), self.center(partner).tile()])
    }
}
