use super::{NodeId, NodeKind, NodeNeighbors, TileNodeNetwork};
use crate::tnav::LocalDirection;
use log::trace;

impl TileNodeNetwork {
    /// Move the force held by a center node one hop along its own direction.
    /// Orthogonal forces cross the side node into the neighboring center,
    /// diagonal forces cross the corner node into the center across the
    /// corner. Either way the force is cleared here and written into the
    /// destination remapped into its frame. A diagonal force that points into
    /// a degenerate corner has nowhere to go and bounces back (inverts) in
    /// place instead.
    ///
    /// Returns the node now holding the force, or `None` if the node isn't a
    /// center or its force is static or invalid.
    pub fn propagate_force(&mut self, center: NodeId) -> Option<NodeId> {
        let force = self.nodes.get(center)?.as_center()?.force();
        let direction = self.forces.get_force(force)?;

        let (destination, map) = if direction.is_orthogonal() {
            self.second_neighbor(center, direction)?
        } else if direction.is_diagonal() {
            let link = self.node_ref(center).neighbor(direction)?;
            if self.node_ref(link.node).kind() == NodeKind::Degenerate {
                trace!(
                    "Force {} on {} bounced off degenerate corner {}",
                    direction,
                    center,
                    link.node
                );
                self.forces.set_force(force, direction.inverse());
                return Some(center);
            }
            self.diagonal_neighbor(center, direction)?
        } else {
            return None;
        };

        let destination_force = self.node_ref(destination).force();
        self.forces.set_force(force, LocalDirection::Static);
        self.forces.set_force(destination_force, map.map(direction));
        Some(destination)
    }

    /// Bounce every force that points straight into a degenerate corner: any
    /// quadrant whose two component flags towards the corner are both set
    /// gets its force inverted. Returns the number of forces inverted.
    pub fn invert_degenerate_forces(&mut self) -> usize {
        let mut bounced = Vec::new();
        for (_, node) in self.nodes.iter() {
            if let Some(degen) = node.as_degenerate() {
                for pair in degen.pairs() {
                    let [first, second] = pair.components;
                    if self.forces.component(first)
                        && self.forces.component(second)
                    {
                        bounced.push((pair.center, pair.diagonal));
                    }
                }
            }
        }

        for (center, diagonal) in &bounced {
            let force = self.node_ref(*center).force();
            self.forces.set_force(force, diagonal.inverse());
        }
        bounced.len()
    }
}
