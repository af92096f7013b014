//! Per-node directional force flags. Every node in the network owns one
//! block of 4 flags, one per orthogonal direction of the node's frame. A
//! block reads as a single [LocalDirection]: no flags is `Static`, one flag
//! is an orthogonal direction, and two adjacent flags make a diagonal.

use crate::{network::NodeId, tnav::LocalDirection, tnav::MapType};
use derive_more::Display;
use log::trace;
use serde::{Deserialize, Serialize};

/// Flags set for each direction, in [LocalDirection] table order
const FORCE_MASKS: [[bool; 4]; 9] = [
    [true, false, false, false],
    [false, true, false, false],
    [false, false, true, false],
    [false, false, false, true],
    [true, true, false, false],
    [false, true, true, false],
    [false, false, true, true],
    [true, false, false, true],
    [false, false, false, false],
];

/// Index of one 4-flag block in a [ForceList]. Blocks never move, so an index
/// stays valid until its block is removed.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    Serialize,
    Deserialize,
)]
pub struct ForceIndex(usize);

impl ForceIndex {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// Index of a single flag in [ForceList::flags]
    pub fn component(self, dir: LocalDirection) -> Option<usize> {
        if dir.is_orthogonal() {
            Some(self.0 * 4 + dir.index())
        } else {
            None
        }
    }
}

/// Flat array of force flags, 4 per block, with free-list reuse of removed
/// blocks. Removing the last block shrinks the array; removing any other
/// block clears it and queues it for reuse in place, so no index ever shifts.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ForceList {
    flags: Vec<bool>,
    owners: Vec<Option<NodeId>>,
    free_blocks: Vec<usize>,
}

impl ForceList {
    pub fn with_capacity(blocks: usize) -> Self {
        Self {
            flags: Vec::with_capacity(blocks * 4),
            owners: Vec::with_capacity(blocks),
            free_blocks: Vec::new(),
        }
    }

    /// Allocate a block for the given node, initialized to `direction`
    pub fn add_force(
        &mut self,
        direction: LocalDirection,
        owner: NodeId,
    ) -> ForceIndex {
        let index = match self.free_blocks.pop() {
            Some(block) => {
                self.owners[block] = Some(owner);
                ForceIndex(block)
            }
            None => {
                self.flags.extend_from_slice(&[false; 4]);
                self.owners.push(Some(owner));
                ForceIndex(self.owners.len() - 1)
            }
        };
        self.set_force(index, direction);
        index
    }

    /// Release a block. The tail block is truncated away, any other block is
    /// reset to `Static` and kept for reuse.
    pub fn remove_force(&mut self, index: ForceIndex) {
        let block = index.get();
        if block >= self.owners.len() || self.owners[block].is_none() {
            trace!("Ignoring removal of unused force block {}", block);
            return;
        }

        if block + 1 == self.owners.len() {
            self.owners.pop();
            self.flags.truncate(block * 4);
            // Trailing blocks that were already free can go too
            while let Some(None) = self.owners.last() {
                let last = self.owners.len() - 1;
                self.owners.pop();
                self.flags.truncate(last * 4);
                self.free_blocks.retain(|free| *free != last);
            }
        } else {
            self.set_force(index, LocalDirection::Static);
            self.owners[block] = None;
            self.free_blocks.push(block);
        }
    }

    /// Read a block as a direction. `None` if the block doesn't exist or its
    /// flags don't form a valid direction (e.g. two opposite flags).
    pub fn get_force(&self, index: ForceIndex) -> Option<LocalDirection> {
        let start = index.get() * 4;
        let block = self.flags.get(start..start + 4)?;
        FORCE_MASKS
            .iter()
            .position(|mask| mask[..] == *block)
            .and_then(LocalDirection::from_index)
    }

    /// Overwrite a block with the flags for `direction`
    pub fn set_force(&mut self, index: ForceIndex, direction: LocalDirection) {
        let start = index.get() * 4;
        let mask = FORCE_MASKS[direction.index()];
        if let Some(block) = self.flags.get_mut(start..start + 4) {
            block.copy_from_slice(&mask);
        }
    }

    /// Remap the direction stored in a block into another frame. `Static` is
    /// a fixed point of every map, and invalid blocks are left alone.
    pub fn alter_force(&mut self, index: ForceIndex, map: MapType) {
        match self.get_force(index) {
            Some(LocalDirection::Static) | None => {}
            Some(direction) => self.set_force(index, map.map(direction)),
        }
    }

    /// A single flag, by flat index (see [ForceIndex::component])
    pub fn component(&self, flat_index: usize) -> bool {
        self.flags.get(flat_index).copied().unwrap_or(false)
    }

    pub fn set_component(&mut self, flat_index: usize, active: bool) {
        if let Some(flag) = self.flags.get_mut(flat_index) {
            *flag = active;
        }
    }

    /// The node that owns a block, if the block is in use
    pub fn owner(&self, index: ForceIndex) -> Option<NodeId> {
        self.owners.get(index.get()).copied().flatten()
    }

    /// All flags, 4 per block
    pub fn flags(&self) -> &[bool] {
        &self.flags
    }

    /// Number of blocks in use
    pub fn len(&self) -> usize {
        self.owners.len() - self.free_blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of blocks in the array, used or free
    pub fn block_count(&self) -> usize {
        self.owners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::arena::ArenaHandle;
    use strum::IntoEnumIterator;

    fn node(slot: u32) -> NodeId {
        NodeId::from_parts(slot, 0)
    }

    #[test]
    fn test_get_set_round_trip() {
        let mut forces = ForceList::default();
        let index = forces.add_force(LocalDirection::Static, node(0));
        for dir in LocalDirection::iter() {
            forces.set_force(index, dir);
            assert_eq!(forces.get_force(index), Some(dir));
        }
    }

    #[test]
    fn test_invalid_mask() {
        let mut forces = ForceList::default();
        let index = forces.add_force(LocalDirection::D0, node(0));
        let opposite = index.component(LocalDirection::D2).unwrap();
        forces.set_component(opposite, true);
        assert_eq!(forces.get_force(index), None);
        assert_eq!(forces.get_force(ForceIndex(5)), None);
    }

    #[test]
    fn test_alter_force() {
        let mut forces = ForceList::default();
        let moving = forces.add_force(LocalDirection::D01, node(0));
        let still = forces.add_force(LocalDirection::Static, node(1));
        forces.alter_force(moving, MapType::Rotate90);
        forces.alter_force(still, MapType::Rotate90);
        assert_eq!(forces.get_force(moving), Some(LocalDirection::D12));
        assert_eq!(forces.get_force(still), Some(LocalDirection::Static));
    }

    #[test]
    fn test_slots_never_shift() {
        let mut forces = ForceList::default();
        let a = forces.add_force(LocalDirection::D0, node(0));
        let b = forces.add_force(LocalDirection::D1, node(1));
        let c = forces.add_force(LocalDirection::D2, node(2));

        forces.remove_force(a);
        assert_eq!(forces.get_force(b), Some(LocalDirection::D1));
        assert_eq!(forces.get_force(c), Some(LocalDirection::D2));
        assert_eq!(forces.owner(a), None);

        // The freed block is reused in place
        let d = forces.add_force(LocalDirection::D3, node(3));
        assert_eq!(d, a);
        assert_eq!(forces.get_force(c), Some(LocalDirection::D2));
        assert_eq!(forces.owner(d), Some(node(3)));
    }

    #[test]
    fn test_tail_truncation() {
        let mut forces = ForceList::default();
        let a = forces.add_force(LocalDirection::D0, node(0));
        let b = forces.add_force(LocalDirection::D1, node(1));
        let c = forces.add_force(LocalDirection::D2, node(2));
        forces.remove_force(b);
        forces.remove_force(c);
        // Removing the tail also drops the free block before it
        assert_eq!(forces.block_count(), 1);
        assert_eq!(forces.flags().len(), 4);
        assert_eq!(forces.len(), 1);
        assert_eq!(forces.get_force(a), Some(LocalDirection::D0));
        let d = forces.add_force(LocalDirection::Static, node(3));
        assert_eq!(d.get(), 1);
    }
}
