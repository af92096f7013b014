use serde::{Deserialize, Serialize};
use validator::Validate;

/// Configuration for a [TileNodeNetwork](crate::TileNodeNetwork). The graph
/// a network builds never depends on any of these. They only tune
/// allocation, safety limits and debug output.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct NetworkConfig {
    /// Number of tile pairs to pre-allocate space for. Each tile pair creates
    /// 2 tiles and around 8 nodes, so the node arena is sized accordingly.
    /// This is only a hint, everything grows as needed.
    #[validate(range(max = 1000000))]
    pub initial_capacity: usize,

    /// Upper bound on the number of tile quadrants met while walking around
    /// a single corner. At most 12 tile pairs can meet at a lattice vertex,
    /// which gives 24 quadrants, so a walk that goes further means the graph
    /// is corrupt and the network panics instead of looping forever.
    #[validate(range(min = 24, max = 256))]
    pub max_corner_valence: usize,

    /// Give each tile its per-type debug color. If disabled, all tiles are
    /// white.
    pub debug_colors: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 64,
            max_corner_valence: 24,
            debug_colors: true,
        }
    }
}
