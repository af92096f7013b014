use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// One of the 8 directions relative to a single tile's own frame, plus
/// [LocalDirection::Static] for "no direction". The 4 orthogonal directions
/// run counter-clockwise (`D0` is `+u`, `D1` is `+v`, `D2` is `-u`, `D3` is
/// `-v`), and each diagonal combines two adjacent orthogonals.
///
/// The discriminants double as table indices: orthogonals are `0..4`,
/// diagonals `4..8`, and `Static` is 8.
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
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
pub enum LocalDirection {
    #[strum(serialize = "0")]
    D0 = 0,
    #[strum(serialize = "1")]
    D1 = 1,
    #[strum(serialize = "2")]
    D2 = 2,
    #[strum(serialize = "3")]
    D3 = 3,
    #[strum(serialize = "0_1")]
    D01 = 4,
    #[strum(serialize = "1_2")]
    D12 = 5,
    #[strum(serialize = "2_3")]
    D23 = 6,
    #[strum(serialize = "3_0")]
    D30 = 7,
    #[strum(serialize = "static")]
    Static = 8,
}

use LocalDirection::*;

/// Every direction, in table order
const ALL_DIRECTIONS: [LocalDirection; 9] =
    [D0, D1, D2, D3, D01, D12, D23, D30, Static];

const INVERSE: [LocalDirection; 9] =
    [D2, D3, D0, D1, D23, D30, D01, D12, Static];

const COMPONENTS: [(LocalDirection, LocalDirection); 9] = [
    (D0, D0),
    (D1, D1),
    (D2, D2),
    (D3, D3),
    (D0, D1),
    (D1, D2),
    (D2, D3),
    (D3, D0),
    (Static, Static),
];

/// Symmetric: equal or opposite directions have no combination
const COMBINE: [[Option<LocalDirection>; 4]; 4] = [
    [None, Some(D01), None, Some(D30)],
    [Some(D01), None, Some(D12), None],
    [None, Some(D12), None, Some(D23)],
    [Some(D30), None, Some(D23), None],
];

impl LocalDirection {
    pub const ORTHOGONALS: [Self; 4] = [D0, D1, D2, D3];
    pub const DIAGONALS: [Self; 4] = [D01, D12, D23, D30];

    /// Table index of this direction
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [Self::index]. `None` for anything outside `0..=8`.
    pub fn from_index(index: usize) -> Option<Self> {
        ALL_DIRECTIONS.get(index).copied()
    }

    /// The orthogonal direction `index % 4`
    pub fn orthogonal(index: usize) -> Self {
        Self::ORTHOGONALS[index % 4]
    }

    /// The diagonal that starts at orthogonal `index % 4` and turns
    /// counter-clockwise, e.g. 0 gives `D01` and 3 gives `D30`
    pub fn diagonal(index: usize) -> Self {
        Self::DIAGONALS[index % 4]
    }

    pub fn is_orthogonal(self) -> bool {
        self.index() < 4
    }

    pub fn is_diagonal(self) -> bool {
        (4..8).contains(&self.index())
    }

    /// The opposite direction. `Static` is its own inverse.
    pub fn inverse(self) -> Self {
        INVERSE[self.index()]
    }

    /// Split a diagonal into its two orthogonal components, in
    /// counter-clockwise order. Orthogonals (and `Static`) return themselves
    /// twice.
    pub fn components(self) -> (Self, Self) {
        COMPONENTS[self.index()]
    }

    /// Combine two adjacent orthogonal directions into their diagonal. Returns
    /// `None` if either input isn't orthogonal, or if they're equal or
    /// opposite.
    pub fn combine(self, other: Self) -> Option<Self> {
        if self.is_orthogonal() && other.is_orthogonal() {
            COMBINE[self.index()][other.index()]
        } else {
            None
        }
    }

    /// For a diagonal, the component that isn't `component`. `None` if
    /// `component` isn't one of this direction's components.
    pub fn other_component(self, component: Self) -> Option<Self> {
        let (first, second) = self.components();
        if !self.is_diagonal() {
            None
        } else if first == component {
            Some(second)
        } else if second == component {
            Some(first)
        } else {
            None
        }
    }
}

impl Default for LocalDirection {
    fn default() -> Self {
        Static
    }
}
