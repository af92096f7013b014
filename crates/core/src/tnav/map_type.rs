use crate::tnav::LocalDirection::{self, *};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// One of the 8 symmetries of a square. A [MapType] converts a direction
/// observed in one tile's frame into the same direction in a neighboring
/// tile's frame.
///
/// Rotations turn every direction counter-clockwise by a number of quarter
/// turns. Each flip mirrors the square across the axis through the named
/// direction, so e.g. `FlipAcross0` fixes `D0` and `D2` and swaps `D1` with
/// `D3`.
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
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MapType {
    Identity = 0,
    Rotate90 = 1,
    Rotate180 = 2,
    Rotate270 = 3,
    FlipAcross0 = 4,
    FlipAcross01 = 5,
    FlipAcross1 = 6,
    FlipAcross12 = 7,
}

use MapType::*;

const ALL_MAP_TYPES: [MapType; 8] = [
    Identity,
    Rotate90,
    Rotate180,
    Rotate270,
    FlipAcross0,
    FlipAcross01,
    FlipAcross1,
    FlipAcross12,
];

/// Row per map type, column per direction (in [LocalDirection] order).
/// `Static` is a fixed point of every map.
const ALIGNMENT_TRANSLATION_MAPS: [[LocalDirection; 9]; 8] = [
    [D0, D1, D2, D3, D01, D12, D23, D30, Static],
    [D1, D2, D3, D0, D12, D23, D30, D01, Static],
    [D2, D3, D0, D1, D23, D30, D01, D12, Static],
    [D3, D0, D1, D2, D30, D01, D12, D23, Static],
    [D0, D3, D2, D1, D30, D23, D12, D01, Static],
    [D1, D0, D3, D2, D01, D30, D23, D12, Static],
    [D2, D1, D0, D3, D12, D01, D30, D23, Static],
    [D3, D2, D1, D0, D23, D12, D01, D30, Static],
];

/// `COMBINE[a][b]` applies `a` first, then `b`
const COMBINE: [[MapType; 8]; 8] = [
    [
        Identity,
        Rotate90,
        Rotate180,
        Rotate270,
        FlipAcross0,
        FlipAcross01,
        FlipAcross1,
        FlipAcross12,
    ],
    [
        Rotate90,
        Rotate180,
        Rotate270,
        Identity,
        FlipAcross12,
        FlipAcross0,
        FlipAcross01,
        FlipAcross1,
    ],
    [
        Rotate180,
        Rotate270,
        Identity,
        Rotate90,
        FlipAcross1,
        FlipAcross12,
        FlipAcross0,
        FlipAcross01,
    ],
    [
        Rotate270,
        Identity,
        Rotate90,
        Rotate180,
        FlipAcross01,
        FlipAcross1,
        FlipAcross12,
        FlipAcross0,
    ],
    [
        FlipAcross0,
        FlipAcross01,
        FlipAcross1,
        FlipAcross12,
        Identity,
        Rotate90,
        Rotate180,
        Rotate270,
    ],
    [
        FlipAcross01,
        FlipAcross1,
        FlipAcross12,
        FlipAcross0,
        Rotate270,
        Identity,
        Rotate90,
        Rotate180,
    ],
    [
        FlipAcross1,
        FlipAcross12,
        FlipAcross0,
        FlipAcross01,
        Rotate180,
        Rotate270,
        Identity,
        Rotate90,
    ],
    [
        FlipAcross12,
        FlipAcross0,
        FlipAcross01,
        FlipAcross1,
        Rotate90,
        Rotate180,
        Rotate270,
        Identity,
    ],
];

const INVERSE: [MapType; 8] = [
    Identity,
    Rotate270,
    Rotate180,
    Rotate90,
    FlipAcross0,
    FlipAcross01,
    FlipAcross1,
    FlipAcross12,
];

/// `NEIGHBOR_ALIGNMENT_MAP_TYPE[a][b]` is the map for two tiles where the
/// first reaches the second through its side `a`, and the second reaches back
/// through its side `b`. Moving through side `a` means arriving through side
/// `b`, i.e. facing `inverse(b)`, so the map sends `a` to `inverse(b)`.
const NEIGHBOR_ALIGNMENT_MAP_TYPE: [[MapType; 4]; 4] = [
    [Rotate180, Rotate270, Identity, Rotate90],
    [Rotate90, Rotate180, Rotate270, Identity],
    [Identity, Rotate90, Rotate180, Rotate270],
    [Rotate270, Identity, Rotate90, Rotate180],
];

impl MapType {
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        ALL_MAP_TYPES.get(index).copied()
    }

    pub fn is_rotation(self) -> bool {
        self.index() < 4
    }

    /// Translate a direction from the source frame into the destination frame
    pub fn map(self, dir: LocalDirection) -> LocalDirection {
        ALIGNMENT_TRANSLATION_MAPS[self.index()][dir.index()]
    }

    /// Compose two maps: the result is equivalent to applying `self`, then
    /// `then`
    pub fn combine(self, then: Self) -> Self {
        COMBINE[self.index()][then.index()]
    }

    pub fn inverse(self) -> Self {
        INVERSE[self.index()]
    }

    /// Get the map from tile A's frame into tile B's frame, where A reaches B
    /// through its side `dir_a_to_b` and B reaches A through its side
    /// `dir_b_to_a`. Returns `None` unless both directions are orthogonal.
    pub fn neighbor_map(
        dir_a_to_b: LocalDirection,
        dir_b_to_a: LocalDirection,
    ) -> Option<Self> {
        if dir_a_to_b.is_orthogonal() && dir_b_to_a.is_orthogonal() {
            Some(
                NEIGHBOR_ALIGNMENT_MAP_TYPE[dir_a_to_b.index()]
                    [dir_b_to_a.index()],
            )
        } else {
            None
        }
    }
}

impl Default for MapType {
    fn default() -> Self {
        Identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_combine_closure_and_inverse() {
        for m in MapType::iter() {
            assert_eq!(m.combine(m.inverse()), Identity, "{}", m);
            assert_eq!(m.inverse().combine(m), Identity, "{}", m);
            assert_eq!(m.inverse().inverse(), m);
        }
    }

    #[test]
    fn test_combine_matches_map() {
        for a in MapType::iter() {
            for b in MapType::iter() {
                let ab = a.combine(b);
                for dir in LocalDirection::iter() {
                    assert_eq!(
                        ab.map(dir),
                        b.map(a.map(dir)),
                        "{} then {} on {}",
                        a,
                        b,
                        dir
                    );
                }
            }
        }
    }

    #[test]
    fn test_map_commutes_with_inverse() {
        for m in MapType::iter() {
            for dir in LocalDirection::iter() {
                assert_eq!(m.map(dir.inverse()), m.map(dir).inverse());
            }
        }
    }

    #[test]
    fn test_map_is_permutation() {
        for m in MapType::iter() {
            let mut seen: Vec<LocalDirection> =
                LocalDirection::iter().map(|dir| m.map(dir)).collect();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), 9);
            assert_eq!(m.map(Static), Static);
        }
    }

    #[test]
    fn test_flips() {
        assert_eq!(FlipAcross0.map(D0), D0);
        assert_eq!(FlipAcross0.map(D1), D3);
        assert_eq!(FlipAcross01.map(D01), D01);
        assert_eq!(FlipAcross1.map(D1), D1);
        assert_eq!(FlipAcross12.map(D12), D12);
        for m in MapType::iter().filter(|m| !m.is_rotation()) {
            assert_eq!(m.combine(m), Identity);
        }
    }

    #[test]
    fn test_neighbor_map_round_trip() {
        for a in LocalDirection::ORTHOGONALS.iter().copied() {
            for b in LocalDirection::ORTHOGONALS.iter().copied() {
                let m = MapType::neighbor_map(a, b).unwrap();
                // Leaving A through `a` means entering B through `b`
                assert_eq!(m.map(a), b.inverse());
                // And the reverse trip uses the inverse map
                assert_eq!(MapType::neighbor_map(b, a), Some(m.inverse()));
                for dir in LocalDirection::iter() {
                    assert_eq!(m.inverse().map(m.map(dir)), dir);
                }
            }
        }
        assert_eq!(MapType::neighbor_map(D01, D0), None);
    }
}
