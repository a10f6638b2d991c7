//! Hex grid geometry with cube coordinates

use serde::{Deserialize, Serialize};

/// Cube hex coordinates, invariant: x + y + z = 0
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hex {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Direction vectors in cube coordinates (dx, dy, dz)
/// Index: 0=N, 1=NE, 2=SE, 3=S, 4=SW, 5=NW
pub const DIRECTIONS: [(i32, i32, i32); 6] = [
    (0, 1, -1),  // N
    (1, 0, -1),  // NE
    (1, -1, 0),  // SE
    (0, -1, 1),  // S
    (-1, 0, 1),  // SW
    (-1, 1, 0),  // NW
];

/// The canonical opening position
pub const ORIGIN: Hex = Hex::new(0, 0, 0);

impl Hex {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Get neighbor in direction (0-5)
    pub fn neighbor(&self, direction: u8) -> Hex {
        let (dx, dy, dz) = DIRECTIONS[direction as usize % 6];
        Hex::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// All 6 neighboring positions
    pub fn adjacent(&self) -> [Hex; 6] {
        let mut out = [*self; 6];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.neighbor(i as u8);
        }
        out
    }

    /// Distance between two hexes
    pub fn distance_to(&self, other: Hex) -> i32 {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        let dz = (self.z - other.z).abs();
        (dx + dy + dz) / 2
    }

    /// The (at most two) positions adjacent to both `self` and `other`.
    /// Empty when the two hexes are not adjacent.
    pub fn common_neighbors(&self, other: Hex) -> Vec<Hex> {
        if self.distance_to(other) != 1 {
            return vec![];
        }
        let around = other.adjacent();
        self.adjacent()
            .into_iter()
            .filter(|n| around.contains(n))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directions_sum_to_zero() {
        for (dx, dy, dz) in DIRECTIONS {
            assert_eq!(dx + dy + dz, 0);
        }
    }

    #[test]
    fn test_adjacent_count_and_distance() {
        let h = Hex::new(1, -1, 0);
        let neighbors = h.adjacent();
        assert_eq!(neighbors.len(), 6);
        for n in neighbors {
            assert_eq!(n.x + n.y + n.z, 0);
            assert_eq!(h.distance_to(n), 1);
        }
    }

    #[test]
    fn test_adjacent_deterministic() {
        assert_eq!(ORIGIN.adjacent(), ORIGIN.adjacent());
    }

    #[test]
    fn test_far_coordinates_do_not_wrap() {
        // The board is unbounded; a long game can drift the hive far out
        let far = Hex::new(40_000, -40_000, 0);
        assert_eq!(far.distance_to(ORIGIN), 40_000);
        assert_eq!(far.neighbor(0), Hex::new(40_000, -39_999, -1));
        assert_eq!(far.distance_to(far.neighbor(3)), 1);
    }

    #[test]
    fn test_common_neighbors() {
        let a = ORIGIN;
        let b = Hex::new(0, 1, -1);
        let shared = a.common_neighbors(b);
        assert_eq!(shared.len(), 2);
        assert!(shared.contains(&Hex::new(1, 0, -1)));
        assert!(shared.contains(&Hex::new(-1, 1, 0)));

        // Non-adjacent hexes share nothing
        assert!(a.common_neighbors(Hex::new(0, 2, -2)).is_empty());
    }
}
