mod gpio;

use crate::GpioResult;
use std::fmt::Debug;
pub use gpio::*;

/// Identifies one physical key of a 4x4 matrix keypad.
///
/// The index is `row * 4 + column`, in [0, 15]. What the key *means* is up to
/// the application; the scanner only reports positions.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct KeyIndex(u8);

impl KeyIndex {
    pub const COUNT: usize = 16;

    /// Converts a (row, column) position to a [KeyIndex].
    /// Returns `None` when either coordinate falls outside the matrix.
    pub fn from_position(row: u8, col: u8) -> Option<KeyIndex> {
        if row < 4 && col < 4 {
            Some(KeyIndex(row * 4 + col))
        } else {
            None
        }
    }

    /// Converts a flat index in [0, 15] to a [KeyIndex].
    pub fn from_index(index: u8) -> Option<KeyIndex> {
        if (index as usize) < Self::COUNT {
            Some(KeyIndex(index))
        } else {
            None
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn row(self) -> u8 {
        self.0 / 4
    }

    pub fn col(self) -> u8 {
        self.0 % 4
    }
}

/// The `Keypad` trait defines the interface for keypad input devices.
pub trait Keypad: Debug {
    type Key;

    /// Runs one sweep of the keypad. `None` means no key is pressed;
    /// errors are reserved for backend I/O faults.
    fn scan(&self) -> GpioResult<Option<Self::Key>>;

    /// Blocks until a key event is seen, then resolves it with one sweep.
    ///
    /// May still return `None` when the press disappears between the event
    /// and the sweep (a bounce that never settled into a detectable key).
    fn read_key(&self) -> GpioResult<Option<Self::Key>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn position_maps_to_flat_index() {
        for row in 0..4 {
            for col in 0..4 {
                let key = KeyIndex::from_position(row, col).unwrap();
                assert_eq!(key.index(), row * 4 + col);
                assert_eq!(key.row(), row);
                assert_eq!(key.col(), col);
            }
        }
    }

    #[test]
    fn out_of_matrix_positions_are_rejected() {
        assert_eq!(KeyIndex::from_position(4, 0), None);
        assert_eq!(KeyIndex::from_position(0, 4), None);
        assert_eq!(KeyIndex::from_index(16), None);
    }

    #[test]
    fn all_sixteen_keys_are_distinct() {
        let mut seen = HashSet::new();
        for row in 0..4 {
            for col in 0..4 {
                seen.insert(KeyIndex::from_position(row, col).unwrap());
            }
        }
        assert_eq!(seen.len(), KeyIndex::COUNT);
    }
}
