//! Keypad legend.

use crate::{COLS, ROWS};

/// Characters printed on the keypad, indexed `[row][col]` as seen from the
/// front of the keypad (row 0 at the top).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Keymap {
    keys: [[char; COLS]; ROWS],
}

impl Keymap {
    pub const fn new(keys: [[char; COLS]; ROWS]) -> Self {
        Self { keys }
    }

    /// Character at a legend position.
    pub fn key(&self, row: usize, col: usize) -> char {
        self.keys[row][col]
    }

    /// Legend position of a character, if it is on the keypad.
    pub fn position(&self, key: char) -> Option<(usize, usize)> {
        self.keys.iter().enumerate().find_map(|(row, keys)| {
            keys.iter().position(|&k| k == key).map(|col| (row, col))
        })
    }

    pub fn rows(&self) -> &[[char; COLS]; ROWS] {
        &self.keys
    }
}

/// The standard 4x4 membrane keypad.
pub static KEYPAD: Keymap = Keymap::new([
    ['1', '2', '3', 'A'],
    ['4', '5', '6', 'B'],
    ['7', '8', '9', 'C'],
    ['*', '0', '#', 'D'],
]);
