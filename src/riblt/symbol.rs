use crate::HashType;
use serde::{Deserialize, Serialize};

/// The direction in which a source symbol is folded into a coded symbol.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// The source symbol is added: the degree goes up by one.
    Add,
    /// The source symbol is removed: the degree goes down by one.
    Remove,
}

impl Direction {
    pub(crate) fn delta(self) -> i64 {
        match self {
            Direction::Add => 1,
            Direction::Remove => -1,
        }
    }
}

/// One symbol of the coded stream, summarizing every source symbol whose
/// mapping touches its index.
///
/// At the encoder, `count` is the number of source symbols folded in and
/// `hash` is the XOR of their hashes. At the decoder the count is signed:
/// window adjustments and peeling subtract symbols, and the resulting value
/// is the symbol's degree.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodedSymbol {
    pub count: i64,
    pub hash: HashType,
}

impl CodedSymbol {
    /// Folds a source symbol in, moving the degree by one in `direction`.
    /// XOR is its own inverse, so the accumulator update is shared.
    pub fn apply(mut self, hash: HashType, direction: Direction) -> Self {
        self.count += direction.delta();
        self.hash ^= hash;
        self
    }
}
