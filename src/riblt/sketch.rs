use super::decoder::Decoder;
use super::mapping::RandomMapping;
use super::symbol::{CodedSymbol, Direction};
use crate::HashType;
use serde::{Deserialize, Serialize};
use std::ops::{Sub, SubAssign};

/// A fixed-length prefix of the coded-symbol sequence for a set.
///
/// Compared to generating the prefix incrementally with an
/// [`Encoder`](super::Encoder), a sketch is cheaper when the length is
/// known up front, and it additionally supports removing source symbols
/// after creation. The tradeoff is that the prefix may turn out too short
/// for the actual difference, in which case [`decode`](Self::decode)
/// reports failure and the caller typically doubles the length and retries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sketch {
    symbols: Vec<CodedSymbol>,
}

impl Sketch {
    /// Creates an all-zero sketch of `len` coded symbols.
    pub fn new(len: usize) -> Self {
        Self {
            symbols: vec![CodedSymbol::default(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The coded symbols of the prefix, in stream order.
    pub fn coded_symbols(&self) -> &[CodedSymbol] {
        &self.symbols
    }

    /// Inserts source symbol `hash` into the set the sketch summarizes.
    pub fn add_symbol(&mut self, hash: HashType) {
        self.apply(hash, Direction::Add);
    }

    /// Deletes source symbol `hash` from the set the sketch summarizes.
    pub fn remove_symbol(&mut self, hash: HashType) {
        self.apply(hash, Direction::Remove);
    }

    fn apply(&mut self, hash: HashType, direction: Direction) {
        let mut mapping = RandomMapping::new(hash);
        while (mapping.last_idx as usize) < self.symbols.len() {
            let idx = mapping.last_idx as usize;
            self.symbols[idx] = self.symbols[idx].apply(hash, direction);
            mapping.next_index();
        }
    }

    /// Tries to decode the sketch, either of a set directly or of the
    /// difference left by subtraction.
    ///
    /// On success the first list holds the symbols exclusive to the set the
    /// sketch (or subtraction minuend) summarizes, and the second the
    /// symbols exclusive to the subtrahend. Returns `None` when the prefix
    /// is too short to peel completely; callers double the length and
    /// retry.
    pub fn decode(&self) -> Option<(Vec<HashType>, Vec<HashType>)> {
        let mut decoder = Decoder::new();
        for &coded in &self.symbols {
            decoder.add_coded_symbol(coded);
        }
        decoder.try_decode();
        if decoder.is_decoded() {
            Some((decoder.remote().to_vec(), decoder.local().to_vec()))
        } else {
            None
        }
    }
}

impl SubAssign for Sketch {
    /// Subtracts another sketch elementwise, leaving the sketch of the
    /// symmetric difference. Panics if the lengths differ.
    fn sub_assign(&mut self, rhs: Self) {
        assert_eq!(
            self.len(),
            rhs.len(),
            "expected subtracted sketches to have the same length"
        );
        for (symbol, rhs_symbol) in self.symbols.iter_mut().zip(rhs.symbols) {
            symbol.count -= rhs_symbol.count;
            symbol.hash ^= rhs_symbol.hash;
        }
    }
}

impl Sub for Sketch {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        let mut result = self;
        result -= rhs;
        result
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::riblt::Encoder;

    const SYMBOLS: [u32; 5] = [3616712547, 2333013068, 2234311686, 448751902, 918748965];

    #[test]
    fn test_add_remove_inverse() {
        let mut sketch = Sketch::new(64);
        for &hash in &SYMBOLS {
            sketch.add_symbol(hash);
        }
        for &hash in &SYMBOLS {
            sketch.remove_symbol(hash);
        }
        assert_eq!(sketch, Sketch::new(64));
    }

    #[test]
    fn test_matches_encoder_prefix() {
        let mut sketch = Sketch::new(16);
        let mut encoder = Encoder::new();
        for &hash in &SYMBOLS {
            sketch.add_symbol(hash);
            encoder.add_symbol(hash);
        }
        for idx in 0..sketch.len() {
            assert_eq!(
                encoder.produce_next_coded_symbol(),
                sketch.coded_symbols()[idx],
                "stream diverges at index {}",
                idx
            );
        }
    }

    #[test]
    fn test_subtract_distributes_over_additions() {
        let (extra, common) = SYMBOLS.split_at(2);
        let mut sa = Sketch::new(32);
        let mut sb = Sketch::new(32);
        let mut direct = Sketch::new(32);
        for &hash in common {
            sa.add_symbol(hash);
            sb.add_symbol(hash);
        }
        for &hash in extra {
            sa.add_symbol(hash);
            direct.add_symbol(hash);
        }
        assert_eq!(sa - sb, direct);
    }

    #[test]
    fn test_subtract_and_decode_subset() {
        let (extra, common) = SYMBOLS.split_at(2);
        let mut size = 8;
        loop {
            assert!(size <= 1 << 12, "sketch never became decodable");
            let mut sa = Sketch::new(size);
            let mut sb = Sketch::new(size);
            for &hash in common {
                sa.add_symbol(hash);
                sb.add_symbol(hash);
            }
            for &hash in extra {
                sa.add_symbol(hash);
            }
            if let Some((mut fwd, rev)) = (sa - sb).decode() {
                fwd.sort_unstable();
                let mut want = extra.to_vec();
                want.sort_unstable();
                assert_eq!(fwd, want);
                assert!(rev.is_empty());
                break;
            }
            size *= 2;
        }
    }

    #[test]
    fn test_too_short_prefix_fails() {
        let mut sketch = Sketch::new(1);
        for &hash in &SYMBOLS[..3] {
            sketch.add_symbol(hash);
        }
        assert_eq!(sketch.decode(), None);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_subtract_length_mismatch() {
        let _ = Sketch::new(8) - Sketch::new(16);
    }

    #[test]
    fn test_serialize_round_trip() {
        let mut sketch = Sketch::new(16);
        for &hash in &SYMBOLS {
            sketch.add_symbol(hash);
        }
        let bytes = bincode::serialize(&sketch).unwrap();
        let restored: Sketch = bincode::deserialize(&bytes).unwrap();
        assert_eq!(sketch, restored);
    }
}
