use super::mapping::RandomMapping;
use super::symbol::{CodedSymbol, Direction};
use crate::HashType;

/// A set of source symbols together with each symbol's cached mapping
/// cursor, supporting batch application into the coded symbol at the
/// window's current index.
#[derive(Clone, Debug, Default)]
pub(crate) struct CodingWindow {
    symbols: Vec<HashType>,
    mappings: Vec<RandomMapping>,
    /// Index of the next coded symbol this window is applied to.
    next_idx: u64,
}

impl CodingWindow {
    pub(crate) fn add_hash(&mut self, hash: HashType) {
        self.add_hash_with_mapping(hash, RandomMapping::new(hash));
    }

    /// Adds a source symbol whose mapping has already been advanced, so the
    /// walk resumes where the caller left off instead of restarting.
    pub(crate) fn add_hash_with_mapping(&mut self, hash: HashType, mapping: RandomMapping) {
        self.symbols.push(hash);
        self.mappings.push(mapping);
    }

    /// Folds every source symbol mapped to the window's current index into
    /// `coded`, advancing those mappings past it, then moves the window to
    /// the next index. After the call every cached mapping points beyond
    /// the applied index.
    pub(crate) fn apply_window(
        &mut self,
        mut coded: CodedSymbol,
        direction: Direction,
    ) -> CodedSymbol {
        for (hash, mapping) in self.symbols.iter().zip(self.mappings.iter_mut()) {
            while mapping.last_idx == self.next_idx {
                coded = coded.apply(*hash, direction);
                mapping.next_index();
            }
        }
        self.next_idx += 1;
        coded
    }

    pub(crate) fn symbols(&self) -> &[HashType] {
        &self.symbols
    }

    pub(crate) fn reset(&mut self) {
        self.symbols.clear();
        self.mappings.clear();
        self.next_idx = 0;
    }
}

/// Produces the infinite coded-symbol sequence for a set of source symbols.
///
/// Each call to [`produce_next_coded_symbol`](Self::produce_next_coded_symbol)
/// emits the next symbol of the sequence; the receiver must consume them in
/// the same order. The set is fixed once emission starts: adding a source
/// symbol after the first coded symbol has been produced is undefined, since
/// the new symbol's mapping would not be replayed over already-emitted
/// indices.
#[derive(Clone, Debug, Default)]
pub struct Encoder {
    window: CodingWindow,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source symbol to the set. Must not be called once emission
    /// has started.
    pub fn add_symbol(&mut self, hash: HashType) {
        self.window.add_hash(hash);
    }

    /// Produces the next coded symbol in the sequence.
    pub fn produce_next_coded_symbol(&mut self) -> CodedSymbol {
        self.window.apply_window(CodedSymbol::default(), Direction::Add)
    }

    /// Clears the encoder for reuse, keeping allocations.
    pub fn reset(&mut self) {
        self.window.reset();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty_window_produces_zero_symbols() {
        let mut encoder = Encoder::new();
        for _ in 0..8 {
            assert_eq!(encoder.produce_next_coded_symbol(), CodedSymbol::default());
        }
    }

    #[test]
    fn test_first_coded_symbol_covers_set() {
        // every source symbol's mapping starts at index 0
        let symbols = [3616712547u32, 2333013068, 2234311686];
        let mut encoder = Encoder::new();
        for &hash in &symbols {
            encoder.add_symbol(hash);
        }
        let coded = encoder.produce_next_coded_symbol();
        assert_eq!(coded.count, 3);
        assert_eq!(coded.hash, symbols[0] ^ symbols[1] ^ symbols[2]);
    }

    #[test]
    fn test_single_symbol_stream_degrees() {
        let mut encoder = Encoder::new();
        encoder.add_symbol(0xabcdef01);
        let mut covered = 0;
        for _ in 0..64 {
            let coded = encoder.produce_next_coded_symbol();
            assert!(coded.count == 0 || coded.count == 1);
            if coded.count == 1 {
                assert_eq!(coded.hash, 0xabcdef01);
                covered += 1;
            } else {
                assert_eq!(coded.hash, 0);
            }
        }
        assert!(covered >= 1);
    }

    #[test]
    fn test_reset_clears_the_set() {
        let mut encoder = Encoder::new();
        encoder.add_symbol(42);
        assert_eq!(encoder.produce_next_coded_symbol().count, 1);
        encoder.reset();
        assert_eq!(encoder.produce_next_coded_symbol(), CodedSymbol::default());
    }
}
