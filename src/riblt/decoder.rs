use super::encoder::CodingWindow;
use super::mapping::RandomMapping;
use super::symbol::{CodedSymbol, Direction};
use crate::HashType;
use log::{debug, trace};

/// Computes the set difference between two sets A and B of source symbols.
///
/// The decoder knows B, the local set, and consumes the coded-symbol stream
/// an [`Encoder`](super::Encoder) produces for A, the remote set. Coded
/// symbols must be fed in the order the encoder emitted them. Once enough
/// of the stream has been consumed, [`remote`](Self::remote) holds A \ B.
///
/// Only subset reconciliation is supported: B must be a subset of A. A
/// source symbol present locally but not remotely eventually surfaces as a
/// degree of `-1`, which [`try_decode`](Self::try_decode) refuses with a
/// panic.
#[derive(Clone, Debug, Default)]
pub struct Decoder {
    /// Coded symbols received so far, reduced by the three windows.
    cs: Vec<CodedSymbol>,
    /// Source symbols the decoder knew up front (the local set B).
    window: CodingWindow,
    /// Source symbols recovered as exclusive to the encoder (A \ B).
    remote: CodingWindow,
    /// Source symbols exclusive to the decoder (B \ A). Never filled by the
    /// subset-only decoder, but its sign convention is kept so the stream
    /// reduction below stays symmetric.
    local: CodingWindow,
    /// Indices into `cs` awaiting peeling: degree 1 or -1, or degree 0 with
    /// a zero hash accumulator.
    decodable: Vec<usize>,
    /// Number of coded symbols whose degree has been reduced to 0.
    decoded: usize,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if and only if every coded symbol received so far has been
    /// fully peeled.
    pub fn is_decoded(&self) -> bool {
        self.decoded == self.cs.len()
    }

    /// The source symbols recovered as present in A but not in B.
    pub fn remote(&self) -> &[HashType] {
        self.remote.symbols()
    }

    /// The source symbols recovered as present in B but not in A. Always
    /// empty under subset reconciliation.
    pub fn local(&self) -> &[HashType] {
        self.local.symbols()
    }

    /// Adds a source symbol to B, the decoder's local set.
    ///
    /// It is undefined behavior to call this once
    /// [`add_coded_symbol`](Self::add_coded_symbol) has been called: the
    /// symbol's mapping is not replayed over already-received indices.
    pub fn add_symbol(&mut self, hash: HashType) {
        self.window.add_hash(hash);
    }

    /// Receives the next coded symbol of A's sequence, in the order the
    /// encoder produced it.
    pub fn add_coded_symbol(&mut self, coded: CodedSymbol) {
        // Strip everything already known before storing: the local set, the
        // recovered remote-only symbols, and (by sign convention) re-add the
        // recovered local-only symbols.
        let coded = self.window.apply_window(coded, Direction::Remove);
        let coded = self.remote.apply_window(coded, Direction::Remove);
        let coded = self.local.apply_window(coded, Direction::Add);
        self.cs.push(coded);
        if coded.count == 1
            || coded.count == -1
            || (coded.count == 0 && coded.hash == 0)
        {
            self.decodable.push(self.cs.len() - 1);
        }
    }

    /// Applies a newly recovered source symbol to every received coded
    /// symbol its mapping touches, queueing the ones that land on degree
    /// 1 or -1. Returns the advanced mapping so the caller can store it
    /// alongside the symbol.
    ///
    /// Degree-0 results are not queued. A coded symbol only reaches degree
    /// 0 from 1 or -1, and it was queued when it first got there; once
    /// queued at degree 1 or -1, later peels can only take it to 0. Queueing
    /// on first entry therefore visits each decodable symbol exactly once.
    fn apply_new_symbol(&mut self, hash: HashType, direction: Direction) -> RandomMapping {
        let mut mapping = RandomMapping::new(hash);
        while (mapping.last_idx as usize) < self.cs.len() {
            let cidx = mapping.last_idx as usize;
            self.cs[cidx] = self.cs[cidx].apply(hash, direction);
            if self.cs[cidx].count == 1 || self.cs[cidx].count == -1 {
                self.decodable.push(cidx);
            }
            mapping.next_index();
        }
        mapping
    }

    /// Peels the decodable queue until it is exhausted, including the
    /// indices queued by the peeling itself.
    pub fn try_decode(&mut self) {
        let mut next = 0;
        while next < self.decodable.len() {
            let cidx = self.decodable[next];
            // The queued degree may have dropped to 0 by now, but never out
            // of {-1, 0, 1}, so the fresh read below is decodable.
            let coded = self.cs[cidx];
            match coded.count {
                1 => {
                    let hash = coded.hash;
                    trace!("peeled remote symbol {:#010x} at coded index {}", hash, cidx);
                    let mapping = self.apply_new_symbol(hash, Direction::Remove);
                    self.remote.add_hash_with_mapping(hash, mapping);
                    self.decoded += 1;
                }
                0 => {
                    self.decoded += 1;
                }
                -1 => panic!(
                    "coded symbol with degree -1: only subset reconciliation is supported"
                ),
                degree => panic!("invalid degree {} for decodable coded symbol", degree),
            }
            next += 1;
        }
        self.decodable.clear();
        debug!("decoded {}/{} coded symbols", self.decoded, self.cs.len());
    }

    /// Clears the decoder for reuse, keeping allocations.
    pub fn reset(&mut self) {
        self.cs.clear();
        self.decodable.clear();
        self.window.reset();
        self.remote.reset();
        self.local.reset();
        self.decoded = 0;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::riblt::Encoder;

    fn reconcile(encoder_set: &[u32], decoder_set: &[u32]) -> (Vec<u32>, Vec<u32>, usize) {
        let mut encoder = Encoder::new();
        for &hash in encoder_set {
            encoder.add_symbol(hash);
        }
        let mut decoder = Decoder::new();
        for &hash in decoder_set {
            decoder.add_symbol(hash);
        }
        let mut cost = 0;
        loop {
            decoder.add_coded_symbol(encoder.produce_next_coded_symbol());
            decoder.try_decode();
            cost += 1;
            if decoder.is_decoded() {
                break;
            }
            assert!(cost < 100_000, "decoder failed to converge");
        }
        (decoder.remote().to_vec(), decoder.local().to_vec(), cost)
    }

    #[test]
    fn test_identical_sets_decode_from_one_symbol() {
        let set = [17u32, 2094067, 3966423548];
        let (remote, local, cost) = reconcile(&set, &set);
        assert!(remote.is_empty());
        assert!(local.is_empty());
        assert_eq!(cost, 1);
    }

    #[test]
    fn test_superset_difference_recovered() {
        let alice: Vec<u32> = (1..=11).collect();
        let bob = [1u32, 3, 4, 5, 6, 7, 8, 9, 10];
        let (mut remote, local, _) = reconcile(&alice, &bob);
        remote.sort_unstable();
        assert_eq!(remote, vec![2, 11]);
        assert!(local.is_empty());
    }

    #[test]
    fn test_empty_local_set() {
        let alice = [42u32, 99, 7];
        let (mut remote, local, _) = reconcile(&alice, &[]);
        remote.sort_unstable();
        assert_eq!(remote, vec![7, 42, 99]);
        assert!(local.is_empty());
    }

    #[test]
    fn test_reset_reuses_decoder() {
        let mut encoder = Encoder::new();
        encoder.add_symbol(3616712547);
        encoder.add_symbol(2333013068);
        let mut decoder = Decoder::new();
        loop {
            decoder.add_coded_symbol(encoder.produce_next_coded_symbol());
            decoder.try_decode();
            if decoder.is_decoded() {
                break;
            }
        }
        assert_eq!(decoder.remote().len(), 2);

        decoder.reset();
        assert!(decoder.remote().is_empty());
        assert!(decoder.is_decoded());

        encoder.reset();
        encoder.add_symbol(918748965);
        decoder.add_symbol(918748965);
        decoder.add_coded_symbol(encoder.produce_next_coded_symbol());
        decoder.try_decode();
        assert!(decoder.is_decoded());
        assert!(decoder.remote().is_empty());
        assert!(decoder.local().is_empty());
    }

    #[test]
    #[should_panic(expected = "subset reconciliation")]
    fn test_local_only_symbol_panics() {
        let mut encoder = Encoder::new();
        let mut decoder = Decoder::new();
        decoder.add_symbol(12345);
        decoder.add_coded_symbol(encoder.produce_next_coded_symbol());
        decoder.try_decode();
    }
}
