use crate::HashType;

/// Multiplier of the multiplicative congruential PRNG step. Normative for
/// cross-peer compatibility: peers with different constants disagree on
/// which coded symbols a source symbol touches and cannot reconcile.
const PRNG_MULTIPLIER: u64 = 0xda94_2042_e4dd_58b5;

const TWO_POW_32: f64 = 4_294_967_296.0;

/// Deterministic generator of the coded-symbol indices a source symbol maps
/// into, seeded with the source hash.
///
/// The sequence starts at index 0 and jumps forward so that index `i` is
/// touched with probability roughly `1.5 / (i + 1.5)`; a source symbol
/// therefore lands in O(log n) of the first `n` coded symbols, which is
/// what makes the coded stream rateless.
#[derive(Copy, Clone, Debug)]
pub(crate) struct RandomMapping {
    prng: u64,
    /// The most recent index in the sequence.
    pub(crate) last_idx: u64,
}

impl RandomMapping {
    pub(crate) fn new(hash: HashType) -> Self {
        Self {
            prng: u64::from(hash),
            last_idx: 0,
        }
    }

    /// Advances to the next index in the sequence.
    ///
    /// The jump is `ceil((i + 1.5) * (1/sqrt(u) - 1))` where `i` is the
    /// current index and `u = (r + 1) / 2^64` for the 64-bit PRNG output
    /// `r`. Evaluated in IEEE-754 double precision with round-to-nearest;
    /// peers with different float semantics would disagree on placement.
    pub(crate) fn next_index(&mut self) -> u64 {
        self.prng = self.prng.wrapping_mul(PRNG_MULTIPLIER);
        let r = self.prng as f64;
        let jump = ((self.last_idx as f64 + 1.5) * (TWO_POW_32 / (r + 1.0).sqrt() - 1.0)).ceil();
        self.last_idx += jump as u64;
        self.last_idx
    }
}
