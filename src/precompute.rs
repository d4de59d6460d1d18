//! Precomputed multiplicative inverses for coefficient recovery.

use crate::arithmetic::ModularInteger;
use once_cell::sync::Lazy;
use std::sync::RwLock;

/// Entry `i` holds the inverse of `i + 1`. The table only ever grows, so a
/// slice handed out for one threshold stays valid when a larger threshold is
/// requested concurrently.
static INVERSE_TABLE: Lazy<RwLock<Vec<ModularInteger>>> = Lazy::new(|| RwLock::new(Vec::new()));

/// Makes sure the multiplicative inverses of `1..=threshold` are available.
///
/// Called automatically by [`PowerSumQuack::new`](crate::PowerSumQuack::new),
/// so any sketch that can be decoded already has its inverses precomputed.
/// Callers that construct sketches on one thread and decode on another may
/// also invoke it up front to pay the precomputation cost at startup.
pub fn ensure_inverse_table(threshold: usize) {
    {
        let table = INVERSE_TABLE.read().expect("inverse table lock poisoned");
        if table.len() >= threshold {
            return;
        }
    }
    let mut table = INVERSE_TABLE.write().expect("inverse table lock poisoned");
    let mut index = ModularInteger::new(table.len() as u32 + 1);
    while table.len() < threshold {
        table.push(index.inv());
        index += ModularInteger::new(1);
    }
}

/// Runs `f` over the first `n` inverse-table entries, growing the table
/// first if needed.
pub(crate) fn with_inverse_table<R>(n: usize, f: impl FnOnce(&[ModularInteger]) -> R) -> R {
    ensure_inverse_table(n);
    let table = INVERSE_TABLE.read().expect("inverse table lock poisoned");
    f(&table[..n])
}
