use crate::arithmetic::{self, ModularInteger};
use crate::precompute;
use crate::HashType;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::ops::{Sub, SubAssign};
use thiserror::Error;

/// Errors from decoding a power-sum quACK against a candidate log.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The set difference holds more elements than the sketch threshold can
    /// recover. The caller may retry with a larger threshold.
    #[error("number of elements {count} exceeds sketch threshold {threshold}")]
    ThresholdExceeded { count: u32, threshold: usize },
}

/// A quACK represented by a threshold number of modular power sums.
///
/// If `X` is the multiset of elements inserted so far, the `k`-th power sum
/// is the sum of `x^(k+1)` over all `x` in `X`, in the field modulo
/// `2^32 - 5`. Subtracting the sketch of a subset leaves the sketch of the
/// set difference, which decodes against a candidate log as long as the
/// difference does not exceed the threshold fixed at creation. The number
/// of bytes needed to transmit the sketch is proportional to the threshold,
/// not to the number of elements.
///
/// # Examples
///
/// ```
/// use setrecon::PowerSumQuack;
///
/// let mut quack = PowerSumQuack::new(20);
/// quack.insert(10);
/// quack.insert(12);
/// let missing = quack.decode_with_log(&[10, 11, 12]).unwrap();
/// assert_eq!(missing, vec![10, 12]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PowerSumQuack {
    power_sums: Vec<ModularInteger>,
    count: u32,
}

impl PowerSumQuack {
    /// Creates a quACK that can decode at most `threshold` elements.
    pub fn new(threshold: usize) -> Self {
        precompute::ensure_inverse_table(threshold);
        Self {
            power_sums: vec![ModularInteger::zero(); threshold],
            count: 0,
        }
    }

    /// The maximum number of elements the quACK can decode.
    pub fn threshold(&self) -> usize {
        self.power_sums.len()
    }

    /// The number of elements represented by the quACK.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Inserts an element into the multiset represented by the quACK.
    pub fn insert(&mut self, value: HashType) {
        let size = self.power_sums.len();
        let x = ModularInteger::new(value);
        let mut y = x;
        for i in 0..(size - 1) {
            self.power_sums[i] += y;
            y *= x;
        }
        self.power_sums[size - 1] += y;
        self.count = self.count.wrapping_add(1);
    }

    /// Removes an element. Does not validate that the element had actually
    /// been inserted.
    pub fn remove(&mut self, value: HashType) {
        let size = self.power_sums.len();
        let x = ModularInteger::new(value);
        let mut y = x;
        for i in 0..(size - 1) {
            self.power_sums[i] -= y;
            y *= x;
        }
        self.power_sums[size - 1] -= y;
        self.count = self.count.wrapping_sub(1);
    }

    /// Converts the power sums to the coefficients of the monic polynomial
    /// whose roots are the elements in the quACK, using
    /// [Newton's identities](https://en.wikipedia.org/wiki/Newton%27s_identities).
    ///
    /// The returned vector has `count` coefficients with the constant term
    /// last; the leading 1 is implicit. Panics if the count exceeds the
    /// threshold; [`decode_with_log`](Self::decode_with_log) reports that
    /// case as an error instead.
    pub fn to_coeffs(&self) -> Vec<ModularInteger> {
        let mut coeffs = vec![ModularInteger::zero(); self.count as usize];
        self.to_coeffs_preallocated(&mut coeffs);
        coeffs
    }

    /// Same as [`to_coeffs`](Self::to_coeffs), reusing the provided
    /// allocation.
    ///
    /// Panics if the vector's length differs from [`count`](Self::count),
    /// or if the count exceeds the threshold; past the threshold the power
    /// sums no longer determine the polynomial.
    pub fn to_coeffs_preallocated(&self, coeffs: &mut Vec<ModularInteger>) {
        assert_eq!(
            coeffs.len(),
            self.count as usize,
            "length of coefficient vector must equal the number of elements"
        );
        assert!(
            self.count as usize <= self.threshold(),
            "number of elements must not exceed threshold"
        );
        if coeffs.is_empty() {
            return;
        }
        coeffs[0] = -self.power_sums[0];
        precompute::with_inverse_table(coeffs.len(), |inverses| {
            for i in 1..coeffs.len() {
                coeffs[i] = ModularInteger::zero();
                for j in 0..i {
                    coeffs[i] = coeffs[i] - self.power_sums[j] * coeffs[i - j - 1];
                }
                coeffs[i] -= self.power_sums[i];
                coeffs[i] *= inverses[i];
            }
        });
    }

    /// Decodes the elements of the quACK that appear in `log`.
    ///
    /// Evaluates the polynomial derived from the power sums at each
    /// candidate in the log and returns the roots, preserving log order. A
    /// candidate appearing more than once in the log appears the same
    /// number of times in the result. Roots not present in the log are
    /// silently absent, as are candidates lost to hash collisions; an empty
    /// quACK decodes to an empty list.
    ///
    /// Fails only when the element count exceeds the threshold, in which
    /// case no roots are recoverable.
    pub fn decode_with_log(&self, log: &[HashType]) -> Result<Vec<HashType>, DecodeError> {
        if self.count == 0 {
            return Ok(vec![]);
        }
        if self.count as usize > self.threshold() {
            return Err(DecodeError::ThresholdExceeded {
                count: self.count,
                threshold: self.threshold(),
            });
        }
        debug!(
            "decoding quACK: log_length={}, num_missing={}",
            log.len(),
            self.count
        );
        let coeffs = self.to_coeffs();
        trace!("coeffs = {:?}", coeffs);
        let missing = log
            .iter()
            .copied()
            .filter(|&x| arithmetic::eval(&coeffs, x).is_zero())
            .collect::<Vec<_>>();
        debug!("found {}/{} missing elements", missing.len(), self.count);
        Ok(missing)
    }
}

impl SubAssign for PowerSumQuack {
    /// Subtracts another quACK from this one.
    ///
    /// If the elements of `rhs` are a subset of the elements of `self`, the
    /// difference represents the set difference, decodable as long as its
    /// size does not exceed the threshold. Panics if the thresholds differ.
    fn sub_assign(&mut self, rhs: Self) {
        assert_eq!(
            self.threshold(),
            rhs.threshold(),
            "expected subtracted quacks to have the same threshold"
        );
        for (sum, rhs_sum) in self.power_sums.iter_mut().zip(rhs.power_sums) {
            *sum -= rhs_sum;
        }
        self.count = self.count.wrapping_sub(rhs.count);
    }
}

impl Sub for PowerSumQuack {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        let mut result = self;
        result -= rhs;
        result
    }
}
