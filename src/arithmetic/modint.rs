use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// The largest 32-bit prime, `2^32 - 5`.
pub const MODULUS: u32 = 4_294_967_291;

const MODULUS_U64: u64 = MODULUS as u64;

/// A 32-bit integer in the prime field modulo [`MODULUS`].
///
/// The canonical representative lies in `[0, MODULUS)`. All arithmetic is
/// performed in a 64-bit accumulator and reduced with a single conditional
/// subtraction, except multiplication, which reduces by remainder.
#[derive(Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModularInteger {
    value: u32,
}

impl ModularInteger {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Creates a field element from an arbitrary 32-bit integer, reducing
    /// into the canonical range.
    pub fn new(n: u32) -> Self {
        if n >= MODULUS {
            Self { value: n - MODULUS }
        } else {
            Self { value: n }
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn modulus() -> u32 {
        MODULUS
    }

    /// The modulus widened to 64 bits, for use in wide accumulators.
    pub fn modulus_big() -> u64 {
        MODULUS_U64
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    /// Raises the element to the given power by recursive halving.
    pub fn pow(self, power: u64) -> Self {
        if power == 0 {
            ModularInteger::new(1)
        } else if power == 1 {
            self
        } else {
            let mut result = self.pow(power >> 1);
            result *= result;
            if power & 1 == 1 {
                result *= self;
            }
            result
        }
    }

    /// The multiplicative inverse: `x * x.inv() == 1` for nonzero `x`.
    ///
    /// By Fermat's little theorem the inverse is `x^(MODULUS - 2)`.
    pub fn inv(self) -> Self {
        self.pow(MODULUS_U64 - 2)
    }
}

impl fmt::Display for ModularInteger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl fmt::Debug for ModularInteger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ModularInteger")
            .field("value", &self.value)
            .field("modulus", &MODULUS)
            .finish()
    }
}

impl PartialEq<u32> for ModularInteger {
    fn eq(&self, other: &u32) -> bool {
        self.value == *other
    }
}

impl PartialEq<ModularInteger> for u32 {
    fn eq(&self, other: &ModularInteger) -> bool {
        self == &other.value
    }
}

impl Neg for ModularInteger {
    type Output = Self;

    fn neg(self) -> Self::Output {
        if self.value == 0 {
            self
        } else {
            Self {
                value: MODULUS - self.value,
            }
        }
    }
}

impl AddAssign for ModularInteger {
    fn add_assign(&mut self, rhs: Self) {
        let sum = u64::from(self.value) + u64::from(rhs.value);
        self.value = if sum >= MODULUS_U64 {
            (sum - MODULUS_U64) as u32
        } else {
            sum as u32
        };
    }
}

impl Add for ModularInteger {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let mut result = self;
        result += rhs;
        result
    }
}

impl SubAssign for ModularInteger {
    fn sub_assign(&mut self, rhs: Self) {
        let diff = u64::from(self.value) + u64::from((-rhs).value);
        self.value = if diff >= MODULUS_U64 {
            (diff - MODULUS_U64) as u32
        } else {
            diff as u32
        };
    }
}

impl Sub for ModularInteger {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        let mut result = self;
        result -= rhs;
        result
    }
}

impl MulAssign for ModularInteger {
    fn mul_assign(&mut self, rhs: Self) {
        let prod = u64::from(self.value) * u64::from(rhs.value);
        self.value = (prod % MODULUS_U64) as u32;
    }
}

impl Mul for ModularInteger {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        let mut result = self;
        result *= rhs;
        result
    }
}
