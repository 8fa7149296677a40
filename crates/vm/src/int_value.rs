//! Bounded-precision integers with NeoVM byte semantics.
//!
//! Values that fit a machine word stay on the `i64` fast path; anything
//! larger falls back to [`BigInt`]. Every result is checked against the
//! 32-byte encoding bound before it is handed back.

use crate::error::{VmError, VmResult};
use neovm_config::MAX_BIGINT_SIZE;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;

/// Largest shift amount accepted by SHL/SHR, in bits.
pub const MAX_SHIFT_BITS: u64 = (MAX_BIGINT_SIZE * 8) as u64;

/// Signed integer bounded to `MAX_BIGINT_SIZE` bytes of NeoVM encoding.
///
/// `Big` is only used for values outside the `i64` range.
#[derive(Debug, Clone)]
pub enum IntValue {
    Small(i64),
    Big(BigInt),
}

/// Decodes little-endian two's-complement bytes. Empty input is zero.
pub fn bigint_from_neo_bytes(bytes: &[u8]) -> BigInt {
    if bytes.is_empty() {
        return BigInt::zero();
    }
    BigInt::from_signed_bytes_le(bytes)
}

/// Encodes as minimal little-endian two's-complement. Zero is empty.
pub fn bigint_to_neo_bytes(value: &BigInt) -> Vec<u8> {
    if value.is_zero() {
        return Vec::new();
    }
    value.to_signed_bytes_le()
}

impl IntValue {
    pub fn from_i64(value: i64) -> Self {
        IntValue::Small(value)
    }

    /// Wraps a big integer, failing if its encoding exceeds the size bound.
    pub fn from_bigint(value: BigInt) -> VmResult<Self> {
        if let Some(small) = value.to_i64() {
            return Ok(IntValue::Small(small));
        }
        if bigint_to_neo_bytes(&value).len() > MAX_BIGINT_SIZE {
            return Err(VmError::OverMaxBigIntegerSize);
        }
        Ok(IntValue::Big(value))
    }

    pub fn from_bytes(bytes: &[u8]) -> VmResult<Self> {
        Self::from_bigint(bigint_from_neo_bytes(bytes))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            IntValue::Small(0) => Vec::new(),
            IntValue::Small(v) => bigint_to_neo_bytes(&BigInt::from(*v)),
            IntValue::Big(v) => bigint_to_neo_bytes(v),
        }
    }

    pub fn to_bigint(&self) -> BigInt {
        match self {
            IntValue::Small(v) => BigInt::from(*v),
            IntValue::Big(v) => v.clone(),
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        match self {
            IntValue::Small(v) => Some(*v),
            IntValue::Big(_) => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, IntValue::Small(0))
    }

    /// Returns -1, 0 or 1.
    pub fn sign(&self) -> i64 {
        match self {
            IntValue::Small(v) => v.signum(),
            IntValue::Big(v) => {
                if v.is_negative() {
                    -1
                } else {
                    1
                }
            }
        }
    }

    fn int_op(
        &self,
        other: &IntValue,
        fast: fn(i64, i64) -> Option<i64>,
        slow: fn(BigInt, BigInt) -> BigInt,
    ) -> VmResult<IntValue> {
        if let (IntValue::Small(a), IntValue::Small(b)) = (self, other) {
            if let Some(v) = fast(*a, *b) {
                return Ok(IntValue::Small(v));
            }
        }
        IntValue::from_bigint(slow(self.to_bigint(), other.to_bigint()))
    }

    pub fn add(&self, other: &IntValue) -> VmResult<IntValue> {
        self.int_op(other, i64::checked_add, |a, b| a + b)
    }

    pub fn sub(&self, other: &IntValue) -> VmResult<IntValue> {
        self.int_op(other, i64::checked_sub, |a, b| a - b)
    }

    pub fn mul(&self, other: &IntValue) -> VmResult<IntValue> {
        self.int_op(other, i64::checked_mul, |a, b| a * b)
    }

    /// Truncated division.
    pub fn div(&self, other: &IntValue) -> VmResult<IntValue> {
        if other.is_zero() {
            return Err(VmError::DivModByZero);
        }
        self.int_op(other, i64::checked_div, |a, b| a / b)
    }

    /// Remainder of truncated division; takes the sign of the dividend.
    pub fn modulo(&self, other: &IntValue) -> VmResult<IntValue> {
        if other.is_zero() {
            return Err(VmError::DivModByZero);
        }
        self.int_op(other, i64::checked_rem, |a, b| a % b)
    }

    pub fn and(&self, other: &IntValue) -> VmResult<IntValue> {
        self.int_op(other, |a, b| Some(a & b), |a, b| a & b)
    }

    pub fn or(&self, other: &IntValue) -> VmResult<IntValue> {
        self.int_op(other, |a, b| Some(a | b), |a, b| a | b)
    }

    pub fn xor(&self, other: &IntValue) -> VmResult<IntValue> {
        self.int_op(other, |a, b| Some(a ^ b), |a, b| a ^ b)
    }

    pub fn min(&self, other: &IntValue) -> IntValue {
        if self.cmp(other) == Ordering::Greater {
            other.clone()
        } else {
            self.clone()
        }
    }

    pub fn max(&self, other: &IntValue) -> IntValue {
        if self.cmp(other) == Ordering::Less {
            other.clone()
        } else {
            self.clone()
        }
    }

    pub fn abs(&self) -> VmResult<IntValue> {
        match self {
            IntValue::Small(v) => match v.checked_abs() {
                Some(a) => Ok(IntValue::Small(a)),
                None => IntValue::from_bigint(BigInt::from(*v).abs()),
            },
            IntValue::Big(v) => IntValue::from_bigint(v.abs()),
        }
    }

    pub fn negate(&self) -> VmResult<IntValue> {
        match self {
            IntValue::Small(v) => match v.checked_neg() {
                Some(n) => Ok(IntValue::Small(n)),
                None => IntValue::from_bigint(-BigInt::from(*v)),
            },
            IntValue::Big(v) => IntValue::from_bigint(-v.clone()),
        }
    }

    /// Bitwise complement, `-x - 1`.
    pub fn not(&self) -> VmResult<IntValue> {
        match self {
            IntValue::Small(v) => Ok(IntValue::Small(!v)),
            IntValue::Big(v) => IntValue::from_bigint(-v.clone() - 1u32),
        }
    }

    fn shift_amount(&self) -> VmResult<u64> {
        match self {
            IntValue::Small(v) if *v < 0 => Err(VmError::ShiftByNeg),
            IntValue::Small(v) => Ok(*v as u64),
            IntValue::Big(v) => v.to_u64().ok_or(VmError::ShiftByNeg),
        }
    }

    pub fn shl(&self, shift: &IntValue) -> VmResult<IntValue> {
        let amount = shift.shift_amount()?;
        if amount > MAX_SHIFT_BITS {
            return Err(VmError::OverMaxBigIntegerSize);
        }
        IntValue::from_bigint(self.to_bigint() << amount as usize)
    }

    /// Arithmetic shift right, rounding toward negative infinity.
    pub fn shr(&self, shift: &IntValue) -> VmResult<IntValue> {
        let amount = shift.shift_amount()?;
        if amount > MAX_SHIFT_BITS {
            return Ok(if self.sign() < 0 {
                IntValue::Small(-1)
            } else {
                IntValue::Small(0)
            });
        }
        if let IntValue::Small(v) = self {
            return Ok(IntValue::Small(if amount >= 64 {
                if *v < 0 {
                    -1
                } else {
                    0
                }
            } else {
                v >> amount
            }));
        }
        IntValue::from_bigint(self.to_bigint() >> amount as usize)
    }
}

impl From<i64> for IntValue {
    fn from(value: i64) -> Self {
        IntValue::Small(value)
    }
}

impl PartialEq for IntValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for IntValue {}

impl PartialOrd for IntValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IntValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (IntValue::Small(a), IntValue::Small(b)) => a.cmp(b),
            _ => self.to_bigint().cmp(&other.to_bigint()),
        }
    }
}

impl fmt::Display for IntValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntValue::Small(v) => write!(f, "{v}"),
            IntValue::Big(v) => write!(f, "{v}"),
        }
    }
}
