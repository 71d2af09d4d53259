//! Hand-rolled arbitrary-precision signed integer.
//!
//! `multipleOf`'s `exact` fallback (§4.2, Design Notes §9) needs exact GCD
//! reduction over numerators/denominators that can exceed `i64`/`i128` once
//! a schema chains several rational bounds. Rather than take on
//! `num-bigint` this mirrors the teacher's own posture toward arithmetic
//! primitives (`civilisation-os-kernel`'s `Fixed(u128)` is hand-rolled, not
//! pulled from a crate): magnitude as little-endian base-1e9 limbs plus a
//! sign, enough to add/sub/mul/divmod/gcd — the exact operation set
//! `Rational` needs and no more.

use std::cmp::Ordering;
use std::fmt;

const BASE: u64 = 1_000_000_000;

/// An arbitrary-precision signed integer.
///
/// Representation: sign-magnitude, magnitude as little-endian base-1e9
/// limbs with no trailing zero limbs (so `0` is always `{ sign: Zero, limbs:
/// [] }`, giving every integer exactly one representation).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigInt {
    negative: bool,
    limbs: Vec<u32>,
}

impl BigInt {
    /// The value zero.
    #[must_use]
    pub fn zero() -> Self {
        Self { negative: false, limbs: Vec::new() }
    }

    /// Construct from an `i64`.
    #[must_use]
    pub fn from_i64(v: i64) -> Self {
        let negative = v < 0;
        let mut mag = v.unsigned_abs();
        let mut limbs = Vec::new();
        while mag > 0 {
            limbs.push((mag % BASE) as u32);
            mag /= BASE;
        }
        let mut out = Self { negative, limbs };
        out.normalize();
        out
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.limbs.is_empty()
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    fn normalize(&mut self) {
        while self.limbs.last() == Some(&0) {
            self.limbs.pop();
        }
        if self.limbs.is_empty() {
            self.negative = false;
        }
    }

    fn magnitude_cmp(a: &[u32], b: &[u32]) -> Ordering {
        if a.len() != b.len() {
            return a.len().cmp(&b.len());
        }
        for i in (0..a.len()).rev() {
            if a[i] != b[i] {
                return a[i].cmp(&b[i]);
            }
        }
        Ordering::Equal
    }

    fn magnitude_add(a: &[u32], b: &[u32]) -> Vec<u32> {
        let mut out = Vec::with_capacity(a.len().max(b.len()) + 1);
        let mut carry: u64 = 0;
        for i in 0..a.len().max(b.len()) {
            let x = u64::from(a.get(i).copied().unwrap_or(0));
            let y = u64::from(b.get(i).copied().unwrap_or(0));
            let sum = x + y + carry;
            out.push((sum % BASE) as u32);
            carry = sum / BASE;
        }
        if carry > 0 {
            out.push(carry as u32);
        }
        out
    }

    /// Precondition: `a >= b` in magnitude.
    fn magnitude_sub(a: &[u32], b: &[u32]) -> Vec<u32> {
        let mut out = Vec::with_capacity(a.len());
        let mut borrow: i64 = 0;
        for i in 0..a.len() {
            let x = i64::from(a[i]);
            let y = i64::from(b.get(i).copied().unwrap_or(0));
            let mut diff = x - y - borrow;
            if diff < 0 {
                diff += i64::from(BASE as u32);
                borrow = 1;
            } else {
                borrow = 0;
            }
            out.push(diff as u32);
        }
        out
    }

    fn magnitude_mul(a: &[u32], b: &[u32]) -> Vec<u32> {
        if a.is_empty() || b.is_empty() {
            return Vec::new();
        }
        let mut out = vec![0u64; a.len() + b.len()];
        for (i, &ai) in a.iter().enumerate() {
            let mut carry = 0u64;
            for (j, &bj) in b.iter().enumerate() {
                let idx = i + j;
                let prod = out[idx] + u64::from(ai) * u64::from(bj) + carry;
                out[idx] = prod % BASE;
                carry = prod / BASE;
            }
            let mut k = i + b.len();
            while carry > 0 {
                let sum = out[k] + carry;
                out[k] = sum % BASE;
                carry = sum / BASE;
                k += 1;
            }
        }
        out.into_iter().map(|x| x as u32).collect()
    }

    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        if self.negative == other.negative {
            let limbs = Self::magnitude_add(&self.limbs, &other.limbs);
            let mut out = Self { negative: self.negative, limbs };
            out.normalize();
            out
        } else {
            match Self::magnitude_cmp(&self.limbs, &other.limbs) {
                Ordering::Equal => Self::zero(),
                Ordering::Greater => {
                    let mut out = Self {
                        negative: self.negative,
                        limbs: Self::magnitude_sub(&self.limbs, &other.limbs),
                    };
                    out.normalize();
                    out
                }
                Ordering::Less => {
                    let mut out = Self {
                        negative: other.negative,
                        limbs: Self::magnitude_sub(&other.limbs, &self.limbs),
                    };
                    out.normalize();
                    out
                }
            }
        }
    }

    #[must_use]
    pub fn neg(&self) -> Self {
        if self.is_zero() {
            self.clone()
        } else {
            Self { negative: !self.negative, limbs: self.limbs.clone() }
        }
    }

    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        let mut out = Self {
            negative: self.negative != other.negative,
            limbs: Self::magnitude_mul(&self.limbs, &other.limbs),
        };
        out.normalize();
        out
    }

    /// Truncating division (toward zero), returning `(quotient, remainder)`.
    /// `remainder` has the sign of `self` (matches Rust's `/`/`%` on
    /// integers), as required by the `-0 -> 0` canonicalization contract.
    ///
    /// # Panics
    ///
    /// Panics if `other` is zero.
    #[must_use]
    pub fn div_rem(&self, other: &Self) -> (Self, Self) {
        assert!(!other.is_zero(), "division by zero");
        if Self::magnitude_cmp(&self.limbs, &other.limbs) == Ordering::Less {
            return (Self::zero(), self.clone());
        }
        // Schoolbook long division in base 1e9, most significant limb first.
        let mut remainder = Self::zero();
        let mut quotient_limbs = vec![0u32; self.limbs.len()];
        for i in (0..self.limbs.len()).rev() {
            // remainder = remainder * BASE + limb
            remainder = remainder.mul(&Self::from_i64(i64::from(BASE as u32)));
            remainder = remainder.add(&Self::from_i64(i64::from(self.limbs[i])));
            // Binary search the digit in [0, BASE) such that other*digit <= remainder.
            let mut lo: u32 = 0;
            let mut hi: u32 = (BASE - 1) as u32;
            let other_mag = Self { negative: false, limbs: other.limbs.clone() };
            while lo < hi {
                let mid = lo + (hi - lo + 1) / 2;
                let candidate = other_mag.mul(&Self::from_i64(i64::from(mid)));
                if Self::magnitude_cmp(&candidate.limbs, &remainder.limbs) != Ordering::Greater {
                    lo = mid;
                } else {
                    hi = mid - 1;
                }
            }
            quotient_limbs[i] = lo;
            remainder = remainder.sub(&other_mag.mul(&Self::from_i64(i64::from(lo))));
        }
        let mut quotient = Self { negative: self.negative != other.negative, limbs: quotient_limbs };
        quotient.normalize();
        let mut rem = Self { negative: self.negative, limbs: remainder.limbs };
        rem.normalize();
        (quotient, rem)
    }

    /// Greatest common divisor of the magnitudes (always non-negative).
    #[must_use]
    pub fn gcd(&self, other: &Self) -> Self {
        let mut a = Self { negative: false, limbs: self.limbs.clone() };
        let mut b = Self { negative: false, limbs: other.limbs.clone() };
        while !b.is_zero() {
            let (_, r) = a.div_rem(&b);
            a = b;
            b = Self { negative: false, limbs: r.limbs };
        }
        a
    }

    #[must_use]
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => Self::magnitude_cmp(&self.limbs, &other.limbs),
            (true, true) => Self::magnitude_cmp(&other.limbs, &self.limbs),
        }
    }

    /// Best-effort conversion to `i64`, `None` on overflow.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        let mut acc: i128 = 0;
        for &limb in self.limbs.iter().rev() {
            acc = acc.checked_mul(i128::from(BASE))?.checked_add(i128::from(limb))?;
            if acc > i128::from(i64::MAX) + 1 {
                return None;
            }
        }
        if self.negative {
            acc = -acc;
        }
        i64::try_from(acc).ok()
    }

    /// Best-effort conversion to `f64` (may lose precision for very large values).
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        let mut acc = 0.0_f64;
        for &limb in self.limbs.iter().rev() {
            acc = acc * (BASE as f64) + f64::from(limb);
        }
        if self.negative {
            -acc
        } else {
            acc
        }
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        if self.negative {
            write!(f, "-")?;
        }
        let mut iter = self.limbs.iter().rev();
        write!(f, "{}", iter.next().unwrap())?;
        for limb in iter {
            write!(f, "{limb:09}")?;
        }
        Ok(())
    }
}

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp_value(other))
    }
}

impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_value(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trip() {
        assert_eq!(BigInt::from_i64(0).to_string(), "0");
        assert_eq!(BigInt::from_i64(42).to_string(), "42");
        assert_eq!(BigInt::from_i64(-42).to_string(), "-42");
        assert_eq!(BigInt::from_i64(1_000_000_001).to_string(), "1000000001");
    }

    #[test]
    fn add_and_sub() {
        let a = BigInt::from_i64(123_456_789);
        let b = BigInt::from_i64(987_654_321);
        assert_eq!(a.add(&b).to_string(), "1111111110");
        assert_eq!(b.sub(&a).to_string(), "864197532");
        assert_eq!(a.sub(&b).to_string(), "-864197532");
    }

    #[test]
    fn mul_large() {
        let a = BigInt::from_i64(999_999_999);
        let b = BigInt::from_i64(999_999_999);
        assert_eq!(a.mul(&b).to_string(), "999999998000000001");
    }

    #[test]
    fn div_rem_basic() {
        let a = BigInt::from_i64(100);
        let b = BigInt::from_i64(7);
        let (q, r) = a.div_rem(&b);
        assert_eq!(q.to_string(), "14");
        assert_eq!(r.to_string(), "2");
    }

    #[test]
    fn div_rem_exact() {
        let a = BigInt::from_i64(144);
        let b = BigInt::from_i64(12);
        let (q, r) = a.div_rem(&b);
        assert_eq!(q.to_string(), "12");
        assert!(r.is_zero());
    }

    #[test]
    fn gcd_basic() {
        let a = BigInt::from_i64(48);
        let b = BigInt::from_i64(18);
        assert_eq!(a.gcd(&b).to_string(), "6");
    }

    #[test]
    fn gcd_with_zero() {
        let a = BigInt::from_i64(0);
        let b = BigInt::from_i64(5);
        assert_eq!(a.gcd(&b).to_string(), "5");
    }

    #[test]
    fn ordering() {
        assert!(BigInt::from_i64(-5) < BigInt::from_i64(3));
        assert!(BigInt::from_i64(5) > BigInt::from_i64(3));
        assert_eq!(BigInt::from_i64(0), BigInt::from_i64(0));
    }

    #[test]
    fn to_i64_round_trip() {
        assert_eq!(BigInt::from_i64(-123_456).to_i64(), Some(-123_456));
    }
}
