//! Exact rational arithmetic and numeric bound merging.
//!
//! Grounds §4.2's three `multipleOf` fallback modes and the bound-merging
//! needed to detect `rangeEmpty`/`integerDomainEmpty`. The `exact` mode
//! reduces through [`crate::bigint::BigInt`] GCD exactly as Design Notes §9
//! specifies; `decimal` and `float` live in [`crate::rational::decimal`] and
//! are selected by the caller's configured fallback mode, never silently
//! substituted for one another.

use std::cmp::Ordering;
use std::fmt;

use crate::bigint::BigInt;

/// An exact reduced fraction: `numerator / denominator`, `denominator > 0`,
/// `gcd(|numerator|, denominator) == 1` (or `numerator == 0` and
/// `denominator == 1`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rational {
    num: BigInt,
    den: BigInt,
}

impl Rational {
    /// Construct and reduce `num/den`.
    ///
    /// # Panics
    ///
    /// Panics if `den` is zero.
    #[must_use]
    pub fn new(num: BigInt, den: BigInt) -> Self {
        assert!(!den.is_zero(), "rational denominator must be non-zero");
        let (num, den) = if den.is_negative() {
            (num.neg(), den.neg())
        } else {
            (num, den)
        };
        if num.is_zero() {
            return Self { num: BigInt::zero(), den: BigInt::from_i64(1) };
        }
        let g = num.gcd(&den);
        let (q_num, _) = num.div_rem(&g);
        let (q_den, _) = den.div_rem(&g);
        Self { num: q_num, den: q_den }
    }

    /// Construct an integer rational.
    #[must_use]
    pub fn from_i64(v: i64) -> Self {
        Self { num: BigInt::from_i64(v), den: BigInt::from_i64(1) }
    }

    /// Best-effort construction from an `f64` via exact binary-fraction
    /// decomposition (no precision is lost: every finite `f64` is exactly
    /// representable as `mantissa * 2^exponent`).
    ///
    /// Returns `None` for non-finite input (NaN/Infinity).
    #[must_use]
    pub fn from_f64_exact(v: f64) -> Option<Self> {
        if !v.is_finite() {
            return None;
        }
        if v == 0.0 {
            return Some(Self::from_i64(0));
        }
        let bits = v.to_bits();
        let sign = if (bits >> 63) & 1 == 1 { -1i64 } else { 1 };
        let raw_exp = ((bits >> 52) & 0x7ff) as i64;
        let raw_mantissa = bits & 0x000f_ffff_ffff_ffff;
        let (mantissa, exp) = if raw_exp == 0 {
            (raw_mantissa, -1074_i64)
        } else {
            (raw_mantissa | (1u64 << 52), raw_exp - 1075)
        };
        let mantissa_big = BigInt::from_i64(mantissa as i64).mul(&BigInt::from_i64(sign));
        let two = BigInt::from_i64(2);
        if exp >= 0 {
            let mut scale = BigInt::from_i64(1);
            for _ in 0..exp {
                scale = scale.mul(&two);
            }
            Some(Self::new(mantissa_big.mul(&scale), BigInt::from_i64(1)))
        } else {
            let mut scale = BigInt::from_i64(1);
            for _ in 0..(-exp) {
                scale = scale.mul(&two);
            }
            Some(Self::new(mantissa_big, scale))
        }
    }

    #[must_use]
    pub fn numerator(&self) -> &BigInt {
        &self.num
    }

    #[must_use]
    pub fn denominator(&self) -> &BigInt {
        &self.den
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.den == BigInt::from_i64(1)
    }

    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let num = self.num.mul(&other.den).add(&other.num.mul(&self.den));
        let den = self.den.mul(&other.den);
        Self::new(num, den)
    }

    #[must_use]
    pub fn neg(&self) -> Self {
        Self { num: self.num.neg(), den: self.den.clone() }
    }

    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        Self::new(self.num.mul(&other.num), self.den.mul(&other.den))
    }

    /// Remainder of `self / other` as an exact rational (sign of `self`,
    /// same convention as `BigInt::div_rem`, generalizing `%` to rationals
    /// by clearing denominators first).
    ///
    /// # Panics
    ///
    /// Panics if `other` is zero.
    #[must_use]
    pub fn rem(&self, other: &Self) -> Self {
        assert!(!other.is_zero(), "remainder by zero");
        // a % b = a - b * floor_trunc(a/b) ; work over a common denominator.
        let cross_num = self.num.mul(&other.den);
        let cross_den = self.den.mul(&other.num);
        let (q, _) = cross_num.div_rem(&cross_den);
        let scaled = Self::new(q, BigInt::from_i64(1)).mul(other);
        self.sub(&scaled)
    }

    /// `true` if `self` is an exact multiple of `other` (i.e. `self % other == 0`).
    ///
    /// # Panics
    ///
    /// Panics if `other` is zero.
    #[must_use]
    pub fn is_multiple_of(&self, other: &Self) -> bool {
        self.rem(other).is_zero()
    }

    #[must_use]
    pub fn ceil(&self) -> BigInt {
        let (q, r) = self.num.div_rem(&self.den);
        if r.is_zero() || self.num.is_negative() {
            q
        } else {
            q.add(&BigInt::from_i64(1))
        }
    }

    #[must_use]
    pub fn floor(&self) -> BigInt {
        let (q, r) = self.num.div_rem(&self.den);
        if r.is_zero() || !self.num.is_negative() {
            q
        } else {
            q.sub(&BigInt::from_i64(1))
        }
    }

    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.num.to_f64() / self.den.to_f64()
    }

    #[must_use]
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        let lhs = self.num.mul(&other.den);
        let rhs = other.num.mul(&self.den);
        lhs.cmp_value(&rhs)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp_value(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_value(other)
    }
}

/// A numeric bound: a value plus whether it excludes itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub value: Rational,
    pub exclusive: bool,
}

/// A merged lower/upper bound pair for a numeric-typed subschema, after
/// folding every `minimum`/`maximum`/`exclusiveMinimum`/`exclusiveMaximum`
/// (including draft-04's boolean-flag form) found for that location.
#[derive(Debug, Clone, Default)]
pub struct BoundRange {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

impl BoundRange {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in another lower bound, tightest wins; ties prefer exclusive
    /// (a stricter bound at the same value always wins, §4.2).
    pub fn tighten_lower(&mut self, candidate: Bound) {
        self.lower = Some(match self.lower.take() {
            None => candidate,
            Some(existing) => match existing.value.cmp_value(&candidate.value) {
                Ordering::Less => candidate,
                Ordering::Greater => existing,
                Ordering::Equal => Bound {
                    value: existing.value,
                    exclusive: existing.exclusive || candidate.exclusive,
                },
            },
        });
    }

    /// Fold in another upper bound, tightest wins; same exclusive tie-break.
    pub fn tighten_upper(&mut self, candidate: Bound) {
        self.upper = Some(match self.upper.take() {
            None => candidate,
            Some(existing) => match existing.value.cmp_value(&candidate.value) {
                Ordering::Greater => candidate,
                Ordering::Less => existing,
                Ordering::Equal => Bound {
                    value: existing.value,
                    exclusive: existing.exclusive || candidate.exclusive,
                },
            },
        });
    }

    /// `true` if the bounds cross or meet while at least one side is
    /// exclusive (§4.2 `rangeEmpty`).
    #[must_use]
    pub fn range_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Some(lo), Some(hi)) => match lo.value.cmp_value(&hi.value) {
                Ordering::Greater => true,
                Ordering::Equal => lo.exclusive || hi.exclusive,
                Ordering::Less => false,
            },
            _ => false,
        }
    }

    /// `true` if, restricted to the integer domain, `ceil(lo) > floor(hi)`
    /// (§4.2 `integerDomainEmpty`). Exclusive bounds are tightened to the
    /// next/previous integer first.
    #[must_use]
    pub fn integer_domain_empty(&self) -> bool {
        let lo_int = self.lower.as_ref().map(|b| {
            let c = b.value.ceil();
            if b.exclusive && b.value.is_integer() {
                c.add(&BigInt::from_i64(1))
            } else {
                c
            }
        });
        let hi_int = self.upper.as_ref().map(|b| {
            let f = b.value.floor();
            if b.exclusive && b.value.is_integer() {
                f.sub(&BigInt::from_i64(1))
            } else {
                f
            }
        });
        match (lo_int, hi_int) {
            (Some(lo), Some(hi)) => lo > hi,
            _ => false,
        }
    }
}

/// Fixed-point decimal arithmetic for the `decimal` `multipleOf` fallback.
pub mod decimal {
    use super::Rational;
    use crate::bigint::BigInt;

    /// Round `value` to `scale` decimal digits using banker's rounding
    /// (round-half-to-even), returning the result as an exact `Rational`.
    #[must_use]
    pub fn round_half_even(value: &Rational, scale: u32) -> Rational {
        let mut pow10 = BigInt::from_i64(1);
        for _ in 0..scale {
            pow10 = pow10.mul(&BigInt::from_i64(10));
        }
        let scaled = value.mul(&Rational::new(pow10.clone(), BigInt::from_i64(1)));
        let floor = scaled.floor();
        let frac = scaled.sub(&Rational::new(floor.clone(), BigInt::from_i64(1)));
        let half = Rational::new(BigInt::from_i64(1), BigInt::from_i64(2));
        let rounded = match frac.cmp_value(&half) {
            std::cmp::Ordering::Less => floor,
            std::cmp::Ordering::Greater => floor.add(&BigInt::from_i64(1)),
            std::cmp::Ordering::Equal => {
                // Exactly .5: round to even.
                let (_, rem) = floor.div_rem(&BigInt::from_i64(2));
                if rem.is_zero() {
                    floor
                } else {
                    floor.add(&BigInt::from_i64(1))
                }
            }
        };
        Rational::new(rounded, pow10)
    }

    /// `true` if `value` is a multiple of `modulus` when both are rounded
    /// to `precision` decimal digits first (the `decimal` fallback mode).
    #[must_use]
    pub fn is_multiple_of_decimal(value: &Rational, modulus: &Rational, precision: u32) -> bool {
        let v = round_half_even(value, precision);
        let m = round_half_even(modulus, precision);
        if m.is_zero() {
            return false;
        }
        v.is_multiple_of(&m)
    }
}

/// IEEE epsilon-relative `multipleOf` fallback (the `float` mode).
#[must_use]
pub fn is_multiple_of_float(value: f64, modulus: f64, precision: f64) -> bool {
    if modulus == 0.0 {
        return false;
    }
    let quotient = value / modulus;
    let nearest = quotient.round();
    (quotient - nearest).abs() <= precision
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduces_on_construction() {
        let r = Rational::new(BigInt::from_i64(6), BigInt::from_i64(8));
        assert_eq!(r.numerator(), &BigInt::from_i64(3));
        assert_eq!(r.denominator(), &BigInt::from_i64(4));
    }

    #[test]
    fn negative_denominator_normalized() {
        let r = Rational::new(BigInt::from_i64(1), BigInt::from_i64(-2));
        assert_eq!(r.numerator(), &BigInt::from_i64(-1));
        assert_eq!(r.denominator(), &BigInt::from_i64(2));
    }

    #[test]
    fn is_multiple_of_exact() {
        let v = Rational::from_i64(9);
        let m = Rational::from_i64(3);
        assert!(v.is_multiple_of(&m));
        let v2 = Rational::new(BigInt::from_i64(1), BigInt::from_i64(10));
        let m2 = Rational::new(BigInt::from_i64(1), BigInt::from_i64(10));
        assert!(v2.is_multiple_of(&m2));
    }

    #[test]
    fn not_multiple_of() {
        let v = Rational::from_i64(10);
        let m = Rational::from_i64(3);
        assert!(!v.is_multiple_of(&m));
    }

    #[test]
    fn from_f64_exact_integer() {
        let r = Rational::from_f64_exact(4.0).unwrap();
        assert!(r.is_integer());
        assert_eq!(r.to_f64(), 4.0);
    }

    #[test]
    fn from_f64_exact_fraction() {
        let r = Rational::from_f64_exact(0.1).unwrap();
        assert!((r.to_f64() - 0.1).abs() < 1e-15);
    }

    #[test]
    fn from_f64_exact_rejects_nan_infinity() {
        assert!(Rational::from_f64_exact(f64::NAN).is_none());
        assert!(Rational::from_f64_exact(f64::INFINITY).is_none());
    }

    #[test]
    fn bound_range_empty_detection() {
        let mut range = BoundRange::new();
        range.tighten_lower(Bound { value: Rational::from_i64(5), exclusive: false });
        range.tighten_upper(Bound { value: Rational::from_i64(5), exclusive: true });
        assert!(range.range_empty());
    }

    #[test]
    fn bound_range_not_empty_when_touching_inclusive() {
        let mut range = BoundRange::new();
        range.tighten_lower(Bound { value: Rational::from_i64(5), exclusive: false });
        range.tighten_upper(Bound { value: Rational::from_i64(5), exclusive: false });
        assert!(!range.range_empty());
    }

    #[test]
    fn integer_domain_empty_with_exclusive_bounds() {
        let mut range = BoundRange::new();
        // (2, 3) exclusive-exclusive has no integers strictly between.
        range.tighten_lower(Bound { value: Rational::from_i64(2), exclusive: true });
        range.tighten_upper(Bound { value: Rational::from_i64(3), exclusive: true });
        assert!(range.integer_domain_empty());
    }

    #[test]
    fn integer_domain_not_empty() {
        let mut range = BoundRange::new();
        range.tighten_lower(Bound { value: Rational::from_i64(0), exclusive: false });
        range.tighten_upper(Bound { value: Rational::from_i64(10), exclusive: false });
        assert!(!range.integer_domain_empty());
    }

    #[test]
    fn tighten_prefers_exclusive_on_tie() {
        let mut range = BoundRange::new();
        range.tighten_lower(Bound { value: Rational::from_i64(1), exclusive: false });
        range.tighten_lower(Bound { value: Rational::from_i64(1), exclusive: true });
        assert!(range.lower.unwrap().exclusive);
    }

    #[test]
    fn decimal_round_half_even() {
        let v = Rational::new(BigInt::from_i64(25), BigInt::from_i64(10)); // 2.5
        let rounded = decimal::round_half_even(&v, 0);
        assert_eq!(rounded.to_f64(), 2.0, "2.5 rounds to even (2)");
        let v2 = Rational::new(BigInt::from_i64(35), BigInt::from_i64(10)); // 3.5
        let rounded2 = decimal::round_half_even(&v2, 0);
        assert_eq!(rounded2.to_f64(), 4.0, "3.5 rounds to even (4)");
    }

    #[test]
    fn decimal_multiple_of() {
        let v = Rational::new(BigInt::from_i64(3), BigInt::from_i64(10)); // 0.3
        let m = Rational::new(BigInt::from_i64(1), BigInt::from_i64(10)); // 0.1
        assert!(decimal::is_multiple_of_decimal(&v, &m, 4));
    }

    #[test]
    fn float_multiple_of_within_epsilon() {
        assert!(is_multiple_of_float(0.3, 0.1, 1e-9));
        assert!(!is_multiple_of_float(0.31, 0.1, 1e-9));
    }
}
