//! Signed-magnitude 128-bit integer with overflow and NaN tracking.
//!
//! Despite the name, `U128` is not unsigned in the way a bare machine word is:
//! it carries its own [`Sign`] the way a hand-written bignum class would, plus a
//! [`Singular`] state so that overflow and not-a-number survive arithmetic instead
//! of wrapping silently. `I128` in [`crate::i128`] is a deliberately separate type built
//! the same way on its own private magnitude, not a type alias of this one.

use crate::mag::Magnitude;
use crate::sign::Sign;
use crate::singular::Singular;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
pub struct U128 {
    mag: Magnitude,
    sign: Sign,
    singular: Singular,
}

impl U128 {
    pub const ZERO: Self = Self {
        mag: Magnitude::ZERO,
        sign: Sign::POS,
        singular: Singular::NONE,
    };

    pub const ONE: Self = Self {
        mag: Magnitude::ONE,
        sign: Sign::POS,
        singular: Singular::NONE,
    };

    pub const MAX: Self = Self {
        mag: Magnitude::MAX,
        sign: Sign::POS,
        singular: Singular::NONE,
    };

    pub fn from_u64(v: u64) -> Self {
        Self {
            mag: Magnitude::from_u64(v),
            sign: Sign::POS,
            singular: Singular::NONE,
        }
    }

    pub fn from_u128(v: u128) -> Self {
        Self {
            mag: Magnitude::new((v >> 64) as u64, v as u64),
            sign: Sign::POS,
            singular: Singular::NONE,
        }
    }

    pub fn nan() -> Self {
        Self {
            mag: Magnitude::ZERO,
            sign: Sign::POS,
            singular: Singular::nan(),
        }
    }

    pub fn overflow(sign: Sign) -> Self {
        Self {
            mag: Magnitude::MAX,
            sign,
            singular: Singular::overflow(),
        }
    }

    pub fn new_signed(mag: Magnitude, sign: Sign) -> Self {
        // Canonical zero carries no sign: there is exactly one zero, not a
        // positive and a negative one.
        let sign = if mag.is_zero() { Sign::POS } else { sign };
        Self {
            mag,
            sign,
            singular: Singular::NONE,
        }
    }

    pub fn magnitude(self) -> Magnitude {
        self.mag
    }

    pub fn sign(self) -> Sign {
        self.sign
    }

    pub fn is_negative(self) -> bool {
        !self.singular.is_singular() && self.sign.is_negative() && !self.mag.is_zero()
    }

    pub fn is_nan(self) -> bool {
        self.singular.is_nan()
    }

    pub fn is_overflow(self) -> bool {
        self.singular.is_overflow()
    }

    pub fn is_singular(self) -> bool {
        self.singular.is_singular()
    }

    pub fn is_zero(self) -> bool {
        !self.singular.is_singular() && self.mag.is_zero()
    }

    /// The decimal string form. An empty string for NaN, `"inf"` for overflow,
    /// matching the codec the fixed-point [`crate::decimal::Decimal`] layer expects
    /// when round-tripping through its string buffer.
    pub fn value(self) -> String {
        if self.singular.is_nan() {
            return String::new();
        }
        if self.singular.is_overflow() {
            return if self.sign.is_negative() {
                "-inf".to_string()
            } else {
                "inf".to_string()
            };
        }
        let body = self.mag.to_string();
        if self.sign.is_negative() && !self.mag.is_zero() {
            format!("-{body}")
        } else {
            body
        }
    }

    pub fn checked_add(self, rhs: Self) -> Self {
        if self.singular.is_singular() || rhs.singular.is_singular() {
            return Self {
                mag: Magnitude::ZERO,
                sign: Sign::POS,
                singular: self.singular.merge(rhs.singular),
            };
        }
        if self.sign == rhs.sign {
            let (mag, overflow) = self.mag.overflowing_add(rhs.mag);
            if overflow {
                return Self::overflow(self.sign);
            }
            return Self::new_signed(mag, self.sign);
        }
        // Opposite signs: subtract the smaller magnitude from the larger one
        // and take the sign of whichever side was bigger.
        match self.mag.cmp_mag(rhs.mag) {
            Ordering::Equal => Self::ZERO,
            Ordering::Greater => {
                Self::new_signed(self.mag.overflowing_sub(rhs.mag).0, self.sign)
            }
            Ordering::Less => Self::new_signed(rhs.mag.overflowing_sub(self.mag).0, rhs.sign),
        }
    }

    pub fn checked_sub(self, rhs: Self) -> Self {
        self.checked_add(rhs.negate())
    }

    pub fn negate(self) -> Self {
        if self.singular.is_singular() || self.mag.is_zero() {
            return self;
        }
        Self {
            sign: self.sign.flip(),
            ..self
        }
    }

    pub fn checked_mul(self, rhs: Self) -> Self {
        if self.singular.is_singular() || rhs.singular.is_singular() {
            return Self {
                mag: Magnitude::ZERO,
                sign: Sign::POS,
                singular: self.singular.merge(rhs.singular),
            };
        }
        let (mag, overflow) = self.mag.overflowing_mul(rhs.mag);
        let sign = self.sign.combine(rhs.sign);
        if overflow {
            return Self::overflow(sign);
        }
        Self::new_signed(mag, sign)
    }

    pub fn checked_div(self, rhs: Self) -> Self {
        if self.singular.is_singular() || rhs.singular.is_singular() {
            return Self {
                mag: Magnitude::ZERO,
                sign: Sign::POS,
                singular: self.singular.merge(rhs.singular),
            };
        }
        if rhs.mag.is_zero() {
            return Self::nan();
        }
        let (q, _) = self.mag.div_wide(rhs.mag);
        Self::new_signed(q, self.sign.combine(rhs.sign))
    }

    pub fn checked_rem(self, rhs: Self) -> Self {
        if self.singular.is_singular() || rhs.singular.is_singular() {
            return Self {
                mag: Magnitude::ZERO,
                sign: Sign::POS,
                singular: self.singular.merge(rhs.singular),
            };
        }
        if rhs.mag.is_zero() {
            return Self::nan();
        }
        let (_, r) = self.mag.div_wide(rhs.mag);
        Self::new_signed(r, self.sign)
    }

    /// Absolute value: clears the sign, leaving singular values untouched.
    pub fn abs(self) -> Self {
        if self.singular.is_singular() {
            return self;
        }
        Self {
            sign: Sign::POS,
            ..self
        }
    }

    pub fn div10(self) -> Self {
        if self.singular.is_singular() {
            return self;
        }
        Self::new_signed(self.mag.div10(), self.sign)
    }

    pub fn mod10(self) -> u32 {
        self.mag.mod10()
    }
}

impl std::ops::Add for U128 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        self.checked_add(rhs)
    }
}

impl std::ops::Sub for U128 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self.checked_sub(rhs)
    }
}

impl std::ops::Mul for U128 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.checked_mul(rhs)
    }
}

impl std::ops::Div for U128 {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        self.checked_div(rhs)
    }
}

impl std::ops::Rem for U128 {
    type Output = Self;
    fn rem(self, rhs: Self) -> Self {
        self.checked_rem(rhs)
    }
}

impl std::ops::Neg for U128 {
    type Output = Self;
    fn neg(self) -> Self {
        self.negate()
    }
}

/// Two singular values never compare equal to anything, themselves included:
/// a NaN is never equal to another NaN, and an overflowed value isn't
/// guaranteed to equal another overflowed value of the same sign, since both
/// have already lost information about their true magnitude.
impl PartialEq for U128 {
    fn eq(&self, other: &Self) -> bool {
        if self.singular.is_singular() || other.singular.is_singular() {
            return false;
        }
        self.mag.is_zero() && other.mag.is_zero()
            || (self.sign == other.sign && self.mag == other.mag)
    }
}

impl PartialOrd for U128 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.singular.is_singular() || other.singular.is_singular() {
            return None;
        }
        if self.mag.is_zero() && other.mag.is_zero() {
            return Some(Ordering::Equal);
        }
        Some(match (self.sign.is_negative(), other.sign.is_negative()) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.mag.cmp_mag(other.mag),
            (true, true) => other.mag.cmp_mag(self.mag),
        })
    }
}

impl std::fmt::Display for U128 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl Default for U128 {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[quickcheck]
    fn add_sub_roundtrip(a: u64, b: u64) -> bool {
        let x = U128::from_u64(a);
        let y = U128::from_u64(b);
        (x + y) - y == x
    }

    #[test]
    fn nan_is_never_equal() {
        assert!(U128::nan() != U128::nan());
    }

    #[test]
    fn nan_beats_overflow_through_merge() {
        let r = U128::nan() + U128::overflow(Sign::POS);
        assert!(r.is_nan());
    }

    #[test]
    fn div_by_zero_is_nan() {
        assert!((U128::from_u64(5) / U128::ZERO).is_nan());
    }

    #[test]
    fn negative_zero_normalizes_to_positive() {
        let neg_zero = U128::ZERO.negate();
        assert!(!neg_zero.is_negative());
        assert_eq!(neg_zero.value(), "0");
    }

    #[test]
    fn opposite_sign_add_takes_larger_magnitude_sign() {
        let a = U128::from_u64(10);
        let b = U128::from_u64(3).negate();
        assert_eq!((a + b).value(), "7");
        assert_eq!((b + a).value(), "7");
    }

    #[quickcheck]
    fn mul_overflow_detected(a_hi: u64, a_lo: u64, b_hi: u64, b_lo: u64) -> bool {
        let a = ((a_hi as u128) << 64) | a_lo as u128;
        let b = ((b_hi as u128) << 64) | b_lo as u128;
        let x = U128::from_u128(a);
        let y = U128::from_u128(b);
        let expect_overflow = a.checked_mul(b).is_none();
        (x * y).is_overflow() == expect_overflow
    }

    #[test]
    fn value_of_nan_is_empty_string() {
        assert_eq!(U128::nan().value(), "");
    }

    #[test]
    fn abs_clears_sign_but_leaves_singular_alone() {
        assert_eq!(U128::from_u64(5).negate().abs(), U128::from_u64(5));
        assert!(U128::nan().abs().is_nan());
    }
}
