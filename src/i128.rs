//! Signed 128-bit integer, layered independently from [`crate::u128::U128`].
//!
//! The reference implementation this is modeled on keeps a completely separate
//! magnitude type for its signed integer (no sign or singular fields at all) and
//! composes the sign and singular tracking on top as generic wrappers. `I128`
//! follows that layering here rather than aliasing `U128`: the two types share
//! the same underlying `Magnitude` engine for raw arithmetic, but each owns its
//! own sign and singular state and its own display conventions.

use crate::mag::Magnitude;
use crate::sign::Sign;
use crate::singular::Singular;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
pub struct I128 {
    unsigned: Magnitude,
    sign: Sign,
    singular: Singular,
}

impl I128 {
    pub const ZERO: Self = Self {
        unsigned: Magnitude::ZERO,
        sign: Sign::POS,
        singular: Singular::NONE,
    };

    pub const ONE: Self = Self {
        unsigned: Magnitude::ONE,
        sign: Sign::POS,
        singular: Singular::NONE,
    };

    pub fn from_i64(v: i64) -> Self {
        let sign = Sign::new(v < 0);
        let mag = Magnitude::from_u64(v.unsigned_abs());
        Self::new_signed(mag, sign)
    }

    pub fn from_i128(v: i128) -> Self {
        let sign = Sign::new(v < 0);
        let abs = v.unsigned_abs();
        let mag = Magnitude::new((abs >> 64) as u64, abs as u64);
        Self::new_signed(mag, sign)
    }

    pub fn nan() -> Self {
        Self {
            unsigned: Magnitude::ZERO,
            sign: Sign::POS,
            singular: Singular::nan(),
        }
    }

    pub fn overflow(sign: Sign) -> Self {
        Self {
            unsigned: Magnitude::MAX,
            sign,
            singular: Singular::overflow(),
        }
    }

    fn new_signed(unsigned: Magnitude, sign: Sign) -> Self {
        let sign = if unsigned.is_zero() { Sign::POS } else { sign };
        Self {
            unsigned,
            sign,
            singular: Singular::NONE,
        }
    }

    pub fn is_negative(self) -> bool {
        !self.singular.is_singular() && self.sign.is_negative() && !self.unsigned.is_zero()
    }

    pub fn is_nan(self) -> bool {
        self.singular.is_nan()
    }

    pub fn is_overflow(self) -> bool {
        self.singular.is_overflow()
    }

    pub fn is_zero(self) -> bool {
        !self.singular.is_singular() && self.unsigned.is_zero()
    }

    pub fn checked_add(self, rhs: Self) -> Self {
        if self.singular.is_singular() || rhs.singular.is_singular() {
            return Self {
                unsigned: Magnitude::ZERO,
                sign: Sign::POS,
                singular: self.singular.merge(rhs.singular),
            };
        }
        if self.sign == rhs.sign {
            let (mag, overflow) = self.unsigned.overflowing_add(rhs.unsigned);
            if overflow {
                return Self::overflow(self.sign);
            }
            return Self::new_signed(mag, self.sign);
        }
        match self.unsigned.cmp_mag(rhs.unsigned) {
            Ordering::Equal => Self::ZERO,
            Ordering::Greater => {
                Self::new_signed(self.unsigned.overflowing_sub(rhs.unsigned).0, self.sign)
            }
            Ordering::Less => {
                Self::new_signed(rhs.unsigned.overflowing_sub(self.unsigned).0, rhs.sign)
            }
        }
    }

    pub fn negate(self) -> Self {
        if self.singular.is_singular() || self.unsigned.is_zero() {
            return self;
        }
        Self {
            sign: self.sign.flip(),
            ..self
        }
    }

    pub fn checked_sub(self, rhs: Self) -> Self {
        self.checked_add(rhs.negate())
    }

    pub fn checked_mul(self, rhs: Self) -> Self {
        if self.singular.is_singular() || rhs.singular.is_singular() {
            return Self {
                unsigned: Magnitude::ZERO,
                sign: Sign::POS,
                singular: self.singular.merge(rhs.singular),
            };
        }
        let (mag, overflow) = self.unsigned.overflowing_mul(rhs.unsigned);
        let sign = self.sign.combine(rhs.sign);
        if overflow {
            return Self::overflow(sign);
        }
        Self::new_signed(mag, sign)
    }

    pub fn checked_div(self, rhs: Self) -> Self {
        self.div_rem_euclid(rhs).0
    }

    pub fn checked_rem(self, rhs: Self) -> Self {
        self.div_rem_euclid(rhs).1
    }

    /// Euclidean-style division: `(Q, R)` with `0 <= R < |Y|` always, rather
    /// than the truncating convention (remainder takes the dividend's sign)
    /// that falls out of dividing the two magnitudes directly. When the
    /// truncating remainder comes out with the wrong sign, `|Y|` is folded
    /// into it and `Q` is nudged by one in the direction that keeps
    /// `Q*Y + R == self` true.
    pub fn div_rem_euclid(self, rhs: Self) -> (Self, Self) {
        if self.singular.is_singular() || rhs.singular.is_singular() {
            let merged = Self {
                unsigned: Magnitude::ZERO,
                sign: Sign::POS,
                singular: self.singular.merge(rhs.singular),
            };
            return (merged, merged);
        }
        if rhs.unsigned.is_zero() {
            return (Self::nan(), Self::nan());
        }
        let (q_mag, r_mag) = self.unsigned.div_wide(rhs.unsigned);
        let mut q = Self::new_signed(q_mag, self.sign.combine(rhs.sign));
        let mut r = Self::new_signed(r_mag, self.sign);
        if r.is_negative() {
            let abs_rhs = Self::new_signed(rhs.unsigned, Sign::POS);
            r = r + abs_rhs;
            q = if rhs.is_negative() { q + Self::ONE } else { q - Self::ONE };
        }
        (q, r)
    }

    /// Left shift of the magnitude, sign preserved.
    pub fn shl(self, shift: u32) -> Self {
        if self.singular.is_singular() {
            return self;
        }
        Self::new_signed(self.unsigned.shl(shift), self.sign)
    }

    /// Right shift of the magnitude, sign preserved.
    ///
    /// Shifts right, full stop. An earlier revision of this routine called the
    /// left-shift path here by mistake; that bug is not reproduced.
    pub fn shr(self, shift: u32) -> Self {
        if self.singular.is_singular() {
            return self;
        }
        Self::new_signed(self.unsigned.shr(shift), self.sign)
    }

    /// String form using this type's own NaN/overflow tokens, which differ
    /// deliberately from `U128::value`'s empty-string NaN convention: `I128` has
    /// no canonicalizing caller above it that treats NaN as "no text", so it
    /// spells out `"nan"` / `"inf"` rather than hiding them.
    pub fn value(self) -> String {
        if self.singular.is_nan() {
            return "nan".to_string();
        }
        if self.singular.is_overflow() {
            return if self.sign.is_negative() {
                "-inf".to_string()
            } else {
                "inf".to_string()
            };
        }
        let body = self.unsigned.to_string();
        if self.sign.is_negative() && !self.unsigned.is_zero() {
            format!("-{body}")
        } else {
            body
        }
    }
}

impl std::ops::Add for I128 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        self.checked_add(rhs)
    }
}

impl std::ops::Sub for I128 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self.checked_sub(rhs)
    }
}

impl std::ops::Mul for I128 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.checked_mul(rhs)
    }
}

impl std::ops::Div for I128 {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        self.checked_div(rhs)
    }
}

impl std::ops::Rem for I128 {
    type Output = Self;
    fn rem(self, rhs: Self) -> Self {
        self.checked_rem(rhs)
    }
}

impl std::ops::Neg for I128 {
    type Output = Self;
    fn neg(self) -> Self {
        self.negate()
    }
}

impl std::ops::Shl<u32> for I128 {
    type Output = Self;
    fn shl(self, shift: u32) -> Self {
        I128::shl(self, shift)
    }
}

impl std::ops::Shr<u32> for I128 {
    type Output = Self;
    fn shr(self, shift: u32) -> Self {
        I128::shr(self, shift)
    }
}

impl PartialEq for I128 {
    fn eq(&self, other: &Self) -> bool {
        if self.singular.is_singular() || other.singular.is_singular() {
            return false;
        }
        self.unsigned.is_zero() && other.unsigned.is_zero()
            || (self.sign == other.sign && self.unsigned == other.unsigned)
    }
}

impl PartialOrd for I128 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.singular.is_singular() || other.singular.is_singular() {
            return None;
        }
        if self.unsigned.is_zero() && other.unsigned.is_zero() {
            return Some(Ordering::Equal);
        }
        Some(match (self.sign.is_negative(), other.sign.is_negative()) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.unsigned.cmp_mag(other.unsigned),
            (true, true) => other.unsigned.cmp_mag(self.unsigned),
        })
    }
}

impl std::fmt::Display for I128 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl Default for I128 {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[quickcheck]
    fn add_sub_roundtrip(a: i64, b: i64) -> bool {
        let x = I128::from_i64(a);
        let y = I128::from_i64(b);
        (x + y) - y == x
    }

    #[test]
    fn shr_actually_shifts_right() {
        let v = I128::from_i64(8);
        assert_eq!(v.shr(1), I128::from_i64(4));
    }

    #[test]
    fn value_of_nan_is_literal_token() {
        assert_eq!(I128::nan().value(), "nan");
    }

    #[test]
    fn negative_zero_normalizes() {
        assert!(!I128::ZERO.negate().is_negative());
    }

    #[quickcheck]
    fn mul_div_inverts_for_nonzero(a: i32, b: i32) -> bool {
        if b == 0 {
            return true;
        }
        let x = I128::from_i64(a as i64 * b as i64);
        let y = I128::from_i64(b as i64);
        (x / y) == I128::from_i64(a as i64)
    }

    #[quickcheck]
    fn euclidean_remainder_is_always_non_negative_and_below_divisor(a: i16, b: i16) -> bool {
        if b == 0 {
            return true;
        }
        let x = I128::from_i64(a as i64);
        let y = I128::from_i64(b as i64);
        let (q, r) = x.div_rem_euclid(y);
        let reconstructed = q * y + r;
        !r.is_negative() && r < I128::from_i64((b as i64).abs()) && reconstructed == x
    }

    #[test]
    fn euclidean_division_matches_scenario_with_negative_dividend() {
        // -7 / 3: truncating gives (-2, -1); Euclidean gives (-3, 2).
        let (q, r) = I128::from_i64(-7).div_rem_euclid(I128::from_i64(3));
        assert_eq!(q, I128::from_i64(-3));
        assert_eq!(r, I128::from_i64(2));
    }

    #[test]
    fn euclidean_division_matches_scenario_with_negative_divisor() {
        // -7 / -3: truncating gives (2, -1); Euclidean gives (3, 2).
        let (q, r) = I128::from_i64(-7).div_rem_euclid(I128::from_i64(-3));
        assert_eq!(q, I128::from_i64(3));
        assert_eq!(r, I128::from_i64(2));
    }
}
