//! Pure unsigned 128-bit magnitude arithmetic.
//!
//! This is the shared engine underneath both [`crate::u128::U128`] (which adds a
//! sign and a singular state on top) and [`crate::i128::I128`] (which layers its own,
//! separately-typed sign and singular state over a private magnitude of its own). Keeping
//! the raw bit-twiddling here means the two wrapping types only have to reason about
//! sign and NaN/overflow bookkeeping, not about carries.

use crate::low64::Low64;
use std::cmp::Ordering;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Magnitude {
    pub lo: Low64,
    pub hi: Low64,
}

impl Magnitude {
    pub const ZERO: Self = Self {
        lo: Low64::ZERO,
        hi: Low64::ZERO,
    };
    pub const ONE: Self = Self {
        lo: Low64::ONE,
        hi: Low64::ZERO,
    };
    pub const MAX: Self = Self {
        lo: Low64::MAX,
        hi: Low64::MAX,
    };

    pub const fn new(hi: u64, lo: u64) -> Self {
        Self {
            hi: Low64::new(hi),
            lo: Low64::new(lo),
        }
    }

    pub fn from_u64(v: u64) -> Self {
        Self {
            hi: Low64::ZERO,
            lo: Low64::new(v),
        }
    }

    pub fn is_zero(self) -> bool {
        self.hi.is_zero() && self.lo.is_zero()
    }

    pub fn fits_u64(self) -> bool {
        self.hi.is_zero()
    }

    pub fn cmp_mag(self, other: Self) -> Ordering {
        match self.hi.cmp(&other.hi) {
            Ordering::Equal => self.lo.cmp(&other.lo),
            ord => ord,
        }
    }

    /// Adds two magnitudes, reporting whether the 128-bit result overflowed.
    pub fn overflowing_add(self, rhs: Self) -> (Self, bool) {
        let (lo, carry) = self.lo.overflowing_add(rhs.lo);
        let (hi, carry1) = self.hi.overflowing_add(rhs.hi);
        let (hi, carry2) = hi.overflowing_add(Low64::new(carry as u64));
        (Self { hi, lo }, carry1 || carry2)
    }

    /// Subtracts `rhs` from `self`, reporting whether the result borrowed
    /// below zero (i.e. `self < rhs`).
    pub fn overflowing_sub(self, rhs: Self) -> (Self, bool) {
        let (lo, borrow) = self.lo.overflowing_sub(rhs.lo);
        let (hi, borrow1) = self.hi.overflowing_sub(rhs.hi);
        let (hi, borrow2) = hi.overflowing_sub(Low64::new(borrow as u64));
        (Self { hi, lo }, borrow1 || borrow2)
    }

    /// Quarter-width multiply of two 64-bit limbs into a full 128-bit product.
    ///
    /// Splits each operand into 32-bit halves and forms the four cross products,
    /// the same decomposition a machine without a native 64×64→128 multiplier would
    /// use by hand.
    pub fn mult64(x: Low64, y: Low64) -> Self {
        let x = x.get();
        let y = y.get();
        let x_lo = x & 0xFFFF_FFFF;
        let x_hi = x >> 32;
        let y_lo = y & 0xFFFF_FFFF;
        let y_hi = y >> 32;

        let t0 = x_lo * y_lo;
        let t1 = x_lo * y_hi;
        let t2 = x_hi * y_lo;
        let t3 = x_hi * y_hi;

        let mut mid = t1.wrapping_add(t2);
        let mid_carry = if mid < t1 { 1u64 << 32 } else { 0 };

        let (lo, lo_carry) = t0.overflowing_add(mid << 32);
        let hi = t3
            .wrapping_add(mid >> 32)
            .wrapping_add(mid_carry >> 32)
            .wrapping_add(lo_carry as u64);

        Self {
            hi: Low64::new(hi),
            lo: Low64::new(lo),
        }
    }

    /// Full 128×128 -> 256-bit product, as four limbs (most significant first).
    /// Used by the number-theory layer's modular multiplication, where the
    /// intermediate product of two 128-bit residues genuinely needs 256 bits.
    pub fn mult_ext(self, other: Self) -> [Low64; 4] {
        let ll = Self::mult64(self.lo, other.lo);
        let lh = Self::mult64(self.lo, other.hi);
        let hl = Self::mult64(self.hi, other.lo);
        let hh = Self::mult64(self.hi, other.hi);

        let r0 = ll.lo;
        let (mid, c1) = ll.hi.overflowing_add(lh.lo);
        let (mid, c2) = mid.overflowing_add(hl.lo);
        let r1 = mid;

        let (hi2, c3) = hh.lo.overflowing_add(lh.hi);
        let (hi2, c4) = hi2.overflowing_add(hl.hi);
        let (hi2, c5) = hi2.overflowing_add(Low64::new(c1 as u64 + c2 as u64));
        let r2 = hi2;

        let r3 = hh
            .hi
            .wrapping_add(Low64::new(c3 as u64 + c4 as u64 + c5 as u64));

        [r3, r2, r1, r0]
    }

    /// `self * other`, truncated to 128 bits, alongside whether any of the
    /// discarded high bits were nonzero.
    ///
    /// Built from the same `mult64` quarter-width primitive as [`Self::mult_ext`]:
    /// only the low 128 bits of the full 256-bit product are kept, and overflow is
    /// whatever the upper two limbs of that product would have been.
    pub fn overflowing_mul(self, other: Self) -> (Self, bool) {
        let [r3, r2, r1, r0] = self.mult_ext(other);
        let result = Self { hi: r1, lo: r0 };
        let overflow = !r3.is_zero() || !r2.is_zero();
        (result, overflow)
    }

    /// Divides `self` (a full 128-bit value) by a 64-bit divisor `y`, returning
    /// `(quotient, remainder)`.
    ///
    /// The quotient is built in two pieces — the part contributed by the high
    /// limb, and a correction pass that walks down a running error term until it
    /// is smaller than the divisor — rather than a single wide division, mirroring
    /// how the reference implementation builds 128÷64 division out of 64-bit
    /// hardware division primitives.
    pub fn div_low64(self, y: Low64) -> (Self, Low64) {
        assert!(!y.is_zero(), "division by zero");

        let (q1, r1) = self.hi.divmod(y);
        let d = Low64::MAX.divmod(y).0;
        let m = Low64::MAX.divmod(y).1;

        let (q_low, r_low) = self.lo.divmod(y);

        // N is the quotient contributed by (r1 : self.lo), approximated via the
        // MAX/y, MAX%y reciprocal split; E is the running error against the exact
        // value, corrected below one divisor-sized step at a time.
        let mut n: u128 = (r1.get() as u128) * (d.get() as u128) + q_low.get() as u128;
        let mut e: u128 = (r1.get() as u128) * (m.get() as u128) + r_low.get() as u128 + r1.get() as u128;

        loop {
            let tmp = e / y.get() as u128;
            if tmp == 0 {
                break;
            }
            n += tmp;
            e -= tmp * y.get() as u128;
        }

        let quotient = Self {
            hi: q1,
            lo: Low64::new(n as u64),
        };
        let remainder = Low64::new(e as u64);
        (quotient, remainder)
    }

    /// Full 128-bit by 128-bit division.
    ///
    /// When the divisor fits in 64 bits this degenerates to [`Self::div_low64`].
    /// Otherwise this is the reference's authorial estimate-then-correct
    /// algorithm: divide the high limbs to get a first-pass quotient `Q`
    /// (with remainder `R`), refine it against `Δ = MAX − y.lo` through a
    /// `mult_ext` cross product and a `W1/W2/C1` ratio, then walk a bounded
    /// correction loop that nudges the estimate by one and adjusts the
    /// running error `X − Y·result` until `0 <= Error < Y`.
    pub fn div_wide(self, other: Self) -> (Self, Self) {
        assert!(!other.is_zero(), "division by zero");

        if self.cmp_mag(other) == Ordering::Less {
            return (Self::ZERO, self);
        }

        if other.fits_u64() {
            let (q, r) = self.div_low64(other.lo);
            return (q, Self::from_u64(r.get()));
        }

        const MAX_LOW: Low64 = Low64::MAX;

        let (q, r) = self.hi.divmod(other.hi);
        let delta = MAX_LOW - other.lo;
        let delta_q = Self::mult64(delta, q);
        let r_embedded = Self { hi: Low64::ZERO, lo: r };
        let q_embedded = Self { hi: Low64::ZERO, lo: q };
        let sum1 = r_embedded.overflowing_add(delta_q).0;
        let (w1_raw, make_inverse) = sum1.overflowing_sub(q_embedded);
        let w1 = if make_inverse { w1_raw.wrapping_neg() } else { w1_raw };

        let c1 = if other.hi < MAX_LOW { other.hi + Low64::ONE } else { MAX_LOW };
        let w2 = MAX_LOW - delta.divmod(c1).0;

        let (quotient, _) = w1.div_low64(w2);
        let (quotient, _) = quotient.div_low64(c1);
        let quotient = if make_inverse { quotient.wrapping_neg() } else { quotient };

        let mut result = q_embedded.overflowing_add(quotient).0;
        if make_inverse {
            result = result.overflowing_sub(Self::ONE).0;
        }

        let n = other.overflowing_mul(Self { hi: Low64::ZERO, lo: result.lo }).0;
        let (mut error, negative_error) = self.overflowing_sub(n);

        let mut loops = 0u32;
        while error.cmp_mag(other) != Ordering::Less {
            debug_assert!(loops < 128, "division correction loop should converge quickly");
            loops += 1;
            if negative_error {
                result = result.overflowing_sub(Self::ONE).0;
                error = error.overflowing_add(other).0;
            } else {
                result = result.overflowing_add(Self::ONE).0;
                error = error.overflowing_sub(other).0;
            }
        }

        (result, error)
    }

    /// Bitwise two's-complement negation, wrapping modulo `2^128`. Used by
    /// [`Self::div_wide`]'s quotient refinement, which walks through a
    /// signed-looking intermediate (`W1`) represented as an unsigned
    /// wraparound value exactly the way the reference's fixed-width register
    /// does.
    fn wrapping_neg(self) -> Self {
        self.not().overflowing_add(Self::ONE).0
    }

    pub fn div10(self) -> Self {
        self.div_low64(Low64::new(10)).0
    }

    pub fn mod10(self) -> u32 {
        self.div_low64(Low64::new(10)).1.get() as u32
    }

    pub fn shl(self, shift: u32) -> Self {
        if shift == 0 {
            self
        } else if shift >= 128 {
            Self::ZERO
        } else if shift >= 64 {
            Self {
                hi: self.lo << (shift - 64),
                lo: Low64::ZERO,
            }
        } else {
            Self {
                hi: (self.hi << shift) | (self.lo >> (64 - shift)),
                lo: self.lo << shift,
            }
        }
    }

    pub fn shr(self, shift: u32) -> Self {
        if shift == 0 {
            self
        } else if shift >= 128 {
            Self::ZERO
        } else if shift >= 64 {
            Self {
                hi: Low64::ZERO,
                lo: self.hi >> (shift - 64),
            }
        } else {
            Self {
                hi: self.hi >> shift,
                lo: (self.lo >> shift) | (self.hi << (64 - shift)),
            }
        }
    }

    pub fn countl_zero(self) -> u32 {
        if self.hi.is_zero() {
            64 + self.lo.countl_zero()
        } else {
            self.hi.countl_zero()
        }
    }

    pub fn bitand(self, other: Self) -> Self {
        Self {
            hi: self.hi & other.hi,
            lo: self.lo & other.lo,
        }
    }

    pub fn bitor(self, other: Self) -> Self {
        Self {
            hi: self.hi | other.hi,
            lo: self.lo | other.lo,
        }
    }

    pub fn bitxor(self, other: Self) -> Self {
        Self {
            hi: self.hi ^ other.hi,
            lo: self.lo ^ other.lo,
        }
    }

    pub fn not(self) -> Self {
        Self {
            hi: !self.hi,
            lo: !self.lo,
        }
    }

    /// Decimal digits, least significant first, using repeated `div10`.
    pub fn to_decimal_digits(self) -> Vec<u8> {
        if self.is_zero() {
            return vec![0];
        }
        let mut digits = Vec::new();
        let mut n = self;
        while !n.is_zero() {
            digits.push(n.mod10() as u8);
            n = n.div10();
        }
        digits
    }
}

impl std::fmt::Display for Magnitude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut digits = self.to_decimal_digits();
        digits.reverse();
        for d in digits {
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn to_u128(m: Magnitude) -> u128 {
        ((m.hi.get() as u128) << 64) | m.lo.get() as u128
    }

    fn from_u128(v: u128) -> Magnitude {
        Magnitude::new((v >> 64) as u64, v as u64)
    }

    #[quickcheck]
    fn add_matches_native(a: u64, b: u64, c: u64, d: u64) -> bool {
        let x = from_u128(((a as u128) << 64) | b as u128);
        let y = from_u128(((c as u128) << 64) | d as u128);
        let (r, ovf) = x.overflowing_add(y);
        let (expect, expect_ovf) = to_u128(x).overflowing_add(to_u128(y));
        to_u128(r) == expect && ovf == expect_ovf
    }

    #[quickcheck]
    fn mult64_matches_native(a: u64, b: u64) -> bool {
        let r = Magnitude::mult64(Low64::new(a), Low64::new(b));
        to_u128(r) == (a as u128) * (b as u128)
    }

    #[quickcheck]
    fn div_low64_matches_native(a: u64, b: u64, y: u64) -> bool {
        if y == 0 {
            return true;
        }
        let x = from_u128(((a as u128) << 64) | b as u128);
        let (q, r) = x.div_low64(Low64::new(y));
        to_u128(x) / (y as u128) == to_u128(q) && to_u128(x) % (y as u128) == r.get() as u128
    }

    #[quickcheck]
    fn div_wide_matches_native(a: u128, b: u128) -> bool {
        if b == 0 {
            return true;
        }
        let x = from_u128(a);
        let y = from_u128(b);
        let (q, r) = x.div_wide(y);
        to_u128(q) == a / b && to_u128(r) == a % b
    }

    #[test]
    fn display_zero_is_single_digit() {
        assert_eq!(Magnitude::ZERO.to_string(), "0");
    }
}
