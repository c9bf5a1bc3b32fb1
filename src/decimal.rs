//! Fixed-point signed decimal built on a pair of [`U128`] values: an integer
//! part and a fractional numerator over a process-wide denominator `D = 10^W`.
//!
//! Grounded on the reference's `dec_n::Decimal`/`dec_n::Vector128`. The sign
//! is deliberately dual-encoded exactly as the reference keeps it: a value
//! with magnitude at least one carries its sign in the integer part ("strong"
//! negative); a value strictly between -1 and 1 carries it in the numerator
//! instead ("weak" negative), because the integer part is zero and zero has
//! no sign of its own. Multiply and divide branch on this sign class the same
//! eight ways the reference does, rather than collapsing to a single
//! magnitude-and-sign representation, because that branching is the part of
//! this component worth learning from.

use crate::error::CalcError;
use crate::sign::Sign;
use crate::u128::U128;
use std::sync::atomic::{AtomicU32, Ordering};

const MAX_WIDTH: u32 = 9;
const DEFAULT_WIDTH: u32 = 3;
const MAX_STRING_LEN: usize = 80;

static WIDTH: AtomicU32 = AtomicU32::new(DEFAULT_WIDTH);

/// Sets the process-wide fractional width, returning whether it actually
/// changed. Every existing [`Decimal`] keeps its own `changed_denominator`
/// snapshot, so in-flight values are not retroactively reinterpreted, but new
/// arithmetic and parsing use the new width from this call onward.
pub fn set_width(width: i32) -> Result<bool, CalcError> {
    if !(0..=MAX_WIDTH as i32).contains(&width) {
        return Err(CalcError::WidthOutOfRange(width));
    }
    let old = WIDTH.swap(width as u32, Ordering::SeqCst);
    Ok(old != width as u32)
}

pub fn width() -> u32 {
    WIDTH.load(Ordering::Relaxed)
}

/// `10^W` for the current process-wide width.
pub fn denominator() -> U128 {
    power_of_ten(width())
}

fn power_of_ten(w: u32) -> U128 {
    let mut d = U128::ONE;
    let ten = U128::from_u64(10);
    for _ in 0..w {
        d = d * ten;
    }
    d
}

/// Fixed-capacity string cache, mirroring the reference's stack-allocated
/// `Vector128` buffer rather than a heap `String`.
#[derive(Debug, Clone, Copy)]
struct StringBuffer {
    bytes: [u8; MAX_STRING_LEN],
    len: usize,
}

impl StringBuffer {
    fn empty() -> Self {
        Self {
            bytes: [0; MAX_STRING_LEN],
            len: 0,
        }
    }

    fn set(&mut self, s: &str) {
        let bytes = s.as_bytes();
        self.len = bytes.len().min(MAX_STRING_LEN);
        self.bytes[..self.len].copy_from_slice(&bytes[..self.len]);
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len]).unwrap_or("")
    }
}

impl Default for StringBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for StringBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Decimal {
    integer: U128,
    nominator: U128,
    changed_denominator: Option<U128>,
    string_cache: StringBuffer,
}

impl Decimal {
    pub fn zero() -> Self {
        let mut d = Self {
            integer: U128::ZERO,
            nominator: U128::ZERO,
            changed_denominator: Some(denominator()),
            string_cache: StringBuffer::default(),
        };
        d.transform_to_string();
        d
    }

    pub fn nan() -> Self {
        let mut d = Self {
            integer: U128::ZERO,
            nominator: U128::ZERO,
            changed_denominator: Some(U128::ZERO),
            string_cache: StringBuffer::default(),
        };
        d.transform_to_string();
        d
    }

    pub fn infinity() -> Self {
        let mut d = Self {
            integer: U128::overflow(Sign::POS),
            nominator: U128::overflow(Sign::POS),
            changed_denominator: None,
            string_cache: StringBuffer::default(),
        };
        d.transform_to_string();
        d
    }

    /// Stores components and canonicalizes: carries an out-of-range
    /// numerator into the integer part, rescales the numerator if
    /// `denominator` differs from the current width's `D`, and refreshes the
    /// string cache. `denominator = None` means "use the process-wide `D`".
    pub fn set_decimal(integer: U128, nominator: U128, denominator: Option<U128>) -> Self {
        let mut d = Self {
            integer,
            nominator,
            changed_denominator: denominator,
            string_cache: StringBuffer::default(),
        };
        d.transform_to_string();
        d.transform_to_decimal();
        d
    }

    /// Parses `[-]? digits (separator digits?)?`; `,` and `.` are both
    /// accepted as the fractional separator. Overflow during integer
    /// accumulation produces infinity; missing or extra fractional digits
    /// are padded or truncated to exactly the current width.
    pub fn parse(s: &str) -> Self {
        let mut d = Self {
            integer: U128::ZERO,
            nominator: U128::ZERO,
            changed_denominator: None,
            string_cache: StringBuffer::default(),
        };
        d.string_cache.set(s);
        d.transform_to_decimal();
        d.transform_to_string();
        d
    }

    pub fn value(&self) -> &str {
        self.string_cache.as_str()
    }

    pub fn integer_part(&self) -> U128 {
        self.integer
    }

    pub fn nominator(&self) -> U128 {
        self.nominator
    }

    pub fn is_integer(&self) -> bool {
        self.nominator.is_zero() && self.changed_denominator.map(|d| !d.is_zero()).unwrap_or(true)
    }

    pub fn is_overflowed(&self) -> bool {
        (self.integer.is_negative() && self.nominator.is_negative())
            || self.integer.is_overflow()
            || self.nominator.is_overflow()
    }

    pub fn is_not_a_number(&self) -> bool {
        let is_triple_zero = self.integer.is_zero()
            && self.nominator.is_zero()
            && self.changed_denominator.map(|d| d.is_zero()).unwrap_or(false);
        is_triple_zero || self.integer.is_nan() || self.nominator.is_nan()
    }

    /// Negative in the "strong" sense: magnitude at least one, sign held by
    /// the integer part.
    pub fn is_strong_negative(&self) -> bool {
        self.integer.is_negative()
            && !self.nominator.is_negative()
            && self.changed_denominator.map(|d| !d.is_zero() && !d.is_negative()).unwrap_or(true)
    }

    /// Negative in the "weak" sense: magnitude under one, sign held by the
    /// numerator because the integer part is zero.
    pub fn is_weak_negative(&self) -> bool {
        self.integer.is_zero()
            && self.nominator.is_negative()
            && self.changed_denominator.map(|d| !d.is_zero() && !d.is_negative()).unwrap_or(true)
    }

    pub fn is_negative(&self) -> bool {
        self.is_strong_negative() || self.is_weak_negative()
    }

    pub fn is_zero(&self) -> bool {
        self.integer.is_zero()
            && self.nominator.is_zero()
            && self.changed_denominator.map(|d| !d.is_zero() && !d.is_negative()).unwrap_or(true)
    }

    fn set_infinity(&mut self) {
        *self = Self::infinity();
    }

    fn set_not_a_number(&mut self) {
        *self = Self::nan();
    }

    /// Canonicalizes the stored components into the string cache: carries a
    /// numerator outside `[0, changed_denominator)` into the integer part,
    /// rescales the numerator to the current width's denominator, then
    /// writes out `[-]? int_digits [,] frac_digits{W}`.
    fn transform_to_string(&mut self) {
        if self.is_overflowed() {
            self.string_cache.set("inf");
            return;
        }
        if self.is_not_a_number() {
            self.string_cache.set("");
            return;
        }

        let current_d = denominator();
        let mut changed_d = self.changed_denominator.unwrap_or(current_d);
        let mut r = self.integer;
        let the_sign = self.is_negative();

        if self.nominator.abs() >= changed_d {
            let tmp = self.nominator / changed_d;
            r = if !the_sign { r + tmp } else { r - tmp };
            if r.is_overflow() {
                self.string_cache.set("inf");
                return;
            }
            self.nominator = if !self.nominator.is_negative() {
                self.nominator - changed_d * tmp
            } else {
                self.nominator + changed_d * tmp
            };
        }

        let mut fraction = self.nominator.abs();
        if current_d != changed_d {
            fraction = (fraction * current_d) / changed_d;
        }
        changed_d = current_d;
        self.changed_denominator = Some(changed_d);

        r = r.abs();
        if r.is_overflow() {
            self.integer = U128::overflow(Sign::POS);
            self.nominator = U128::overflow(Sign::POS);
            self.string_cache.set("inf");
            return;
        }

        let w = width() as usize;
        let int_digits = digits_of(r);
        let mut s = String::with_capacity(int_digits.len() + w + 2);
        if the_sign {
            s.push('-');
        }
        s.push_str(&int_digits);
        if w > 0 {
            s.push(',');
            let mut frac_digits = Vec::with_capacity(w);
            let mut f = fraction;
            for _ in 0..w {
                frac_digits.push(b'0' + f.mod10() as u8);
                f = f.div10();
            }
            frac_digits.reverse();
            s.push_str(std::str::from_utf8(&frac_digits).unwrap());
        }
        self.string_cache.set(&s);
    }

    /// Parses `string_cache` back into `(integer, nominator, changed_denominator)`,
    /// the inverse of [`Self::transform_to_string`].
    fn transform_to_decimal(&mut self) {
        let view: Vec<u8> = self.string_cache.as_str().bytes().collect();
        if view.is_empty() {
            self.integer = U128::ZERO;
            self.nominator = U128::ZERO;
            self.changed_denominator = Some(U128::ZERO);
            return;
        }
        if self.string_cache.as_str().starts_with("inf") {
            self.integer = U128::overflow(Sign::POS);
            self.nominator = U128::overflow(Sign::POS);
            return;
        }

        self.nominator = U128::ZERO;
        let d = denominator();
        self.changed_denominator = Some(d);

        let the_sign = view[0] == b'-';
        let mut idx = if the_sign { 1 } else { 0 };
        self.integer = U128::ZERO;
        let mut overflow = false;
        while idx < view.len() && is_digit(view[idx]) {
            let digit = undigit(view[idx]);
            let next = self.integer * U128::from_u64(10);
            if next.is_overflow() {
                overflow = true;
                break;
            }
            self.integer = next;
            let next = self.integer + U128::from_u64(digit as u64);
            if next.is_overflow() {
                overflow = true;
                break;
            }
            self.integer = next;
            idx += 1;
        }
        if overflow {
            self.integer = U128::overflow(Sign::POS);
            self.nominator = U128::overflow(Sign::POS);
            self.string_cache.set("inf");
            return;
        }
        self.integer = if the_sign { -self.integer } else { self.integer };

        if idx >= view.len() || (view[idx] != b',' && view[idx] != b'.') {
            return;
        }
        idx += 1;

        let mut digits_seen = 0u32;
        let w = width();
        while idx < view.len() && digits_seen < w && is_digit(view[idx]) {
            self.nominator = self.nominator * U128::from_u64(10);
            self.nominator = self.nominator + U128::from_u64(undigit(view[idx]) as u64);
            idx += 1;
            digits_seen += 1;
        }
        while digits_seen < w {
            self.nominator = self.nominator * U128::from_u64(10);
            digits_seen += 1;
        }
        if self.integer.is_zero() && the_sign {
            self.nominator = -self.nominator;
        }
    }

    pub fn add(self, rhs: Self) -> Self {
        let neg1 = self.is_negative();
        let neg2 = rhs.is_negative();
        let integer_sum = self.integer + rhs.integer;
        if integer_sum.is_overflow() {
            return Self::infinity();
        }
        let nominator_sum = self.nominator + rhs.nominator;
        if nominator_sum.is_overflow() {
            return Self::infinity();
        }

        let mut sum = integer_sum;
        let mut f = self.nominator.abs() + rhs.nominator.abs();
        let have_differ_signs = neg1 ^ neg2;
        if neg1 && !neg2 {
            f = -self.nominator.abs() + rhs.nominator.abs();
        }
        if !neg1 && neg2 {
            f = self.nominator.abs() - rhs.nominator.abs();
        }
        if have_differ_signs {
            if f.is_negative() && sum.is_negative() {
                f = -f;
            } else if f.is_negative() && !sum.is_negative() && !sum.is_zero() {
                f = f + denominator();
                sum = sum - U128::ONE;
            } else if !f.is_negative() && !f.is_zero() && sum.is_negative() {
                f = f - denominator();
                sum = sum + U128::ONE;
                if !sum.is_zero() {
                    f = f.abs();
                }
            }
        }
        if neg1 && neg2 && sum.is_zero() {
            f = -f;
        }
        Self::set_decimal(sum, f, None)
    }

    pub fn sub(self, rhs: Self) -> Self {
        let negated_nominator = if rhs.integer.is_zero() {
            -rhs.nominator
        } else {
            rhs.nominator
        };
        let negated = Self::set_decimal(-rhs.integer, negated_nominator, None);
        negated.add(self)
    }

    pub fn mul(self, rhs: Self) -> Self {
        if rhs.is_overflowed() || self.is_overflowed() {
            return Self::infinity();
        }
        if rhs.is_not_a_number() || self.is_not_a_number() {
            return Self::nan();
        }
        let d = denominator();
        let mut integer_part = self.integer * rhs.integer;
        if integer_part.is_overflow() {
            return Self::infinity();
        }

        let all_integers = self.nominator.is_zero() && rhs.nominator.is_zero();
        if all_integers {
            return Self::set_decimal(integer_part, U128::ZERO, None);
        }

        let neg1 = self.is_negative();
        let neg2 = rhs.is_negative();
        let mut fraction_part;

        let left_integer = self.nominator.is_zero() && !rhs.nominator.is_zero();
        if left_integer {
            let a = self.integer.abs() * rhs.nominator.abs();
            if a.is_overflow() {
                return Self::infinity();
            }
            let tmp = a / d;
            integer_part = integer_part + if neg1 ^ neg2 { -tmp } else { tmp };
            fraction_part = a - tmp * d;
            if neg1 ^ neg2 {
                fraction_part = if integer_part.is_zero() { -fraction_part } else { fraction_part };
            }
            return Self::set_decimal(integer_part, fraction_part, None);
        }

        let right_integer = !self.nominator.is_zero() && rhs.nominator.is_zero();
        if right_integer {
            let a = self.nominator.abs() * rhs.integer.abs();
            if a.is_overflow() {
                return Self::infinity();
            }
            let tmp = a / d;
            integer_part = integer_part + if neg1 ^ neg2 { -tmp } else { tmp };
            fraction_part = a - tmp * d;
            if neg1 ^ neg2 {
                fraction_part = if integer_part.is_zero() { -fraction_part } else { fraction_part };
            }
            return Self::set_decimal(integer_part, fraction_part, None);
        }

        if !neg1 && !neg2 {
            let a = self.integer * rhs.nominator + self.nominator * rhs.integer
                + (self.nominator * rhs.nominator) / d;
            if a.is_overflow() {
                return Self::infinity();
            }
            let tmp = a / d;
            integer_part = integer_part + tmp;
            fraction_part = a - tmp * d;
            return Self::set_decimal(integer_part, fraction_part, None);
        }

        if neg1 && neg2 {
            let (neg1_strong, neg1_weak) = (self.is_strong_negative(), self.is_weak_negative());
            let (neg2_strong, neg2_weak) = (rhs.is_strong_negative(), rhs.is_weak_negative());
            let a = if neg1_strong && neg2_strong {
                self.integer.abs() * rhs.nominator + rhs.integer.abs() * self.nominator
                    + (self.nominator * rhs.nominator) / d
            } else if neg1_weak && neg2_strong {
                rhs.integer.abs() * self.nominator.abs() + (self.nominator.abs() * rhs.nominator) / d
            } else if neg1_strong && neg2_weak {
                self.integer.abs() * rhs.nominator.abs() + (self.nominator * rhs.nominator.abs()) / d
            } else {
                debug_assert!(neg1_weak && neg2_weak);
                (self.nominator.abs() * rhs.nominator.abs()) / d
            };
            if a.is_overflow() {
                return Self::infinity();
            }
            let tmp = a / d;
            integer_part = integer_part + tmp;
            fraction_part = a - tmp * d;
            return Self::set_decimal(integer_part, fraction_part, None);
        }

        if neg1 && !neg2 {
            let neg1_strong = self.is_strong_negative();
            let a = if neg1_strong {
                self.integer.abs() * rhs.nominator + rhs.integer * self.nominator
                    + (self.nominator * rhs.nominator) / d
            } else {
                rhs.integer * self.nominator.abs() + (self.nominator.abs() * rhs.nominator) / d
            };
            if a.is_overflow() {
                return Self::infinity();
            }
            let tmp = a / d;
            integer_part = if neg1_strong { integer_part.abs() + tmp } else { tmp };
            fraction_part = a - tmp * d;
            integer_part = -integer_part;
            fraction_part = if integer_part.is_zero() { -fraction_part } else { fraction_part };
            return Self::set_decimal(integer_part, fraction_part, None);
        }

        debug_assert!(!neg1 && neg2);
        let neg2_strong = rhs.is_strong_negative();
        let a = if neg2_strong {
            self.integer * rhs.nominator + rhs.integer.abs() * self.nominator
                + (self.nominator * rhs.nominator) / d
        } else {
            self.integer * rhs.nominator.abs() + (self.nominator * rhs.nominator.abs()) / d
        };
        if a.is_overflow() {
            return Self::infinity();
        }
        let tmp = a / d;
        integer_part = if neg2_strong { integer_part.abs() + tmp } else { tmp };
        fraction_part = a - tmp * d;
        integer_part = -integer_part;
        fraction_part = if integer_part.is_zero() { -fraction_part } else { fraction_part };
        Self::set_decimal(integer_part, fraction_part, None)
    }

    pub fn div(self, rhs: Self) -> Self {
        if rhs.is_zero() && !self.is_zero() {
            return Self::infinity();
        }
        if rhs.is_zero() && self.is_zero() {
            return Self::nan();
        }
        if rhs.is_overflowed() || self.is_overflowed() {
            return Self::infinity();
        }
        if rhs.is_not_a_number() || self.is_not_a_number() {
            return Self::nan();
        }

        let d = denominator();
        let neg1 = self.is_negative();
        let neg2 = rhs.is_negative();

        let all_integers = self.nominator.is_zero() && rhs.nominator.is_zero();
        if all_integers {
            let a = self.integer.abs();
            let b = rhs.integer.abs();
            let mut integer_part = a / b;
            let mut fraction_part = a - integer_part * b;
            if neg1 ^ neg2 {
                integer_part = if integer_part.is_zero() { integer_part } else { -integer_part };
                fraction_part = if integer_part.is_zero() { -fraction_part } else { fraction_part };
            }
            return Self::set_decimal(integer_part, fraction_part, Some(b));
        }

        let denominator_is_integer = rhs.nominator.is_zero() && !rhs.integer.is_zero();
        if denominator_is_integer {
            let a = self.integer.abs();
            let b = rhs.integer.abs();
            let div_part = a / b;
            let mod_part = a - div_part * b;
            let mut integer_part = div_part + mod_part / b;
            let mut fraction_part = (self.nominator.abs() + mod_part * d) / b;
            if neg1 ^ neg2 {
                integer_part = if integer_part.is_zero() { integer_part } else { -integer_part };
                fraction_part = if integer_part.is_zero() { -fraction_part } else { fraction_part };
            }
            return Self::set_decimal(integer_part, fraction_part, None);
        }

        if !neg1 && !neg2 {
            let a = self.integer * d + self.nominator;
            let b = rhs.integer * d + rhs.nominator;
            let integer_part = a / b;
            let fraction_part = a - integer_part * b;
            return Self::set_decimal(integer_part, fraction_part, Some(b));
        }

        if neg1 && neg2 {
            let (neg1_strong, neg1_weak) = (self.is_strong_negative(), self.is_weak_negative());
            let (neg2_strong, neg2_weak) = (rhs.is_strong_negative(), rhs.is_weak_negative());
            if neg1_strong && neg2_strong {
                let a = self.integer.abs() * d + self.nominator;
                let b = rhs.integer.abs() * d + rhs.nominator;
                let integer_part = a / b;
                let fraction_part = a - integer_part * b;
                return Self::set_decimal(integer_part, fraction_part, Some(b));
            }
            if neg1_weak && neg2_weak {
                let integer_part = self.nominator / rhs.nominator;
                let a = self.nominator.abs();
                let b = rhs.nominator.abs();
                let div_part = a / b;
                let fraction_part = a - div_part * b;
                return Self::set_decimal(integer_part, fraction_part, Some(b));
            }
            if neg1_strong && neg2_weak {
                let a = self.integer.abs() * d + self.nominator;
                let b = rhs.nominator.abs();
                let integer_part = a / b;
                let fraction_part = a - integer_part * b;
                return Self::set_decimal(integer_part, fraction_part, Some(b));
            }
            debug_assert!(neg1_weak && neg2_strong);
            let a = self.nominator.abs();
            let b = rhs.integer.abs() * d + rhs.nominator;
            let integer_part = a / b;
            let fraction_part = a - integer_part * b;
            return Self::set_decimal(integer_part, fraction_part, Some(b));
        }

        if neg1 && !neg2 {
            let neg1_strong = self.is_strong_negative();
            let (a, b) = if neg1_strong {
                (self.integer.abs() * d + self.nominator, rhs.integer * d + rhs.nominator)
            } else {
                (self.nominator.abs(), rhs.integer * d + rhs.nominator)
            };
            let mut integer_part = a / b;
            let mut fraction_part = a - integer_part * b;
            integer_part = -integer_part;
            fraction_part = if integer_part.is_zero() { -fraction_part } else { fraction_part };
            return Self::set_decimal(integer_part, fraction_part, Some(b));
        }

        debug_assert!(!neg1 && neg2);
        let neg2_strong = rhs.is_strong_negative();
        let (a, b) = if neg2_strong {
            (self.integer * d + self.nominator, rhs.integer.abs() * d + rhs.nominator)
        } else {
            (self.integer * d + self.nominator, rhs.nominator.abs())
        };
        let mut integer_part = a / b;
        let mut fraction_part = a - integer_part * b;
        integer_part = -integer_part;
        fraction_part = if integer_part.is_zero() { -fraction_part } else { fraction_part };
        Self::set_decimal(integer_part, fraction_part, Some(b))
    }

    /// Integer square root of this value's full-precision numerator
    /// `A = |integer|*D + nominator`, returned as a `Decimal` over the same
    /// width, alongside whether the root is exact.
    pub fn sqrt(self) -> (Self, bool) {
        if self.is_negative() {
            return (Self::nan(), false);
        }
        if self.is_not_a_number() || self.is_overflowed() {
            return (Self::nan(), false);
        }
        let d = denominator();
        let a = self.integer.abs() * d + self.nominator.abs();
        // Scale by D again so the integer sqrt of A*D divided back by sqrt(D)
        // lands on the same width as the operand: sqrt(A/D) = sqrt(A*D)/D.
        let scaled = a * d;
        let (root, exact) = crate::number_theory::isqrt_exact(scaled);
        let integer_part = root / d;
        let remainder = root - integer_part * d;
        let result = Self::set_decimal(integer_part, remainder, None);
        (result, exact)
    }
}

impl std::ops::Add for Decimal {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Decimal::add(self, rhs)
    }
}

impl std::ops::Sub for Decimal {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Decimal::sub(self, rhs)
    }
}

impl std::ops::Mul for Decimal {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Decimal::mul(self, rhs)
    }
}

impl std::ops::Div for Decimal {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        Decimal::div(self, rhs)
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl std::fmt::Display for Decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Self::zero()
    }
}

fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

fn undigit(b: u8) -> u32 {
    if is_digit(b) {
        (b - b'0') as u32
    } else {
        0
    }
}

/// Ascii decimal digits of a non-negative, non-singular `U128`, most
/// significant first, with at least one digit (`"0"` for zero).
fn digits_of(mut r: U128) -> String {
    if r.is_zero() {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while !r.is_zero() {
        digits.push(b'0' + r.mod10() as u8);
        r = r.div10();
    }
    digits.reverse();
    String::from_utf8(digits).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_width<T>(w: i32, body: impl FnOnce() -> T) -> T {
        let old = width();
        set_width(w).unwrap();
        let result = body();
        set_width(old as i32).unwrap();
        result
    }

    #[test]
    fn zero_formats_with_configured_width() {
        with_width(3, || {
            assert_eq!(Decimal::zero().value(), "0,000");
        });
    }

    #[test]
    fn parse_then_format_round_trips() {
        with_width(3, || {
            let d = Decimal::parse("1,000");
            assert_eq!(d.value(), "1,000");
        });
    }

    #[test]
    fn divide_matches_scenario_s3() {
        with_width(3, || {
            let a = Decimal::parse("1,000");
            let b = Decimal::parse("0,500");
            assert_eq!((a / b).value(), "2,000");
        });
    }

    #[test]
    fn sqrt_matches_scenario_s4() {
        with_width(3, || {
            let (root, exact) = Decimal::parse("2,000").sqrt();
            assert_eq!(root.value(), "1,414");
            assert!(!exact);
        });
    }

    #[test]
    fn multiply_matches_scenario_s5() {
        with_width(3, || {
            let a = Decimal::parse("55,550");
            let b = Decimal::parse("44,440");
            assert_eq!((a * b).value(), "2468,642");
        });
    }

    #[test]
    fn add_matches_scenario_s6() {
        with_width(3, || {
            let a = Decimal::parse("55,555");
            let b = Decimal::parse("-44,445");
            assert_eq!((a + b).value(), "11,110");
        });
    }

    #[test]
    fn divide_by_zero_is_infinite_unless_both_are_zero() {
        with_width(3, || {
            let a = Decimal::parse("1,000");
            let zero = Decimal::zero();
            assert_eq!((a / zero).value(), "inf");
            assert_eq!((zero / zero).value(), "");
        });
    }

    #[test]
    fn negative_weak_value_round_trips() {
        with_width(3, || {
            let d = Decimal::parse("-0,500");
            assert!(d.is_weak_negative());
            assert_eq!(d.value(), "-0,500");
        });
    }

    #[test]
    fn width_out_of_range_is_rejected() {
        assert_eq!(set_width(10), Err(CalcError::WidthOutOfRange(10)));
        assert_eq!(set_width(-1), Err(CalcError::WidthOutOfRange(-1)));
    }
}
