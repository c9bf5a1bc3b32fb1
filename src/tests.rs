//! Property-based tests spanning the crate's public surface — the things
//! an individual module's own `#[cfg(test)]` block can't see because they
//! cross module boundaries (decimal arithmetic composed with the integer
//! layer, factorization composed with primality testing).

use quickcheck_macros::quickcheck;

use crate::{factor, is_prime, mod_pow, Decimal, Prng, StopToken, U128};

#[quickcheck]
fn u128_roundtrips_through_u64(v: u64) -> bool {
    U128::from_u64(v).value() == v.to_string()
}

#[quickcheck]
fn mod_pow_matches_repeated_multiplication(base: u8, exp: u8, modulus: u8) -> bool {
    if modulus == 0 {
        return true;
    }
    let m = modulus as u64;
    let expected = (1..=exp as u64).fold(1u64, |acc, _| (acc * base as u64) % m);
    let got = mod_pow(U128::from_u64(base as u64), U128::from_u64(exp as u64), U128::from_u64(m));
    got.value() == expected.to_string()
}

#[test]
fn factoring_a_number_reproduces_it_by_multiplication() {
    let stop = StopToken::new();
    let mut rng = Prng::seed_from(3);
    for n in [12u64, 97, 1001, 360] {
        let factors = factor(U128::from_u64(n), &stop, &mut rng);
        let product = factors.iter().fold(U128::from_u64(1), |acc, (p, e)| {
            (0..*e).fold(acc, |acc, _| acc * *p)
        });
        assert_eq!(product.value(), n.to_string(), "failed for {n}");
        for (p, _) in &factors {
            assert!(is_prime(*p, 64, &mut rng), "{p} returned as a factor of {n} isn't prime");
        }
    }
}

#[quickcheck]
fn decimal_add_then_sub_is_identity(a: u32, b: u32) -> bool {
    let x = Decimal::parse(&a.to_string());
    let y = Decimal::parse(&b.to_string());
    (x + y) - y == x
}

#[quickcheck]
fn decimal_mul_by_one_is_identity(a: u32) -> bool {
    let x = Decimal::parse(&a.to_string());
    let one = Decimal::parse("1");
    x * one == x
}
