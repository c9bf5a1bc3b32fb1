//! Integer factorization: trial division, Miller-Rabin, Pollard's rho,
//! Pollard p-1, and Fermat's method, all cooperatively cancellable.
//!
//! Grounded on the reference's `u128_utils.cpp` `factor`/`ferma_method`/
//! `ro_pollard`/`pollard_minus_p`, translated phase-for-phase: divide out
//! small primes first, fall back to Miller-Rabin once the residual is small
//! enough to trust, then alternate Pollard's rho and Pollard p-1 to peel off
//! further factors, and finish with a recursive Fermat pass over whatever is
//! left. `tracing::instrument`/`tracing::debug!` stand in for the reference's
//! silence — there is no free equivalent to "nothing happened" in the source,
//! so this is strictly additive instrumentation (§10.1 of the design notes).

use crate::control::StopToken;
use crate::number_theory::{gcd, is_prime, isqrt_exact, mod_mul};
use crate::prng::Prng;
use crate::u128::U128;

const SMALL_PRIME_BOUND: u64 = 65536;
const STOP_POLL_FERMAT: u64 = 65536;
const STOP_POLL_POLLARD: u64 = 256;

/// Repeatedly divides `x` by `q`, returning `(q, how many times it divided evenly)`.
fn div_by_q(x: &mut U128, q: U128) -> (U128, u32) {
    let mut count = 0u32;
    loop {
        let (quotient, remainder) = (*x / q, *x % q);
        if !remainder.is_zero() {
            break;
        }
        *x = quotient;
        count += 1;
    }
    (q, count)
}

fn add_mod(x: U128, y: U128, n: U128) -> U128 {
    mod_mul(x + y, U128::ONE, n)
}

/// Fermat's method: express `x = a^2 - b^2` by searching outward from `isqrt(x)`,
/// using the incremental update to the running square so each step costs an add
/// rather than a multiply, plus a dual-side divisibility check from the small-factor
/// side that can terminate the search early. Returns `(a, b)` with `a <= b` and
/// `a*b == x`; when `x` turns out to be prime this returns `(x, 1)`.
#[tracing::instrument(level = "debug", skip(stop))]
pub fn fermat_method(x: U128, stop: &StopToken) -> (U128, U128) {
    let (x_sqrt, exact) = isqrt_exact(x);
    if exact {
        return (x_sqrt, x_sqrt);
    }
    let error = x - x_sqrt * x_sqrt;
    let mut y = U128::from_u64(2) * x_sqrt + U128::ONE - error;

    let (y_sqrt, exact) = isqrt_exact(y);
    let delta0 = x_sqrt + x_sqrt + U128::from_u64(3);
    y = y + delta0;
    if exact {
        return (
            x_sqrt + U128::ONE - y_sqrt,
            x_sqrt + U128::ONE + y_sqrt,
        );
    }

    let k_upper = x_sqrt;
    let mut k = U128::from_u64(2);
    loop {
        if k.magnitude().lo.get() & 65535 == 0 && stop.is_stopped() {
            tracing::warn!("fermat_method cancelled mid-search");
            break;
        }
        if k > k_upper {
            return (x, U128::ONE);
        }
        if k.magnitude().lo.get() & 1 == 1 {
            // Dual-side check: does `k` itself divide out a valid factor without
            // needing the slower square-search below?
            let n1 = k * k + x;
            if n1.magnitude().lo.get() & 1 == 0 {
                let two_k = k + k;
                let (q1, remainder) = (n1 / two_k, n1 % two_k);
                if remainder.is_zero() && q1 > x_sqrt {
                    let (q2, remainder2) = (x / k, x % k);
                    if remainder2.is_zero() {
                        return (k, q2);
                    }
                }
            }
        }
        // Filter out candidates whose running square can't possibly be a
        // perfect square ending in anything but 1 or 9, so the (relatively
        // expensive) isqrt below only runs on plausible candidates.
        let delta = (x_sqrt + x_sqrt) + (k + k) + U128::ONE;
        let r = y.mod10();
        if r == 1 || r == 9 {
            let (y_sqrt, exact) = isqrt_exact(y);
            y = y + delta;
            if exact {
                return (x_sqrt + k - y_sqrt, x_sqrt + k + y_sqrt);
            }
        } else {
            y = y + delta;
        }
        k = k + U128::ONE;
    }
    (x, U128::ONE)
}

/// Pollard's rho, tortoise-and-hare variant: `q` advances one step per
/// iteration, `y` advances two, and a shared-factor candidate falls out of
/// `gcd(|q - y|, n)`. Returns `n` itself if nothing was found within `limit`
/// iterations or before cancellation.
#[tracing::instrument(level = "debug", skip(stop))]
pub fn pollard_rho(n: U128, limit: Option<U128>, stop: &StopToken) -> U128 {
    if n < U128::from_u64(4) {
        return n;
    }
    let mut q = U128::from_u64(2);
    let mut y = q;
    let mut d = U128::ONE;
    let mut i = U128::ZERO;
    while d == U128::ONE {
        q = add_mod(mod_mul(q, q, n), U128::from_u64(3), n);
        y = add_mod(mod_mul(y, y, n), U128::from_u64(3), n);
        y = add_mod(mod_mul(y, y, n), U128::from_u64(3), n);
        d = if q >= y { gcd(q - y, n) } else { gcd(y - q, n) };
        if i.magnitude().lo.get() & STOP_POLL_POLLARD == 0 && stop.is_stopped() {
            tracing::warn!("pollard_rho cancelled mid-search");
            break;
        }
        if let Some(bound) = limit {
            if i >= bound {
                break;
            }
        }
        i = i + U128::ONE;
    }
    if d != n {
        d
    } else {
        n
    }
}

/// Pollard's p-1: looks for a factor via `gcd(q^(i+2) mod x - 1, x)`, which
/// finds `p` whenever `p - 1` is a product of only small primes.
#[tracing::instrument(level = "debug", skip(stop))]
pub fn pollard_minus_p(x: U128, limit: Option<U128>, stop: &StopToken) -> U128 {
    if x < U128::from_u64(4) {
        return x;
    }
    let mut q = U128::from_u64(2);
    let mut i = U128::ZERO;
    loop {
        q = crate::number_theory::mod_pow(q, i + U128::from_u64(2), x);
        let d = gcd(q - U128::ONE, x);
        if d > U128::ONE {
            return d;
        }
        if i.magnitude().lo.get() & STOP_POLL_POLLARD == 0 && stop.is_stopped() {
            tracing::warn!("pollard_minus_p cancelled mid-search");
            break;
        }
        if let Some(bound) = limit {
            if i >= bound {
                break;
            }
        }
        i = i + U128::ONE;
    }
    x
}

fn recurse_isqrt_limit(x: U128) -> U128 {
    isqrt_exact(isqrt_exact(x).0).0
}

/// Recursively applies Fermat's method to `x` and every factor it produces,
/// accumulating `(prime, exponent)` pairs into `result`.
fn fermat_recursive(x: U128, stop: &StopToken, rng: &mut Prng, result: &mut Vec<(U128, u32)>) {
    if stop.is_stopped() {
        return;
    }
    if is_prime(x, 64, rng) {
        record(result, x, 1);
        return;
    }
    let (a, b) = fermat_method(x, stop);
    if a == U128::ONE {
        record(result, b, 1);
        return;
    }
    if b == U128::ONE {
        record(result, a, 1);
        return;
    }
    fermat_recursive(a, stop, rng, result);
    fermat_recursive(b, stop, rng, result);
}

fn record(result: &mut Vec<(U128, u32)>, p: U128, exponent: u32) {
    if exponent == 0 {
        return;
    }
    if let Some(entry) = result.iter_mut().find(|(prime, _)| *prime == p) {
        entry.1 += exponent;
    } else {
        result.push((p, exponent));
    }
}

/// Factors `x` into prime-power pairs, polling `stop` throughout so a long
/// factorization can be abandoned early with whatever partial result has
/// accumulated so far.
#[tracing::instrument(level = "debug", skip(stop, rng))]
pub fn factor(mut x: U128, stop: &StopToken, rng: &mut Prng) -> Vec<(U128, u32)> {
    let mut result = Vec::new();

    if x.is_zero() || x == U128::ONE {
        result.push((x, 1));
        return result;
    }

    let (_, twos) = div_by_q(&mut x, U128::from_u64(2));
    if twos > 0 {
        record(&mut result, U128::from_u64(2), twos);
    }
    if x == U128::ONE {
        return result;
    }

    let mut divisor: u64 = 3;
    while divisor < SMALL_PRIME_BOUND {
        if stop.is_stopped() {
            tracing::warn!("factor cancelled during trial division");
            return result;
        }
        let q = U128::from_u64(divisor);
        if is_prime(q, 64, rng) {
            let (_, successes) = div_by_q(&mut x, q);
            if successes > 0 {
                record(&mut result, q, successes);
            }
            if x == U128::ONE {
                return result;
            }
        }
        divisor += 2;
    }

    if is_prime(x, 64, rng) {
        record(&mut result, x, 1);
        return result;
    }

    let mut pollard_factors = Vec::new();
    let mut remaining = x;

    let mut limit = recurse_isqrt_limit(remaining);
    loop {
        if is_prime(remaining, 64, rng) {
            record(&mut result, remaining, 1);
            remaining = U128::ONE;
            break;
        }
        let d = pollard_rho(remaining, Some(limit), stop);
        if d != remaining && d != U128::ONE {
            pollard_factors.push(d);
            remaining = remaining / d;
            limit = recurse_isqrt_limit(remaining);
            continue;
        }
        break;
    }

    if remaining != U128::ONE {
        let mut limit = recurse_isqrt_limit(remaining);
        loop {
            if is_prime(remaining, 64, rng) {
                record(&mut result, remaining, 1);
                remaining = U128::ONE;
                break;
            }
            let d = pollard_minus_p(remaining, Some(limit), stop);
            if d != remaining && d != U128::ONE {
                pollard_factors.push(d);
                remaining = remaining / d;
                limit = recurse_isqrt_limit(remaining);
                continue;
            }
            break;
        }
    }

    if remaining > U128::ONE {
        pollard_factors.push(remaining);
    }

    for factor_candidate in pollard_factors {
        fermat_recursive(factor_candidate, stop, rng, &mut result);
    }

    stop.reset();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(factors: &[(U128, u32)]) -> U128 {
        factors
            .iter()
            .fold(U128::ONE, |acc, (p, e)| (0..*e).fold(acc, |a, _| a * *p))
    }

    #[test]
    fn factors_small_semiprime() {
        let stop = StopToken::new();
        let mut rng = Prng::seed_from(1);
        let result = factor(U128::from_u64(91), &stop, &mut rng); // 7 * 13
        assert_eq!(product(&result), U128::from_u64(91));
    }

    #[test]
    fn factors_composite_with_repeated_prime() {
        let stop = StopToken::new();
        let mut rng = Prng::seed_from(2);
        // 2 * 3^2 * 5^3 * 7 = 15750
        let x = U128::from_u64(2 * 9 * 125 * 7);
        let result = factor(x, &stop, &mut rng);
        assert_eq!(product(&result), x);
        let as_map: std::collections::BTreeMap<_, _> = result.into_iter().collect();
        assert_eq!(as_map.get(&U128::from_u64(2)), Some(&1));
        assert_eq!(as_map.get(&U128::from_u64(3)), Some(&2));
        assert_eq!(as_map.get(&U128::from_u64(5)), Some(&3));
        assert_eq!(as_map.get(&U128::from_u64(7)), Some(&1));
    }

    #[test]
    fn factors_prime_as_itself() {
        let stop = StopToken::new();
        let mut rng = Prng::seed_from(3);
        let result = factor(U128::from_u64(7919), &stop, &mut rng);
        assert_eq!(result, vec![(U128::from_u64(7919), 1)]);
    }

    #[test]
    fn factors_zero_and_one_trivially() {
        let stop = StopToken::new();
        let mut rng = Prng::seed_from(4);
        assert_eq!(
            factor(U128::ZERO, &stop, &mut rng),
            vec![(U128::ZERO, 1)]
        );
        assert_eq!(factor(U128::ONE, &stop, &mut rng), vec![(U128::ONE, 1)]);
    }

    #[test]
    fn cancellation_yields_partial_result_without_panicking() {
        let stop = StopToken::new();
        stop.request_stop();
        let mut rng = Prng::seed_from(5);
        // Large-ish composite; with stop already requested the trial-division
        // loop should bail immediately rather than hang.
        let _ = factor(U128::from_u64(999_999_937 * 3), &stop, &mut rng);
    }
}
