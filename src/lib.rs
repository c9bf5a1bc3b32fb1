//! A 128-bit arbitrary-precision numeric kernel: signed-magnitude integers,
//! a fixed-point decimal built on top of them, number theory and
//! factorization routines, a GF(2) linear solver, and the calculator state
//! machine and pipeline that tie them together for a front end.

mod low64;
mod sign;
mod singular;
mod mag;
mod u128;
mod i128;

mod control;
mod prng;
mod number_theory;
mod factor;
mod gf2;

mod error;
mod decimal;
mod config;
mod calculator;
mod pipeline;

#[cfg(test)]
mod tests;

pub use control::StopToken;
pub use prng::Prng;

pub use number_theory::{gcd, is_prime, is_quadratic_residue, isqrt, isqrt_exact, miller_test, mod_mul, mod_pow, sqrt_mod};
pub use factor::{factor, fermat_method, pollard_minus_p, pollard_rho};
pub use gf2::solve as solve_gf2;

pub use error::CalcError;
pub use decimal::{denominator, set_width, width, Decimal};
pub use config::{Config, ConfigStore, MemoryConfigStore};
pub use calculator::{
    do_it, evaluate, Calculator, Request, ResultRecord, State, ADD, CLEAR_ALL, DIV, EQUAL, FACTOR,
    MAX_INT_VALUE, MULT, NEGATION, NO_ERRORS, NOT_FINITE, RANDINT, RANDINT64, RECIPROC, SEPARATOR,
    SQR, SQRT, SUB, UNKNOWN_OP, ZERO_DIVISION,
};
pub use pipeline::{Pipeline, RequestSender, ResultReceiver, BUFFER_SIZE};

pub use i128::I128;
pub use mag::Magnitude;
pub use sign::Sign;
pub use u128::U128;
