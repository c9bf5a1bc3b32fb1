//! The stateful orchestrator tying `Decimal` arithmetic, the factorizer, and
//! the PRNG together behind a single operation-code dispatch.
//!
//! Grounded on the reference's `doIt` (the arithmetic switch) and `AppCore`'s
//! `process`/`DoWork`/`mState` machine. The Qt-specific parts of `AppCore`
//! (signals, input-field strings, console logging) are UI plumbing this
//! crate doesn't own; what's kept here is the operation-code table, the
//! `{Reset, EqualToOp, EqualsLoop, OpLoop, OpToEqual}` state machine that
//! decides which register an incoming value lands in and when a request is
//! actually ready to dispatch, and the arithmetic dispatcher itself.

use crate::control::StopToken;
use crate::decimal::Decimal;
use crate::error::CalcError;
use crate::factor::factor;
use crate::mag::Magnitude;
use crate::prng::Prng;
use crate::sign::Sign;
use crate::u128::U128;

pub const ADD: i32 = 0;
pub const SUB: i32 = 1;
pub const MULT: i32 = 2;
pub const DIV: i32 = 3;
pub const SEPARATOR: i32 = 4;
pub const SQRT: i32 = 5;
pub const SQR: i32 = 6;
pub const RECIPROC: i32 = 7;
pub const NEGATION: i32 = 8;
pub const FACTOR: i32 = 9;
pub const MAX_INT_VALUE: i32 = 10;
pub const RANDINT: i32 = 11;
pub const RANDINT64: i32 = 12;
pub const EQUAL: i32 = -1;
pub const CLEAR_ALL: i32 = -2;

pub const NO_ERRORS: i32 = 0;
pub const UNKNOWN_OP: i32 = 1;
pub const ZERO_DIVISION: i32 = 2;
pub const NOT_FINITE: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Reset,
    EqualToOp,
    EqualsLoop,
    OpLoop,
    OpToEqual,
}

/// `{ operation, operands }`, the wire shape the worker consumes (§6).
#[derive(Debug, Clone, Copy)]
pub struct Request {
    pub operation: i32,
    pub operands: [Decimal; 2],
}

/// `{ error, operation, exact_sqrt, result }` (§6). For `FACTOR`, `result` is
/// the flattened `[prime_0, power_0, prime_1, power_1, ...]` sequence.
#[derive(Debug, Clone)]
pub struct ResultRecord {
    pub error: i32,
    pub operation: i32,
    pub exact_sqrt: bool,
    pub result: Vec<Decimal>,
}

fn checked(result: Decimal) -> Result<Decimal, CalcError> {
    if result.is_overflowed() {
        Err(CalcError::NotFinite)
    } else {
        Ok(result)
    }
}

/// Routes a two-operand or one-operand operation code to the matching
/// `Decimal` operator, returning the exact-square-root flag alongside the
/// result (meaningful only for [`SQRT`]; `false` otherwise).
///
/// The reference's dispatcher re-checks `both_operands_same_sign &&
/// result.IsNegative()` after multiply/divide and flags that as an error
/// too; this reimplementation trusts `Decimal`'s own overflow tagging
/// instead (see the design notes on why that re-check isn't reproduced).
#[tracing::instrument(skip(x, y))]
pub fn do_it(operation: i32, x: Decimal, y: Decimal) -> (Result<Decimal, CalcError>, bool) {
    match operation {
        ADD => (checked(x + y), false),
        SUB => (checked(x - y), false),
        MULT => (checked(x * y), false),
        DIV => {
            if y.is_zero() {
                (Err(CalcError::ZeroDivision), false)
            } else {
                (checked(x / y), false)
            }
        }
        NEGATION => (checked(Decimal::zero() - x), false),
        SQR => (checked(x * x), false),
        SQRT => {
            if x.is_negative() {
                (Err(CalcError::NotFinite), false)
            } else {
                let (root, exact) = x.sqrt();
                (checked(root), exact)
            }
        }
        RECIPROC => {
            if x.is_zero() {
                (Err(CalcError::ZeroDivision), false)
            } else {
                let one = Decimal::set_decimal(U128::ONE, U128::ZERO, None);
                (checked(one / x), false)
            }
        }
        _ => (Err(CalcError::UnknownOperation(operation)), false),
    }
}

/// Evaluates a fully-formed request, including the non-arithmetic codes
/// (`FACTOR`, `MAX_INT_VALUE`, `RANDINT`, `RANDINT64`) that `do_it` alone
/// doesn't cover.
#[tracing::instrument(skip(rng, stop))]
pub fn evaluate(request: Request, rng: &mut Prng, stop: &StopToken) -> ResultRecord {
    let Request { operation, operands } = request;
    let [x, y] = operands;
    match operation {
        FACTOR => {
            let factors = factor(x.integer_part(), stop, rng);
            let result = factors
                .into_iter()
                .flat_map(|(p, e)| {
                    [
                        Decimal::set_decimal(p, U128::ZERO, None),
                        Decimal::set_decimal(U128::from_u64(e as u64), U128::ZERO, None),
                    ]
                })
                .collect();
            ResultRecord {
                error: NO_ERRORS,
                operation,
                exact_sqrt: false,
                result,
            }
        }
        MAX_INT_VALUE => ResultRecord {
            error: NO_ERRORS,
            operation,
            exact_sqrt: false,
            result: vec![Decimal::set_decimal(U128::MAX, U128::ZERO, None)],
        },
        RANDINT => {
            let mag = Magnitude::new(rng.next_u64(), rng.next_u64());
            let value = U128::new_signed(mag, Sign::POS);
            ResultRecord {
                error: NO_ERRORS,
                operation,
                exact_sqrt: false,
                result: vec![Decimal::set_decimal(value, U128::ZERO, None)],
            }
        }
        RANDINT64 => {
            let value = U128::from_u64(rng.next_u64());
            ResultRecord {
                error: NO_ERRORS,
                operation,
                exact_sqrt: false,
                result: vec![Decimal::set_decimal(value, U128::ZERO, None)],
            }
        }
        _ => {
            let (outcome, exact) = do_it(operation, x, y);
            match outcome {
                Ok(value) => ResultRecord {
                    error: NO_ERRORS,
                    operation,
                    exact_sqrt: exact,
                    result: vec![value],
                },
                Err(e) => ResultRecord {
                    error: e.code(),
                    operation,
                    exact_sqrt: exact,
                    result: Vec::new(),
                },
            }
        }
    }
}

/// Registers, state, and cancellation token for one calculator session.
/// Owns no thread itself; [`crate::pipeline`] supplies the worker loop that
/// drains requests this emits and calls [`evaluate`] on them.
pub struct Calculator {
    r0: Decimal,
    r1: Decimal,
    state: State,
    current_operation: Option<i32>,
    stop: StopToken,
}

impl Calculator {
    pub fn new() -> Self {
        Self {
            r0: Decimal::zero(),
            r1: Decimal::zero(),
            state: State::Reset,
            current_operation: None,
            stop: StopToken::new(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// A clone of the cancellation token this calculator signals on `clear`.
    /// A worker thread running the factorizer polls this to unwind an
    /// in-flight computation.
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Unconditionally returns to [`State::Reset`] and signals cancellation
    /// to any in-flight factorization.
    pub fn clear(&mut self) {
        self.stop.request_stop();
        self.r0 = Decimal::zero();
        self.r1 = Decimal::zero();
        self.state = State::Reset;
        self.current_operation = None;
    }

    /// Submits `value` (already parsed) under `operation`, returning the
    /// request that should be dispatched, or `None` when the operator code
    /// alone doesn't yet produce one — e.g. selecting a binary operator
    /// while a left operand is still pending.
    #[tracing::instrument(skip(self))]
    pub fn submit(&mut self, operation: i32, value: Decimal) -> Option<Request> {
        if operation == CLEAR_ALL {
            self.clear();
            return None;
        }
        if operation == FACTOR {
            if matches!(self.state, State::EqualToOp | State::OpLoop) {
                return None;
            }
            self.current_operation = Some(FACTOR);
            return Some(Request {
                operation,
                operands: [value, value],
            });
        }

        let is_two_operand = (0..SEPARATOR).contains(&operation);
        let is_one_operand = operation > SEPARATOR;
        let state_is_operation = matches!(self.state, State::EqualToOp | State::OpLoop);
        let state_is_the_equal = matches!(self.state, State::EqualsLoop | State::OpToEqual);
        let state_is_resetted = matches!(self.state, State::Reset);

        if is_two_operand && state_is_operation {
            self.state = State::OpLoop;
            let req = self.push(value);
            self.current_operation = Some(operation);
            return req;
        }

        if operation == EQUAL || is_one_operand {
            self.state = if state_is_operation {
                State::OpToEqual
            } else {
                State::EqualsLoop
            };
        }

        if is_two_operand {
            if state_is_the_equal {
                self.state = State::EqualToOp;
            }
            if state_is_resetted {
                self.r1 = value;
                self.state = State::EqualToOp;
            }
            self.current_operation = Some(operation);
        }

        self.push(value)
    }

    /// Routes `value` into `R0`/`R1` per the current state and builds the
    /// request, if the state calls for dispatching one immediately.
    fn push(&mut self, value: Decimal) -> Option<Request> {
        let operation = self.current_operation?;
        match self.state {
            State::EqualsLoop | State::Reset => {
                self.r1 = value;
                Some(Request {
                    operation,
                    operands: [self.r1, self.r0],
                })
            }
            State::EqualToOp => {
                self.r1 = value;
                None
            }
            State::OpLoop | State::OpToEqual => {
                self.r0 = value;
                Some(Request {
                    operation,
                    operands: [self.r1, self.r0],
                })
            }
        }
    }

    /// Feeds a completed result back into `R1`, so a chained operation (or a
    /// repeated `equal`) consumes it as the next left operand.
    pub fn accept_result(&mut self, result: Decimal) {
        self.r1 = result;
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_equal_dispatches_twice() {
        let mut calc = Calculator::new();
        let three = Decimal::parse("3");
        let four = Decimal::parse("4");

        let req = calc.submit(ADD, three).expect("first operand starts a request");
        assert_eq!(req.operation, ADD);

        let req = calc.submit(ADD, four).expect("second operand completes it");
        assert_eq!(req.operands[1], four);
        let (result, _) = do_it(ADD, req.operands[0], req.operands[1]);
        let sum = result.unwrap();
        calc.accept_result(sum);
        assert_eq!(sum.value(), "7");

        let req = calc
            .submit(EQUAL, Decimal::nan())
            .expect("equal repeats the last operation");
        assert_eq!(req.operation, ADD);
    }

    #[test]
    fn clear_resets_state_and_requests_cancellation() {
        let mut calc = Calculator::new();
        let stop = calc.stop_token();
        calc.submit(ADD, Decimal::parse("1"));
        calc.clear();
        assert_eq!(calc.state(), State::Reset);
        assert!(stop.is_stopped());
    }

    #[test]
    fn factor_is_refused_mid_binary_chain() {
        let mut calc = Calculator::new();
        calc.submit(ADD, Decimal::parse("1"));
        calc.submit(ADD, Decimal::parse("2"));
        assert!(calc.submit(FACTOR, Decimal::parse("6")).is_none());
    }

    #[test]
    fn division_by_zero_is_zero_division() {
        let x = Decimal::parse("1");
        let zero = Decimal::zero();
        let (result, _) = do_it(DIV, x, zero);
        assert_eq!(result, Err(CalcError::ZeroDivision));
    }

    #[test]
    fn unknown_operation_is_reported() {
        let (result, _) = do_it(42, Decimal::zero(), Decimal::zero());
        assert_eq!(result, Err(CalcError::UnknownOperation(42)));
    }

    #[test]
    fn evaluate_factor_flattens_prime_power_pairs() {
        let stop = StopToken::new();
        let mut rng = Prng::seed_from(11);
        let request = Request {
            operation: FACTOR,
            operands: [Decimal::parse("12"), Decimal::parse("12")],
        };
        let record = evaluate(request, &mut rng, &stop);
        assert_eq!(record.error, NO_ERRORS);
        // 12 = 2^2 * 3^1, as two (prime, power) pairs flattened.
        assert_eq!(record.result.len(), 4);
    }
}
