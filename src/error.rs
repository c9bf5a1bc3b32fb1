//! The error type surfaced at the `Decimal`/`Calculator` boundary.
//!
//! Internal numeric code (`U128`, `I128`, `Decimal` arithmetic operators) never
//! returns a `Result`: overflow and NaN are carried in-band as [`crate::singular::Singular`]
//! so that a long expression can keep computing through a singularity instead of
//! unwinding. Only the places a hostile or malformed request can reach — setting
//! the decimal width, dispatching an operation code, parsing a string — translate
//! that in-band state into this enum.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CalcError {
    #[error("division by zero")]
    ZeroDivision,

    #[error("unknown operation code: {0}")]
    UnknownOperation(i32),

    #[error("result is not finite")]
    NotFinite,

    #[error("decimal width out of range: {0} (must be 0..=9)")]
    WidthOutOfRange(i32),
}

/// The dispatcher's numeric error codes (§6), in the same order the original
/// UI layer displayed them.
impl CalcError {
    pub fn code(self) -> i32 {
        match self {
            CalcError::ZeroDivision => 2,
            CalcError::NotFinite => 3,
            CalcError::UnknownOperation(_) => 1,
            CalcError::WidthOutOfRange(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_match_the_external_table() {
        assert_eq!(CalcError::ZeroDivision.code(), 2);
        assert_eq!(CalcError::NotFinite.code(), 3);
        assert_eq!(CalcError::UnknownOperation(42).code(), 1);
    }

    #[test]
    fn unknown_operation_carries_the_offending_code() {
        let err = CalcError::UnknownOperation(77);
        assert_eq!(err.to_string(), "unknown operation code: 77");
    }
}
