/// Tracks the two ways a numeric value can stop being an ordinary number:
/// overflow and not-a-number. The two are mutually exclusive; NaN wins if both
/// are requested at once, since a computation that is simultaneously
/// ill-defined and out of range is still, first and foremost, ill-defined.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Singular {
    overflow: bool,
    nan: bool,
}

impl Singular {
    pub const NONE: Self = Self {
        overflow: false,
        nan: false,
    };

    pub fn new(overflow: bool, nan: bool) -> Self {
        if nan {
            Self {
                overflow: false,
                nan: true,
            }
        } else {
            Self {
                overflow,
                nan: false,
            }
        }
    }

    pub const fn overflow() -> Self {
        Self {
            overflow: true,
            nan: false,
        }
    }

    pub const fn nan() -> Self {
        Self {
            overflow: false,
            nan: true,
        }
    }

    pub const fn is_overflow(self) -> bool {
        self.overflow
    }

    pub const fn is_nan(self) -> bool {
        self.nan
    }

    pub const fn is_singular(self) -> bool {
        self.overflow || self.nan
    }

    /// Merges two singular states the way arithmetic propagates them:
    /// NaN infects everything, overflow infects anything that isn't NaN.
    pub fn merge(self, other: Self) -> Self {
        if self.nan || other.nan {
            Self::nan()
        } else if self.overflow || other.overflow {
            Self::overflow()
        } else {
            Self::NONE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_wins_over_overflow_at_construction() {
        let s = Singular::new(true, true);
        assert!(s.is_nan());
        assert!(!s.is_overflow());
    }

    #[test]
    fn merge_propagates_nan_first() {
        assert_eq!(Singular::nan().merge(Singular::overflow()), Singular::nan());
        assert_eq!(Singular::overflow().merge(Singular::NONE), Singular::overflow());
        assert_eq!(Singular::NONE.merge(Singular::NONE), Singular::NONE);
    }
}
