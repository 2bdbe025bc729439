//! Precedence levels.
//!
//! A production fires only when its precedence is at least the minimum
//! precedence requested by the caller. Higher numbers bind tighter.

use std::fmt;

/// Binding strength of a production or operand position.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, serde::Serialize)]
#[serde(transparent)]
pub struct Prec(u32);

impl Prec {
    /// Loosest level: any production may fire.
    pub const ZERO: Prec = Prec(0);
    /// Atomic productions (identifiers, literals, brackets).
    pub const MAX: Prec = Prec(1024);
    /// Operands of application. Only `MAX` productions fire here.
    pub const ARG: Prec = Prec(1023);
    /// Binders such as `fun`: tighter than any operator, but not an argument.
    pub const LEAD: Prec = Prec(1022);

    #[inline]
    pub const fn new(level: u32) -> Self {
        Self(level)
    }

    #[inline]
    pub const fn level(self) -> u32 {
        self.0
    }

    /// The next tighter level, saturating at `MAX`.
    #[inline]
    pub fn succ(self) -> Self {
        Self((self.0 + 1).min(Self::MAX.0))
    }

    /// The next looser level, saturating at zero.
    #[inline]
    pub fn pred(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

impl From<u32> for Prec {
    fn from(level: u32) -> Self {
        Self(level.min(Self::MAX.0))
    }
}

impl fmt::Display for Prec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::MAX => write!(f, "max"),
            Self::ARG => write!(f, "arg"),
            Self::LEAD => write!(f, "lead"),
            Self(level) => write!(f, "{level}"),
        }
    }
}
