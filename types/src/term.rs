//! Stake terms.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// A term length a position may be opened with, or extended by.
///
/// A position's stored term is a plain month count: extensions add a `Term`
/// to it and the sum is not required to be a `Term` itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Term {
    OneMonth,
    ThreeMonths,
    SixMonths,
    TwelveMonths,
}

impl Term {
    pub const ALL: [Term; 4] = [
        Term::OneMonth,
        Term::ThreeMonths,
        Term::SixMonths,
        Term::TwelveMonths,
    ];

    pub fn months(&self) -> u32 {
        match self {
            Term::OneMonth => 1,
            Term::ThreeMonths => 3,
            Term::SixMonths => 6,
            Term::TwelveMonths => 12,
        }
    }

    /// Validate a raw month count against the allowed set.
    pub fn from_months(months: u32) -> Result<Self, TypesError> {
        match months {
            1 => Ok(Term::OneMonth),
            3 => Ok(Term::ThreeMonths),
            6 => Ok(Term::SixMonths),
            12 => Ok(Term::TwelveMonths),
            other => Err(TypesError::InvalidTerm(other)),
        }
    }
}

impl TryFrom<u32> for Term {
    type Error = TypesError;

    fn try_from(months: u32) -> Result<Self, Self::Error> {
        Self::from_months(months)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}mo", self.months())
    }
}
