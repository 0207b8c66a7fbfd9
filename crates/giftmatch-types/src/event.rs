//! Event details for one matching round.
//!
//! The event is a singleton per round. Its budget is informational only:
//! it is copied onto every reveal record but never constrains matching.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{GiftmatchError, Result};

/// Suggested spend range for a gift. Invariant: `0 <= min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBudget", into = "RawBudget")]
pub struct BudgetRange {
    min: Decimal,
    max: Decimal,
}

#[derive(Serialize, Deserialize)]
struct RawBudget {
    min: Decimal,
    max: Decimal,
}

impl BudgetRange {
    /// # Errors
    /// Returns [`GiftmatchError::InvalidBudget`] if either bound is
    /// negative or `min > max`.
    pub fn new(min: Decimal, max: Decimal) -> Result<Self> {
        if min.is_sign_negative() || max.is_sign_negative() {
            return Err(GiftmatchError::InvalidBudget {
                reason: "Budget cannot be negative".to_string(),
            });
        }
        if min > max {
            return Err(GiftmatchError::InvalidBudget {
                reason: format!(
                    "Minimum budget {min} cannot be greater than maximum budget {max}"
                ),
            });
        }
        Ok(Self { min, max })
    }

    /// A single suggested amount.
    ///
    /// # Errors
    /// Returns [`GiftmatchError::InvalidBudget`] if `amount` is negative.
    pub fn exact(amount: Decimal) -> Result<Self> {
        Self::new(amount, amount)
    }

    #[must_use]
    pub fn min(&self) -> Decimal {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> Decimal {
        self.max
    }

    /// No budget was set.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.max.is_zero()
    }
}

impl Default for BudgetRange {
    fn default() -> Self {
        Self {
            min: Decimal::ZERO,
            max: Decimal::ZERO,
        }
    }
}

impl TryFrom<RawBudget> for BudgetRange {
    type Error = GiftmatchError;

    fn try_from(raw: RawBudget) -> Result<Self> {
        Self::new(raw.min, raw.max)
    }
}

impl From<BudgetRange> for RawBudget {
    fn from(budget: BudgetRange) -> Self {
        Self {
            min: budget.min,
            max: budget.max,
        }
    }
}

impl fmt::Display for BudgetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unset() {
            write!(f, "None")
        } else if self.min == self.max {
            write!(f, "{}", self.max)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// Organizer-supplied details for one round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub organizer_name: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub budget: BudgetRange,
    /// Free-text message shown alongside every reveal.
    #[serde(default)]
    pub message: String,
}

impl EventDetails {
    /// Trim text fields and check the organizer name.
    ///
    /// # Errors
    /// Returns `EmptyField` if the organizer name is blank.
    pub fn normalized(mut self) -> Result<Self> {
        self.organizer_name = self.organizer_name.trim().to_string();
        self.message = self.message.trim().to_string();
        if self.organizer_name.is_empty() {
            return Err(GiftmatchError::EmptyField {
                field: "organizer_name",
            });
        }
        Ok(self)
    }
}
