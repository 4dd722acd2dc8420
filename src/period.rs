//! Term units and installment due-date sequencing.
//!
//! A loan is repaid one installment per period. The period is a day, a
//! week or a calendar month; loans quoted in years are still collected
//! monthly, so a `Years` term steps one month at a time and its
//! installment count is the term multiplied by twelve.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_MAX_INSTALLMENTS;
use crate::error::{EmiError, EmiResult};

const MONTHS_PER_YEAR: u32 = 12;

/// Calendar granularity of a loan term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermUnit {
    #[serde(alias = "daily", alias = "day")]
    Days,
    #[serde(alias = "weekly", alias = "week")]
    Weeks,
    #[serde(alias = "monthly", alias = "month")]
    Months,
    #[serde(alias = "yearly", alias = "year")]
    Years,
}

impl TermUnit {
    /// Number of installments for a term of `term_value` units.
    pub fn installment_count(self, term_value: u32) -> EmiResult<u32> {
        match self {
            TermUnit::Years => term_value.checked_mul(MONTHS_PER_YEAR).ok_or_else(|| {
                EmiError::invalid("termValue", format!("{term_value} years overflows the installment count"))
            }),
            TermUnit::Days | TermUnit::Weeks | TermUnit::Months => Ok(term_value),
        }
    }

    /// Converts a percentage rate input into the decimal rate applied per installment.
    ///
    /// Day, week and month rates are already quoted per period. A yearly
    /// rate is annual and is spread over the twelve monthly installments.
    pub fn periodic_rate(self, rate_input: Decimal) -> Decimal {
        let rate = rate_input / dec!(100);
        match self {
            TermUnit::Years => rate / Decimal::from(MONTHS_PER_YEAR),
            TermUnit::Days | TermUnit::Weeks | TermUnit::Months => rate,
        }
    }

    /// Advances `date` by exactly one installment period.
    ///
    /// Month steps clamp to the last day of a shorter month.
    pub fn advance(self, date: NaiveDate) -> EmiResult<NaiveDate> {
        let next = match self {
            TermUnit::Days => date.checked_add_days(Days::new(1)),
            TermUnit::Weeks => date.checked_add_days(Days::new(7)),
            TermUnit::Months | TermUnit::Years => date.checked_add_months(Months::new(1)),
        };
        next.ok_or(EmiError::DateOverflow {
            from: date,
            unit: self,
        })
    }

    /// Wire name of the unit.
    pub fn as_str(self) -> &'static str {
        match self {
            TermUnit::Days => "days",
            TermUnit::Weeks => "weeks",
            TermUnit::Months => "months",
            TermUnit::Years => "years",
        }
    }
}

impl fmt::Display for TermUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TermUnit {
    type Err = EmiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "days" | "daily" | "day" => Ok(TermUnit::Days),
            "weeks" | "weekly" | "week" => Ok(TermUnit::Weeks),
            "months" | "monthly" | "month" => Ok(TermUnit::Months),
            "years" | "yearly" | "year" => Ok(TermUnit::Years),
            _ => Err(EmiError::UnknownTermUnit(s.to_string())),
        }
    }
}

/// Produces the due date of every installment, in order.
///
/// `start_date` is the disbursement date: the first installment falls one
/// period after it, and each later installment one period after the
/// previous due date.
///
/// # Errors
///
/// Returns an error if `installment_count` is zero or the sequence runs
/// past the representable calendar.
pub fn generate_installment_dates(
    start_date: NaiveDate,
    installment_count: u32,
    term_unit: TermUnit,
) -> EmiResult<Vec<NaiveDate>> {
    if installment_count == 0 {
        return Err(EmiError::invalid(
            "installmentCount",
            "must be greater than zero",
        ));
    }

    let mut dates = Vec::with_capacity(installment_count.min(DEFAULT_MAX_INSTALLMENTS) as usize);
    let mut anchor = start_date;
    for _ in 0..installment_count {
        anchor = term_unit.advance(anchor)?;
        dates.push(anchor);
    }
    Ok(dates)
}
