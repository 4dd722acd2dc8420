//! Amortization engine: turns loan parameters and due dates into an EMI schedule.
//!
//! Two interest methods are supported:
//! - **Diminishing**: the principal is repaid in equal tranches and each
//!   installment carries interest on the balance still outstanding, so
//!   payments decrease over time.
//! - **Flat**: the total interest of the diminishing method is computed
//!   once, added to the principal and spread evenly, so every installment
//!   has the same EMI and the same interest portion.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{EmiError, EmiResult};

/// Balances smaller than this are treated as fully repaid.
const ZERO_TOLERANCE: Decimal = dec!(0.001);
const MONEY_DECIMALS: u32 = 2;

/// How interest is charged over the life of the loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestMethod {
    #[serde(alias = "Diminishing")]
    Diminishing,
    #[serde(alias = "Flat")]
    Flat,
}

impl fmt::Display for InterestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterestMethod::Diminishing => f.write_str("diminishing"),
            InterestMethod::Flat => f.write_str("flat"),
        }
    }
}

impl FromStr for InterestMethod {
    type Err = EmiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "diminishing" => Ok(InterestMethod::Diminishing),
            "flat" => Ok(InterestMethod::Flat),
            _ => Err(EmiError::UnknownMethod(s.to_string())),
        }
    }
}

/// One installment of the schedule. Money fields are rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRow {
    /// 1-based position of the installment.
    pub installment_index: u32,
    pub due_date: NaiveDate,
    /// EMI due for this installment (interest plus principal).
    pub total_payment: Decimal,
    pub interest_portion: Decimal,
    pub principal_portion: Decimal,
    /// Outstanding principal once this installment is paid.
    pub remaining_balance: Decimal,
}

/// A complete EMI schedule and its aggregate totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResult {
    pub rows: Vec<ScheduleRow>,
    pub total_payment: Decimal,
    pub total_principal: Decimal,
    pub total_interest: Decimal,
}

impl ScheduleResult {
    fn from_rows(rows: Vec<ScheduleRow>) -> Self {
        let mut total_payment = Decimal::ZERO;
        let mut total_principal = Decimal::ZERO;
        let mut total_interest = Decimal::ZERO;
        for row in &rows {
            total_payment += row.total_payment;
            total_principal += row.principal_portion;
            total_interest += row.interest_portion;
        }
        ScheduleResult {
            rows,
            total_payment,
            total_principal,
            total_interest,
        }
    }
}

/// Rounds a money amount to cents, halves away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

fn clamp_to_zero(balance: Decimal) -> Decimal {
    if balance.abs() < ZERO_TOLERANCE {
        Decimal::ZERO
    } else {
        balance
    }
}

fn row(
    index: usize,
    due_date: NaiveDate,
    payment: Decimal,
    interest: Decimal,
    principal: Decimal,
    remaining: Decimal,
) -> ScheduleRow {
    ScheduleRow {
        installment_index: index as u32 + 1,
        due_date,
        total_payment: round_money(payment),
        interest_portion: round_money(interest),
        principal_portion: round_money(principal),
        remaining_balance: round_money(remaining.max(Decimal::ZERO)),
    }
}

fn validate(
    principal: Decimal,
    periodic_rate: Decimal,
    installment_count: u32,
    installment_dates: &[NaiveDate],
) -> EmiResult<()> {
    if principal <= Decimal::ZERO {
        return Err(EmiError::invalid("principal", "must be greater than zero"));
    }
    if installment_count == 0 {
        return Err(EmiError::invalid("installmentCount", "must be greater than zero"));
    }
    if periodic_rate < Decimal::ZERO {
        return Err(EmiError::invalid("rateInput", "must not be negative"));
    }
    if installment_dates.len() != installment_count as usize {
        return Err(EmiError::invalid(
            "installmentDates",
            format!(
                "expected {installment_count} due dates, got {}",
                installment_dates.len()
            ),
        ));
    }
    Ok(())
}

/// Computes the installment-by-installment schedule of a loan.
///
/// # Arguments
///
/// * `principal` - The disbursed amount.
/// * `periodic_rate` - Interest rate per installment as a decimal (0.03 for 3%).
/// * `installment_count` - Number of installments.
/// * `method` - Diminishing or flat interest.
/// * `installment_dates` - Due dates, one per installment.
///
/// # Errors
///
/// Returns an error if the principal is not positive, the count is zero,
/// the rate is negative, or the dates do not match the count.
pub fn compute_schedule(
    principal: Decimal,
    periodic_rate: Decimal,
    installment_count: u32,
    method: InterestMethod,
    installment_dates: &[NaiveDate],
) -> EmiResult<ScheduleResult> {
    validate(principal, periodic_rate, installment_count, installment_dates)?;
    debug!(%method, installment_count, %periodic_rate, %principal, "computing EMI schedule");

    let rows = match method {
        InterestMethod::Diminishing => diminishing_rows(principal, periodic_rate, installment_dates),
        InterestMethod::Flat => flat_rows(principal, periodic_rate, installment_dates),
    };
    let result = ScheduleResult::from_rows(rows);

    debug!(
        rows = result.rows.len(),
        total_payment = %result.total_payment,
        total_interest = %result.total_interest,
        "EMI schedule computed"
    );
    Ok(result)
}

fn diminishing_rows(principal: Decimal, rate: Decimal, dates: &[NaiveDate]) -> Vec<ScheduleRow> {
    let tranche = principal / Decimal::from(dates.len());
    let last = dates.len() - 1;
    let mut remaining = principal;
    let mut rows = Vec::with_capacity(dates.len());

    for (i, due_date) in dates.iter().enumerate() {
        let interest = remaining * rate;
        // The last installment, or one that would overshoot, takes exactly what is left.
        let principal_paid = if i == last || tranche > remaining {
            remaining
        } else {
            tranche
        };
        remaining = clamp_to_zero(remaining - principal_paid);

        let installment = row(i, *due_date, principal_paid + interest, interest, principal_paid, remaining);
        trace!(?installment, "diminishing installment");
        rows.push(installment);

        if remaining <= Decimal::ZERO && i < last {
            warn!(
                installment = i + 1,
                scheduled = dates.len(),
                "loan retired before the final installment"
            );
            break;
        }
    }

    if let Some(final_row) = rows.last_mut() {
        final_row.remaining_balance = Decimal::ZERO;
    }
    rows
}

/// Total interest the diminishing method would charge, without building rows.
pub fn simulate_diminishing_interest(
    principal: Decimal,
    periodic_rate: Decimal,
    installment_count: u32,
) -> Decimal {
    if installment_count == 0 {
        return Decimal::ZERO;
    }
    let tranche = principal / Decimal::from(installment_count);
    let mut remaining = principal;
    let mut total_interest = Decimal::ZERO;
    for _ in 0..installment_count {
        total_interest += remaining * periodic_rate;
        remaining = (remaining - tranche).max(Decimal::ZERO);
    }
    total_interest
}

fn flat_rows(principal: Decimal, rate: Decimal, dates: &[NaiveDate]) -> Vec<ScheduleRow> {
    let count = Decimal::from(dates.len());
    let simulated_interest = simulate_diminishing_interest(principal, rate, dates.len() as u32);
    let fixed_emi = (principal + simulated_interest) / count;
    let tranche = principal / count;
    // Interest is the residual of the fixed EMI, not a charge on the balance.
    let interest = fixed_emi - tranche;
    let last = dates.len() - 1;

    let mut remaining = principal;
    let mut rows = Vec::with_capacity(dates.len());

    for (i, due_date) in dates.iter().enumerate() {
        let mut principal_paid = tranche;
        let mut payment = fixed_emi;
        if i == last && remaining != tranche {
            warn!(residual = %(remaining - tranche), "final flat installment absorbs balance residual");
            principal_paid = remaining;
            payment = principal_paid + interest;
        }
        remaining = clamp_to_zero(remaining - principal_paid);

        let installment = row(i, *due_date, payment, interest, principal_paid, remaining);
        trace!(?installment, "flat installment");
        rows.push(installment);
    }

    if let Some(final_row) = rows.last_mut() {
        final_row.remaining_balance = Decimal::ZERO;
    }
    rows
}
