//! `emi_schedule` is a Rust library for calculating EMI (equated monthly
//! installment) schedules of microfinance loans.
//!
//! It supports the two interest methods used by the loan desk:
//! - **Diminishing**: equal principal tranches, with interest charged on the
//!   outstanding balance, so installments decrease over time.
//! - **Flat**: a fixed EMI whose total interest is the interest the
//!   diminishing method would have charged, spread evenly over the term.
//!
//! Terms may be quoted in days, weeks, months or years. Yearly terms are
//! collected monthly: two years means 24 installments, and the rate input is
//! treated as an annual rate.
//!
//! ## Usage
//!
//! Add `emi_schedule` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! emi_schedule = "0.1.0"
//! chrono = "0.4"
//! rust_decimal = "1.39.0"
//! rust_decimal_macros = "1.39.0"
//! ```
//!
//! Then, use `calculate_emi_schedule` to build the schedule for a loan:
//!
//! ```rust
//! use chrono::NaiveDate;
//! use emi_schedule::{calculate_emi_schedule, InterestMethod, LoanRequest, TermUnit};
//! use rust_decimal_macros::dec;
//!
//! fn main() {
//!     let request = LoanRequest {
//!         principal: dec!(10_000),
//!         rate_input: dec!(3),
//!         term_value: 5,
//!         term_unit: TermUnit::Months,
//!         method: InterestMethod::Diminishing,
//!         start_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
//!     };
//!
//!     match calculate_emi_schedule(&request) {
//!         Ok(schedule) => {
//!             for row in &schedule.rows {
//!                 println!(
//!                     "#{} {} EMI {:.2} (interest {:.2}, principal {:.2}) balance {:.2}",
//!                     row.installment_index,
//!                     row.due_date,
//!                     row.total_payment,
//!                     row.interest_portion,
//!                     row.principal_portion,
//!                     row.remaining_balance,
//!                 );
//!             }
//!             println!("Total Interest: {:.2}", schedule.total_interest);
//!             println!("Total Payment:  {:.2}", schedule.total_payment);
//!         }
//!         Err(e) => {
//!             eprintln!("Error calculating EMI schedule: {}", e);
//!         }
//!     }
//! }
//! ```
//!
//! Collections against a schedule are tracked with [`RepaymentLedger`].
//! The library logs through `tracing`; install a subscriber to see it.

pub mod config;
pub mod error;
pub mod period;
pub mod repayment;
pub mod request;
pub mod schedule;

pub use config::{DEFAULT_MAX_INSTALLMENTS, ScheduleLimits};
pub use error::{EmiError, EmiResult};
pub use period::{TermUnit, generate_installment_dates};
pub use repayment::{LedgerEntry, RepaymentLedger, RepaymentSummary};
pub use request::{EmiCalculator, LoanPlan, LoanRequest};
pub use schedule::{
    InterestMethod, ScheduleResult, ScheduleRow, compute_schedule, round_money,
    simulate_diminishing_interest,
};

/// Calculates the EMI schedule of a loan request under the default limits.
///
/// This is the main entry point of the library: it validates the request,
/// derives the installment count, periodic rate and due dates, and runs the
/// amortization engine.
///
/// # Errors
///
/// Returns an error naming the offending field if the request is invalid.
pub fn calculate_emi_schedule(request: &LoanRequest) -> EmiResult<ScheduleResult> {
    EmiCalculator::default().calculate(request)
}

/// Same as [`calculate_emi_schedule`], reading the request from JSON and
/// returning the schedule as JSON.
pub fn calculate_emi_schedule_json(json: &str) -> anyhow::Result<String> {
    EmiCalculator::default().calculate_json(json)
}
