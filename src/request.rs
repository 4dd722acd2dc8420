//! Loan request intake: validation and the derivations feeding the engine.

use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ScheduleLimits;
use crate::error::{EmiError, EmiResult};
use crate::period::{TermUnit, generate_installment_dates};
use crate::schedule::{InterestMethod, ScheduleResult, compute_schedule};

/// Loan parameters as supplied by the loan application form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRequest {
    /// The amount disbursed.
    pub principal: Decimal,
    /// Rate as a percentage (e.g., 3 for 3%). Per period, except for
    /// yearly terms where it is annual.
    pub rate_input: Decimal,
    /// Length of the term in `term_unit`s.
    #[serde(alias = "installmentCount")]
    pub term_value: u32,
    pub term_unit: TermUnit,
    pub method: InterestMethod,
    /// Disbursement date; the first installment is due one period later.
    pub start_date: NaiveDate,
}

/// Everything the engine needs, derived from a validated request.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanPlan {
    /// Installments to schedule (`termValue × 12` for yearly terms).
    pub installment_count: u32,
    /// Decimal rate charged per installment.
    pub periodic_rate: Decimal,
    /// Due date of each installment, in order.
    pub installment_dates: Vec<NaiveDate>,
}

impl LoanRequest {
    /// Parses a request from the loan form's JSON.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("failed to parse loan request")
    }

    /// Checks the request against the intake rules and the given limits.
    pub fn validate(&self, limits: &ScheduleLimits) -> EmiResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(EmiError::invalid("principal", "must be greater than zero"));
        }
        if self.rate_input <= Decimal::ZERO {
            return Err(EmiError::invalid("rateInput", "must be greater than zero"));
        }
        if self.term_value == 0 {
            return Err(EmiError::invalid("termValue", "must be greater than zero"));
        }
        let installment_count = self.term_unit.installment_count(self.term_value)?;
        limits.check_installments(installment_count)
    }

    /// Validates the request and derives installment count, periodic rate and due dates.
    pub fn plan(&self, limits: &ScheduleLimits) -> EmiResult<LoanPlan> {
        self.validate(limits)?;
        let installment_count = self.term_unit.installment_count(self.term_value)?;
        let periodic_rate = self.term_unit.periodic_rate(self.rate_input);
        let installment_dates = generate_installment_dates(self.start_date, installment_count, self.term_unit)?;

        debug!(
            term_value = self.term_value,
            term_unit = %self.term_unit,
            installment_count,
            %periodic_rate,
            "loan request planned"
        );
        Ok(LoanPlan {
            installment_count,
            periodic_rate,
            installment_dates,
        })
    }
}

/// Runs loan requests through the date sequencer and amortization engine.
#[derive(Debug, Clone, Default)]
pub struct EmiCalculator {
    limits: ScheduleLimits,
}

impl EmiCalculator {
    /// Creates a calculator bound to the given limits.
    pub fn new(limits: ScheduleLimits) -> Self {
        EmiCalculator { limits }
    }

    /// Limits applied to every request.
    pub fn limits(&self) -> &ScheduleLimits {
        &self.limits
    }

    /// Validates the request and builds its schedule.
    pub fn calculate(&self, request: &LoanRequest) -> EmiResult<ScheduleResult> {
        let plan = request.plan(&self.limits)?;
        compute_schedule(
            request.principal,
            plan.periodic_rate,
            plan.installment_count,
            request.method,
            &plan.installment_dates,
        )
    }

    /// Parses a JSON loan request and returns the schedule as JSON.
    pub fn calculate_json(&self, json: &str) -> anyhow::Result<String> {
        let request = LoanRequest::from_json(json)?;
        let schedule = self
            .calculate(&request)
            .context("failed to calculate EMI schedule")?;
        serde_json::to_string(&schedule).context("failed to serialize EMI schedule")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn request(term_value: u32, term_unit: TermUnit, method: InterestMethod) -> LoanRequest {
        LoanRequest {
            principal: dec!(10000),
            rate_input: dec!(3),
            term_value,
            term_unit,
            method,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    #[test]
    fn test_years_term_plans_monthly_installments() {
        let mut req = request(2, TermUnit::Years, InterestMethod::Diminishing);
        req.rate_input = dec!(12);
        let plan = req.plan(&ScheduleLimits::default()).unwrap();

        assert_eq!(plan.installment_count, 24);
        assert_eq!(plan.periodic_rate, dec!(0.01));
        assert_eq!(plan.installment_dates.len(), 24);
        assert_eq!(plan.installment_dates[0], NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());
        assert_eq!(plan.installment_dates[23], NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
    }

    #[rstest]
    #[case(TermUnit::Days)]
    #[case(TermUnit::Weeks)]
    #[case(TermUnit::Months)]
    fn test_per_period_rate(#[case] unit: TermUnit) {
        let plan = request(5, unit, InterestMethod::Flat)
            .plan(&ScheduleLimits::default())
            .unwrap();
        assert_eq!(plan.installment_count, 5);
        assert_eq!(plan.periodic_rate, dec!(0.03));
    }

    #[test]
    fn test_calculate_diminishing() {
        let schedule = EmiCalculator::default()
            .calculate(&request(5, TermUnit::Months, InterestMethod::Diminishing))
            .unwrap();
        assert_eq!(schedule.rows.len(), 5);
        assert_eq!(schedule.rows[0].total_payment, dec!(2300));
        assert_eq!(schedule.total_interest, dec!(900));
    }

    #[rstest]
    #[case::zero_principal(|r: &mut LoanRequest| r.principal = dec!(0), "principal")]
    #[case::zero_rate(|r: &mut LoanRequest| r.rate_input = dec!(0), "rateInput")]
    #[case::negative_rate(|r: &mut LoanRequest| r.rate_input = dec!(-1), "rateInput")]
    #[case::zero_term(|r: &mut LoanRequest| r.term_value = 0, "termValue")]
    #[case::too_many_years(|r: &mut LoanRequest| { r.term_unit = TermUnit::Years; r.term_value = 101 }, "termValue")]
    fn test_invalid_request(#[case] tweak: fn(&mut LoanRequest), #[case] field: &str) {
        let mut req = request(5, TermUnit::Months, InterestMethod::Diminishing);
        tweak(&mut req);
        let err = EmiCalculator::default().calculate(&req).unwrap_err();
        assert_eq!(err.field(), Some(field));
    }

    #[test]
    fn test_custom_limits() {
        let calculator = EmiCalculator::new(ScheduleLimits { max_installments: 4 });
        assert_eq!(calculator.limits().max_installments, 4);
        let err = calculator
            .calculate(&request(5, TermUnit::Weeks, InterestMethod::Flat))
            .unwrap_err();
        assert_eq!(err.field(), Some("termValue"));
    }

    #[test]
    fn test_from_json() {
        let req = LoanRequest::from_json(
            r#"{
                "principal": 10000,
                "rateInput": 3,
                "installmentCount": 5,
                "termUnit": "months",
                "method": "flat",
                "startDate": "2024-01-15"
            }"#,
        )
        .unwrap();
        assert_eq!(req, request(5, TermUnit::Months, InterestMethod::Flat));
    }

    #[test]
    fn test_from_json_rejects_bad_fields() {
        let non_numeric_rate = r#"{"principal": 1000, "rateInput": "abc", "termValue": 5,
            "termUnit": "months", "method": "flat", "startDate": "2024-01-15"}"#;
        assert!(LoanRequest::from_json(non_numeric_rate).is_err());

        let unknown_unit = r#"{"principal": 1000, "rateInput": 3, "termValue": 5,
            "termUnit": "fortnights", "method": "flat", "startDate": "2024-01-15"}"#;
        assert!(LoanRequest::from_json(unknown_unit).is_err());

        let unknown_method = r#"{"principal": 1000, "rateInput": 3, "termValue": 5,
            "termUnit": "months", "method": "compound", "startDate": "2024-01-15"}"#;
        assert!(LoanRequest::from_json(unknown_method).is_err());
    }

    #[test]
    fn test_calculate_json() {
        let output = EmiCalculator::default()
            .calculate_json(
                r#"{"principal": 10000, "rateInput": 3, "termValue": 5,
                    "termUnit": "months", "method": "diminishing", "startDate": "2024-01-15"}"#,
            )
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["rows"].as_array().unwrap().len(), 5);
        assert_eq!(value["totalInterest"].as_f64(), Some(900.0));
        assert_eq!(value["rows"][4]["dueDate"], "2024-06-15");
        assert_eq!(value["rows"][4]["remainingBalance"].as_f64(), Some(0.0));
    }

    #[test]
    fn test_calculate_json_reports_field() {
        let err = EmiCalculator::default()
            .calculate_json(
                r#"{"principal": -5, "rateInput": 3, "termValue": 5,
                    "termUnit": "months", "method": "diminishing", "startDate": "2024-01-15"}"#,
            )
            .unwrap_err();
        let cause = err.downcast_ref::<EmiError>().unwrap();
        assert_eq!(cause.field(), Some("principal"));
    }
}
