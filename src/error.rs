use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::period::TermUnit;

/// Every way an EMI calculation or repayment update can be refused.
///
/// All failures are validation failures: the calculation is pure, so
/// nothing here is transient and nothing is worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmiError {
    /// A field failed validation.
    #[error("invalid input: {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// Term unit text is not days, weeks, months or years.
    #[error("unrecognized term unit `{0}`")]
    UnknownTermUnit(String),

    /// Method text is neither diminishing nor flat.
    #[error("unrecognized interest method `{0}`")]
    UnknownMethod(String),

    /// A due date fell outside the representable calendar.
    #[error("date overflow advancing {from} by one {unit} period")]
    DateOverflow { from: NaiveDate, unit: TermUnit },

    /// A repayment named an installment the schedule does not have.
    #[error("installment {0} is not part of the schedule")]
    UnknownInstallment(u32),

    /// A repayment larger than what is still pending.
    #[error("payment of {amount} on installment {installment_index} exceeds pending amount {pending}")]
    Overpayment {
        installment_index: u32,
        amount: Decimal,
        pending: Decimal,
    },
}

impl EmiError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        EmiError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// The input field this error points at, when there is one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            EmiError::InvalidInput { field, .. } => Some(*field),
            EmiError::UnknownTermUnit(_) => Some("termUnit"),
            EmiError::DateOverflow { .. } => Some("startDate"),
            EmiError::UnknownMethod(_) => Some("method"),
            EmiError::UnknownInstallment(_) => Some("installmentIndex"),
            EmiError::Overpayment { .. } => Some("amount"),
        }
    }
}

pub type EmiResult<T> = Result<T, EmiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_invalid_input_names_field() {
        let err = EmiError::invalid("principal", "must be greater than zero");
        assert_eq!(err.field(), Some("principal"));
        assert_eq!(
            err.to_string(),
            "invalid input: principal: must be greater than zero"
        );
    }

    #[test]
    fn test_overpayment_message() {
        let err = EmiError::Overpayment {
            installment_index: 2,
            amount: dec!(500),
            pending: dec!(120.50),
        };
        assert_eq!(err.field(), Some("amount"));
        assert_eq!(
            err.to_string(),
            "payment of 500 on installment 2 exceeds pending amount 120.50"
        );
    }
}
