//! Repayment ledger: EMI collections recorded against a generated schedule.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EmiError, EmiResult};
use crate::schedule::{ScheduleResult, ScheduleRow};

/// A schedule row together with what has been collected against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    #[serde(flatten)]
    pub installment: ScheduleRow,
    pub amount_paid: Decimal,
    pub pending_amount: Decimal,
}

impl LedgerEntry {
    /// True once nothing is pending.
    pub fn is_settled(&self) -> bool {
        self.pending_amount <= Decimal::ZERO
    }
}

/// Collection totals over the whole ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepaymentSummary {
    pub total_paid: Decimal,
    pub total_pending: Decimal,
    /// Installments with any amount collected.
    pub paid_installments: u32,
    /// Installments collected in full.
    pub settled_installments: u32,
    pub total_emi_amount: Decimal,
    /// Principal of the installments collected in full.
    pub total_principal_paid: Decimal,
}

/// Collection state of every installment of one schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentLedger {
    entries: Vec<LedgerEntry>,
}

impl RepaymentLedger {
    /// Opens a ledger with nothing collected yet.
    pub fn from_schedule(schedule: &ScheduleResult) -> Self {
        let entries = schedule
            .rows
            .iter()
            .map(|row| LedgerEntry {
                installment: row.clone(),
                amount_paid: Decimal::ZERO,
                pending_amount: row.total_payment,
            })
            .collect();
        RepaymentLedger { entries }
    }

    /// Entries in installment order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Looks up an entry by its 1-based installment index.
    pub fn entry(&self, installment_index: u32) -> Option<&LedgerEntry> {
        self.entries
            .iter()
            .find(|e| e.installment.installment_index == installment_index)
    }

    /// Records a collection against one installment.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive, the installment does
    /// not exist, or the amount is more than what is still pending. The
    /// ledger is left unchanged on error.
    pub fn record_payment(&mut self, installment_index: u32, amount: Decimal) -> EmiResult<&LedgerEntry> {
        if amount <= Decimal::ZERO {
            return Err(EmiError::invalid("amount", "must be greater than zero"));
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.installment.installment_index == installment_index)
            .ok_or(EmiError::UnknownInstallment(installment_index))?;
        if amount > entry.pending_amount {
            return Err(EmiError::Overpayment {
                installment_index,
                amount,
                pending: entry.pending_amount,
            });
        }

        entry.amount_paid += amount;
        entry.pending_amount -= amount;
        debug!(
            installment_index,
            %amount,
            pending = %entry.pending_amount,
            "repayment recorded"
        );
        Ok(&*entry)
    }

    /// Totals across all entries.
    pub fn summary(&self) -> RepaymentSummary {
        let mut summary = RepaymentSummary {
            total_paid: Decimal::ZERO,
            total_pending: Decimal::ZERO,
            paid_installments: 0,
            settled_installments: 0,
            total_emi_amount: Decimal::ZERO,
            total_principal_paid: Decimal::ZERO,
        };
        for entry in &self.entries {
            summary.total_paid += entry.amount_paid;
            summary.total_pending += entry.pending_amount;
            summary.total_emi_amount += entry.installment.total_payment;
            if entry.amount_paid > Decimal::ZERO {
                summary.paid_installments += 1;
            }
            if entry.is_settled() {
                summary.settled_installments += 1;
                summary.total_principal_paid += entry.installment.principal_portion;
            }
        }
        summary
    }

    /// Amount still pending on installments due within `from..=to`.
    pub fn pending_between(&self, from: NaiveDate, to: NaiveDate) -> Decimal {
        self.entries
            .iter()
            .filter(|e| (from..=to).contains(&e.installment.due_date))
            .map(|e| e.pending_amount)
            .sum()
    }

    pub fn has_pending_between(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.pending_between(from, to) > Decimal::ZERO
    }
}
