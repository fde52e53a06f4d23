//! Loan repayment record - per-loan ledger state
//!
//! One record exists per registered loan. Key characteristics:
//! - Outstanding principal never increases; reaching zero is terminal (`Paid`)
//! - Totals (paid, deferrals, penalties) never decrease
//! - `last_activity_block` never moves backwards
//! - `Defaulted` is declared but no transition in this core produces it

use crate::error::{RepaymentError, Result};
use crate::types::identity::Identity;
use serde::{Deserialize, Serialize};

/// Repayment status state machine
///
/// ```text
/// Active   -> Active | Deferred | Paid
/// Deferred -> Active | Deferred | Paid
/// Paid     (terminal)
/// Defaulted (terminal, set only by an external default declaration)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepaymentStatus {
    Active,
    Deferred,
    Paid,
    Defaulted,
}

impl RepaymentStatus {
    /// Status following a processed cycle
    pub fn after_cycle(new_principal: u128, effective_amount: u128) -> Self {
        if new_principal == 0 {
            RepaymentStatus::Paid
        } else if effective_amount > 0 {
            RepaymentStatus::Active
        } else {
            RepaymentStatus::Deferred
        }
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, RepaymentStatus::Paid | RepaymentStatus::Defaulted)
    }
}

impl std::fmt::Display for RepaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepaymentStatus::Active => write!(f, "active"),
            RepaymentStatus::Deferred => write!(f, "deferred"),
            RepaymentStatus::Paid => write!(f, "paid"),
            RepaymentStatus::Defaulted => write!(f, "defaulted"),
        }
    }
}

/// Per-loan repayment ledger record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRepaymentRecord {
    /// Borrower identity, fixed at creation
    pub borrower: Identity,

    /// Principal still owed
    pub outstanding_principal: u128,

    /// Interest accrued since the last non-zero payment
    pub accrued_interest: u128,

    /// Block height of the last processed cycle
    pub last_activity_block: u64,

    pub status: RepaymentStatus,

    /// Sum of all effective payments
    pub total_paid: u128,

    pub deferral_count: u64,

    /// Lifetime penalty total
    pub penalty_accrued: u128,
}

impl LoanRepaymentRecord {
    /// Create a fresh `Active` record for a newly registered loan
    pub fn new(borrower: Identity, principal: u128, current_block: u64) -> Self {
        Self {
            borrower,
            outstanding_principal: principal,
            accrued_interest: 0,
            last_activity_block: current_block,
            status: RepaymentStatus::Active,
            total_paid: 0,
            deferral_count: 0,
            penalty_accrued: 0,
        }
    }

    /// Block height a cycle at `current_block` is recorded at
    #[inline]
    pub fn cycle_block(&self, current_block: u64) -> u64 {
        current_block.max(self.last_activity_block)
    }

    /// Blocks elapsed since the last processed cycle
    #[inline]
    pub fn elapsed_blocks(&self, current_block: u64) -> u64 {
        current_block.saturating_sub(self.last_activity_block)
    }

    /// Whether further cycles may be processed
    pub fn ensure_collectable(&self) -> Result<()> {
        if self.status.is_terminal() {
            return Err(RepaymentError::InvalidStatus(format!(
                "loan is {}, no further repayment cycles",
                self.status
            )));
        }
        Ok(())
    }

    /// Record a zero-collection cycle: interest and penalty accrue, principal is untouched
    pub fn apply_deferral(&mut self, interest: u128, penalty: u128, block: u64) -> Result<()> {
        self.ensure_collectable()?;

        let accrued_interest = checked_add(self.accrued_interest, interest, "accrued interest")?;
        let penalty_accrued = checked_add(self.penalty_accrued, penalty, "penalty total")?;
        let deferral_count = self.deferral_count.checked_add(1).ok_or_else(|| {
            RepaymentError::CalculationOverflow("deferral count".to_string())
        })?;

        self.accrued_interest = accrued_interest;
        self.penalty_accrued = penalty_accrued;
        self.deferral_count = deferral_count;
        self.status = RepaymentStatus::after_cycle(self.outstanding_principal, 0);
        self.last_activity_block = self.cycle_block(block);
        Ok(())
    }

    /// Apply a transferred payment
    ///
    /// The amount due includes interest and penalty, so a final payment may
    /// exceed the outstanding principal. The principal floors at zero.
    pub fn apply_payment(&mut self, amount: u128, penalty: u128, block: u64) -> Result<()> {
        self.ensure_collectable()?;
        if amount == 0 {
            return Err(RepaymentError::InvalidAmount(
                "payment amount must be positive".to_string(),
            ));
        }

        let total_paid = checked_add(self.total_paid, amount, "total paid")?;
        let penalty_accrued = checked_add(self.penalty_accrued, penalty, "penalty total")?;
        let new_principal = self.outstanding_principal.saturating_sub(amount);

        self.outstanding_principal = new_principal;
        self.accrued_interest = 0;
        self.status = RepaymentStatus::after_cycle(new_principal, amount);
        self.total_paid = total_paid;
        self.penalty_accrued = penalty_accrued;
        self.last_activity_block = self.cycle_block(block);
        Ok(())
    }
}

fn checked_add(a: u128, b: u128, what: &str) -> Result<u128> {
    a.checked_add(b)
        .ok_or_else(|| RepaymentError::CalculationOverflow(what.to_string()))
}

impl std::fmt::Display for LoanRepaymentRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LoanRepaymentRecord(borrower={}, outstanding={}, status={}, paid={})",
            self.borrower, self.outstanding_principal, self.status, self.total_paid
        )
    }
}
