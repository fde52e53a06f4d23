//! Outcome of a processed repayment cycle

use icr_common::{LoanId, RepaymentError, RepaymentStatus, Result};
use serde::{Deserialize, Serialize};

/// What a successful `process_repayment` call did
///
/// A deferral is an expected outcome, not an error: the cycle was recorded,
/// interest and penalty accrued, and no funds moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepaymentOutcome {
    Collected {
        loan_id: LoanId,
        sequence: u64,
        amount: u128,
        interest: u128,
        penalty: u128,
        outstanding_principal: u128,
        status: RepaymentStatus,
    },
    Deferred {
        loan_id: LoanId,
        sequence: u64,
        interest: u128,
        penalty: u128,
        deferral_count: u64,
    },
}

impl RepaymentOutcome {
    pub fn loan_id(&self) -> LoanId {
        match self {
            RepaymentOutcome::Collected { loan_id, .. }
            | RepaymentOutcome::Deferred { loan_id, .. } => *loan_id,
        }
    }

    /// History sequence number allocated to this cycle
    pub fn sequence(&self) -> u64 {
        match self {
            RepaymentOutcome::Collected { sequence, .. }
            | RepaymentOutcome::Deferred { sequence, .. } => *sequence,
        }
    }

    /// Amount transferred, zero for a deferral
    pub fn amount(&self) -> u128 {
        match self {
            RepaymentOutcome::Collected { amount, .. } => *amount,
            RepaymentOutcome::Deferred { .. } => 0,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, RepaymentOutcome::Deferred { .. })
    }

    /// The collected amount, or `RepaymentError::Deferred` for callers that
    /// want deferral as a discriminant
    pub fn into_collected(self) -> Result<u128> {
        match self {
            RepaymentOutcome::Collected { amount, .. } => Ok(amount),
            RepaymentOutcome::Deferred { loan_id, .. } => Err(RepaymentError::Deferred(loan_id)),
        }
    }
}
