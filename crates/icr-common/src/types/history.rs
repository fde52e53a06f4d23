//! Repayment history entries
//!
//! Entries are keyed by `(loan_id, sequence)`, written once and never
//! overwritten. Sequence numbers start at 1.

use serde::{Deserialize, Serialize};

/// Immutable audit record of one processed repayment cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentHistoryEntry {
    /// Amount actually transferred this cycle (0 when deferred)
    pub amount: u128,
    /// Cycle block height
    pub block_height: u64,
    /// Verified income snapshot the decision was based on
    pub income_at_time: u128,
    pub was_deferred: bool,
    /// Penalty computed for this cycle only
    pub penalty_applied: u128,
}

impl RepaymentHistoryEntry {
    pub fn collected(amount: u128, block_height: u64, income: u128, penalty: u128) -> Self {
        Self {
            amount,
            block_height,
            income_at_time: income,
            was_deferred: false,
            penalty_applied: penalty,
        }
    }

    pub fn deferred(block_height: u64, income: u128, penalty: u128) -> Self {
        Self {
            amount: 0,
            block_height,
            income_at_time: income,
            was_deferred: true,
            penalty_applied: penalty,
        }
    }
}
