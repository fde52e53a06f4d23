//! Loan account - a repayment record together with its history log
//!
//! The history is append-only and its sequence numbers are dense: entry `n`
//! lives at index `n - 1`, so the repayment counter is always the history
//! length and `1..=counter` has no gaps or repeats.

use icr_common::{LoanRepaymentRecord, RepaymentHistoryEntry, Result};
use serde::{Deserialize, Serialize};

/// Ledger state for one loan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAccount {
    record: LoanRepaymentRecord,
    history: Vec<RepaymentHistoryEntry>,
}

impl LoanAccount {
    /// Open an account with an empty history (counter = 0)
    pub fn open(record: LoanRepaymentRecord) -> Self {
        Self {
            record,
            history: Vec::new(),
        }
    }

    pub fn record(&self) -> &LoanRepaymentRecord {
        &self.record
    }

    /// Number of cycles processed so far
    #[inline]
    pub fn counter(&self) -> u64 {
        self.history.len() as u64
    }

    /// History entry by sequence number (1-based)
    pub fn history_entry(&self, sequence: u64) -> Option<&RepaymentHistoryEntry> {
        let index = usize::try_from(sequence.checked_sub(1)?).ok()?;
        self.history.get(index)
    }

    /// All entries in sequence order, paired with their sequence numbers
    pub fn history(&self) -> impl Iterator<Item = (u64, &RepaymentHistoryEntry)> {
        self.history
            .iter()
            .enumerate()
            .map(|(i, entry)| (i as u64 + 1, entry))
    }

    /// Commit one processed cycle
    ///
    /// `apply` runs against a staged copy of the record. The record update and
    /// the history append land together, or neither does. Returns the sequence
    /// number allocated to `entry`.
    pub fn commit_cycle<F>(&mut self, entry: RepaymentHistoryEntry, apply: F) -> Result<u64>
    where
        F: FnOnce(&mut LoanRepaymentRecord) -> Result<()>,
    {
        let mut staged = self.record.clone();
        apply(&mut staged)?;

        debug_assert_eq!(staged.last_activity_block, entry.block_height);

        self.history.push(entry);
        self.record = staged;
        Ok(self.counter())
    }
}
