//! Ledger storage backends
//!
//! Loan accounts are held behind a per-loan async mutex. A repayment cycle
//! takes the loan's lock for its whole read-decide-transfer-commit sequence,
//! so two cycles on one loan never interleave while different loans proceed
//! in parallel.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use icr_common::{LoanId, LoanRepaymentRecord, RepaymentError, RepaymentHistoryEntry};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use super::account::LoanAccount;

/// Exclusive handle on one loan's account
pub type AccountGuard = OwnedMutexGuard<LoanAccount>;

/// Errors from ledger store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Loan {0} already has a repayment record")]
    AlreadyRegistered(LoanId),

    #[error("No repayment record for {0}")]
    NotFound(LoanId),
}

impl From<LedgerError> for RepaymentError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AlreadyRegistered(id) => RepaymentError::AlreadyRegistered(id),
            LedgerError::NotFound(id) => RepaymentError::NoActiveLoan(id),
        }
    }
}

/// Trait for repayment ledger backends
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Create the account for a loan; fails if one already exists
    async fn register(&self, loan_id: LoanId, record: LoanRepaymentRecord)
        -> Result<(), LedgerError>;

    /// Take the loan's exclusive lock
    async fn lock(&self, loan_id: LoanId) -> Result<AccountGuard, LedgerError>;

    /// Snapshot of the loan's record
    async fn record(&self, loan_id: LoanId) -> Option<LoanRepaymentRecord>;

    /// History entry by exact `(loan_id, sequence)` key
    async fn history_entry(&self, loan_id: LoanId, sequence: u64)
        -> Option<RepaymentHistoryEntry>;

    /// Entries `1..=counter` in order
    async fn history(&self, loan_id: LoanId) -> Vec<RepaymentHistoryEntry>;

    /// Current repayment counter
    async fn counter(&self, loan_id: LoanId) -> Option<u64>;
}

/// In-memory ledger
///
/// Uses DashMap for the loan index and a tokio mutex per account.
#[derive(Default)]
pub struct InMemoryLedger {
    accounts: DashMap<LoanId, Arc<Mutex<LoanAccount>>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone the account handle out of the map so no shard lock is held across an await
    fn handle(&self, loan_id: LoanId) -> Option<Arc<Mutex<LoanAccount>>> {
        self.accounts.get(&loan_id).map(|h| h.value().clone())
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn register(
        &self,
        loan_id: LoanId,
        record: LoanRepaymentRecord,
    ) -> Result<(), LedgerError> {
        match self.accounts.entry(loan_id) {
            Entry::Occupied(_) => Err(LedgerError::AlreadyRegistered(loan_id)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(LoanAccount::open(record))));
                debug!(%loan_id, "Loan account opened");
                Ok(())
            }
        }
    }

    async fn lock(&self, loan_id: LoanId) -> Result<AccountGuard, LedgerError> {
        let handle = self.handle(loan_id).ok_or(LedgerError::NotFound(loan_id))?;
        Ok(handle.lock_owned().await)
    }

    async fn record(&self, loan_id: LoanId) -> Option<LoanRepaymentRecord> {
        let handle = self.handle(loan_id)?;
        let account = handle.lock().await;
        Some(account.record().clone())
    }

    async fn history_entry(
        &self,
        loan_id: LoanId,
        sequence: u64,
    ) -> Option<RepaymentHistoryEntry> {
        let handle = self.handle(loan_id)?;
        let account = handle.lock().await;
        account.history_entry(sequence).cloned()
    }

    async fn history(&self, loan_id: LoanId) -> Vec<RepaymentHistoryEntry> {
        let Some(handle) = self.handle(loan_id) else {
            return Vec::new();
        };
        let account = handle.lock().await;
        account.history().map(|(_, e)| e.clone()).collect()
    }

    async fn counter(&self, loan_id: LoanId) -> Option<u64> {
        let handle = self.handle(loan_id)?;
        let account = handle.lock().await;
        Some(account.counter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icr_common::Identity;
    use std::time::Duration;

    fn record() -> LoanRepaymentRecord {
        LoanRepaymentRecord::new(Identity::from("borrower"), 10_000, 0)
    }

    #[tokio::test]
    async fn test_register_and_read() {
        let ledger = InMemoryLedger::new();
        ledger.register(LoanId(1), record()).await.unwrap();

        assert_eq!(ledger.record(LoanId(1)).await, Some(record()));
        assert_eq!(ledger.counter(LoanId(1)).await, Some(0));
        assert!(ledger.history(LoanId(1)).await.is_empty());
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let ledger = InMemoryLedger::new();
        ledger.register(LoanId(1), record()).await.unwrap();

        let err = ledger.register(LoanId(1), record()).await.unwrap_err();
        assert_eq!(err, LedgerError::AlreadyRegistered(LoanId(1)));
        assert_eq!(
            RepaymentError::from(err),
            RepaymentError::AlreadyRegistered(LoanId(1))
        );
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_loan() {
        let ledger = InMemoryLedger::new();
        assert!(ledger.record(LoanId(9)).await.is_none());
        assert!(ledger.history_entry(LoanId(9), 1).await.is_none());
        assert!(matches!(
            ledger.lock(LoanId(9)).await,
            Err(LedgerError::NotFound(LoanId(9)))
        ));
    }

    #[tokio::test]
    async fn test_commit_through_guard() {
        let ledger = InMemoryLedger::new();
        ledger.register(LoanId(1), record()).await.unwrap();

        {
            let mut guard = ledger.lock(LoanId(1)).await.unwrap();
            guard
                .commit_cycle(RepaymentHistoryEntry::collected(2_500, 5, 60_000, 0), |r| {
                    r.apply_payment(2_500, 0, 5)
                })
                .unwrap();
        }

        assert_eq!(ledger.counter(LoanId(1)).await, Some(1));
        let entry = ledger.history_entry(LoanId(1), 1).await.unwrap();
        assert_eq!(entry.amount, 2_500);
        assert_eq!(
            ledger.record(LoanId(1)).await.unwrap().outstanding_principal,
            7_500
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_serializes_cycles_on_one_loan() {
        let ledger = Arc::new(InMemoryLedger::new());
        ledger.register(LoanId(1), record()).await.unwrap();

        let guard = ledger.lock(LoanId(1)).await.unwrap();

        let reader = {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.counter(LoanId(1)).await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!reader.is_finished());

        drop(guard);
        assert_eq!(reader.await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_other_loans_not_blocked() {
        let ledger = InMemoryLedger::new();
        ledger.register(LoanId(1), record()).await.unwrap();
        ledger.register(LoanId(2), record()).await.unwrap();

        let _guard = ledger.lock(LoanId(1)).await.unwrap();
        assert_eq!(ledger.counter(LoanId(2)).await, Some(0));
    }
}
