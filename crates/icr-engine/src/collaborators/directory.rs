//! In-memory collaborator directory
//!
//! Stands in for all four external subsystems at once: incomes, loan terms,
//! borrower profiles, and escrow balances. Used for simulations, what-if
//! tooling, and tests.

use async_trait::async_trait;
use dashmap::DashMap;
use icr_common::{BorrowerStatus, CollaboratorError, Identity, LoanId, LoanTerms};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use super::{BorrowerProfiles, FundsTransfer, IncomeOracle, LoanRegistry};

/// A completed escrow transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub from: Identity,
    pub to: Identity,
    pub amount: u128,
}

/// Directory of incomes, loan terms, borrower profiles and escrow balances
#[derive(Default)]
pub struct InMemoryDirectory {
    incomes: DashMap<Identity, u128>,
    loans: DashMap<LoanId, LoanTerms>,
    profiles: DashMap<Identity, BorrowerStatus>,
    balances: DashMap<Identity, u128>,
    transfers: RwLock<Vec<TransferRecord>>,
    /// When set, every transfer fails as if escrow were offline
    escrow_offline: AtomicBool,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_income(&self, borrower: &Identity, income: u128) {
        self.incomes.insert(borrower.clone(), income);
    }

    pub fn remove_income(&self, borrower: &Identity) {
        self.incomes.remove(borrower);
    }

    pub fn set_loan(&self, loan_id: LoanId, terms: LoanTerms) {
        self.loans.insert(loan_id, terms);
    }

    pub fn set_profile(&self, borrower: &Identity, status: BorrowerStatus) {
        self.profiles.insert(borrower.clone(), status);
    }

    pub fn set_balance(&self, owner: &Identity, balance: u128) {
        self.balances.insert(owner.clone(), balance);
    }

    pub fn balance(&self, owner: &Identity) -> u128 {
        self.balances.get(owner).map(|b| *b).unwrap_or(0)
    }

    pub fn set_escrow_offline(&self, offline: bool) {
        self.escrow_offline.store(offline, Ordering::SeqCst);
    }

    /// Completed transfers, oldest first
    pub fn transfers(&self) -> Vec<TransferRecord> {
        self.transfers.read().clone()
    }
}

#[async_trait]
impl IncomeOracle for InMemoryDirectory {
    async fn get_verified_income(&self, borrower: &Identity) -> Result<u128, CollaboratorError> {
        self.incomes
            .get(borrower)
            .map(|i| *i)
            .ok_or_else(|| CollaboratorError::NotFound(format!("no verified income for {}", borrower)))
    }
}

#[async_trait]
impl LoanRegistry for InMemoryDirectory {
    async fn get_loan_details(&self, loan_id: LoanId) -> Result<LoanTerms, CollaboratorError> {
        self.loans
            .get(&loan_id)
            .map(|t| t.clone())
            .ok_or_else(|| CollaboratorError::NotFound(format!("no terms for {}", loan_id)))
    }
}

#[async_trait]
impl BorrowerProfiles for InMemoryDirectory {
    async fn get_borrower_status(
        &self,
        borrower: &Identity,
    ) -> Result<BorrowerStatus, CollaboratorError> {
        self.profiles
            .get(borrower)
            .map(|s| *s)
            .ok_or_else(|| CollaboratorError::NotFound(format!("no profile for {}", borrower)))
    }
}

#[async_trait]
impl FundsTransfer for InMemoryDirectory {
    async fn transfer_funds(
        &self,
        from: &Identity,
        to: &Identity,
        amount: u128,
    ) -> Result<bool, CollaboratorError> {
        if self.escrow_offline.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Unavailable("escrow offline".to_string()));
        }

        // Debit under the sender's entry lock so concurrent transfers can't overdraw
        {
            let mut sender = self.balances.entry(from.clone()).or_insert(0);
            if *sender < amount {
                return Err(CollaboratorError::Rejected(format!(
                    "insufficient balance: required {}, available {}",
                    amount, *sender
                )));
            }
            *sender -= amount;
        }
        *self.balances.entry(to.clone()).or_insert(0) += amount;

        self.transfers.write().push(TransferRecord {
            from: from.clone(),
            to: to.clone(),
            amount,
        });
        debug!(%from, %to, amount, "Escrow transfer executed");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookups() {
        let dir = InMemoryDirectory::new();
        let borrower = Identity::from("b");
        dir.set_income(&borrower, 42_000);
        dir.set_profile(
            &borrower,
            BorrowerStatus {
                is_active: true,
                low_income_flag: true,
            },
        );

        assert_eq!(dir.get_verified_income(&borrower).await.unwrap(), 42_000);
        assert!(dir.get_borrower_status(&borrower).await.unwrap().is_active);
        assert!(matches!(
            dir.get_loan_details(LoanId(1)).await,
            Err(CollaboratorError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_transfer_moves_balance() {
        let dir = InMemoryDirectory::new();
        let from = Identity::from("b");
        let to = Identity::from("collector");
        dir.set_balance(&from, 5_000);

        assert!(dir.transfer_funds(&from, &to, 3_000).await.unwrap());
        assert_eq!(dir.balance(&from), 2_000);
        assert_eq!(dir.balance(&to), 3_000);
        assert_eq!(dir.transfers().len(), 1);
    }

    #[tokio::test]
    async fn test_transfer_insufficient_balance() {
        let dir = InMemoryDirectory::new();
        let from = Identity::from("b");
        dir.set_balance(&from, 10);

        let result = dir.transfer_funds(&from, &Identity::from("c"), 11).await;
        assert!(matches!(result, Err(CollaboratorError::Rejected(_))));
        assert_eq!(dir.balance(&from), 10);
        assert!(dir.transfers().is_empty());
    }

    #[tokio::test]
    async fn test_escrow_offline() {
        let dir = InMemoryDirectory::new();
        let from = Identity::from("b");
        dir.set_balance(&from, 100);
        dir.set_escrow_offline(true);

        let result = dir.transfer_funds(&from, &Identity::from("c"), 1).await;
        assert!(matches!(result, Err(CollaboratorError::Unavailable(_))));
        assert_eq!(dir.balance(&from), 100);
    }
}
