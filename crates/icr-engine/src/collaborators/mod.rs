//! Collaborator capabilities
//!
//! The repayment core reaches four external subsystems, each through one
//! narrow async call:
//! - [`IncomeOracle`]: verified income per borrower
//! - [`LoanRegistry`]: loan terms per loan id
//! - [`BorrowerProfiles`]: borrower eligibility
//! - [`FundsTransfer`]: escrow transfer execution
//!
//! Failures surface immediately; the core never retries a collaborator call.

pub mod directory;

use async_trait::async_trait;
use icr_common::{
    BorrowerStatus, CollaboratorEndpoints, CollaboratorError, Identity, LoanId, LoanTerms,
};
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

pub use directory::{InMemoryDirectory, TransferRecord};

/// Verified-income source
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IncomeOracle: Send + Sync {
    async fn get_verified_income(&self, borrower: &Identity) -> Result<u128, CollaboratorError>;
}

/// Loan-terms source
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LoanRegistry: Send + Sync {
    async fn get_loan_details(&self, loan_id: LoanId) -> Result<LoanTerms, CollaboratorError>;
}

/// Borrower-eligibility source
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BorrowerProfiles: Send + Sync {
    async fn get_borrower_status(
        &self,
        borrower: &Identity,
    ) -> Result<BorrowerStatus, CollaboratorError>;
}

/// Fund-transfer executor
///
/// `Ok(false)` means the executor declined the transfer without an error code.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FundsTransfer: Send + Sync {
    async fn transfer_funds(
        &self,
        from: &Identity,
        to: &Identity,
        amount: u128,
    ) -> Result<bool, CollaboratorError>;
}

/// The live collaborator capabilities together with their endpoint identities
#[derive(Clone)]
pub struct CollaboratorSet {
    endpoints: CollaboratorEndpoints,
    pub income: Arc<dyn IncomeOracle>,
    pub loans: Arc<dyn LoanRegistry>,
    pub profiles: Arc<dyn BorrowerProfiles>,
    pub escrow: Arc<dyn FundsTransfer>,
}

impl CollaboratorSet {
    pub fn new(
        endpoints: CollaboratorEndpoints,
        income: Arc<dyn IncomeOracle>,
        loans: Arc<dyn LoanRegistry>,
        profiles: Arc<dyn BorrowerProfiles>,
        escrow: Arc<dyn FundsTransfer>,
    ) -> Self {
        Self {
            endpoints,
            income,
            loans,
            profiles,
            escrow,
        }
    }

    /// Use one directory for all four capabilities
    pub fn from_directory(endpoints: CollaboratorEndpoints, directory: Arc<InMemoryDirectory>) -> Self {
        Self::new(
            endpoints,
            directory.clone(),
            directory.clone(),
            directory.clone(),
            directory,
        )
    }

    /// Rebind the same capabilities to different endpoint identities
    pub fn with_endpoints(mut self, endpoints: CollaboratorEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn endpoints(&self) -> &CollaboratorEndpoints {
        &self.endpoints
    }
}

impl std::fmt::Debug for CollaboratorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollaboratorSet")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}
