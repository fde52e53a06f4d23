//! Collaborator payloads: loan terms and borrower eligibility

use crate::types::identity::Identity;
use serde::{Deserialize, Serialize};

/// Loan terms as reported by the loan-issuance subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Original principal
    pub principal: u128,
    /// Interest rate in basis-point-like fixed point units (e.g. 500)
    pub interest_rate: u128,
    /// Term length in blocks
    pub term: u64,
    pub start_block: u64,
    pub borrower: Identity,
}

/// Borrower eligibility as reported by the borrower-profile subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowerStatus {
    pub is_active: bool,
    pub low_income_flag: bool,
}
