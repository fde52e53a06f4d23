//! # ICR Common
//!
//! Shared types, errors, and audit trail for income-contingent loan repayment.
//!
//! ## Core Types
//!
//! - [`Identity`] / [`LoanId`]: principals and loan identifiers
//! - [`LoanRepaymentRecord`]: per-loan ledger record and its status machine
//! - [`RepaymentHistoryEntry`]: immutable per-cycle audit entry
//! - [`ContractConfig`]: pause flag, admin, thresholds, collaborator endpoints
//! - [`LoanTerms`] / [`BorrowerStatus`]: collaborator payloads
//!
//! ## Security
//!
//! - [`security::audit`]: audit trail for admin and registration activity

pub mod error;
pub mod security;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{CollaboratorError, ErrorCode, RepaymentError, Result};
pub use types::{
    config::{CollaboratorEndpoints, ContractConfig},
    history::RepaymentHistoryEntry,
    identity::{Identity, LoanId},
    loan_record::{LoanRepaymentRecord, RepaymentStatus},
    loan_terms::{BorrowerStatus, LoanTerms},
};

/// ICR version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default annual income cutoff below which nothing is collected
pub const DEFAULT_REPAYMENT_THRESHOLD: u128 = 20_000;

/// Default share (percent) of income above the threshold collected per cycle
pub const DEFAULT_MIN_REPAYMENT_PERCENTAGE: u128 = 10;

/// Default grace window in blocks (about one day at ten-minute blocks)
pub const DEFAULT_GRACE_PERIOD_BLOCKS: u64 = 144;
