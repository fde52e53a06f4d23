//! Error types for income-contingent repayment
//!
//! Every failure surfaced by the repayment core maps to exactly one stable
//! [`ErrorCode`], so callers can drive messaging without matching on strings.

use crate::types::identity::{Identity, LoanId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using RepaymentError
pub type Result<T> = std::result::Result<T, RepaymentError>;

/// Stable numeric error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ErrorCode {
    Unauthorized = 100,
    InvalidLoan = 101,
    InvalidIncome = 102,
    Paused = 103,
    InvalidAmount = 104,
    NoActiveLoan = 105,
    Deferred = 106,
    /// Reserved, not produced by the current repayment logic
    GracePeriod = 107,
    InvalidStatus = 108,
    TransferFailed = 109,
    InvalidThresholds = 110,
    NotLowIncome = 111,
    CalculationOverflow = 112,
    AlreadyRegistered = 113,
}

impl ErrorCode {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}({})", self, self.as_u32())
    }
}

/// Unified error type for repayment operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepaymentError {
    #[error("Caller {caller} is not authorized for this operation")]
    Unauthorized { caller: Identity },

    #[error("Loan {loan_id} is invalid: {reason}")]
    InvalidLoan { loan_id: LoanId, reason: String },

    #[error("Verified income unavailable for {borrower}: {reason}")]
    InvalidIncome { borrower: Identity, reason: String },

    #[error("Contract is paused")]
    Paused,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("No repayment record for {0}")]
    NoActiveLoan(LoanId),

    /// Zero collection capacity this cycle. An expected business outcome, not a fault.
    #[error("Repayment deferred for {0}: income-derived capacity is zero")]
    Deferred(LoanId),

    #[error("Loan is within its grace period")]
    GracePeriod,

    #[error("Invalid loan status: {0}")]
    InvalidStatus(String),

    #[error("Transfer of {amount} failed: {reason}")]
    TransferFailed { amount: u128, reason: String },

    #[error("Invalid thresholds: threshold {threshold}, minimum percentage {min_percentage}")]
    InvalidThresholds { threshold: u128, min_percentage: u128 },

    #[error("Borrower {0} is not flagged as low income")]
    NotLowIncome(Identity),

    #[error("Calculation overflow: {0}")]
    CalculationOverflow(String),

    #[error("{0} is already registered for repayment")]
    AlreadyRegistered(LoanId),
}

impl RepaymentError {
    /// Stable code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            RepaymentError::Unauthorized { .. } => ErrorCode::Unauthorized,
            RepaymentError::InvalidLoan { .. } => ErrorCode::InvalidLoan,
            RepaymentError::InvalidIncome { .. } => ErrorCode::InvalidIncome,
            RepaymentError::Paused => ErrorCode::Paused,
            RepaymentError::InvalidAmount(_) => ErrorCode::InvalidAmount,
            RepaymentError::NoActiveLoan(_) => ErrorCode::NoActiveLoan,
            RepaymentError::Deferred(_) => ErrorCode::Deferred,
            RepaymentError::GracePeriod => ErrorCode::GracePeriod,
            RepaymentError::InvalidStatus(_) => ErrorCode::InvalidStatus,
            RepaymentError::TransferFailed { .. } => ErrorCode::TransferFailed,
            RepaymentError::InvalidThresholds { .. } => ErrorCode::InvalidThresholds,
            RepaymentError::NotLowIncome(_) => ErrorCode::NotLowIncome,
            RepaymentError::CalculationOverflow(_) => ErrorCode::CalculationOverflow,
            RepaymentError::AlreadyRegistered(_) => ErrorCode::AlreadyRegistered,
        }
    }

    /// Whether the caller may reasonably retry the same operation later
    ///
    /// Deferral is not a failure, and configuration or eligibility errors will
    /// not change by retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RepaymentError::TransferFailed { .. }
                | RepaymentError::InvalidIncome { .. }
                | RepaymentError::Paused
        )
    }
}

/// Errors reported by external collaborators (income, loan terms, eligibility, transfer)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request rejected: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RepaymentError::AlreadyRegistered(LoanId(7));
        assert!(err.to_string().contains("loan-7"));

        let err = RepaymentError::InvalidThresholds {
            threshold: 0,
            min_percentage: 120,
        };
        assert!(err.to_string().contains("120"));
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ErrorCode::Unauthorized.as_u32(), 100);
        assert_eq!(ErrorCode::AlreadyRegistered.as_u32(), 113);
        assert_eq!(RepaymentError::Paused.code(), ErrorCode::Paused);
        assert_eq!(
            RepaymentError::Deferred(LoanId(1)).code().as_u32(),
            106
        );
    }

    #[test]
    fn test_deferral_is_not_retryable_failure() {
        assert!(!RepaymentError::Deferred(LoanId(1)).is_retryable());
        assert!(RepaymentError::TransferFailed {
            amount: 10,
            reason: "escrow offline".into()
        }
        .is_retryable());
    }
}
