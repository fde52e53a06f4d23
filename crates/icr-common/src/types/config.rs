//! Contract configuration - pause flag, admin, thresholds, collaborator endpoints

use crate::error::{RepaymentError, Result};
use crate::types::identity::Identity;
use serde::{Deserialize, Serialize};

/// Identities of the four collaborator endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorEndpoints {
    /// Verified-income oracle
    pub oracle: Identity,
    /// Loan-issuance (terms) source
    pub loan_issuance: Identity,
    /// Borrower-profile (eligibility) source
    pub borrower_profile: Identity,
    /// Escrow / fund-transfer executor
    pub escrow: Identity,
}

/// Repayment contract configuration
///
/// Owned by the engine and mutated only through admin operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    pub paused: bool,
    pub admin_identity: Identity,
    /// Annual income at or below which nothing is collected
    pub repayment_threshold: u128,
    /// Share of income above the threshold collected per cycle (0-100)
    pub min_repayment_percentage: u128,
    /// Blocks after last activity before penalties accrue
    pub grace_period_blocks: u64,
    pub endpoints: CollaboratorEndpoints,
}

impl ContractConfig {
    pub fn new(admin_identity: Identity, endpoints: CollaboratorEndpoints) -> Self {
        Self {
            paused: false,
            admin_identity,
            repayment_threshold: crate::DEFAULT_REPAYMENT_THRESHOLD,
            min_repayment_percentage: crate::DEFAULT_MIN_REPAYMENT_PERCENTAGE,
            grace_period_blocks: crate::DEFAULT_GRACE_PERIOD_BLOCKS,
            endpoints,
        }
    }

    /// Threshold must be positive and the percentage at most 100
    pub fn validate_thresholds(threshold: u128, min_percentage: u128) -> Result<()> {
        if threshold == 0 || min_percentage > 100 {
            return Err(RepaymentError::InvalidThresholds {
                threshold,
                min_percentage,
            });
        }
        Ok(())
    }

    pub fn ensure_admin(&self, caller: &Identity) -> Result<()> {
        if caller != &self.admin_identity {
            return Err(RepaymentError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    pub fn ensure_not_paused(&self) -> Result<()> {
        if self.paused {
            return Err(RepaymentError::Paused);
        }
        Ok(())
    }
}
