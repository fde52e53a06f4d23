//! Fixed-point repayment formulas
//!
//! All values are unsigned integers and every division truncates, so results
//! are reproducible bit for bit:
//!
//! ```text
//! interest = floor(principal * rate * elapsed / SCALE) / 100
//! penalty  = floor(outstanding * PENALTY_RATE * blocks_late / SCALE)
//! capacity = income < threshold ? 0 : floor((income - threshold) * pct / 100)
//! ```

use icr_common::{ContractConfig, LoanRepaymentRecord, RepaymentError, Result};
use serde::{Deserialize, Serialize};

/// Fixed-point denominator for rates
pub const SCALE: u128 = 1_000_000;

/// Penalty per block late, in `SCALE` units (0.01% of outstanding)
pub const PENALTY_RATE: u128 = 100;

const PERCENT: u128 = 100;

fn overflow(what: &str) -> RepaymentError {
    RepaymentError::CalculationOverflow(what.to_string())
}

/// Interest accrued on `principal` over `elapsed_periods`
///
/// A scaled interest larger than the principal itself is rejected as a
/// configuration or clock error rather than capped.
pub fn compute_interest(principal: u128, rate: u128, elapsed_periods: u64) -> Result<u128> {
    let scaled = principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(u128::from(elapsed_periods)))
        .ok_or_else(|| overflow("interest exceeds arithmetic width"))?
        / SCALE;

    if scaled > principal {
        return Err(RepaymentError::CalculationOverflow(format!(
            "scaled interest {} exceeds principal {}",
            scaled, principal
        )));
    }

    Ok(scaled / PERCENT)
}

/// Late penalty on `outstanding` for `blocks_late` blocks past the grace window
pub fn compute_penalty(outstanding: u128, blocks_late: u64) -> Result<u128> {
    outstanding
        .checked_mul(PENALTY_RATE)
        .and_then(|v| v.checked_mul(u128::from(blocks_late)))
        .map(|v| v / SCALE)
        .ok_or_else(|| overflow("penalty exceeds arithmetic width"))
}

/// Penalty for a cycle, zero while `elapsed` is within the grace period
pub fn penalty_for(outstanding: u128, elapsed: u64, grace_period_blocks: u64) -> Result<u128> {
    if elapsed > grace_period_blocks {
        compute_penalty(outstanding, elapsed - grace_period_blocks)
    } else {
        Ok(0)
    }
}

/// Amount collectable from `income` this cycle
pub fn repayment_capacity(income: u128, threshold: u128, min_percentage: u128) -> Result<u128> {
    if income < threshold {
        return Ok(0);
    }
    (income - threshold)
        .checked_mul(min_percentage)
        .map(|v| v / PERCENT)
        .ok_or_else(|| overflow("repayment capacity exceeds arithmetic width"))
}

/// Result of evaluating one repayment cycle against a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentQuote {
    pub elapsed_blocks: u64,
    pub interest: u128,
    pub penalty: u128,
    /// Outstanding principal plus this cycle's interest and penalty
    pub total_due: u128,
    pub repayment_capacity: u128,
    /// `min(repayment_capacity, total_due)`
    pub effective_amount: u128,
}

impl RepaymentQuote {
    /// Evaluate a cycle at `current_block` with the given verified (or hypothetical) income
    ///
    /// Both live processing and forecasting go through here so the two can't drift.
    pub fn compute(
        record: &LoanRepaymentRecord,
        interest_rate: u128,
        income: u128,
        config: &ContractConfig,
        current_block: u64,
    ) -> Result<Self> {
        let elapsed_blocks = record.elapsed_blocks(current_block);
        let outstanding = record.outstanding_principal;

        let interest = compute_interest(outstanding, interest_rate, elapsed_blocks)?;
        let penalty = penalty_for(outstanding, elapsed_blocks, config.grace_period_blocks)?;
        let total_due = outstanding
            .checked_add(interest)
            .and_then(|v| v.checked_add(penalty))
            .ok_or_else(|| overflow("total due exceeds arithmetic width"))?;

        let repayment_capacity = repayment_capacity(
            income,
            config.repayment_threshold,
            config.min_repayment_percentage,
        )?;

        Ok(Self {
            elapsed_blocks,
            interest,
            penalty,
            total_due,
            repayment_capacity,
            effective_amount: repayment_capacity.min(total_due),
        })
    }

    /// Whether this cycle collects nothing
    #[inline]
    pub fn is_deferral(&self) -> bool {
        self.effective_amount == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icr_common::{CollaboratorEndpoints, Identity};

    fn config() -> ContractConfig {
        ContractConfig::new(
            Identity::from("admin"),
            CollaboratorEndpoints {
                oracle: "oracle".into(),
                loan_issuance: "issuance".into(),
                borrower_profile: "profile".into(),
                escrow: "escrow".into(),
            },
        )
    }

    #[test]
    fn test_interest_truncates() {
        // 10000 * 500 * 200 / 1e6 = 1000, / 100 = 10
        assert_eq!(compute_interest(10_000, 500, 200).unwrap(), 10);
        // 10000 * 500 * 150 / 1e6 = 750, / 100 = 7
        assert_eq!(compute_interest(10_000, 500, 150).unwrap(), 7);
        assert_eq!(compute_interest(10_000, 500, 0).unwrap(), 0);
        assert_eq!(compute_interest(0, 500, 1_000).unwrap(), 0);
    }

    #[test]
    fn test_interest_ceiling() {
        // 100 * 10000 * 200 / 1e6 = 200 > 100
        assert!(matches!(
            compute_interest(100, 10_000, 200),
            Err(RepaymentError::CalculationOverflow(_))
        ));
        // exactly at the ceiling is allowed: 100 * 10000 * 100 / 1e6 = 100
        assert_eq!(compute_interest(100, 10_000, 100).unwrap(), 1);
    }

    #[test]
    fn test_interest_width_overflow() {
        assert!(matches!(
            compute_interest(u128::MAX, 2, 1),
            Err(RepaymentError::CalculationOverflow(_))
        ));
    }

    #[test]
    fn test_penalty() {
        // 10000 * 100 * 6 / 1e6 = 6
        assert_eq!(compute_penalty(10_000, 6).unwrap(), 6);
        // 10000 * 100 * 56 / 1e6 = 56
        assert_eq!(compute_penalty(10_000, 56).unwrap(), 56);
        assert_eq!(compute_penalty(999, 1).unwrap(), 0);
        assert!(compute_penalty(u128::MAX, 2).is_err());
    }

    #[test]
    fn test_penalty_respects_grace_period() {
        assert_eq!(penalty_for(10_000, 144, 144).unwrap(), 0);
        assert_eq!(penalty_for(10_000, 100, 144).unwrap(), 0);
        assert_eq!(penalty_for(10_000, 150, 144).unwrap(), 6);
    }

    #[test]
    fn test_capacity() {
        assert_eq!(repayment_capacity(15_000, 20_000, 10).unwrap(), 0);
        assert_eq!(repayment_capacity(20_000, 20_000, 10).unwrap(), 0);
        assert_eq!(repayment_capacity(50_000, 20_000, 10).unwrap(), 3_000);
        // 20009 - 20000 = 9, * 10 / 100 = 0
        assert_eq!(repayment_capacity(20_009, 20_000, 10).unwrap(), 0);
        assert_eq!(repayment_capacity(50_000, 20_000, 0).unwrap(), 0);
    }

    #[test]
    fn test_quote_combines_formulas() {
        let record = LoanRepaymentRecord::new(Identity::from("b"), 10_000, 0);
        let quote = RepaymentQuote::compute(&record, 500, 50_000, &config(), 200).unwrap();

        assert_eq!(quote.elapsed_blocks, 200);
        assert_eq!(quote.interest, 10);
        assert_eq!(quote.penalty, 56);
        assert_eq!(quote.total_due, 10_066);
        assert_eq!(quote.repayment_capacity, 3_000);
        assert_eq!(quote.effective_amount, 3_000);
        assert!(!quote.is_deferral());
    }

    #[test]
    fn test_quote_caps_at_total_due() {
        let record = LoanRepaymentRecord::new(Identity::from("b"), 1_000, 0);
        let quote = RepaymentQuote::compute(&record, 500, 1_000_000, &config(), 10).unwrap();
        assert_eq!(quote.effective_amount, quote.total_due);
    }

    #[test]
    fn test_quote_deferral_below_threshold() {
        let record = LoanRepaymentRecord::new(Identity::from("b"), 10_000, 0);
        let quote = RepaymentQuote::compute(&record, 500, 15_000, &config(), 200).unwrap();
        assert!(quote.is_deferral());
        assert_eq!(quote.interest, 10);
        assert_eq!(quote.penalty, 56);
    }
}
