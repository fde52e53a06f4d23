//! # ICR Engine
//!
//! Income-contingent repayment: each cycle collects a share of the borrower's
//! verified income above a threshold, or defers when there is none.
//!
//! ## Repayment Formula
//!
//! ```text
//! capacity  = max(0, income - threshold) * pct / 100
//! total_due = outstanding + interest + penalty
//! collected = min(capacity, total_due)
//! ```
//!
//! Where:
//! - interest: fixed-point accrual over the blocks since last activity
//! - penalty: 0.01% of outstanding per block past the grace window
//! - collected == 0: the cycle is a deferral (interest and penalty still accrue)
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────────────────────────────┐
//! │  BlockClock  │──▶│             RepaymentEngine              │
//! └──────────────┘   │  config (RwLock)   collaborators (RwLock) │
//!                    └───────┬───────────────────────┬──────────┘
//!                            │ lock / commit         │ lookups, transfer
//!                    ┌───────▼────────┐   ┌──────────▼───────────┐
//!                    │  LedgerStore   │   │ IncomeOracle         │
//!                    │ record+history │   │ LoanRegistry         │
//!                    └───────┬────────┘   │ BorrowerProfiles     │
//!                            │            │ FundsTransfer        │
//!                    ┌───────▼────────┐   └──────────────────────┘
//!                    │ EventPublisher │
//!                    └────────────────┘
//! ```

pub mod clock;
pub mod collaborators;
pub mod repayment;
pub mod settings;

pub use clock::{BlockClock, ManualClock, WallClock};
pub use collaborators::{
    BorrowerProfiles, CollaboratorSet, FundsTransfer, InMemoryDirectory, IncomeOracle,
    LoanRegistry, TransferRecord,
};
pub use repayment::{RepaymentEngine, RepaymentOutcome, RepaymentQuote};
pub use settings::{EndpointSettings, EngineSettings};
