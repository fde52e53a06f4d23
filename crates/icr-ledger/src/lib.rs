//! # ICR Ledger
//!
//! Per-loan repayment ledger and append-only repayment history.
//!
//! ## Components
//!
//! - **Account**: a loan's [`LoanRepaymentRecord`](icr_common::LoanRepaymentRecord)
//!   plus its dense, 1-based history log
//! - **Store**: [`LedgerStore`] backends with per-loan exclusive locking
//! - **Events**: [`RepaymentEvent`] broadcast after every committed change
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      InMemoryLedger                      │
//! │   DashMap<LoanId, Arc<Mutex<LoanAccount>>>               │
//! │  ┌────────────────────┐    ┌──────────────────────────┐  │
//! │  │ LoanRepaymentRecord│────│ history[0..counter]      │  │
//! │  │ (status machine)   │    │ (append-only, seq = i+1) │  │
//! │  └────────────────────┘    └──────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//!                │ commit
//!                ▼
//!        EventPublisher (broadcast)
//! ```

pub mod ledger;

pub use ledger::{
    AccountGuard, EventPublisher, InMemoryLedger, LedgerError, LedgerStore, LoanAccount,
    RepaymentEvent,
};

/// Default broadcast buffer for repayment events
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;
