//! Repayment ledger storage and event stream

pub mod account;
pub mod events;
pub mod store;

pub use account::LoanAccount;
pub use events::{EventPublisher, RepaymentEvent};
pub use store::{AccountGuard, InMemoryLedger, LedgerError, LedgerStore};
