//! Repayment event stream
//!
//! Events are published after a mutation has been committed, never before,
//! so a subscriber only ever observes ledger state that actually exists.

use icr_common::{Identity, LoanId, RepaymentStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Events emitted by the repayment core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RepaymentEvent {
    /// Repayment record created for a loan
    LoanInitialized {
        loan_id: LoanId,
        borrower: Identity,
        principal: u128,
        block_height: u64,
    },
    /// Funds collected and applied
    RepaymentCollected {
        loan_id: LoanId,
        sequence: u64,
        amount: u128,
        penalty: u128,
        outstanding_principal: u128,
        status: RepaymentStatus,
        block_height: u64,
    },
    /// Zero-capacity cycle recorded
    RepaymentDeferred {
        loan_id: LoanId,
        sequence: u64,
        interest: u128,
        penalty: u128,
        deferral_count: u64,
        block_height: u64,
    },
    /// Admin changed the contract configuration
    ConfigChanged {
        actor: Identity,
        setting: String,
        value: String,
    },
}

impl RepaymentEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            RepaymentEvent::LoanInitialized { .. } => "LoanInitialized",
            RepaymentEvent::RepaymentCollected { .. } => "RepaymentCollected",
            RepaymentEvent::RepaymentDeferred { .. } => "RepaymentDeferred",
            RepaymentEvent::ConfigChanged { .. } => "ConfigChanged",
        }
    }

    pub fn loan_id(&self) -> Option<LoanId> {
        match self {
            RepaymentEvent::LoanInitialized { loan_id, .. }
            | RepaymentEvent::RepaymentCollected { loan_id, .. }
            | RepaymentEvent::RepaymentDeferred { loan_id, .. } => Some(*loan_id),
            RepaymentEvent::ConfigChanged { .. } => None,
        }
    }
}

/// Broadcasts committed events to any number of subscribers
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<RepaymentEvent>,
}

impl EventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event; having no subscribers is not an error
    pub fn publish(&self, event: RepaymentEvent) {
        let event_type = event.event_type();
        match self.sender.send(event) {
            Ok(receivers) => debug!(event_type, receivers, "Event published"),
            Err(_) => debug!(event_type, "Event dropped, no subscribers"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RepaymentEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(crate::DEFAULT_EVENT_CAPACITY)
    }
}
