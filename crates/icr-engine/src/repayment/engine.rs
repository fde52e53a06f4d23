//! Repayment engine
//!
//! Orchestrates registration, repayment cycles, and forecasts. One cycle:
//! 1. Pause check, then the loan's exclusive lock (missing record fails here)
//! 2. Verified income and loan terms lookups
//! 3. Fixed-point quote: interest, penalty, total due, capacity
//! 4. Deferral commit, or escrow transfer followed by a payment commit
//! 5. Event publication
//!
//! Every check runs before any effect. A collaborator failure aborts the cycle
//! with the ledger untouched.

use crate::clock::BlockClock;
use crate::collaborators::CollaboratorSet;
use crate::repayment::formula::RepaymentQuote;
use crate::repayment::outcome::RepaymentOutcome;
use crate::settings::EngineSettings;
use icr_common::{
    security::AuditLogger, CollaboratorError, ContractConfig, Identity, LoanId,
    LoanRepaymentRecord, RepaymentError, RepaymentHistoryEntry, Result,
};
use icr_ledger::{EventPublisher, InMemoryLedger, LedgerStore, RepaymentEvent};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

/// Income-contingent repayment engine
pub struct RepaymentEngine {
    pub(crate) config: RwLock<ContractConfig>,
    pub(crate) collaborators: RwLock<CollaboratorSet>,
    ledger: Arc<dyn LedgerStore>,
    clock: Arc<dyn BlockClock>,
    pub(crate) events: EventPublisher,
    pub(crate) audit: AuditLogger,
}

impl RepaymentEngine {
    /// Create an engine over an in-memory ledger
    ///
    /// The configuration's endpoint identities are taken from `collaborators`.
    pub fn new(
        mut config: ContractConfig,
        collaborators: CollaboratorSet,
        clock: Arc<dyn BlockClock>,
    ) -> Self {
        config.endpoints = collaborators.endpoints().clone();
        Self {
            config: RwLock::new(config),
            collaborators: RwLock::new(collaborators),
            ledger: Arc::new(InMemoryLedger::new()),
            clock,
            events: EventPublisher::default(),
            audit: AuditLogger::new(),
        }
    }

    /// Create an engine from loaded settings
    ///
    /// Endpoint identities come from `settings`, replacing whatever
    /// `collaborators` was built with.
    pub fn from_settings(
        settings: &EngineSettings,
        collaborators: CollaboratorSet,
        clock: Arc<dyn BlockClock>,
    ) -> Self {
        let collaborators = collaborators.with_endpoints(settings.collaborator_endpoints());
        Self::new(settings.contract_config(), collaborators, clock)
            .with_event_capacity(settings.event_capacity)
    }

    pub fn with_ledger(mut self, ledger: Arc<dyn LedgerStore>) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.events = EventPublisher::new(capacity);
        self
    }

    fn config_snapshot(&self) -> ContractConfig {
        self.config.read().clone()
    }

    fn collaborator_snapshot(&self) -> CollaboratorSet {
        self.collaborators.read().clone()
    }

    /// Register a loan for income-contingent repayment
    ///
    /// Checks, in order: not paused, loan terms, borrower profile, borrower
    /// active, low-income flag, positive principal, not yet registered.
    #[instrument(skip(self))]
    pub async fn initialize_loan_repayment(&self, loan_id: LoanId) -> Result<LoanRepaymentRecord> {
        self.config_snapshot().ensure_not_paused()?;
        let collaborators = self.collaborator_snapshot();

        let terms = collaborators
            .loans
            .get_loan_details(loan_id)
            .await
            .map_err(invalid_loan(loan_id))?;

        let status = collaborators
            .profiles
            .get_borrower_status(&terms.borrower)
            .await
            .map_err(invalid_loan(loan_id))?;

        if !status.is_active {
            return Err(RepaymentError::InvalidStatus(format!(
                "borrower {} is not active",
                terms.borrower
            )));
        }
        if !status.low_income_flag {
            return Err(RepaymentError::NotLowIncome(terms.borrower));
        }
        if terms.principal == 0 {
            return Err(RepaymentError::InvalidAmount(format!(
                "{} has zero principal",
                loan_id
            )));
        }

        // A pause that landed during the lookups still wins
        self.config_snapshot().ensure_not_paused()?;

        let current_block = self.clock.current_block();
        let record = LoanRepaymentRecord::new(terms.borrower, terms.principal, current_block);
        self.ledger.register(loan_id, record.clone()).await?;

        info!(
            borrower = %record.borrower,
            principal = record.outstanding_principal,
            block = current_block,
            "Loan registered for repayment"
        );
        self.audit.log_registration(
            record.borrower.as_str(),
            &loan_id.to_string(),
            record.outstanding_principal,
        );
        self.events.publish(RepaymentEvent::LoanInitialized {
            loan_id,
            borrower: record.borrower.clone(),
            principal: record.outstanding_principal,
            block_height: current_block,
        });

        Ok(record)
    }

    /// Process one repayment cycle, collecting on behalf of `collector`
    ///
    /// Holds the loan's lock from the record read through the commit, so
    /// cycles on one loan are strictly serialized. Paid and defaulted loans are
    /// rejected with `InvalidStatus` before any lookup.
    #[instrument(skip(self, collector), fields(collector = %collector))]
    pub async fn process_repayment(
        &self,
        collector: &Identity,
        loan_id: LoanId,
    ) -> Result<RepaymentOutcome> {
        self.config_snapshot().ensure_not_paused()?;
        let mut account = self.ledger.lock(loan_id).await?;

        // The cycle runs against the configuration in force once the lock is held
        let config = self.config_snapshot();
        config.ensure_not_paused()?;

        let record = account.record().clone();
        record.ensure_collectable()?;

        let collaborators = self.collaborator_snapshot();
        let income = collaborators
            .income
            .get_verified_income(&record.borrower)
            .await
            .map_err(|e| RepaymentError::InvalidIncome {
                borrower: record.borrower.clone(),
                reason: e.to_string(),
            })?;
        let terms = collaborators
            .loans
            .get_loan_details(loan_id)
            .await
            .map_err(invalid_loan(loan_id))?;

        let current_block = self.clock.current_block();
        let quote =
            RepaymentQuote::compute(&record, terms.interest_rate, income, &config, current_block)?;
        let block = record.cycle_block(current_block);
        debug!(?quote, income, block, "Repayment quote computed");

        if quote.is_deferral() {
            let sequence = account.commit_cycle(
                RepaymentHistoryEntry::deferred(block, income, quote.penalty),
                |r| r.apply_deferral(quote.interest, quote.penalty, block),
            )?;
            let deferral_count = account.record().deferral_count;
            drop(account);

            info!(
                sequence,
                deferral_count,
                interest = quote.interest,
                penalty = quote.penalty,
                "Repayment deferred"
            );
            self.events.publish(RepaymentEvent::RepaymentDeferred {
                loan_id,
                sequence,
                interest: quote.interest,
                penalty: quote.penalty,
                deferral_count,
                block_height: block,
            });

            return Ok(RepaymentOutcome::Deferred {
                loan_id,
                sequence,
                interest: quote.interest,
                penalty: quote.penalty,
                deferral_count,
            });
        }

        let amount = quote.effective_amount;

        // The payment must be committable before any funds move
        let mut staged = record.clone();
        staged.apply_payment(amount, quote.penalty, block)?;

        match collaborators
            .escrow
            .transfer_funds(&record.borrower, collector, amount)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                warn!(amount, "Transfer declined by escrow");
                return Err(RepaymentError::TransferFailed {
                    amount,
                    reason: "transfer declined".to_string(),
                });
            }
            Err(e) => {
                warn!(amount, error = %e, "Transfer failed");
                return Err(RepaymentError::TransferFailed {
                    amount,
                    reason: e.to_string(),
                });
            }
        }

        let sequence = account.commit_cycle(
            RepaymentHistoryEntry::collected(amount, block, income, quote.penalty),
            |r| r.apply_payment(amount, quote.penalty, block),
        )?;
        let updated = account.record().clone();
        drop(account);

        info!(
            sequence,
            amount,
            penalty = quote.penalty,
            outstanding = updated.outstanding_principal,
            status = %updated.status,
            "Repayment collected"
        );
        self.events.publish(RepaymentEvent::RepaymentCollected {
            loan_id,
            sequence,
            amount,
            penalty: quote.penalty,
            outstanding_principal: updated.outstanding_principal,
            status: updated.status,
            block_height: block,
        });

        Ok(RepaymentOutcome::Collected {
            loan_id,
            sequence,
            amount,
            interest: quote.interest,
            penalty: quote.penalty,
            outstanding_principal: updated.outstanding_principal,
            status: updated.status,
        })
    }

    /// What a cycle would collect now with `hypothetical_income`
    ///
    /// Read-only: no ledger mutation, no transfer, no counter change. Fails
    /// wherever a live cycle would, so a paid or defaulted loan is `InvalidStatus`.
    #[instrument(skip(self))]
    pub async fn calculate_expected_repayment(
        &self,
        loan_id: LoanId,
        hypothetical_income: u128,
    ) -> Result<RepaymentQuote> {
        let record = self
            .ledger
            .record(loan_id)
            .await
            .ok_or(RepaymentError::NoActiveLoan(loan_id))?;
        record.ensure_collectable()?;

        let terms = self
            .collaborator_snapshot()
            .loans
            .get_loan_details(loan_id)
            .await
            .map_err(invalid_loan(loan_id))?;

        RepaymentQuote::compute(
            &record,
            terms.interest_rate,
            hypothetical_income,
            &self.config_snapshot(),
            self.clock.current_block(),
        )
    }

    pub async fn get_repayment_details(&self, loan_id: LoanId) -> Option<LoanRepaymentRecord> {
        self.ledger.record(loan_id).await
    }

    pub async fn get_repayment_history_entry(
        &self,
        loan_id: LoanId,
        sequence: u64,
    ) -> Option<RepaymentHistoryEntry> {
        self.ledger.history_entry(loan_id, sequence).await
    }

    /// Entries `1..=counter` in sequence order
    pub async fn get_repayment_history(&self, loan_id: LoanId) -> Vec<RepaymentHistoryEntry> {
        self.ledger.history(loan_id).await
    }

    pub async fn get_repayment_counter(&self, loan_id: LoanId) -> Option<u64> {
        self.ledger.counter(loan_id).await
    }

    pub fn get_contract_config(&self) -> ContractConfig {
        self.config_snapshot()
    }

    /// Subscribe to committed repayment events
    pub fn subscribe(&self) -> broadcast::Receiver<RepaymentEvent> {
        self.events.subscribe()
    }
}

fn invalid_loan(loan_id: LoanId) -> impl FnOnce(CollaboratorError) -> RepaymentError {
    move |e| RepaymentError::InvalidLoan {
        loan_id,
        reason: e.to_string(),
    }
}
