//! Shared harness for engine integration tests

#![allow(dead_code)]

use icr_common::{BorrowerStatus, CollaboratorEndpoints, ContractConfig, Identity, LoanId, LoanTerms};
use icr_engine::{CollaboratorSet, InMemoryDirectory, ManualClock, RepaymentEngine};
use std::sync::Arc;

pub const ESCROW_FUNDS: u128 = 10_000_000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn admin() -> Identity {
    Identity::from("admin")
}

pub fn collector() -> Identity {
    Identity::from("collector")
}

pub fn endpoints() -> CollaboratorEndpoints {
    CollaboratorEndpoints {
        oracle: Identity::from("income-oracle"),
        loan_issuance: Identity::from("loan-issuance"),
        borrower_profile: Identity::from("borrower-profile"),
        escrow: Identity::from("escrow"),
    }
}

/// Engine wired to one in-memory directory and a manual clock at block 0
pub struct TestHarness {
    pub engine: Arc<RepaymentEngine>,
    pub directory: Arc<InMemoryDirectory>,
    pub clock: Arc<ManualClock>,
}

impl TestHarness {
    pub fn new() -> Self {
        init_tracing();

        let directory = Arc::new(InMemoryDirectory::new());
        let clock = Arc::new(ManualClock::new(0));
        let collaborators = CollaboratorSet::from_directory(endpoints(), directory.clone());
        let engine = RepaymentEngine::new(
            ContractConfig::new(admin(), endpoints()),
            collaborators,
            clock.clone(),
        );

        Self {
            engine: Arc::new(engine),
            directory,
            clock,
        }
    }

    /// Register terms and an eligible low-income profile for `borrower`,
    /// with a funded escrow balance and the given verified income
    pub fn add_loan(
        &self,
        loan_id: LoanId,
        borrower: &str,
        principal: u128,
        interest_rate: u128,
        income: u128,
    ) -> Identity {
        let borrower = Identity::from(borrower);
        self.directory.set_loan(
            loan_id,
            LoanTerms {
                principal,
                interest_rate,
                term: 52_560,
                start_block: self.clock_height(),
                borrower: borrower.clone(),
            },
        );
        self.directory.set_profile(
            &borrower,
            BorrowerStatus {
                is_active: true,
                low_income_flag: true,
            },
        );
        self.directory.set_income(&borrower, income);
        self.directory.set_balance(&borrower, ESCROW_FUNDS);
        borrower
    }

    fn clock_height(&self) -> u64 {
        use icr_engine::BlockClock;
        self.clock.current_block()
    }
}
