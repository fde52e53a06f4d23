//! Concurrent access to one loan
//!
//! Cycles on the same loan must serialize: dense sequence numbers, no lost
//! updates, and exactly one winner for concurrent registration.

mod common;

use common::{collector, TestHarness, ESCROW_FUNDS};
use futures::future::join_all;
use icr_common::{LoanId, RepaymentError};

const LOAN: LoanId = LoanId(7);

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cycles_are_serialized() {
    let h = TestHarness::new();
    let borrower = h.add_loan(LOAN, "olga", 1_000_000, 500, 50_000);
    h.engine.initialize_loan_repayment(LOAN).await.unwrap();
    h.clock.advance(10);

    let tasks: Vec<_> = (0..40)
        .map(|_| {
            let engine = h.engine.clone();
            tokio::spawn(async move { engine.process_repayment(&collector(), LOAN).await })
        })
        .collect();

    let mut sequences: Vec<u64> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap().sequence())
        .collect();
    sequences.sort_unstable();
    assert_eq!(sequences, (1..=40).collect::<Vec<u64>>());

    assert_eq!(h.engine.get_repayment_counter(LOAN).await, Some(40));
    let history = h.engine.get_repayment_history(LOAN).await;
    assert_eq!(history.len(), 40);

    let record = h.engine.get_repayment_details(LOAN).await.unwrap();
    let collected: u128 = history.iter().map(|e| e.amount).sum();
    assert_eq!(collected, record.total_paid);
    assert_eq!(collected, 120_000);
    assert_eq!(record.outstanding_principal, 880_000);

    assert_eq!(h.directory.transfers().len(), 40);
    assert_eq!(h.directory.balance(&borrower), ESCROW_FUNDS - 120_000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_has_one_winner() {
    let h = TestHarness::new();
    h.add_loan(LOAN, "pete", 10_000, 500, 50_000);

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let engine = h.engine.clone();
            tokio::spawn(async move { engine.initialize_loan_repayment(LOAN).await })
        })
        .collect();

    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| *e == RepaymentError::AlreadyRegistered(LOAN)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_loans_progress_in_parallel() {
    let h = TestHarness::new();
    let loans: Vec<LoanId> = (100..110).map(LoanId).collect();
    for loan in &loans {
        h.add_loan(*loan, &format!("borrower-{}", loan.0), 10_000, 500, 50_000);
        h.engine.initialize_loan_repayment(*loan).await.unwrap();
    }
    h.clock.advance(200);

    let tasks: Vec<_> = loans
        .iter()
        .map(|loan| {
            let engine = h.engine.clone();
            let loan = *loan;
            tokio::spawn(async move { engine.process_repayment(&collector(), loan).await })
        })
        .collect();

    for joined in join_all(tasks).await {
        let outcome = joined.unwrap().unwrap();
        assert_eq!(outcome.sequence(), 1);
        assert_eq!(outcome.amount(), 3_000);
    }
    assert_eq!(h.directory.balance(&collector()), 30_000);
}
