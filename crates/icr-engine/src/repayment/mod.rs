//! Repayment formulas, the engine, and its admin surface

mod admin;
pub mod engine;
pub mod formula;
pub mod outcome;

pub use engine::RepaymentEngine;
pub use formula::{
    compute_interest, compute_penalty, penalty_for, repayment_capacity, RepaymentQuote,
    PENALTY_RATE, SCALE,
};
pub use outcome::RepaymentOutcome;
