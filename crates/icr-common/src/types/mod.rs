//! Core data types for income-contingent repayment

pub mod config;
pub mod history;
pub mod identity;
pub mod loan_record;
pub mod loan_terms;
