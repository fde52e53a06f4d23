//! Principals and loan identifiers
//!
//! Borrowers, collectors, administrators and collaborator endpoints are all
//! addressed by an opaque [`Identity`]. Loans are addressed by a numeric
//! [`LoanId`] issued by the loan-issuance subsystem.

use serde::{Deserialize, Serialize};

/// Opaque principal identity (borrower, collector, admin, or collaborator endpoint)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Loan identifier as issued by the loan-issuance subsystem
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LoanId(pub u64);

impl std::fmt::Display for LoanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "loan-{}", self.0)
    }
}

impl From<u64> for LoanId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_display() {
        let id = Identity::from("SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7");
        assert_eq!(id.to_string(), "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7");
        assert_eq!(id.as_str(), id.to_string());
    }

    #[test]
    fn test_identity_serializes_as_string() {
        let id = Identity::new("borrower-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"borrower-1\"");
    }

    #[test]
    fn test_loan_id_display() {
        assert_eq!(LoanId(42).to_string(), "loan-42");
    }
}
