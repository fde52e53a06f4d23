//! Security module - audit trail for admin and registration activity

pub mod audit;

pub use audit::{
    AuditCategory, AuditEvent, AuditLogger, AuditOutcome, AuditSeverity, AuditSink,
    MemoryAuditSink, TracingAuditSink,
};
