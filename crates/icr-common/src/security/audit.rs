//! Security audit trail
//!
//! Records security-relevant events of the repayment contract:
//! - Admin authorization decisions (granted and denied)
//! - Configuration changes (pause, thresholds, grace period, endpoints, admin)
//! - Loan registrations

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Audit event severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AuditSeverity {
    /// Informational - normal operation
    Info,
    /// Warning - denied or failed operation
    Warning,
}

impl std::fmt::Display for AuditSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditSeverity::Info => write!(f, "INFO"),
            AuditSeverity::Warning => write!(f, "WARN"),
        }
    }
}

/// Audit event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditCategory {
    /// Admin authorization decisions
    Authorization,
    /// Contract configuration changes
    Configuration,
    /// Loan registration
    Registration,
}

impl std::fmt::Display for AuditCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditCategory::Authorization => write!(f, "AUTHZ"),
            AuditCategory::Configuration => write!(f, "CONFIG"),
            AuditCategory::Registration => write!(f, "REGISTER"),
        }
    }
}

/// Audit outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditOutcome {
    Success,
    Failure,
}

/// Audit event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub event_id: String,

    /// Timestamp (Unix millis)
    pub timestamp: i64,

    pub severity: AuditSeverity,

    pub category: AuditCategory,

    /// Operation name (e.g. "pause", "set_thresholds")
    pub action: String,

    pub outcome: AuditOutcome,

    /// Identity that performed the action
    pub actor: Option<String>,

    /// Target resource (loan id, config section)
    pub resource: Option<String>,

    /// Additional details
    pub details: HashMap<String, String>,
}

impl AuditEvent {
    /// Create a new audit event
    pub fn new(category: AuditCategory, action: &str, outcome: AuditOutcome) -> Self {
        Self {
            event_id: uuid::Uuid::now_v7().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            severity: match outcome {
                AuditOutcome::Success => AuditSeverity::Info,
                AuditOutcome::Failure => AuditSeverity::Warning,
            },
            category,
            action: action.to_string(),
            outcome,
            actor: None,
            resource: None,
            details: HashMap::new(),
        }
    }

    pub fn with_actor(mut self, actor: &str) -> Self {
        self.actor = Some(actor.to_string());
        self
    }

    pub fn with_resource(mut self, resource: &str) -> Self {
        self.resource = Some(resource.to_string());
        self
    }

    pub fn with_detail(mut self, key: &str, value: &str) -> Self {
        self.details.insert(key.to_string(), value.to_string());
        self
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Audit log sink
pub trait AuditSink: Send + Sync {
    /// Write an audit event
    fn write(&self, event: &AuditEvent);
}

/// Writes audit events through `tracing`
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn write(&self, event: &AuditEvent) {
        let log_line = format!(
            "[{}] {} {} {} - actor={} resource={} outcome={:?}",
            event.severity,
            event.category,
            event.action,
            event.event_id,
            event.actor.as_deref().unwrap_or("-"),
            event.resource.as_deref().unwrap_or("-"),
            event.outcome,
        );

        match event.severity {
            AuditSeverity::Info => info!(target: "icr::audit", "{}", log_line),
            AuditSeverity::Warning => warn!(target: "icr::audit", "{}", log_line),
        }
    }
}

/// Keeps audit events in memory for inspection
#[derive(Clone, Default)]
pub struct MemoryAuditSink {
    events: Arc<RwLock<Vec<AuditEvent>>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events, oldest first
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().clone()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl AuditSink for MemoryAuditSink {
    fn write(&self, event: &AuditEvent) {
        self.events.write().push(event.clone());
    }
}

/// Audit logger fanning events out to its sinks
pub struct AuditLogger {
    sinks: Vec<Box<dyn AuditSink>>,
    /// Minimum severity to log
    min_severity: AuditSeverity,
}

impl AuditLogger {
    /// Create a logger writing through `tracing`
    pub fn new() -> Self {
        Self {
            sinks: vec![Box::new(TracingAuditSink)],
            min_severity: AuditSeverity::Info,
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn AuditSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn set_min_severity(&mut self, severity: AuditSeverity) {
        self.min_severity = severity;
    }

    /// Log an audit event
    pub fn log(&self, event: AuditEvent) {
        if event.severity < self.min_severity {
            return;
        }

        for sink in &self.sinks {
            sink.write(&event);
        }
    }

    /// Log an admin authorization decision
    pub fn log_authorization(&self, actor: &str, action: &str, allowed: bool) {
        let outcome = if allowed {
            AuditOutcome::Success
        } else {
            AuditOutcome::Failure
        };

        let event = AuditEvent::new(AuditCategory::Authorization, action, outcome)
            .with_actor(actor)
            .with_resource("contract-config");

        self.log(event);
    }

    /// Log configuration change
    pub fn log_config_change(&self, actor: &str, setting: &str, old_value: &str, new_value: &str) {
        let event = AuditEvent::new(AuditCategory::Configuration, "change", AuditOutcome::Success)
            .with_actor(actor)
            .with_resource("contract-config")
            .with_detail("setting", setting)
            .with_detail("old_value", old_value)
            .with_detail("new_value", new_value);

        self.log(event);
    }

    /// Log a loan registration
    pub fn log_registration(&self, borrower: &str, loan: &str, principal: u128) {
        let event = AuditEvent::new(
            AuditCategory::Registration,
            "initialize_loan_repayment",
            AuditOutcome::Success,
        )
        .with_actor(borrower)
        .with_resource(loan)
        .with_detail("principal", &principal.to_string());

        self.log(event);
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_event_creation() {
        let event = AuditEvent::new(AuditCategory::Configuration, "pause", AuditOutcome::Success)
            .with_actor("admin")
            .with_detail("setting", "paused");

        assert_eq!(event.category, AuditCategory::Configuration);
        assert_eq!(event.action, "pause");
        assert_eq!(event.severity, AuditSeverity::Info);
        assert_eq!(event.actor, Some("admin".to_string()));
        assert_eq!(event.details.get("setting"), Some(&"paused".to_string()));
    }

    #[test]
    fn test_audit_event_json() {
        let event = AuditEvent::new(AuditCategory::Authorization, "pause", AuditOutcome::Failure)
            .with_resource("contract-config");

        let json = event.to_json();
        assert!(json.contains("Authorization"));
        assert!(json.contains("contract-config"));
    }

    #[test]
    fn test_memory_sink_collects_denials() {
        let sink = MemoryAuditSink::new();
        let logger = AuditLogger::new().with_sink(Box::new(sink.clone()));

        logger.log_authorization("mallory", "pause", false);
        logger.log_config_change("admin", "repayment_threshold", "20000", "30000");

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].outcome, AuditOutcome::Failure);
        assert_eq!(events[0].severity, AuditSeverity::Warning);
        assert_eq!(
            events[1].details.get("new_value"),
            Some(&"30000".to_string())
        );
    }

    #[test]
    fn test_min_severity_filters() {
        let sink = MemoryAuditSink::new();
        let mut logger = AuditLogger::new().with_sink(Box::new(sink.clone()));
        logger.set_min_severity(AuditSeverity::Warning);

        logger.log_authorization("admin", "pause", true);
        assert!(sink.is_empty());

        logger.log_authorization("mallory", "pause", false);
        assert_eq!(sink.len(), 1);
    }
}
