//! Admin operations
//!
//! Every operation here requires the caller to be the configured admin. A
//! denied call is audited and leaves the configuration untouched.

use super::engine::RepaymentEngine;
use crate::collaborators::CollaboratorSet;
use icr_common::{ContractConfig, Identity, Result};
use icr_ledger::RepaymentEvent;
use tracing::{info, instrument, warn};

impl RepaymentEngine {
    /// Authorize `caller`, apply `update` under the config write lock, then
    /// audit and publish the change. `update` returns the old and new values.
    fn admin_update<F>(&self, caller: &Identity, setting: &str, update: F) -> Result<()>
    where
        F: FnOnce(&mut ContractConfig) -> Result<(String, String)>,
    {
        let (old, new) = {
            let mut config = self.config.write();
            if let Err(err) = config.ensure_admin(caller) {
                drop(config);
                warn!(%caller, setting, "Unauthorized admin operation");
                self.audit.log_authorization(caller.as_str(), setting, false);
                return Err(err);
            }
            update(&mut config)?
        };

        info!(%caller, setting, old = %old, new = %new, "Contract configuration changed");
        self.audit.log_authorization(caller.as_str(), setting, true);
        self.audit.log_config_change(caller.as_str(), setting, &old, &new);
        self.events.publish(RepaymentEvent::ConfigChanged {
            actor: caller.clone(),
            setting: setting.to_string(),
            value: new,
        });
        Ok(())
    }

    /// Stop initialization and repayment processing
    #[instrument(skip(self))]
    pub fn pause(&self, caller: &Identity) -> Result<()> {
        self.admin_update(caller, "paused", |config| {
            let old = config.paused;
            config.paused = true;
            Ok((old.to_string(), true.to_string()))
        })
    }

    #[instrument(skip(self))]
    pub fn unpause(&self, caller: &Identity) -> Result<()> {
        self.admin_update(caller, "paused", |config| {
            let old = config.paused;
            config.paused = false;
            Ok((old.to_string(), false.to_string()))
        })
    }

    /// Replace the income threshold and collection percentage
    ///
    /// Rejects a zero threshold or a percentage above 100 with
    /// `InvalidThresholds`, after the admin check.
    #[instrument(skip(self))]
    pub fn set_thresholds(
        &self,
        caller: &Identity,
        threshold: u128,
        min_percentage: u128,
    ) -> Result<()> {
        self.admin_update(caller, "thresholds", |config| {
            ContractConfig::validate_thresholds(threshold, min_percentage)?;
            let old = format!(
                "{}/{}%",
                config.repayment_threshold, config.min_repayment_percentage
            );
            config.repayment_threshold = threshold;
            config.min_repayment_percentage = min_percentage;
            Ok((old, format!("{}/{}%", threshold, min_percentage)))
        })
    }

    #[instrument(skip(self))]
    pub fn set_grace_period(&self, caller: &Identity, blocks: u64) -> Result<()> {
        self.admin_update(caller, "grace_period_blocks", |config| {
            let old = config.grace_period_blocks;
            config.grace_period_blocks = blocks;
            Ok((old.to_string(), blocks.to_string()))
        })
    }

    /// Swap the live collaborators and record their endpoint identities
    ///
    /// Cycles already past their collaborator snapshot finish against the old set.
    #[instrument(skip(self, collaborators))]
    pub fn update_dependencies(&self, caller: &Identity, collaborators: CollaboratorSet) -> Result<()> {
        self.admin_update(caller, "endpoints", |config| {
            let old = describe_endpoints(config);
            config.endpoints = collaborators.endpoints().clone();
            let new = describe_endpoints(config);
            *self.collaborators.write() = collaborators;
            Ok((old, new))
        })
    }

    /// Hand the admin role to `new_admin`
    #[instrument(skip(self))]
    pub fn transfer_admin(&self, caller: &Identity, new_admin: Identity) -> Result<()> {
        self.admin_update(caller, "admin_identity", |config| {
            let old = std::mem::replace(&mut config.admin_identity, new_admin);
            Ok((old.to_string(), config.admin_identity.to_string()))
        })
    }
}

fn describe_endpoints(config: &ContractConfig) -> String {
    let e = &config.endpoints;
    format!(
        "oracle={} loan_issuance={} borrower_profile={} escrow={}",
        e.oracle, e.loan_issuance, e.borrower_profile, e.escrow
    )
}
