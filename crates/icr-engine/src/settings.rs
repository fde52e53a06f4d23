//! Engine configuration
//!
//! Settings are layered: built-in defaults, then an optional config file,
//! then `ICR_`-prefixed environment variables (nested keys use `__`, e.g.
//! `ICR_ENDPOINTS__ESCROW`). A `.env` file is read first if present.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use icr_common::{CollaboratorEndpoints, ContractConfig, Identity};
use serde::{Deserialize, Serialize};

/// Repayment engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Initial admin identity
    pub admin: String,
    /// Annual income cutoff below which nothing is collected
    pub repayment_threshold: u64,
    /// Percent of income above the threshold collected per cycle
    pub min_repayment_percentage: u64,
    /// Blocks after last activity before penalties accrue
    pub grace_period_blocks: u64,
    /// Collaborator endpoint identities
    pub endpoints: EndpointSettings,
    /// Broadcast buffer for repayment events
    pub event_capacity: usize,
}

/// Collaborator endpoint identities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSettings {
    pub oracle: String,
    pub loan_issuance: String,
    pub borrower_profile: String,
    pub escrow: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            admin: "admin".to_string(),
            repayment_threshold: icr_common::DEFAULT_REPAYMENT_THRESHOLD as u64,
            min_repayment_percentage: icr_common::DEFAULT_MIN_REPAYMENT_PERCENTAGE as u64,
            grace_period_blocks: icr_common::DEFAULT_GRACE_PERIOD_BLOCKS,
            endpoints: EndpointSettings::default(),
            event_capacity: icr_ledger::DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            oracle: "income-oracle".to_string(),
            loan_issuance: "loan-issuance".to_string(),
            borrower_profile: "borrower-profile".to_string(),
            escrow: "escrow".to_string(),
        }
    }
}

impl EngineSettings {
    /// Load from `.env`, the file named by `ICR_CONFIG` (default `config/icr`), and the environment
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let path = std::env::var("ICR_CONFIG").unwrap_or_else(|_| "config/icr".to_string());
        let settings = Self::builder()?
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix("ICR")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to assemble engine configuration")?
            .try_deserialize::<Self>()
            .context("Failed to parse engine configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Defaults overlaid with a TOML document
    pub fn from_toml(toml: &str) -> Result<Self> {
        let settings = Self::builder()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .context("Failed to assemble engine configuration")?
            .try_deserialize::<Self>()
            .context("Failed to parse engine configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let defaults = Config::try_from(&Self::default())
            .context("Failed to serialize default configuration")?;
        Ok(Config::builder().add_source(defaults))
    }

    /// Same rules the admin threshold update enforces, plus non-empty identities
    pub fn validate(&self) -> Result<()> {
        ContractConfig::validate_thresholds(
            u128::from(self.repayment_threshold),
            u128::from(self.min_repayment_percentage),
        )?;

        let identities = [
            ("admin", &self.admin),
            ("endpoints.oracle", &self.endpoints.oracle),
            ("endpoints.loan_issuance", &self.endpoints.loan_issuance),
            ("endpoints.borrower_profile", &self.endpoints.borrower_profile),
            ("endpoints.escrow", &self.endpoints.escrow),
        ];
        for (key, value) in identities {
            if value.trim().is_empty() {
                anyhow::bail!("Configuration key `{}` must not be empty", key);
            }
        }
        Ok(())
    }

    pub fn collaborator_endpoints(&self) -> CollaboratorEndpoints {
        CollaboratorEndpoints {
            oracle: Identity::new(self.endpoints.oracle.clone()),
            loan_issuance: Identity::new(self.endpoints.loan_issuance.clone()),
            borrower_profile: Identity::new(self.endpoints.borrower_profile.clone()),
            escrow: Identity::new(self.endpoints.escrow.clone()),
        }
    }

    /// Initial contract configuration (unpaused)
    pub fn contract_config(&self) -> ContractConfig {
        ContractConfig {
            paused: false,
            admin_identity: Identity::new(self.admin.clone()),
            repayment_threshold: u128::from(self.repayment_threshold),
            min_repayment_percentage: u128::from(self.min_repayment_percentage),
            grace_period_blocks: self.grace_period_blocks,
            endpoints: self.collaborator_endpoints(),
        }
    }
}
