//! Domain types, search criteria, configuration and the storage interface
//! shared by every AlphaLeads crate.

pub mod app_config;
pub mod config;
pub mod criteria;
pub mod lead;
pub mod store;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use criteria::{CriteriaError, Industry, NormalizedCriteria, SearchCriteria};
pub use lead::{
    Address, BusinessDetails, BusinessHours, BusinessValidation, Coordinates, EmailRisk,
    EmailValidation, Lead, LeadSource, LeadStatus, PhoneType, PhoneValidation, SocialHandles,
    ValidationStatus,
};
pub use store::{LeadFilters, LeadStore, StoreError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
