//! Contact validation and enrichment for AlphaLeads.
//!
//! [`LeadValidator`] checks email, phone and company data, then rescores a
//! lead. Hunter.io and Clearbit are used when configured; otherwise every
//! check runs offline.

pub mod business;
pub mod email;
pub mod error;
pub(crate) mod http;
pub mod phone;
pub mod score;
pub mod validator;

pub use business::{extract_domain, BusinessEnricher, ClearbitClient, CompanyProfile};
pub use email::{EmailVerdict, EmailVerification, EmailVerifier, HunterClient};
pub use error::ValidationError;
pub use score::{overall_confidence, status_after_validation};
pub use validator::LeadValidator;
