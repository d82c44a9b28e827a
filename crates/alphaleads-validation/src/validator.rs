use std::sync::Arc;

use alphaleads_core::{
    AppConfig, BusinessValidation, EmailValidation, Lead, PhoneValidation, ValidationStatus,
};
use chrono::Datelike;

use crate::business::{extract_domain, BusinessEnricher, ClearbitClient};
use crate::email::{heuristic_email, is_well_formed, EmailVerifier, HunterClient};
use crate::error::ValidationError;
use crate::phone::validate_phone;
use crate::score::{overall_confidence, status_after_validation};

/// Validates contact fields and rescores leads.
///
/// External services are optional. Without them, or when a call fails,
/// each field falls back to its offline check.
#[derive(Clone, Default)]
pub struct LeadValidator {
    email_verifier: Option<Arc<dyn EmailVerifier>>,
    business_enricher: Option<Arc<dyn BusinessEnricher>>,
}

impl LeadValidator {
    /// A validator with no external services.
    #[must_use]
    pub fn offline() -> Self {
        Self::default()
    }

    /// Wires Hunter.io and Clearbit when their keys are configured.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Http`] if an HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ValidationError> {
        let mut validator = Self::offline();
        if let Some(key) = config.hunter_api_key.as_deref() {
            validator = validator.with_email_verifier(Arc::new(HunterClient::new(key)?));
        }
        if let Some(key) = config.clearbit_api_key.as_deref() {
            validator = validator.with_business_enricher(Arc::new(ClearbitClient::new(key)?));
        }
        Ok(validator)
    }

    #[must_use]
    pub fn with_email_verifier(mut self, verifier: Arc<dyn EmailVerifier>) -> Self {
        self.email_verifier = Some(verifier);
        self
    }

    #[must_use]
    pub fn with_business_enricher(mut self, enricher: Arc<dyn BusinessEnricher>) -> Self {
        self.business_enricher = Some(enricher);
        self
    }

    #[must_use]
    pub fn has_email_verifier(&self) -> bool {
        self.email_verifier.is_some()
    }

    #[must_use]
    pub fn has_business_enricher(&self) -> bool {
        self.business_enricher.is_some()
    }

    pub async fn validate_email(&self, email: &str) -> EmailValidation {
        let email = email.trim();
        if !is_well_formed(email) {
            return EmailValidation::rejected();
        }
        let Some(verifier) = &self.email_verifier else {
            return heuristic_email(email);
        };
        match verifier.verify(email).await {
            Ok(verification) => verification.into(),
            Err(e) => {
                tracing::warn!(error = %e, "email verification failed, using heuristic");
                heuristic_email(email)
            }
        }
    }

    #[must_use]
    pub fn validate_phone(&self, phone: &str) -> PhoneValidation {
        validate_phone(phone)
    }

    pub async fn enrich_business(&self, name: &str, website: Option<&str>) -> BusinessValidation {
        let name = name.trim();
        let Some(enricher) = &self.business_enricher else {
            return BusinessValidation::unverified();
        };
        if name.is_empty() {
            return BusinessValidation::unverified();
        }

        let domain = website.and_then(extract_domain);
        match enricher.enrich(name, domain.as_deref()).await {
            Ok(Some(profile)) => profile.into_validation(chrono::Utc::now().year()),
            Ok(None) => BusinessValidation::unverified(),
            Err(e) => {
                tracing::warn!(business = %name, error = %e, "business enrichment failed");
                BusinessValidation::unverified()
            }
        }
    }

    /// Validates every present contact field, then recomputes confidence
    /// and status.
    pub async fn validate_lead(&self, mut lead: Lead) -> Lead {
        let email_check = async {
            match lead.email.as_deref().filter(|e| !e.trim().is_empty()) {
                Some(email) => Some(self.validate_email(email).await),
                None => None,
            }
        };
        let business_check = self.enrich_business(&lead.business_name, lead.website.as_deref());
        let (email, business) = tokio::join!(email_check, business_check);

        let phone = lead
            .phone
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(validate_phone);

        let validation = ValidationStatus {
            email,
            phone,
            business: Some(business),
        };

        lead.confidence = overall_confidence(&lead, &validation);
        lead.status = status_after_validation(lead.status, lead.confidence);
        lead.validation_status = Some(validation);
        lead.touch();

        tracing::debug!(
            lead_id = %lead.id,
            confidence = lead.confidence,
            status = %lead.status,
            "lead validated"
        );
        lead
    }
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
