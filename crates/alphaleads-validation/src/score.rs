use alphaleads_core::{EmailRisk, Lead, LeadStatus, PhoneType, ValidationStatus};

/// Leads scoring above this are promoted to [`LeadStatus::Validated`].
pub const VALIDATED_THRESHOLD: u8 = 70;

/// Post-validation confidence.
///
/// Base 30; email valid +20, deliverable +15, low risk +10; phone valid +15
/// (+5 mobile); business verified +20; website +10; street +10; rating
/// above 4.0 +5. Capped at 100.
#[must_use]
pub fn overall_confidence(lead: &Lead, validation: &ValidationStatus) -> u8 {
    let mut score: u32 = 30;

    if let Some(email) = &validation.email {
        if email.valid {
            score += 20;
        }
        if email.deliverable {
            score += 15;
        }
        if email.risk == EmailRisk::Low {
            score += 10;
        }
    }

    if let Some(phone) = validation.phone.as_ref().filter(|p| p.valid) {
        score += 15;
        if phone.phone_type == Some(PhoneType::Mobile) {
            score += 5;
        }
    }

    if validation.business.as_ref().is_some_and(|b| b.verified) {
        score += 20;
    }

    if lead.has_website() {
        score += 10;
    }
    if lead.address.has_street() {
        score += 10;
    }
    if lead.business_details.rating.is_some_and(|r| r > 4.0) {
        score += 5;
    }

    u8::try_from(score.min(100)).unwrap_or(100)
}

/// Status after validation. Only `new` and `validated` leads move; later
/// pipeline stages set by callers are kept.
#[must_use]
pub fn status_after_validation(current: LeadStatus, confidence: u8) -> LeadStatus {
    match current {
        LeadStatus::New | LeadStatus::Validated => {
            if confidence > VALIDATED_THRESHOLD {
                LeadStatus::Validated
            } else {
                LeadStatus::New
            }
        }
        other => other,
    }
}
