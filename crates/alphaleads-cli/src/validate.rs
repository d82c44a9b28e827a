use alphaleads_core::AppConfig;
use alphaleads_validation::LeadValidator;

/// # Errors
///
/// Returns an error if the validation HTTP clients cannot be built.
pub(crate) async fn run_validate_email(config: &AppConfig, email: &str) -> anyhow::Result<()> {
    let validator = LeadValidator::from_config(config)?;
    if !validator.has_email_verifier() {
        tracing::info!("HUNTER_IO_API_KEY not set; using offline email checks");
    }
    let result = validator.validate_email(email).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// # Errors
///
/// Returns an error only if the result cannot be serialized.
pub(crate) fn run_validate_phone(phone: &str) -> anyhow::Result<()> {
    let result = LeadValidator::offline().validate_phone(phone);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
