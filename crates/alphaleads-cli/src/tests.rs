use alphaleads_pipeline::{summarize, PipelineResult, NO_LEADS_MESSAGE};

use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["alphaleads-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_generate_with_defaults() {
    let cli = Cli::try_parse_from(["alphaleads-cli", "generate", "--industry", "real-estate"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Generate {
            industry: Industry::RealEstate,
            city: None,
            limit: 50,
            format: OutputFormat::Json,
            no_validate: false,
            save: false,
            ..
        })
    ));
}

#[test]
fn parses_generate_with_every_option() {
    let cli = Cli::try_parse_from([
        "alphaleads-cli",
        "generate",
        "--industry",
        "legal",
        "--city",
        "Austin",
        "--state",
        "TX",
        "--country",
        "usa",
        "--business-type",
        "family law",
        "--limit",
        "10",
        "--format",
        "csv",
        "--no-validate",
    ])
    .expect("expected valid cli args");

    let Some(Commands::Generate {
        industry,
        city,
        state,
        business_type,
        limit,
        format,
        no_validate,
        ..
    }) = cli.command
    else {
        panic!("expected generate command");
    };
    assert_eq!(industry, Industry::Legal);
    assert_eq!(city.as_deref(), Some("Austin"));
    assert_eq!(state.as_deref(), Some("TX"));
    assert_eq!(business_type.as_deref(), Some("family law"));
    assert_eq!(limit, 10);
    assert_eq!(format, OutputFormat::Csv);
    assert!(no_validate);
}

#[test]
fn generate_rejects_unknown_industry() {
    assert!(Cli::try_parse_from(["alphaleads-cli", "generate", "--industry", "mining"]).is_err());
}

#[test]
fn generate_requires_industry() {
    assert!(Cli::try_parse_from(["alphaleads-cli", "generate"]).is_err());
}

#[test]
fn parses_validate_commands() {
    let cli = Cli::try_parse_from(["alphaleads-cli", "validate-email", "a@b.co"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::ValidateEmail { ref email }) if email == "a@b.co"));

    let cli = Cli::try_parse_from(["alphaleads-cli", "validate-phone", "512-555-0100"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::ValidatePhone { .. })));

    let cli = Cli::try_parse_from(["alphaleads-cli", "sources"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Sources)));
}

fn empty_result() -> PipelineResult {
    PipelineResult {
        success: true,
        total: 0,
        leads: Vec::new(),
        sources: summarize(&[], 2),
        timestamp: chrono::Utc::now(),
        message: Some(NO_LEADS_MESSAGE.to_string()),
        error: None,
    }
}

#[test]
fn renders_json_and_csv() {
    let result = empty_result();

    let json = generate::render(&result, OutputFormat::Json).expect("json");
    let parsed: serde_json::Value = serde_json::from_str(&json).expect("parse");
    assert_eq!(parsed["message"], NO_LEADS_MESSAGE);
    assert_eq!(parsed["sources"]["totalEnabledProviders"], 2);

    let csv = generate::render(&result, OutputFormat::Csv).expect("csv");
    assert!(csv.starts_with("Business Name,Contact Name,Phone"));
    assert_eq!(csv.lines().count(), 1);
}
