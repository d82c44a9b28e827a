mod generate;
mod validate;

use alphaleads_core::Industry;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "alphaleads-cli")]
#[command(about = "AlphaLeads lead generation command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect, dedupe, score and validate leads from every enabled source.
    Generate {
        #[arg(long)]
        industry: Industry,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        country: Option<String>,
        /// Free-form place; overrides --city/--state.
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        business_type: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Skip the validation stage and keep provider confidence scores.
        #[arg(long)]
        no_validate: bool,
        /// Persist the results to the database in DATABASE_URL.
        #[arg(long)]
        save: bool,
    },
    /// Check an email address.
    ValidateEmail { email: String },
    /// Parse and classify a North American phone number.
    ValidatePhone { phone: String },
    /// Show which providers and validation services are configured.
    Sources,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = alphaleads_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // stdout carries command output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Generate {
            industry,
            city,
            state,
            country,
            location,
            business_type,
            limit,
            format,
            no_validate,
            save,
        }) => {
            let criteria = alphaleads_core::SearchCriteria {
                industry,
                location,
                city,
                state,
                country,
                business_type,
                limit,
            };
            let options = generate::GenerateOptions {
                format,
                validate: !no_validate,
                save,
            };
            generate::run_generate(&config, &criteria, options).await?;
        }
        Some(Commands::ValidateEmail { email }) => {
            validate::run_validate_email(&config, &email).await?;
        }
        Some(Commands::ValidatePhone { phone }) => validate::run_validate_phone(&phone)?,
        Some(Commands::Sources) => generate::print_sources(&config),
        None => println!("alphaleads-cli: run with --help to list commands"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
