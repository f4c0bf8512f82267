use crate::checks::{run_compatibility, run_validate, CompatibilityArgs, ValidateArgs};
use crate::demo::{run_demo, DemoArgs};
use crate::registry::{run_generate, GenerateArgs};
use clap::{Parser, Subcommand};
use organ_match::config::AppConfig;
use organ_match::error::AppError;
use organ_match::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "matchctl",
    about = "Screen donors, generate ranked organ matches and record transplant decisions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a synthetic end-to-end matching scenario (default command)
    Demo(DemoArgs),
    /// Import registry CSV exports and generate ranked matches
    Generate(GenerateArgs),
    /// Check a proposed donor organ set against the eligibility rules
    Validate(ValidateArgs),
    /// Print the donor/recipient blood-group compatibility table
    Compatibility(CompatibilityArgs),
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let command = cli
        .command
        .unwrap_or_else(|| Command::Demo(DemoArgs::default()));

    match command {
        Command::Demo(args) => run_demo(args, &config),
        Command::Generate(args) => run_generate(args, &config).await,
        Command::Validate(args) => run_validate(args, &config),
        Command::Compatibility(args) => run_compatibility(args),
    }
}
