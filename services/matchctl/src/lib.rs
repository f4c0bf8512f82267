mod checks;
mod cli;
mod demo;
mod infra;
mod registry;

use organ_match::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
