use clap::Args;
use organ_match::config::AppConfig;
use organ_match::error::AppError;
use organ_match::matching::compatibility::{compatibility_score, compatible_recipient_types};
use organ_match::matching::eligibility::{validate_donor, DonorScreening};
use organ_match::matching::{BloodType, DonationMode};

use crate::infra::split_organs;

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Donation mode: LIVING or DECEASED
    #[arg(long)]
    pub(crate) mode: String,
    /// Proposed organs, comma or semicolon separated
    #[arg(long)]
    pub(crate) organs: String,
    /// Donor age in years
    #[arg(long)]
    pub(crate) age: u8,
    /// Reference to an uploaded consent form, if any
    #[arg(long)]
    pub(crate) consent_form: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct CompatibilityArgs {
    /// Limit the table to one donor blood group
    #[arg(long)]
    pub(crate) donor: Option<String>,
}

pub(crate) fn run_validate(args: ValidateArgs, config: &AppConfig) -> Result<(), AppError> {
    let mode: DonationMode = args
        .mode
        .parse()
        .map_err(|err| AppError::Usage(format!("{err}")))?;
    let organs = split_organs(&args.organs);

    let result = validate_donor(
        &config.eligibility,
        &DonorScreening {
            donation_mode: mode,
            organs: organs.as_slice(),
            age: args.age,
            consent_on_file: args
                .consent_form
                .as_deref()
                .is_some_and(|form| !form.trim().is_empty()),
        },
    );

    println!(
        "{} donor offering [{}]: {}",
        mode.label(),
        organs.join(", "),
        if result.is_valid() { "ELIGIBLE" } else { "NOT ELIGIBLE" }
    );
    for error in &result.errors {
        println!("  error: {error}");
    }
    for warning in &result.warnings {
        println!("  warning: {warning}");
    }

    Ok(())
}

pub(crate) fn run_compatibility(args: CompatibilityArgs) -> Result<(), AppError> {
    let donors = match args.donor {
        Some(label) => vec![label
            .parse::<BloodType>()
            .map_err(|err| AppError::Usage(format!("{err}")))?],
        None => BloodType::ordered().to_vec(),
    };

    print!("{:<6}", "donor");
    for recipient in BloodType::ordered() {
        print!("{:>5}", recipient.label());
    }
    println!();

    for donor in donors {
        print!("{:<6}", donor.label());
        for recipient in BloodType::ordered() {
            print!("{:>5}", compatibility_score(donor, recipient));
        }
        println!(
            "   gives to {}",
            compatible_recipient_types(donor)
                .iter()
                .map(|recipient| recipient.label())
                .collect::<Vec<_>>()
                .join(" ")
        );
    }

    Ok(())
}
