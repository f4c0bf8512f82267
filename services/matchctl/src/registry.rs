use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use organ_match::config::AppConfig;
use organ_match::error::AppError;
use organ_match::matching::{
    DonorFilter, DonorId, GenerationReport, MatchStats, MatchingError, RegistryImporter,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::infra::{build_service, evaluation_instant, require_path, Service};

#[derive(Args, Debug)]
pub(crate) struct GenerateArgs {
    /// Donor registry CSV export (defaults to MATCHING_DONORS_CSV)
    #[arg(long)]
    pub(crate) donors: Option<PathBuf>,
    /// Recipient registry CSV export (defaults to MATCHING_RECIPIENTS_CSV)
    #[arg(long)]
    pub(crate) recipients: Option<PathBuf>,
    /// Only generate matches for this donor id
    #[arg(long)]
    pub(crate) donor: Option<String>,
    /// Evaluation date for waiting-time scoring (YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Number of ranked matches printed per donor
    #[arg(long, default_value_t = 5)]
    pub(crate) top: usize,
    /// Emit the full result as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Serialize)]
struct ScreenedOut {
    donor_id: DonorId,
    errors: Vec<String>,
}

#[derive(Debug, Serialize)]
struct GenerateSummary {
    evaluated_at: DateTime<Utc>,
    screened_out: Vec<ScreenedOut>,
    reports: Vec<GenerationReport>,
    stats: MatchStats,
}

pub(crate) async fn run_generate(args: GenerateArgs, config: &AppConfig) -> Result<(), AppError> {
    let GenerateArgs {
        donors,
        recipients,
        donor,
        as_of,
        top,
        json,
    } = args;

    let donors_path = require_path(
        donors,
        config.intake.donors_csv.as_ref(),
        "donors",
        "MATCHING_DONORS_CSV",
    )?;
    let recipients_path = require_path(
        recipients,
        config.intake.recipients_csv.as_ref(),
        "recipients",
        "MATCHING_RECIPIENTS_CSV",
    )?;

    let evaluated_at = evaluation_instant(as_of);
    let service = build_service(config.eligibility, evaluated_at);

    let screened_out =
        register_donors(&service, RegistryImporter::donors_from_path(&donors_path)?)?;
    let recipient_count = register_recipients(
        &service,
        RegistryImporter::recipients_from_path(&recipients_path)?,
    )?;
    info!(
        donors = %donors_path.display(),
        recipients = recipient_count,
        screened_out = screened_out.len(),
        "registry loaded"
    );

    let donor_ids = match donor {
        Some(id) => vec![DonorId(id)],
        None => service
            .list_donors(&DonorFilter::default())?
            .into_iter()
            .map(|donor| donor.id)
            .collect(),
    };

    let reports = generate_all(&service, donor_ids).await?;
    let stats = service.get_match_stats()?;
    let summary = GenerateSummary {
        evaluated_at,
        screened_out,
        reports,
        stats,
    };

    if json {
        let rendered = serde_json::to_string_pretty(&summary)
            .map_err(|err| AppError::Runtime(format!("failed to render JSON: {err}")))?;
        println!("{rendered}");
    } else {
        render_summary(&summary, top);
    }

    Ok(())
}

fn register_donors(
    service: &Service,
    registrations: Vec<organ_match::matching::DonorRegistration>,
) -> Result<Vec<ScreenedOut>, AppError> {
    let mut screened_out = Vec::new();

    for registration in registrations {
        let donor_id = registration.id.clone();
        match service.register_donor(registration) {
            Ok(registered) => {
                for warning in &registered.warnings {
                    warn!(donor = %donor_id, "{warning}");
                }
            }
            Err(MatchingError::ValidationFailed(result)) => {
                warn!(donor = %donor_id, reason = %result, "donor failed eligibility screening");
                screened_out.push(ScreenedOut {
                    donor_id,
                    errors: result.errors,
                });
            }
            Err(other) => return Err(other.into()),
        }
    }

    Ok(screened_out)
}

fn register_recipients(
    service: &Service,
    registrations: Vec<organ_match::matching::RecipientRegistration>,
) -> Result<usize, AppError> {
    let count = registrations.len();
    for registration in registrations {
        service.register_recipient(registration)?;
    }
    Ok(count)
}

/// Runs one generation per donor on the blocking pool. Pairing uniqueness is enforced by the
/// repository, so donors sharing recipients can run side by side.
async fn generate_all(
    service: &std::sync::Arc<Service>,
    donor_ids: Vec<DonorId>,
) -> Result<Vec<GenerationReport>, AppError> {
    let handles: Vec<_> = donor_ids
        .into_iter()
        .map(|donor_id| {
            let service = std::sync::Arc::clone(service);
            tokio::task::spawn_blocking(move || service.generate_matches_for_donor(&donor_id))
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        let report = handle
            .await
            .map_err(|err| AppError::Runtime(format!("generation task failed: {err}")))??;
        reports.push(report);
    }

    reports.sort_by(|left, right| left.donor_id.cmp(&right.donor_id));
    Ok(reports)
}

fn render_summary(summary: &GenerateSummary, top: usize) {
    println!("Match generation as of {}", summary.evaluated_at.format("%Y-%m-%d"));

    if !summary.screened_out.is_empty() {
        println!("\nDonors held back by eligibility screening");
        for held in &summary.screened_out {
            println!("- {}: {}", held.donor_id, held.errors.join("; "));
        }
    }

    for report in &summary.reports {
        println!(
            "\nDonor {} | created {} | already matched {} | blood-incompatible {}",
            report.donor_id, report.created, report.duplicates_ignored, report.incompatible_skipped
        );
        if report.matches.is_empty() {
            println!("  (no compatible waiting recipients)");
        }
        for record in report.matches.iter().take(top) {
            println!(
                "  {:>3} {:<10} recipient {:<12} tissue {:>2} urgency {:>2} proximity {:>2} wait {:>2} [{}]",
                record.score.total,
                record.organ.label(),
                record.recipient_id.0,
                record.score.tissue_match,
                record.score.urgency,
                record.score.proximity,
                record.score.waiting_time,
                record.status,
            );
        }
        for failure in &report.failures {
            println!(
                "  ! {} for {} not stored: {}",
                failure.organ, failure.recipient_id, failure.reason
            );
        }
    }

    let stats = &summary.stats;
    println!(
        "\nTotals: {} matches ({} pending, {} accepted, {} rejected, {} expired)",
        stats.total, stats.pending, stats.accepted, stats.rejected, stats.expired
    );
}
