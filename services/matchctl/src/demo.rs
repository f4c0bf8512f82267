use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::Args;
use organ_match::config::AppConfig;
use organ_match::error::AppError;
use organ_match::matching::{
    ActorId, BloodType, DonationMode, DonorId, DonorRegistration, HospitalId, Location,
    MatchingError, OrganType, RecipientId, RecipientRegistration, UrgencyTier,
};

use crate::infra::{build_service, evaluation_instant, today, Service};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date for the scenario (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Skip recording accept/reject decisions after generation.
    #[arg(long)]
    pub(crate) skip_decisions: bool,
}

pub(crate) fn run_demo(args: DemoArgs, config: &AppConfig) -> Result<(), AppError> {
    let DemoArgs {
        as_of,
        skip_decisions,
    } = args;

    let as_of = as_of.unwrap_or_else(today);
    let now = evaluation_instant(Some(as_of));
    let service = build_service(config.eligibility, now);

    println!("Organ matching demo as of {as_of}");
    println!("\nDonor intake");
    for registration in synthetic_donors() {
        let id = registration.id.clone();
        match service.register_donor(registration) {
            Ok(registered) if registered.warnings.is_empty() => println!("- {id}: registered"),
            Ok(registered) => println!(
                "- {id}: registered with warnings ({})",
                registered.warnings.join(" ")
            ),
            Err(MatchingError::ValidationFailed(result)) => {
                println!("- {id}: held back ({result})")
            }
            Err(other) => return Err(other.into()),
        }
    }
    for registration in synthetic_recipients(now) {
        service.register_recipient(registration)?;
    }

    let living_donor = DonorId("DN-LIV-01".to_string());
    let deceased_donor = DonorId("DN-DEC-07".to_string());

    for donor_id in [&living_donor, &deceased_donor] {
        let report = service.generate_matches_for_donor(donor_id)?;
        println!(
            "\nRanked matches for {} ({} new, {} blood-incompatible skipped)",
            donor_id, report.created, report.incompatible_skipped
        );
        for record in &report.matches {
            println!(
                "  {:>3}  {:<11} -> {:<9} tissue {:>2} urgency {:>2} proximity {:>2} wait {:>2}",
                record.score.total,
                record.organ.label(),
                record.recipient_id.0,
                record.score.tissue_match,
                record.score.urgency,
                record.score.proximity,
                record.score.waiting_time,
            );
        }
    }

    if !skip_decisions {
        record_decisions(&service, &living_donor, &deceased_donor)?;
    }

    let stats = service.get_match_stats()?;
    println!(
        "\nMatch stats: {} total | {} pending | {} accepted | {} rejected | {} expired | acceptance {:.0}%",
        stats.total,
        stats.pending,
        stats.accepted,
        stats.rejected,
        stats.expired,
        stats.acceptance_rate() * 100.0
    );

    let demand = service.organ_demand_report()?;
    println!("\nOrgan supply and demand");
    for (organ, entry) in &demand.by_organ {
        println!(
            "  {:<11} offered {:>2} | waiting {:>2} | accepted {:>2}",
            organ.label(),
            entry.donors_offering,
            entry.recipients_waiting,
            entry.transplants_accepted
        );
    }
    for (organ, gap) in demand.shortages() {
        println!("  shortage: {} needs {} more donor(s)", organ.label(), gap);
    }

    Ok(())
}

fn record_decisions(
    service: &Service,
    living_donor: &DonorId,
    deceased_donor: &DonorId,
) -> Result<(), AppError> {
    let coordinator = ActorId("ruby-hall-coordinator".to_string());

    if let Some(best) = service.find_matches_for_donor(living_donor)?.first() {
        let outcome = service.accept_match(&best.id, &coordinator)?;
        println!(
            "\nAccepted {} -> {}; {} competing offer(s) expired",
            outcome.accepted.donor_id,
            outcome.accepted.recipient_id,
            outcome.expired.len()
        );
        let donor = service.get_donor(living_donor)?;
        let recipient = service.get_recipient(&outcome.accepted.recipient_id)?;
        println!(
            "Donor {} is now {}, recipient {} is now {}",
            donor.id,
            donor.status.label(),
            recipient.id,
            recipient.status.label()
        );
    }

    let cornea_offers: Vec<_> = service
        .find_matches_for_donor(deceased_donor)?
        .into_iter()
        .filter(|record| record.organ == OrganType::Cornea)
        .collect();
    if let Some(declined) = cornea_offers.last() {
        let record = service.reject_match(
            &declined.id,
            &coordinator,
            Some("recipient unreachable for surgery window".to_string()),
        )?;
        println!(
            "Rejected {} -> {} ({})",
            record.donor_id,
            record.recipient_id,
            record.rejection_reason().unwrap_or("no reason given")
        );
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn donor(
    id: &str,
    name: &str,
    age: u8,
    blood_type: BloodType,
    donation_mode: DonationMode,
    organs: &[&str],
    location: Location,
    consent: bool,
) -> DonorRegistration {
    DonorRegistration {
        id: DonorId(id.to_string()),
        name: name.to_string(),
        age,
        blood_type,
        donation_mode,
        organs: organs.iter().map(|organ| organ.to_string()).collect(),
        tissue_type: Some("HLA-A2/B44".to_string()),
        location,
        consulting_hospital: HospitalId("ruby-hall".to_string()),
        consent_form: consent.then(|| format!("consent/{id}.pdf")),
    }
}

fn synthetic_donors() -> Vec<DonorRegistration> {
    vec![
        donor(
            "DN-LIV-01",
            "Anil Kulkarni",
            38,
            BloodType::ONegative,
            DonationMode::Living,
            &["KIDNEY"],
            Location::new("Pune", "Maharashtra"),
            true,
        ),
        donor(
            "DN-DEC-07",
            "Sunita Patil",
            59,
            BloodType::APositive,
            DonationMode::Deceased,
            &["KIDNEY", "LIVER", "CORNEA"],
            Location::new("Mumbai", "Maharashtra"),
            false,
        ),
        donor(
            "DN-LIV-02",
            "Rohan Mehta",
            44,
            BloodType::BPositive,
            DonationMode::Living,
            &["KIDNEY", "LIVER"],
            Location::new("Nashik", "Maharashtra"),
            true,
        ),
    ]
}

fn recipient(
    id: &str,
    blood_type: BloodType,
    organ_needed: OrganType,
    urgency: UrgencyTier,
    waiting_since: DateTime<Utc>,
    tissue_type: Option<&str>,
    location: Location,
) -> RecipientRegistration {
    RecipientRegistration {
        id: RecipientId(id.to_string()),
        name: format!("Patient {id}"),
        age: 50,
        blood_type,
        organ_needed,
        urgency,
        waiting_since,
        tissue_type: tissue_type.map(str::to_string),
        location,
        hospital: HospitalId("kem".to_string()),
    }
}

fn synthetic_recipients(now: DateTime<Utc>) -> Vec<RecipientRegistration> {
    let pune = || Location::new("Pune", "Maharashtra");
    let mumbai = || Location::new("Mumbai", "Maharashtra");
    let bengaluru = || Location::new("Bengaluru", "Karnataka");

    vec![
        recipient(
            "RC-101",
            BloodType::ONegative,
            OrganType::Kidney,
            UrgencyTier::Critical,
            now - Duration::days(200),
            None,
            pune(),
        ),
        recipient(
            "RC-102",
            BloodType::AbPositive,
            OrganType::Kidney,
            UrgencyTier::High,
            now - Duration::days(95),
            Some("HLA-A2/B44"),
            mumbai(),
        ),
        recipient(
            "RC-103",
            BloodType::APositive,
            OrganType::Kidney,
            UrgencyTier::Medium,
            now - Duration::days(20),
            None,
            bengaluru(),
        ),
        recipient(
            "RC-104",
            BloodType::ANegative,
            OrganType::Liver,
            UrgencyTier::Critical,
            now - Duration::days(400),
            None,
            mumbai(),
        ),
        recipient(
            "RC-105",
            BloodType::AbNegative,
            OrganType::Liver,
            UrgencyTier::High,
            now - Duration::days(45),
            Some("HLA-B7"),
            pune(),
        ),
        recipient(
            "RC-106",
            BloodType::APositive,
            OrganType::Cornea,
            UrgencyTier::Low,
            now - Duration::days(600),
            None,
            mumbai(),
        ),
        recipient(
            "RC-107",
            BloodType::AbPositive,
            OrganType::Cornea,
            UrgencyTier::Medium,
            now - Duration::days(10),
            None,
            bengaluru(),
        ),
        recipient(
            "RC-108",
            BloodType::OPositive,
            OrganType::Heart,
            UrgencyTier::Critical,
            now - Duration::days(30),
            None,
            pune(),
        ),
    ]
}
