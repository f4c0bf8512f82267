use super::common::*;
use crate::matching::domain::{
    BloodType, DonationMode, DonorId, DonorStatus, HospitalId, OrganType, RecipientId,
    UrgencyTier,
};
use crate::matching::record::{ActorId, MatchStatus};
use crate::matching::repository::{DonorFilter, RecipientFilter};
use crate::matching::MatchingError;

#[test]
fn register_donor_rejects_invalid_organ_sets() {
    let (repository, service) = build_service();

    match service.register_donor(donor_registration(
        "d-1",
        BloodType::APositive,
        DonationMode::Living,
        &["KIDNEY", "LIVER"],
    )) {
        Err(MatchingError::ValidationFailed(result)) => {
            assert_eq!(result.errors.len(), 1);
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert!(service
        .list_donors(&DonorFilter::default())
        .expect("list")
        .is_empty());
    assert_eq!(repository.match_count(), 0);
}

#[test]
fn register_donor_enforces_living_age_band() {
    let (_, service) = build_service();

    let mut minor = donor_registration(
        "d-1",
        BloodType::APositive,
        DonationMode::Living,
        &["KIDNEY"],
    );
    minor.age = 16;
    assert!(matches!(
        service.register_donor(minor),
        Err(MatchingError::ValidationFailed(_))
    ));

    let mut senior =
        donor_registration("d-2", BloodType::APositive, DonationMode::Living, &["KIDNEY"]);
    senior.age = 68;
    senior.consent_form = None;
    let registered = service.register_donor(senior).expect("senior registers");
    assert_eq!(registered.warnings.len(), 2);
    assert_eq!(registered.donor.status, DonorStatus::Registered);
    assert!(registered.donor.offers(OrganType::Kidney));
}

#[test]
fn duplicate_registrations_are_reported() {
    let (_, service) = build_service();
    let donor = donor_registration("d-1", BloodType::OPositive, DonationMode::Deceased, &["HEART"]);
    service.register_donor(donor.clone()).expect("first registers");

    match service.register_donor(donor) {
        Err(MatchingError::DuplicateRecord { entity: "donor", id }) => assert_eq!(id, "d-1"),
        other => panic!("expected duplicate, got {other:?}"),
    }

    let recipient =
        recipient_registration("r-1", BloodType::OPositive, OrganType::Heart, UrgencyTier::High, 3);
    service
        .register_recipient(recipient.clone())
        .expect("first registers");
    assert!(matches!(
        service.register_recipient(recipient),
        Err(MatchingError::DuplicateRecord {
            entity: "recipient",
            ..
        })
    ));
}

#[test]
fn get_propagates_not_found() {
    let (_, service) = build_service();

    match service.get_donor(&DonorId("missing".to_string())) {
        Err(MatchingError::NotFound { entity: "donor", .. }) => {}
        other => panic!("expected not found, got {other:?}"),
    }
    match service.get_recipient(&RecipientId("missing".to_string())) {
        Err(MatchingError::NotFound {
            entity: "recipient",
            ..
        }) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn filters_are_anded() {
    let (_, service) = build_service();
    register_donor(
        &service,
        donor_registration("d-1", BloodType::OPositive, DonationMode::Deceased, &["HEART"]),
    );
    register_donor(
        &service,
        donor_registration("d-2", BloodType::OPositive, DonationMode::Living, &["KIDNEY"]),
    );
    let mut elsewhere =
        donor_registration("d-3", BloodType::OPositive, DonationMode::Living, &["KIDNEY"]);
    elsewhere.consulting_hospital = HospitalId("aiims".to_string());
    register_donor(&service, elsewhere);

    let living_at_ruby_hall = service
        .list_donors(&DonorFilter {
            blood_type: Some(BloodType::OPositive),
            donation_mode: Some(DonationMode::Living),
            hospital: Some(HospitalId("ruby-hall".to_string())),
            ..DonorFilter::default()
        })
        .expect("list");
    assert_eq!(living_at_ruby_hall.len(), 1);
    assert_eq!(living_at_ruby_hall[0].id, DonorId("d-2".to_string()));

    register_recipient(
        &service,
        recipient_registration(
            "r-1",
            BloodType::BNegative,
            OrganType::Liver,
            UrgencyTier::Critical,
            1,
        ),
    );
    register_recipient(
        &service,
        recipient_registration("r-2", BloodType::BNegative, OrganType::Liver, UrgencyTier::Low, 1),
    );
    let critical = service
        .list_recipients(&RecipientFilter {
            organ_needed: Some(OrganType::Liver),
            urgency: Some(UrgencyTier::Critical),
            ..RecipientFilter::default()
        })
        .expect("list");
    assert_eq!(critical.len(), 1);
    assert_eq!(critical[0].id, RecipientId("r-1".to_string()));
}

#[test]
fn match_queries_rank_by_score() {
    let (_, service) = build_service();
    register_donor(
        &service,
        donor_registration("d-1", BloodType::ONegative, DonationMode::Deceased, &["KIDNEY"]),
    );
    register_recipient(
        &service,
        recipient_registration(
            "r-low",
            BloodType::ONegative,
            OrganType::Kidney,
            UrgencyTier::Low,
            5,
        ),
    );
    register_recipient(
        &service,
        recipient_registration(
            "r-high",
            BloodType::ONegative,
            OrganType::Kidney,
            UrgencyTier::Critical,
            5,
        ),
    );
    let donor_id = DonorId("d-1".to_string());
    let report = service
        .generate_matches_for_donor(&donor_id)
        .expect("generation succeeds");

    let for_donor = service.find_matches_for_donor(&donor_id).expect("query");
    assert_eq!(for_donor[0].recipient_id, RecipientId("r-high".to_string()));
    assert!(for_donor[0].score.total > for_donor[1].score.total);

    service
        .reject_match(
            &match_for(&report.matches, "r-low").id,
            &ActorId("surgeon".to_string()),
            None,
        )
        .expect("reject succeeds");

    let for_donor = service.find_matches_for_donor(&donor_id).expect("query");
    assert_eq!(for_donor.len(), 2);
    assert!(for_donor
        .iter()
        .any(|record| record.status == MatchStatus::Rejected));

    let pending_for_low = service
        .find_matches_for_recipient(&RecipientId("r-low".to_string()))
        .expect("query");
    assert!(pending_for_low.is_empty());
    let pending_for_high = service
        .find_matches_for_recipient(&RecipientId("r-high".to_string()))
        .expect("query");
    assert_eq!(pending_for_high.len(), 1);
}

#[test]
fn organ_demand_report_tracks_supply_and_shortages() {
    let (_, service) = build_service();
    register_donor(
        &service,
        donor_registration(
            "d-1",
            BloodType::ONegative,
            DonationMode::Deceased,
            &["KIDNEY", "CORNEA"],
        ),
    );
    for id in ["r-1", "r-2"] {
        register_recipient(
            &service,
            recipient_registration(
                id,
                BloodType::ONegative,
                OrganType::Kidney,
                UrgencyTier::High,
                10,
            ),
        );
    }
    let report = service
        .generate_matches_for_donor(&DonorId("d-1".to_string()))
        .expect("generation succeeds");
    service
        .accept_match(&match_for(&report.matches, "r-1").id, &ActorId("surgeon".to_string()))
        .expect("accept succeeds");

    let demand = service.organ_demand_report().expect("report");
    let kidney = demand.by_organ[&OrganType::Kidney];
    assert_eq!(kidney.donors_offering, 1);
    assert_eq!(kidney.recipients_waiting, 1);
    assert_eq!(kidney.transplants_accepted, 1);
    assert_eq!(demand.by_organ[&OrganType::Cornea].recipients_waiting, 0);
    assert!(demand.shortages().is_empty());
}

#[test]
fn pure_operations_do_not_persist() {
    let (repository, service) = build_service();
    let donor = register_donor(
        &service,
        donor_registration("d-1", BloodType::BNegative, DonationMode::Living, &["KIDNEY"]),
    );
    let recipient = register_recipient(
        &service,
        recipient_registration(
            "r-1",
            BloodType::AbPositive,
            OrganType::Kidney,
            UrgencyTier::Medium,
            100,
        ),
    );

    let breakdown = service.score(&donor, &recipient);
    assert_eq!(breakdown.total, 15 + 14 + 20 + 15);
    assert_eq!(repository.match_count(), 0);

    assert!(service
        .validate_organs(DonationMode::Living, &["kidney"])
        .is_valid());
    assert_eq!(service.policy().minimum_living_donor_age, 18);
}
