use super::common::*;
use crate::matching::domain::{
    BloodType, DonationMode, DonorId, DonorStatus, OrganType, RecipientId, RecipientStatus,
    UrgencyTier,
};
use crate::matching::record::{ActorId, MatchId, MatchStatus, NewMatch};
use crate::matching::repository::MatchRepository;
use crate::matching::scoring::ScoreBreakdown;
use crate::matching::{InMemoryMatchRepository, MatchRecord, MatchingError, MatchingService};
use std::sync::Arc;

fn coordinator() -> ActorId {
    ActorId("coordinator-7".to_string())
}

fn seed_competing_kidney_matches() -> (
    Arc<InMemoryMatchRepository>,
    MatchingService<InMemoryMatchRepository>,
    Vec<MatchRecord>,
) {
    let (repository, service) = build_service();
    register_donor(
        &service,
        donor_registration(
            "donor-x",
            BloodType::ONegative,
            DonationMode::Deceased,
            &["KIDNEY", "LIVER"],
        ),
    );
    register_recipient(
        &service,
        recipient_registration(
            "r-a",
            BloodType::ONegative,
            OrganType::Kidney,
            UrgencyTier::Critical,
            300,
        ),
    );
    register_recipient(
        &service,
        recipient_registration(
            "r-b",
            BloodType::APositive,
            OrganType::Kidney,
            UrgencyTier::Medium,
            12,
        ),
    );
    register_recipient(
        &service,
        recipient_registration(
            "r-c",
            BloodType::BNegative,
            OrganType::Liver,
            UrgencyTier::High,
            90,
        ),
    );

    let report = service
        .generate_matches_for_donor(&DonorId("donor-x".to_string()))
        .expect("generation succeeds");
    assert_eq!(report.created, 3);
    (repository, service, report.matches)
}

#[test]
fn accept_cascades_to_parties_and_expires_competitors() {
    let (repository, service, matches) = seed_competing_kidney_matches();
    let chosen = match_for(&matches, "r-a");
    let competitor = match_for(&matches, "r-b");
    let other_organ = match_for(&matches, "r-c");

    let outcome = service
        .accept_match(&chosen.id, &coordinator())
        .expect("accept succeeds");

    assert_eq!(outcome.accepted.status, MatchStatus::Accepted);
    assert_eq!(outcome.expired, vec![competitor.id]);
    let decision = outcome.accepted.decision.expect("decision recorded");
    assert_eq!(decision.decided_by, coordinator());
    assert_eq!(decision.decided_at, now());

    let expired = repository
        .get_match(&competitor.id)
        .expect("read succeeds")
        .expect("competitor retained");
    assert_eq!(expired.status, MatchStatus::Expired);
    let expiry = expired.decision.expect("expiry recorded");
    assert_eq!(expiry.decided_by, ActorId::system());
    assert!(expiry
        .reason
        .as_deref()
        .is_some_and(|reason| reason.contains(&chosen.id.to_string())));

    let untouched = service
        .get_match(&other_organ.id)
        .expect("liver match retained");
    assert_eq!(untouched.status, MatchStatus::Pending);

    let donor = service
        .get_donor(&DonorId("donor-x".to_string()))
        .expect("donor present");
    assert_eq!(donor.status, DonorStatus::Matched);
    let winner = service
        .get_recipient(&RecipientId("r-a".to_string()))
        .expect("recipient present");
    assert_eq!(winner.status, RecipientStatus::Matched);
    let loser = service
        .get_recipient(&RecipientId("r-b".to_string()))
        .expect("recipient present");
    assert_eq!(loser.status, RecipientStatus::Waiting);
}

#[test]
fn deciding_a_decided_match_conflicts() {
    let (_, service, matches) = seed_competing_kidney_matches();
    let chosen = match_for(&matches, "r-a");
    let competitor = match_for(&matches, "r-b");
    service
        .accept_match(&chosen.id, &coordinator())
        .expect("accept succeeds");

    match service.accept_match(&chosen.id, &coordinator()) {
        Err(MatchingError::Conflict { match_id, status }) => {
            assert_eq!(match_id, chosen.id);
            assert_eq!(status, MatchStatus::Accepted);
        }
        other => panic!("expected conflict, got {other:?}"),
    }

    match service.accept_match(&competitor.id, &coordinator()) {
        Err(MatchingError::Conflict { status, .. }) => assert_eq!(status, MatchStatus::Expired),
        other => panic!("expected conflict, got {other:?}"),
    }

    match service.reject_match(&competitor.id, &coordinator(), None) {
        Err(MatchingError::Conflict { status, .. }) => assert_eq!(status, MatchStatus::Expired),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[test]
fn committed_organ_cannot_be_accepted_twice() {
    let (repository, service) = build_service();
    let donor_id = DonorId("d-live".to_string());
    register_donor(
        &service,
        donor_registration("d-live", BloodType::ONegative, DonationMode::Living, &["KIDNEY"]),
    );
    register_recipient(
        &service,
        recipient_registration(
            "r-1",
            BloodType::ONegative,
            OrganType::Kidney,
            UrgencyTier::High,
            60,
        ),
    );
    let first = service
        .generate_matches_for_donor(&donor_id)
        .expect("generation succeeds");
    let committed = match_for(&first.matches, "r-1");
    service
        .accept_match(&committed.id, &coordinator())
        .expect("accept succeeds");

    register_recipient(
        &service,
        recipient_registration(
            "r-2",
            BloodType::ONegative,
            OrganType::Kidney,
            UrgencyTier::Critical,
            400,
        ),
    );
    let second = service
        .generate_matches_for_donor(&donor_id)
        .expect("generation succeeds");
    assert_eq!(second.created, 0);
    assert!(second.matches.is_empty());

    let late = repository
        .insert_match_if_absent(NewMatch {
            donor_id: donor_id.clone(),
            recipient_id: RecipientId("r-2".to_string()),
            organ: OrganType::Kidney,
            score: ScoreBreakdown::default(),
            created_at: now(),
        })
        .expect("insert succeeds")
        .expect("new triple");

    match service.accept_match(&late.id, &coordinator()) {
        Err(MatchingError::Conflict { match_id, status }) => {
            assert_eq!(match_id, committed.id);
            assert_eq!(status, MatchStatus::Accepted);
        }
        other => panic!("expected conflict, got {other:?}"),
    }

    let accepted: Vec<_> = repository
        .list_matches_by_donor(&donor_id)
        .expect("read succeeds")
        .into_iter()
        .filter(|record| {
            record.organ == OrganType::Kidney && record.status == MatchStatus::Accepted
        })
        .collect();
    assert_eq!(accepted.len(), 1);
    assert_eq!(service.get_match(&late.id).expect("retained").status, MatchStatus::Pending);
    let waiting = service
        .get_recipient(&RecipientId("r-2".to_string()))
        .expect("recipient present");
    assert_eq!(waiting.status, RecipientStatus::Waiting);
}

#[test]
fn unknown_match_is_not_found() {
    let (_, service) = build_service();
    let missing = MatchId::new();

    match service.accept_match(&missing, &coordinator()) {
        Err(MatchingError::NotFound { entity: "match", id }) => {
            assert_eq!(id, missing.to_string())
        }
        other => panic!("expected not found, got {other:?}"),
    }
    assert!(matches!(
        service.get_match(&missing),
        Err(MatchingError::NotFound { entity: "match", .. })
    ));
    assert!(matches!(
        service.reject_match(&missing, &coordinator(), None),
        Err(MatchingError::NotFound { entity: "match", .. })
    ));
}

#[test]
fn reject_records_reason_without_touching_parties() {
    let (_, service, matches) = seed_competing_kidney_matches();
    let declined = match_for(&matches, "r-b");

    let record = service
        .reject_match(
            &declined.id,
            &coordinator(),
            Some("  crossmatch positive ".to_string()),
        )
        .expect("reject succeeds");

    assert_eq!(record.status, MatchStatus::Rejected);
    assert_eq!(record.rejection_reason(), Some("crossmatch positive"));
    assert_eq!(
        service
            .get_donor(&DonorId("donor-x".to_string()))
            .expect("donor present")
            .status,
        DonorStatus::Registered
    );
    assert_eq!(
        service
            .get_recipient(&RecipientId("r-b".to_string()))
            .expect("recipient present")
            .status,
        RecipientStatus::Waiting
    );

    let kept = match_for(&matches, "r-a");
    service
        .accept_match(&kept.id, &coordinator())
        .expect("remaining match can still be accepted");
}

#[test]
fn blank_rejection_reason_is_dropped() {
    let (_, service, matches) = seed_competing_kidney_matches();
    let record = service
        .reject_match(&match_for(&matches, "r-c").id, &coordinator(), Some("   ".to_string()))
        .expect("reject succeeds");

    assert!(record.rejection_reason().is_none());
    assert!(record.decision.is_some());
}

#[test]
fn failed_cascade_leaves_no_partial_writes() {
    let (repository, service) = build_service();
    register_donor(
        &service,
        donor_registration("d-1", BloodType::ONegative, DonationMode::Deceased, &["HEART"]),
    );
    let orphan = repository
        .insert_match_if_absent(NewMatch {
            donor_id: DonorId("d-1".to_string()),
            recipient_id: RecipientId("deregistered".to_string()),
            organ: OrganType::Heart,
            score: ScoreBreakdown::default(),
            created_at: now(),
        })
        .expect("insert succeeds")
        .expect("new triple");

    match service.accept_match(&orphan.id, &coordinator()) {
        Err(MatchingError::NotFound {
            entity: "recipient",
            id,
        }) => assert_eq!(id, "deregistered"),
        other => panic!("expected recipient not found, got {other:?}"),
    }

    let stored = repository
        .get_match(&orphan.id)
        .expect("read succeeds")
        .expect("match retained");
    assert_eq!(stored.status, MatchStatus::Pending);
    assert!(stored.decision.is_none());
}

#[test]
fn stats_count_every_status() {
    let (_, service, matches) = seed_competing_kidney_matches();
    service
        .accept_match(&match_for(&matches, "r-a").id, &coordinator())
        .expect("accept succeeds");
    service
        .reject_match(&match_for(&matches, "r-c").id, &coordinator(), None)
        .expect("reject succeeds");

    let stats = service.get_match_stats().expect("stats");
    assert_eq!(stats.total, 3);
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.expired, 1);
    assert!((stats.acceptance_rate() - 1.0 / 3.0).abs() < f32::EPSILON);
}
