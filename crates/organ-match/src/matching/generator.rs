use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::compatibility::is_compatible;
use super::domain::{DonorId, OrganType, RecipientId};
use super::error::MatchingError;
use super::record::{MatchRecord, MatchStatus, NewMatch};
use super::repository::{MatchRepository, RepositoryError};
use super::scoring::{score, ScoreInput};

/// Result of one generation run for a donor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    pub donor_id: DonorId,
    /// Created and pre-existing matches for every pairing considered, best first.
    pub matches: Vec<MatchRecord>,
    pub created: usize,
    pub duplicates_ignored: usize,
    pub incompatible_skipped: usize,
    pub failures: Vec<PairFailure>,
}

/// A single pairing whose insert failed; the rest of the batch still ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairFailure {
    pub recipient_id: RecipientId,
    pub organ: OrganType,
    pub reason: String,
}

pub(crate) fn generate_for_donor<R: MatchRepository>(
    repository: &R,
    donor_id: &DonorId,
    now: DateTime<Utc>,
) -> Result<GenerationReport, MatchingError> {
    let donor = repository
        .get_donor(donor_id)?
        .ok_or_else(|| MatchingError::not_found("donor", donor_id))?;

    let committed: BTreeSet<OrganType> = repository
        .list_matches_by_donor(&donor.id)?
        .into_iter()
        .filter(|record| record.status == MatchStatus::Accepted)
        .map(|record| record.organ)
        .collect();
    let open_organs: BTreeSet<OrganType> = donor
        .organs_offered
        .iter()
        .copied()
        .filter(|organ| !committed.contains(organ))
        .collect();
    if open_organs.is_empty() {
        tracing::debug!(donor = %donor.id, "every offered organ is already committed");
    }

    let candidates = repository.list_waiting_recipients_needing_any_of(&open_organs)?;

    let mut report = GenerationReport {
        donor_id: donor.id.clone(),
        matches: Vec::new(),
        created: 0,
        duplicates_ignored: 0,
        incompatible_skipped: 0,
        failures: Vec::new(),
    };
    let mut waiting_since = HashMap::new();
    let mut existing = HashSet::new();

    for recipient in &candidates {
        if !is_compatible(donor.blood_type, recipient.blood_type) {
            report.incompatible_skipped += 1;
            tracing::debug!(
                donor = %donor.id,
                recipient = %recipient.id,
                "skipping blood-incompatible pairing"
            );
            continue;
        }

        waiting_since.insert(recipient.id.clone(), recipient.waiting_since);
        let breakdown = score(&ScoreInput::for_pair(&donor, recipient, now));

        for organ in open_organs
            .iter()
            .copied()
            .filter(|organ| *organ == recipient.organ_needed)
        {
            let attempt = repository.insert_match_if_absent(NewMatch {
                donor_id: donor.id.clone(),
                recipient_id: recipient.id.clone(),
                organ,
                score: breakdown,
                created_at: now,
            });

            match attempt {
                Ok(Some(record)) => {
                    report.created += 1;
                    report.matches.push(record);
                }
                Ok(None) => {
                    report.duplicates_ignored += 1;
                    existing.insert((recipient.id.clone(), organ));
                }
                Err(error) => report.failures.push(PairFailure {
                    recipient_id: recipient.id.clone(),
                    organ,
                    reason: error.to_string(),
                }),
            }
        }
    }

    if !existing.is_empty() {
        collect_existing(repository, &donor.id, &existing, &mut report.matches)?;
    }

    report.matches.sort_by(|left, right| {
        right
            .score
            .total
            .cmp(&left.score.total)
            .then_with(|| {
                compare_waiting(
                    waiting_since.get(&left.recipient_id),
                    waiting_since.get(&right.recipient_id),
                )
            })
            .then_with(|| left.recipient_id.cmp(&right.recipient_id))
    });

    Ok(report)
}

fn collect_existing<R: MatchRepository>(
    repository: &R,
    donor_id: &DonorId,
    wanted: &HashSet<(RecipientId, OrganType)>,
    into: &mut Vec<MatchRecord>,
) -> Result<(), RepositoryError> {
    let stored = repository.list_matches_by_donor(donor_id)?;
    into.extend(
        stored
            .into_iter()
            .filter(|record| wanted.contains(&(record.recipient_id.clone(), record.organ))),
    );
    Ok(())
}

// Longer waits rank first among equal totals.
fn compare_waiting(left: Option<&DateTime<Utc>>, right: Option<&DateTime<Utc>>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(right),
        _ => Ordering::Equal,
    }
}
