use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{DonorStatus, RecipientStatus};
use super::error::MatchingError;
use super::record::{ActorId, Decision, MatchId, MatchRecord, MatchStatus};
use super::repository::{MatchRepository, RepositoryError};

/// Accepted match plus the competing matches its cascade expired.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptOutcome {
    pub accepted: MatchRecord,
    pub expired: Vec<MatchId>,
}

/// Aggregate counts across every stored match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub total: usize,
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub expired: usize,
}

impl MatchStats {
    pub(crate) fn from_counts(counts: &BTreeMap<MatchStatus, usize>) -> Self {
        let count = |status| counts.get(&status).copied().unwrap_or(0);
        let pending = count(MatchStatus::Pending);
        let accepted = count(MatchStatus::Accepted);
        let rejected = count(MatchStatus::Rejected);
        let expired = count(MatchStatus::Expired);

        Self {
            total: pending + accepted + rejected + expired,
            pending,
            accepted,
            rejected,
            expired,
        }
    }

    /// Share of all matches that ended up accepted, in `[0, 1]`.
    pub fn acceptance_rate(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.accepted as f32 / self.total as f32
        }
    }
}

/// Commits the organ to this match. The status change, both party cascades and the
/// expiry of competing pending matches land in one repository transaction.
///
/// Fails with `Conflict` naming the earlier match when the donor's organ is already
/// committed elsewhere; nothing is written in that case.
pub(crate) fn accept<R: MatchRepository>(
    repository: &R,
    match_id: &MatchId,
    actor: &ActorId,
    now: DateTime<Utc>,
) -> Result<AcceptOutcome, MatchingError> {
    let decision = Decision {
        decided_at: now,
        decided_by: actor.clone(),
        reason: None,
    };
    let expiry = Decision {
        decided_at: now,
        decided_by: ActorId::system(),
        reason: Some(format!("organ committed to match {match_id}")),
    };

    repository.transaction(|tx| {
        let accepted = tx
            .update_match_status(match_id, MatchStatus::Pending, MatchStatus::Accepted, decision)
            .map_err(|error| MatchingError::from_decision(*match_id, error))?;

        if let Some(holder) = tx.accepted_match_for(&accepted.donor_id, accepted.organ)? {
            if holder.id != accepted.id {
                return Err(MatchingError::Conflict {
                    match_id: holder.id,
                    status: holder.status,
                });
            }
        }

        tx.update_recipient_status(&accepted.recipient_id, RecipientStatus::Matched)
            .map_err(|error| party_error("recipient", &accepted.recipient_id, error))?;
        tx.update_donor_status(&accepted.donor_id, DonorStatus::Matched)
            .map_err(|error| party_error("donor", &accepted.donor_id, error))?;

        let expired = tx.expire_competing_pending_matches(
            &accepted.donor_id,
            accepted.organ,
            &accepted.id,
            &expiry,
        )?;

        Ok(AcceptOutcome { accepted, expired })
    })
}

/// Declines the match. Donor and recipient stay eligible for other pairings.
pub(crate) fn reject<R: MatchRepository>(
    repository: &R,
    match_id: &MatchId,
    actor: &ActorId,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> Result<MatchRecord, MatchingError> {
    let decision = Decision {
        decided_at: now,
        decided_by: actor.clone(),
        reason: reason
            .map(|reason| reason.trim().to_string())
            .filter(|reason| !reason.is_empty()),
    };

    repository.transaction(|tx| {
        tx.update_match_status(match_id, MatchStatus::Pending, MatchStatus::Rejected, decision)
            .map_err(|error| MatchingError::from_decision(*match_id, error))
    })
}

fn party_error(entity: &'static str, id: &impl ToString, error: RepositoryError) -> MatchingError {
    match error {
        RepositoryError::NotFound => MatchingError::not_found(entity, id.to_string()),
        other => MatchingError::Repository(other),
    }
}
