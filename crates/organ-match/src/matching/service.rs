use std::sync::Arc;

use tracing::info;

use super::clock::{Clock, SystemClock};
use super::domain::{DonationMode, Donor, DonorId, Recipient, RecipientId};
use super::eligibility::{validate_organs, EligibilityPolicy, ValidationResult};
use super::error::MatchingError;
use super::generator::{generate_for_donor, GenerationReport};
use super::lifecycle::{self, AcceptOutcome, MatchStats};
use super::record::{ActorId, MatchId, MatchRecord, MatchStatus};
use super::registration::{DonorRegistration, RecipientRegistration, RegisteredDonor};
use super::report::OrganDemandReport;
use super::repository::{DonorFilter, MatchRepository, RecipientFilter, RepositoryError};
use super::scoring::{score, ScoreBreakdown, ScoreInput};

/// Facade exposing the matching engine to the surrounding service layer.
pub struct MatchingService<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
    policy: EligibilityPolicy,
}

impl<R> MatchingService<R>
where
    R: MatchRepository + 'static,
{
    pub fn new(repository: Arc<R>, policy: EligibilityPolicy) -> Self {
        Self::with_clock(repository, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(
        repository: Arc<R>,
        policy: EligibilityPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> &EligibilityPolicy {
        &self.policy
    }

    /// Screen and store a donor. Blocking findings surface as `ValidationFailed`.
    pub fn register_donor(
        &self,
        registration: DonorRegistration,
    ) -> Result<RegisteredDonor, MatchingError> {
        let screening = registration.screen(&self.policy);
        if !screening.is_valid() {
            return Err(MatchingError::ValidationFailed(screening));
        }

        let id = registration.id.to_string();
        let donor = self
            .repository
            .insert_donor(registration.into_donor())
            .map_err(|error| duplicate_or("donor", id, error))?;

        info!(donor = %donor.id, organs = donor.organs_offered.len(), "donor registered");
        Ok(RegisteredDonor {
            donor,
            warnings: screening.warnings,
        })
    }

    pub fn register_recipient(
        &self,
        registration: RecipientRegistration,
    ) -> Result<Recipient, MatchingError> {
        let id = registration.id.to_string();
        let recipient = self
            .repository
            .insert_recipient(registration.into_recipient())
            .map_err(|error| duplicate_or("recipient", id, error))?;

        info!(recipient = %recipient.id, organ = %recipient.organ_needed, "recipient registered");
        Ok(recipient)
    }

    pub fn get_donor(&self, id: &DonorId) -> Result<Donor, MatchingError> {
        self.repository
            .get_donor(id)?
            .ok_or_else(|| MatchingError::not_found("donor", id))
    }

    pub fn get_recipient(&self, id: &RecipientId) -> Result<Recipient, MatchingError> {
        self.repository
            .get_recipient(id)?
            .ok_or_else(|| MatchingError::not_found("recipient", id))
    }

    pub fn get_match(&self, id: &MatchId) -> Result<MatchRecord, MatchingError> {
        self.repository
            .get_match(id)?
            .ok_or_else(|| MatchingError::not_found("match", id))
    }

    pub fn list_donors(&self, filter: &DonorFilter) -> Result<Vec<Donor>, MatchingError> {
        Ok(self.repository.list_donors(filter)?)
    }

    pub fn list_recipients(
        &self,
        filter: &RecipientFilter,
    ) -> Result<Vec<Recipient>, MatchingError> {
        Ok(self.repository.list_recipients(filter)?)
    }

    /// Score every compatible waiting recipient for the donor's organs and persist
    /// new pending matches. Re-running for the same donor never duplicates a pairing.
    pub fn generate_matches_for_donor(
        &self,
        donor_id: &DonorId,
    ) -> Result<GenerationReport, MatchingError> {
        let report = generate_for_donor(self.repository.as_ref(), donor_id, self.clock.now())?;

        info!(
            donor = %donor_id,
            created = report.created,
            duplicates = report.duplicates_ignored,
            incompatible = report.incompatible_skipped,
            failed = report.failures.len(),
            "match generation finished"
        );
        Ok(report)
    }

    /// Every match for the donor regardless of status, best first.
    pub fn find_matches_for_donor(
        &self,
        donor_id: &DonorId,
    ) -> Result<Vec<MatchRecord>, MatchingError> {
        let mut matches = self.repository.list_matches_by_donor(donor_id)?;
        rank(&mut matches);
        Ok(matches)
    }

    /// Pending matches offered to the recipient, best first.
    pub fn find_matches_for_recipient(
        &self,
        recipient_id: &RecipientId,
    ) -> Result<Vec<MatchRecord>, MatchingError> {
        let mut matches: Vec<MatchRecord> = self
            .repository
            .list_matches_by_recipient(recipient_id)?
            .into_iter()
            .filter(|record| record.status == MatchStatus::Pending)
            .collect();
        rank(&mut matches);
        Ok(matches)
    }

    pub fn accept_match(
        &self,
        match_id: &MatchId,
        actor: &ActorId,
    ) -> Result<AcceptOutcome, MatchingError> {
        let outcome =
            lifecycle::accept(self.repository.as_ref(), match_id, actor, self.clock.now())?;

        info!(
            match_id = %match_id,
            donor = %outcome.accepted.donor_id,
            recipient = %outcome.accepted.recipient_id,
            expired = outcome.expired.len(),
            "match accepted"
        );
        Ok(outcome)
    }

    pub fn reject_match(
        &self,
        match_id: &MatchId,
        actor: &ActorId,
        reason: Option<String>,
    ) -> Result<MatchRecord, MatchingError> {
        let record = lifecycle::reject(
            self.repository.as_ref(),
            match_id,
            actor,
            reason,
            self.clock.now(),
        )?;

        info!(match_id = %match_id, "match rejected");
        Ok(record)
    }

    pub fn get_match_stats(&self) -> Result<MatchStats, MatchingError> {
        let counts = self.repository.count_matches_by_status()?;
        Ok(MatchStats::from_counts(&counts))
    }

    pub fn organ_demand_report(&self) -> Result<OrganDemandReport, MatchingError> {
        let donors = self.repository.list_donors(&DonorFilter::default())?;
        let recipients = self.repository.list_recipients(&RecipientFilter::default())?;
        let mut matches = Vec::new();
        for donor in &donors {
            matches.extend(self.repository.list_matches_by_donor(&donor.id)?);
        }

        Ok(OrganDemandReport::build(&donors, &recipients, &matches))
    }

    pub fn validate_organs<S: AsRef<str>>(
        &self,
        mode: DonationMode,
        proposed: &[S],
    ) -> ValidationResult {
        validate_organs(mode, proposed)
    }

    /// Score a donor/recipient pairing as of now without persisting anything.
    pub fn score(&self, donor: &Donor, recipient: &Recipient) -> ScoreBreakdown {
        score(&ScoreInput::for_pair(donor, recipient, self.clock.now()))
    }
}

fn rank(matches: &mut [MatchRecord]) {
    matches.sort_by(|left, right| {
        right
            .score
            .total
            .cmp(&left.score.total)
            .then_with(|| left.created_at.cmp(&right.created_at))
            .then_with(|| left.id.cmp(&right.id))
    });
}

fn duplicate_or(entity: &'static str, id: String, error: RepositoryError) -> MatchingError {
    match error {
        RepositoryError::Conflict => MatchingError::DuplicateRecord { entity, id },
        other => MatchingError::Repository(other),
    }
}
