use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{
    Donor, DonorId, DonorStatus, OrganType, Recipient, RecipientId, RecipientStatus,
};
use super::record::{Decision, MatchId, MatchRecord, MatchStatus, NewMatch};
use super::repository::{
    DonorFilter, MatchRepository, RecipientFilter, RepositoryError, RepositoryTransaction,
};

type MatchKey = (DonorId, RecipientId, OrganType);

#[derive(Debug, Default, Clone)]
struct StoreState {
    donors: BTreeMap<DonorId, Donor>,
    recipients: BTreeMap<RecipientId, Recipient>,
    matches: BTreeMap<MatchId, MatchRecord>,
    triples: HashMap<MatchKey, MatchId>,
}

/// Process-local store. A single lock guards every table, so the triple uniqueness check
/// and each transaction are serialized. Transactions run against a staged copy that only
/// replaces the live state when the closure succeeds.
///
/// Staging clones every table, so each accept or reject costs time and memory linear in the
/// size of the store. Suited to the CLI and tests; a durable backend should use its own
/// transactions instead.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMatchRepository {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryMatchRepository {
    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }

    pub fn match_count(&self) -> usize {
        self.lock().map(|state| state.matches.len()).unwrap_or(0)
    }
}

impl MatchRepository for InMemoryMatchRepository {
    fn get_donor(&self, id: &DonorId) -> Result<Option<Donor>, RepositoryError> {
        Ok(self.lock()?.donors.get(id).cloned())
    }

    fn get_recipient(&self, id: &RecipientId) -> Result<Option<Recipient>, RepositoryError> {
        Ok(self.lock()?.recipients.get(id).cloned())
    }

    fn get_match(&self, id: &MatchId) -> Result<Option<MatchRecord>, RepositoryError> {
        Ok(self.lock()?.matches.get(id).cloned())
    }

    fn insert_donor(&self, donor: Donor) -> Result<Donor, RepositoryError> {
        let mut state = self.lock()?;
        if state.donors.contains_key(&donor.id) {
            return Err(RepositoryError::Conflict);
        }
        state.donors.insert(donor.id.clone(), donor.clone());
        Ok(donor)
    }

    fn insert_recipient(&self, recipient: Recipient) -> Result<Recipient, RepositoryError> {
        let mut state = self.lock()?;
        if state.recipients.contains_key(&recipient.id) {
            return Err(RepositoryError::Conflict);
        }
        state
            .recipients
            .insert(recipient.id.clone(), recipient.clone());
        Ok(recipient)
    }

    fn list_donors(&self, filter: &DonorFilter) -> Result<Vec<Donor>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .donors
            .values()
            .filter(|donor| filter.matches(donor))
            .cloned()
            .collect())
    }

    fn list_recipients(
        &self,
        filter: &RecipientFilter,
    ) -> Result<Vec<Recipient>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .recipients
            .values()
            .filter(|recipient| filter.matches(recipient))
            .cloned()
            .collect())
    }

    fn list_waiting_recipients_needing_any_of(
        &self,
        organs: &BTreeSet<OrganType>,
    ) -> Result<Vec<Recipient>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .recipients
            .values()
            .filter(|recipient| {
                recipient.status == RecipientStatus::Waiting
                    && organs.contains(&recipient.organ_needed)
            })
            .cloned()
            .collect())
    }

    fn insert_match_if_absent(
        &self,
        new_match: NewMatch,
    ) -> Result<Option<MatchRecord>, RepositoryError> {
        let mut state = self.lock()?;
        let key = (
            new_match.donor_id.clone(),
            new_match.recipient_id.clone(),
            new_match.organ,
        );
        if state.triples.contains_key(&key) {
            return Ok(None);
        }

        let record = new_match.into_record(MatchId::new());
        state.triples.insert(key, record.id);
        state.matches.insert(record.id, record.clone());
        Ok(Some(record))
    }

    fn list_matches_by_donor(&self, id: &DonorId) -> Result<Vec<MatchRecord>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .matches
            .values()
            .filter(|record| &record.donor_id == id)
            .cloned()
            .collect())
    }

    fn list_matches_by_recipient(
        &self,
        id: &RecipientId,
    ) -> Result<Vec<MatchRecord>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .matches
            .values()
            .filter(|record| &record.recipient_id == id)
            .cloned()
            .collect())
    }

    fn count_matches_by_status(&self) -> Result<BTreeMap<MatchStatus, usize>, RepositoryError> {
        let state = self.lock()?;
        let mut counts = BTreeMap::new();
        for record in state.matches.values() {
            *counts.entry(record.status).or_insert(0) += 1;
        }
        Ok(counts)
    }

    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&mut dyn RepositoryTransaction) -> Result<T, E>,
    {
        let mut live = self.lock()?;
        let mut staged = StagedWrites {
            state: live.clone(),
        };
        let value = work(&mut staged)?;
        *live = staged.state;
        Ok(value)
    }
}

struct StagedWrites {
    state: StoreState,
}

impl RepositoryTransaction for StagedWrites {
    fn accepted_match_for(
        &self,
        donor_id: &DonorId,
        organ: OrganType,
    ) -> Result<Option<MatchRecord>, RepositoryError> {
        Ok(self
            .state
            .matches
            .values()
            .find(|record| {
                &record.donor_id == donor_id
                    && record.organ == organ
                    && record.status == MatchStatus::Accepted
            })
            .cloned())
    }

    fn update_match_status(
        &mut self,
        id: &MatchId,
        expected: MatchStatus,
        status: MatchStatus,
        decision: Decision,
    ) -> Result<MatchRecord, RepositoryError> {
        let record = self
            .state
            .matches
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        if record.status != expected {
            return Err(RepositoryError::StatusMismatch {
                expected,
                actual: record.status,
            });
        }
        record.status = status;
        record.decision = Some(decision);
        Ok(record.clone())
    }

    fn update_donor_status(
        &mut self,
        id: &DonorId,
        status: DonorStatus,
    ) -> Result<(), RepositoryError> {
        let donor = self
            .state
            .donors
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        donor.status = status;
        Ok(())
    }

    fn update_recipient_status(
        &mut self,
        id: &RecipientId,
        status: RecipientStatus,
    ) -> Result<(), RepositoryError> {
        let recipient = self
            .state
            .recipients
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        recipient.status = status;
        Ok(())
    }

    fn expire_competing_pending_matches(
        &mut self,
        donor_id: &DonorId,
        organ: OrganType,
        exclude: &MatchId,
        decision: &Decision,
    ) -> Result<Vec<MatchId>, RepositoryError> {
        let mut expired = Vec::new();
        for record in self.state.matches.values_mut() {
            if &record.id != exclude
                && &record.donor_id == donor_id
                && record.organ == organ
                && record.status == MatchStatus::Pending
            {
                record.status = MatchStatus::Expired;
                record.decision = Some(decision.clone());
                expired.push(record.id);
            }
        }
        Ok(expired)
    }
}
