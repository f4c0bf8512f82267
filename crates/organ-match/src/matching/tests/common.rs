use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::matching::domain::{
    BloodType, DonationMode, Donor, DonorId, HospitalId, Location, OrganType, Recipient,
    RecipientId, UrgencyTier,
};
use crate::matching::record::{MatchId, MatchRecord, MatchStatus, NewMatch};
use crate::matching::registration::{DonorRegistration, RecipientRegistration};
use crate::matching::repository::{
    DonorFilter, MatchRepository, RecipientFilter, RepositoryError, RepositoryTransaction,
};
use crate::matching::{EligibilityPolicy, FixedClock, InMemoryMatchRepository, MatchingService};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

pub(super) fn pune() -> Location {
    Location::new("Pune", "Maharashtra")
}

pub(super) fn mumbai() -> Location {
    Location::new("Mumbai", "Maharashtra")
}

pub(super) fn bengaluru() -> Location {
    Location::new("Bengaluru", "Karnataka")
}

pub(super) fn donor_registration(
    id: &str,
    blood_type: BloodType,
    donation_mode: DonationMode,
    organs: &[&str],
) -> DonorRegistration {
    DonorRegistration {
        id: DonorId(id.to_string()),
        name: format!("Donor {id}"),
        age: 42,
        blood_type,
        donation_mode,
        organs: organs.iter().map(|organ| organ.to_string()).collect(),
        tissue_type: None,
        location: pune(),
        consulting_hospital: HospitalId("ruby-hall".to_string()),
        consent_form: Some(format!("consent-{id}.pdf")),
    }
}

pub(super) fn recipient_registration(
    id: &str,
    blood_type: BloodType,
    organ_needed: OrganType,
    urgency: UrgencyTier,
    waiting_days: i64,
) -> RecipientRegistration {
    RecipientRegistration {
        id: RecipientId(id.to_string()),
        name: format!("Recipient {id}"),
        age: 51,
        blood_type,
        organ_needed,
        urgency,
        waiting_since: days_ago(waiting_days),
        tissue_type: None,
        location: pune(),
        hospital: HospitalId("kem".to_string()),
    }
}

pub(super) fn build_service() -> (
    Arc<InMemoryMatchRepository>,
    MatchingService<InMemoryMatchRepository>,
) {
    let repository = Arc::new(InMemoryMatchRepository::default());
    let service = MatchingService::with_clock(
        repository.clone(),
        EligibilityPolicy::default(),
        Arc::new(FixedClock(now())),
    );
    (repository, service)
}

pub(super) fn register_donor<R: MatchRepository + 'static>(
    service: &MatchingService<R>,
    registration: DonorRegistration,
) -> Donor {
    service
        .register_donor(registration)
        .expect("donor registers")
        .donor
}

pub(super) fn register_recipient<R: MatchRepository + 'static>(
    service: &MatchingService<R>,
    registration: RecipientRegistration,
) -> Recipient {
    service
        .register_recipient(registration)
        .expect("recipient registers")
}

pub(super) fn match_for(matches: &[MatchRecord], recipient: &str) -> MatchRecord {
    matches
        .iter()
        .find(|record| record.recipient_id.0 == recipient)
        .cloned()
        .unwrap_or_else(|| panic!("no match for recipient {recipient}"))
}

/// Delegates to the in-memory store but fails match inserts for one recipient.
pub(super) struct FlakyRepository {
    pub(super) inner: InMemoryMatchRepository,
    pub(super) failing_recipient: RecipientId,
}

impl MatchRepository for FlakyRepository {
    fn get_donor(&self, id: &DonorId) -> Result<Option<Donor>, RepositoryError> {
        self.inner.get_donor(id)
    }

    fn get_recipient(&self, id: &RecipientId) -> Result<Option<Recipient>, RepositoryError> {
        self.inner.get_recipient(id)
    }

    fn get_match(&self, id: &MatchId) -> Result<Option<MatchRecord>, RepositoryError> {
        self.inner.get_match(id)
    }

    fn insert_donor(&self, donor: Donor) -> Result<Donor, RepositoryError> {
        self.inner.insert_donor(donor)
    }

    fn insert_recipient(&self, recipient: Recipient) -> Result<Recipient, RepositoryError> {
        self.inner.insert_recipient(recipient)
    }

    fn list_donors(&self, filter: &DonorFilter) -> Result<Vec<Donor>, RepositoryError> {
        self.inner.list_donors(filter)
    }

    fn list_recipients(
        &self,
        filter: &RecipientFilter,
    ) -> Result<Vec<Recipient>, RepositoryError> {
        self.inner.list_recipients(filter)
    }

    fn list_waiting_recipients_needing_any_of(
        &self,
        organs: &BTreeSet<OrganType>,
    ) -> Result<Vec<Recipient>, RepositoryError> {
        self.inner.list_waiting_recipients_needing_any_of(organs)
    }

    fn insert_match_if_absent(
        &self,
        new_match: NewMatch,
    ) -> Result<Option<MatchRecord>, RepositoryError> {
        if new_match.recipient_id == self.failing_recipient {
            return Err(RepositoryError::Unavailable("replica lagging".to_string()));
        }
        self.inner.insert_match_if_absent(new_match)
    }

    fn list_matches_by_donor(&self, id: &DonorId) -> Result<Vec<MatchRecord>, RepositoryError> {
        self.inner.list_matches_by_donor(id)
    }

    fn list_matches_by_recipient(
        &self,
        id: &RecipientId,
    ) -> Result<Vec<MatchRecord>, RepositoryError> {
        self.inner.list_matches_by_recipient(id)
    }

    fn count_matches_by_status(&self) -> Result<BTreeMap<MatchStatus, usize>, RepositoryError> {
        self.inner.count_matches_by_status()
    }

    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&mut dyn RepositoryTransaction) -> Result<T, E>,
    {
        self.inner.transaction(work)
    }
}
