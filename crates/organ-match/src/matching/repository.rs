use std::collections::{BTreeMap, BTreeSet};

use super::domain::{
    BloodType, DonationMode, Donor, DonorId, DonorStatus, HospitalId, OrganType, Recipient,
    RecipientId, RecipientStatus, UrgencyTier,
};
use super::record::{Decision, MatchId, MatchRecord, MatchStatus, NewMatch};

/// Donor listing filter. Every field is optional and set fields are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonorFilter {
    pub blood_type: Option<BloodType>,
    pub donation_mode: Option<DonationMode>,
    pub status: Option<DonorStatus>,
    pub hospital: Option<HospitalId>,
}

impl DonorFilter {
    pub fn matches(&self, donor: &Donor) -> bool {
        self.blood_type.is_none_or(|value| donor.blood_type == value)
            && self
                .donation_mode
                .is_none_or(|value| donor.donation_mode == value)
            && self.status.is_none_or(|value| donor.status == value)
            && self
                .hospital
                .as_ref()
                .is_none_or(|value| &donor.consulting_hospital == value)
    }
}

/// Recipient listing filter. Every field is optional and set fields are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientFilter {
    pub blood_type: Option<BloodType>,
    pub organ_needed: Option<OrganType>,
    pub urgency: Option<UrgencyTier>,
    pub status: Option<RecipientStatus>,
    pub hospital: Option<HospitalId>,
}

impl RecipientFilter {
    pub fn matches(&self, recipient: &Recipient) -> bool {
        self.blood_type.is_none_or(|value| recipient.blood_type == value)
            && self
                .organ_needed
                .is_none_or(|value| recipient.organ_needed == value)
            && self.urgency.is_none_or(|value| recipient.urgency == value)
            && self.status.is_none_or(|value| recipient.status == value)
            && self
                .hospital
                .as_ref()
                .is_none_or(|value| &recipient.hospital == value)
    }
}

/// Storage contract consumed by the matching engine.
///
/// Implementations must make `insert_match_if_absent` atomic on the
/// (donor, recipient, organ) triple, and must apply everything staged inside a
/// single `transaction` call as one unit: either every write becomes visible or none do.
pub trait MatchRepository: Send + Sync {
    fn get_donor(&self, id: &DonorId) -> Result<Option<Donor>, RepositoryError>;
    fn get_recipient(&self, id: &RecipientId) -> Result<Option<Recipient>, RepositoryError>;
    fn get_match(&self, id: &MatchId) -> Result<Option<MatchRecord>, RepositoryError>;

    fn insert_donor(&self, donor: Donor) -> Result<Donor, RepositoryError>;
    fn insert_recipient(&self, recipient: Recipient) -> Result<Recipient, RepositoryError>;

    fn list_donors(&self, filter: &DonorFilter) -> Result<Vec<Donor>, RepositoryError>;
    fn list_recipients(&self, filter: &RecipientFilter)
        -> Result<Vec<Recipient>, RepositoryError>;

    /// `WAITING` recipients whose needed organ is in `organs`.
    fn list_waiting_recipients_needing_any_of(
        &self,
        organs: &BTreeSet<OrganType>,
    ) -> Result<Vec<Recipient>, RepositoryError>;

    /// Returns `None` when a match for the same triple already exists, whatever its status.
    fn insert_match_if_absent(
        &self,
        new_match: NewMatch,
    ) -> Result<Option<MatchRecord>, RepositoryError>;

    fn list_matches_by_donor(&self, id: &DonorId) -> Result<Vec<MatchRecord>, RepositoryError>;
    fn list_matches_by_recipient(
        &self,
        id: &RecipientId,
    ) -> Result<Vec<MatchRecord>, RepositoryError>;

    fn count_matches_by_status(&self) -> Result<BTreeMap<MatchStatus, usize>, RepositoryError>;

    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&mut dyn RepositoryTransaction) -> Result<T, E>;
}

/// Writes available inside [`MatchRepository::transaction`].
pub trait RepositoryTransaction {
    /// Conditional update: fails with [`RepositoryError::StatusMismatch`] unless the
    /// match is currently in `expected`.
    fn update_match_status(
        &mut self,
        id: &MatchId,
        expected: MatchStatus,
        status: MatchStatus,
        decision: Decision,
    ) -> Result<MatchRecord, RepositoryError>;

    fn update_donor_status(&mut self, id: &DonorId, status: DonorStatus)
        -> Result<(), RepositoryError>;

    fn update_recipient_status(
        &mut self,
        id: &RecipientId,
        status: RecipientStatus,
    ) -> Result<(), RepositoryError>;

    /// The `ACCEPTED` match already holding the donor's organ, if any.
    fn accepted_match_for(
        &self,
        donor_id: &DonorId,
        organ: OrganType,
    ) -> Result<Option<MatchRecord>, RepositoryError>;

    /// Moves every other `PENDING` match for the donor and organ to `EXPIRED`.
    fn expire_competing_pending_matches(
        &mut self,
        donor_id: &DonorId,
        organ: OrganType,
        exclude: &MatchId,
        decision: &Decision,
    ) -> Result<Vec<MatchId>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("expected match status {expected}, found {actual}")]
    StatusMismatch {
        expected: MatchStatus,
        actual: MatchStatus,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
