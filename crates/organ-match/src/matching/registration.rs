use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    BloodType, DonationMode, Donor, DonorId, DonorStatus, HospitalId, Location, OrganType,
    Recipient, RecipientId, RecipientStatus, UrgencyTier,
};
use super::eligibility::{
    parse_organ_set, validate_donor, DonorScreening, EligibilityPolicy, ValidationResult,
};

/// Donor intake request. Organs stay as raw labels until screening accepts them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorRegistration {
    pub id: DonorId,
    pub name: String,
    pub age: u8,
    pub blood_type: BloodType,
    pub donation_mode: DonationMode,
    pub organs: Vec<String>,
    #[serde(default)]
    pub tissue_type: Option<String>,
    pub location: Location,
    pub consulting_hospital: HospitalId,
    #[serde(default)]
    pub consent_form: Option<String>,
}

impl DonorRegistration {
    pub fn screen(&self, policy: &EligibilityPolicy) -> ValidationResult {
        validate_donor(
            policy,
            &DonorScreening {
                donation_mode: self.donation_mode,
                organs: self.organs.as_slice(),
                age: self.age,
                consent_on_file: self
                    .consent_form
                    .as_deref()
                    .is_some_and(|form| !form.trim().is_empty()),
            },
        )
    }

    /// Builds the stored donor. Call only after [`DonorRegistration::screen`] passed.
    pub(crate) fn into_donor(self) -> Donor {
        let (organs_offered, _) = parse_organ_set(&self.organs);
        Donor {
            id: self.id,
            name: self.name,
            age: self.age,
            blood_type: self.blood_type,
            donation_mode: self.donation_mode,
            organs_offered,
            tissue_type: self.tissue_type,
            status: DonorStatus::Registered,
            location: self.location,
            consulting_hospital: self.consulting_hospital,
            consent_form: self.consent_form,
        }
    }
}

/// Recipient intake request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientRegistration {
    pub id: RecipientId,
    pub name: String,
    pub age: u8,
    pub blood_type: BloodType,
    pub organ_needed: OrganType,
    pub urgency: UrgencyTier,
    pub waiting_since: DateTime<Utc>,
    #[serde(default)]
    pub tissue_type: Option<String>,
    pub location: Location,
    pub hospital: HospitalId,
}

impl RecipientRegistration {
    pub(crate) fn into_recipient(self) -> Recipient {
        Recipient {
            id: self.id,
            name: self.name,
            age: self.age,
            blood_type: self.blood_type,
            organ_needed: self.organ_needed,
            urgency: self.urgency,
            waiting_since: self.waiting_since,
            tissue_type: self.tissue_type,
            status: RecipientStatus::Waiting,
            location: self.location,
            hospital: self.hospital,
        }
    }
}

/// Stored donor along with any non-blocking screening warnings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisteredDonor {
    pub donor: Donor,
    pub warnings: Vec<String>,
}
