use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for registered donors.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DonorId(pub String);

/// Identifier wrapper for registered recipients.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecipientId(pub String);

/// Reference to the consulting or transplant hospital owning a record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HospitalId(pub String);

macro_rules! display_inner {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        })*
    };
}

display_inner!(DonorId, RecipientId, HospitalId);

/// Error raised when a taxonomy label cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {kind} '{value}'")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownLabel {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// ABO/Rh blood groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "O-")]
    ONegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "AB+")]
    AbPositive,
}

impl BloodType {
    pub const fn ordered() -> [BloodType; 8] {
        [
            BloodType::ONegative,
            BloodType::OPositive,
            BloodType::ANegative,
            BloodType::APositive,
            BloodType::BNegative,
            BloodType::BPositive,
            BloodType::AbNegative,
            BloodType::AbPositive,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            BloodType::ONegative => "O-",
            BloodType::OPositive => "O+",
            BloodType::ANegative => "A-",
            BloodType::APositive => "A+",
            BloodType::BNegative => "B-",
            BloodType::BPositive => "B+",
            BloodType::AbNegative => "AB-",
            BloodType::AbPositive => "AB+",
        }
    }
}

impl FromStr for BloodType {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        BloodType::ordered()
            .into_iter()
            .find(|blood_type| blood_type.label() == normalized)
            .ok_or_else(|| UnknownLabel::new("blood type", value))
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Organ catalogue handled by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganType {
    Kidney,
    Liver,
    Heart,
    Lungs,
    Pancreas,
    Cornea,
    Intestines,
    BoneMarrow,
}

impl OrganType {
    pub const fn ordered() -> [OrganType; 8] {
        [
            OrganType::Kidney,
            OrganType::Liver,
            OrganType::Heart,
            OrganType::Lungs,
            OrganType::Pancreas,
            OrganType::Cornea,
            OrganType::Intestines,
            OrganType::BoneMarrow,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            OrganType::Kidney => "KIDNEY",
            OrganType::Liver => "LIVER",
            OrganType::Heart => "HEART",
            OrganType::Lungs => "LUNGS",
            OrganType::Pancreas => "PANCREAS",
            OrganType::Cornea => "CORNEA",
            OrganType::Intestines => "INTESTINES",
            OrganType::BoneMarrow => "BONE_MARROW",
        }
    }
}

impl FromStr for OrganType {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        OrganType::ordered()
            .into_iter()
            .find(|organ| organ.label() == normalized)
            .ok_or_else(|| UnknownLabel::new("organ", value))
    }
}

impl fmt::Display for OrganType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether the donor donates while alive or after death.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationMode {
    Living,
    Deceased,
}

impl DonationMode {
    pub const fn label(self) -> &'static str {
        match self {
            DonationMode::Living => "LIVING",
            DonationMode::Deceased => "DECEASED",
        }
    }
}

impl FromStr for DonationMode {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LIVING" => Ok(DonationMode::Living),
            "DECEASED" => Ok(DonationMode::Deceased),
            _ => Err(UnknownLabel::new("donation mode", value)),
        }
    }
}

/// Ordered severity of a recipient's medical need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyTier {
    Low,
    Medium,
    High,
    Critical,
}

impl UrgencyTier {
    pub const fn label(self) -> &'static str {
        match self {
            UrgencyTier::Low => "LOW",
            UrgencyTier::Medium => "MEDIUM",
            UrgencyTier::High => "HIGH",
            UrgencyTier::Critical => "CRITICAL",
        }
    }

    /// Parses a tier label, falling back to `Medium` for anything unrecognized.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or(UrgencyTier::Medium)
    }
}

impl FromStr for UrgencyTier {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(UrgencyTier::Low),
            "MEDIUM" => Ok(UrgencyTier::Medium),
            "HIGH" => Ok(UrgencyTier::High),
            "CRITICAL" => Ok(UrgencyTier::Critical),
            _ => Err(UnknownLabel::new("urgency tier", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonorStatus {
    Registered,
    Verified,
    Matched,
    Donated,
    Withdrawn,
}

impl DonorStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DonorStatus::Registered => "REGISTERED",
            DonorStatus::Verified => "VERIFIED",
            DonorStatus::Matched => "MATCHED",
            DonorStatus::Donated => "DONATED",
            DonorStatus::Withdrawn => "WITHDRAWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipientStatus {
    Waiting,
    Matched,
    Transplanted,
    Withdrawn,
}

impl RecipientStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RecipientStatus::Waiting => "WAITING",
            RecipientStatus::Matched => "MATCHED",
            RecipientStatus::Transplanted => "TRANSPLANTED",
            RecipientStatus::Withdrawn => "WITHDRAWN",
        }
    }
}

/// Home location used for proximity scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub state: String,
}

impl Location {
    pub fn new(city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
        }
    }

    pub fn same_state(&self, other: &Location) -> bool {
        self.state.trim().eq_ignore_ascii_case(other.state.trim())
    }

    pub fn same_city(&self, other: &Location) -> bool {
        self.same_state(other) && self.city.trim().eq_ignore_ascii_case(other.city.trim())
    }
}

/// Registered donor as stored by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donor {
    pub id: DonorId,
    pub name: String,
    pub age: u8,
    pub blood_type: BloodType,
    pub donation_mode: DonationMode,
    pub organs_offered: BTreeSet<OrganType>,
    pub tissue_type: Option<String>,
    pub status: DonorStatus,
    pub location: Location,
    pub consulting_hospital: HospitalId,
    pub consent_form: Option<String>,
}

impl Donor {
    pub fn offers(&self, organ: OrganType) -> bool {
        self.organs_offered.contains(&organ)
    }
}

/// Registered recipient as stored by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: RecipientId,
    pub name: String,
    pub age: u8,
    pub blood_type: BloodType,
    pub organ_needed: OrganType,
    pub urgency: UrgencyTier,
    pub waiting_since: DateTime<Utc>,
    pub tissue_type: Option<String>,
    pub status: RecipientStatus,
    pub location: Location,
    pub hospital: HospitalId,
}
