//! CSV intake for donor and recipient registry exports.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use super::domain::{DonorId, HospitalId, Location, RecipientId, UnknownLabel, UrgencyTier};
use super::registration::{DonorRegistration, RecipientRegistration};

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: u64, reason: String },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read registry export: {}", err),
            ImportError::Csv(err) => write!(f, "invalid registry CSV data: {}", err),
            ImportError::InvalidRow { line, reason } => {
                write!(f, "invalid registry row on line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct RegistryImporter;

impl RegistryImporter {
    pub fn donors_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<DonorRegistration>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::donors_from_reader(file)
    }

    /// Organ lists are `;`-separated and kept as raw labels for eligibility screening.
    pub fn donors_from_reader<R: Read>(reader: R) -> Result<Vec<DonorRegistration>, ImportError> {
        let mut csv_reader = csv_reader(reader);
        let mut registrations = Vec::new();

        for (index, row) in csv_reader.deserialize::<DonorRow>().enumerate() {
            let row = row?;
            let line = index as u64 + 2;
            registrations.push(row.into_registration().map_err(|err| invalid(line, err))?);
        }

        Ok(registrations)
    }

    pub fn recipients_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<RecipientRegistration>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::recipients_from_reader(file)
    }

    /// Unknown urgency labels fall back to `MEDIUM`; `waiting_since` accepts RFC 3339 or
    /// `YYYY-MM-DD`.
    pub fn recipients_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<RecipientRegistration>, ImportError> {
        let mut csv_reader = csv_reader(reader);
        let mut registrations = Vec::new();

        for (index, row) in csv_reader.deserialize::<RecipientRow>().enumerate() {
            let row = row?;
            let line = index as u64 + 2;
            registrations.push(row.into_registration(line)?);
        }

        Ok(registrations)
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn invalid(line: u64, err: UnknownLabel) -> ImportError {
    ImportError::InvalidRow {
        line,
        reason: err.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct DonorRow {
    id: String,
    name: String,
    age: u8,
    blood_type: String,
    donation_mode: String,
    organs: String,
    city: String,
    state: String,
    hospital_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    tissue_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    consent_form: Option<String>,
}

impl DonorRow {
    fn into_registration(self) -> Result<DonorRegistration, UnknownLabel> {
        let organs = self
            .organs
            .split(';')
            .map(str::trim)
            .filter(|organ| !organ.is_empty())
            .map(str::to_string)
            .collect();

        Ok(DonorRegistration {
            id: DonorId(self.id),
            name: self.name,
            age: self.age,
            blood_type: self.blood_type.parse()?,
            donation_mode: self.donation_mode.parse()?,
            organs,
            tissue_type: self.tissue_type,
            location: Location::new(self.city, self.state),
            consulting_hospital: HospitalId(self.hospital_id),
            consent_form: self.consent_form,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RecipientRow {
    id: String,
    name: String,
    age: u8,
    blood_type: String,
    organ_needed: String,
    #[serde(default)]
    urgency: String,
    waiting_since: String,
    city: String,
    state: String,
    hospital_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    tissue_type: Option<String>,
}

impl RecipientRow {
    fn into_registration(self, line: u64) -> Result<RecipientRegistration, ImportError> {
        let waiting_since =
            parse_datetime(&self.waiting_since).ok_or_else(|| ImportError::InvalidRow {
                line,
                reason: format!("unparseable waiting_since '{}'", self.waiting_since),
            })?;

        Ok(RecipientRegistration {
            id: RecipientId(self.id),
            name: self.name,
            age: self.age,
            blood_type: self.blood_type.parse().map_err(|err| invalid(line, err))?,
            organ_needed: self.organ_needed.parse().map_err(|err| invalid(line, err))?,
            urgency: UrgencyTier::parse_lenient(&self.urgency),
            waiting_since,
            tissue_type: self.tissue_type,
            location: Location::new(self.city, self.state),
            hospital: HospitalId(self.hospital_id),
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
