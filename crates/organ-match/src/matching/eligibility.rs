use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{DonationMode, OrganType};

pub const DEFAULT_MINIMUM_LIVING_DONOR_AGE: u8 = 18;
pub const DEFAULT_SENIOR_LIVING_DONOR_AGE: u8 = 65;

/// Living donors may only give a single kidney.
pub const LIVING_DONOR_ORGANS: [OrganType; 1] = [OrganType::Kidney];

/// Deceased donors may give any organ in the catalogue.
pub const DECEASED_DONOR_ORGANS: [OrganType; 8] = OrganType::ordered();

/// Age band applied to living donors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityPolicy {
    pub minimum_living_donor_age: u8,
    pub senior_living_donor_age: u8,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self {
            minimum_living_donor_age: DEFAULT_MINIMUM_LIVING_DONOR_AGE,
            senior_living_donor_age: DEFAULT_SENIOR_LIVING_DONOR_AGE,
        }
    }
}

/// Outcome of an eligibility check. Errors block registration, warnings do not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            write!(f, "eligible")
        } else {
            write!(f, "{}", self.errors.join("; "))
        }
    }
}

/// Donor attributes screened before registration.
#[derive(Debug, Clone)]
pub struct DonorScreening<'a, S> {
    pub donation_mode: DonationMode,
    pub organs: &'a [S],
    pub age: u8,
    pub consent_on_file: bool,
}

pub fn available_organs(mode: DonationMode) -> &'static [OrganType] {
    match mode {
        DonationMode::Living => &LIVING_DONOR_ORGANS,
        DonationMode::Deceased => &DECEASED_DONOR_ORGANS,
    }
}

pub fn is_organ_valid_for(mode: DonationMode, organ: OrganType) -> bool {
    available_organs(mode).contains(&organ)
}

/// Splits proposed labels into the recognised organ set and the labels that did not parse.
pub fn parse_organ_set<S: AsRef<str>>(proposed: &[S]) -> (BTreeSet<OrganType>, Vec<String>) {
    let mut organs = BTreeSet::new();
    let mut unknown = Vec::new();

    for label in proposed {
        match label.as_ref().parse::<OrganType>() {
            Ok(organ) => {
                organs.insert(organ);
            }
            Err(_) => unknown.push(label.as_ref().trim().to_string()),
        }
    }

    (organs, unknown)
}

/// Checks the proposed organ set against the rules for the donation mode.
pub fn validate_organs<S: AsRef<str>>(mode: DonationMode, proposed: &[S]) -> ValidationResult {
    let mut result = ValidationResult::default();

    match mode {
        DonationMode::Living => {
            if proposed.len() != 1 {
                result.error(format!(
                    "Living donors can only donate 1 kidney (found {} organs).",
                    proposed.len()
                ));
                return result;
            }

            let label = proposed[0].as_ref();
            match label.parse::<OrganType>() {
                Ok(organ) if is_organ_valid_for(mode, organ) => {}
                Ok(organ) => result.error(format!(
                    "Living donors can only donate: {}. Invalid organ selected: {}",
                    organ_list(&LIVING_DONOR_ORGANS),
                    organ
                )),
                Err(err) => result.error(format!("{err}.")),
            }
        }
        DonationMode::Deceased => {
            if proposed.is_empty() {
                result.error("Deceased donors must offer at least one organ.");
                return result;
            }

            let (organs, unknown) = parse_organ_set(proposed);
            let invalid: Vec<String> = unknown
                .into_iter()
                .chain(
                    organs
                        .into_iter()
                        .filter(|organ| !is_organ_valid_for(mode, *organ))
                        .map(|organ| organ.label().to_string()),
                )
                .collect();

            if !invalid.is_empty() {
                result.error(format!(
                    "Invalid organs selected: {}. Valid organs: {}",
                    invalid.join(", "),
                    organ_list(&DECEASED_DONOR_ORGANS)
                ));
            }
        }
    }

    result
}

/// Full donor screening: organ rules, the living-donor age band and consent.
pub fn validate_donor<S: AsRef<str>>(
    policy: &EligibilityPolicy,
    screening: &DonorScreening<'_, S>,
) -> ValidationResult {
    let mut result = validate_organs(screening.donation_mode, screening.organs);

    if screening.donation_mode == DonationMode::Living {
        if screening.age < policy.minimum_living_donor_age {
            result.error(format!(
                "Living donors must be at least {} years old.",
                policy.minimum_living_donor_age
            ));
        } else if screening.age > policy.senior_living_donor_age {
            result.warning(format!(
                "Living donors over {} may face additional medical evaluations.",
                policy.senior_living_donor_age
            ));
        }
    }

    if !screening.consent_on_file {
        result.warning("Consent form not yet uploaded. Required before matching.");
    }

    result
}

fn organ_list(organs: &[OrganType]) -> String {
    organs
        .iter()
        .map(|organ| organ.label())
        .collect::<Vec<_>>()
        .join(", ")
}
