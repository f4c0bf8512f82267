//! Composite 0-100 ranking of a donor/recipient pairing.
//!
//! Blood compatibility is a hard veto. When it passes, the total is the sum of four capped
//! components: tissue match (30), urgency (30), proximity (20) and waiting time (20). The
//! blood component is reported as 100 but stays outside the additive total.

mod rules;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::compatibility::is_compatible;
use super::domain::{BloodType, Donor, Location, Recipient, UrgencyTier};

pub const BLOOD_COMPATIBILITY_PASSED: u8 = 100;

/// Everything the scoring function looks at for one pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreInput<'a> {
    pub donor_blood_type: BloodType,
    pub recipient_blood_type: BloodType,
    pub donor_tissue_type: Option<&'a str>,
    pub recipient_tissue_type: Option<&'a str>,
    pub urgency: UrgencyTier,
    pub donor_location: &'a Location,
    pub recipient_location: &'a Location,
    pub waiting_since: DateTime<Utc>,
    pub evaluated_at: DateTime<Utc>,
}

impl<'a> ScoreInput<'a> {
    pub fn for_pair(
        donor: &'a Donor,
        recipient: &'a Recipient,
        evaluated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            donor_blood_type: donor.blood_type,
            recipient_blood_type: recipient.blood_type,
            donor_tissue_type: donor.tissue_type.as_deref(),
            recipient_tissue_type: recipient.tissue_type.as_deref(),
            urgency: recipient.urgency,
            donor_location: &donor.location,
            recipient_location: &recipient.location,
            waiting_since: recipient.waiting_since,
            evaluated_at,
        }
    }
}

/// Per-component breakdown stored on every match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub blood_compatibility: u8,
    pub tissue_match: u8,
    pub urgency: u8,
    pub proximity: u8,
    pub waiting_time: u8,
    pub total: u8,
}

impl ScoreBreakdown {
    pub fn vetoed() -> Self {
        Self::default()
    }

    pub fn is_vetoed(&self) -> bool {
        self.blood_compatibility == 0
    }
}

pub fn score(input: &ScoreInput<'_>) -> ScoreBreakdown {
    if !is_compatible(input.donor_blood_type, input.recipient_blood_type) {
        return ScoreBreakdown::vetoed();
    }

    let tissue_match = rules::tissue_points(input.donor_tissue_type, input.recipient_tissue_type);
    let urgency = rules::urgency_points(input.urgency);
    let proximity = rules::proximity_points(input.donor_location, input.recipient_location);
    let waiting_time = rules::waiting_time_points(rules::waiting_days(
        input.waiting_since,
        input.evaluated_at,
    ));

    ScoreBreakdown {
        blood_compatibility: BLOOD_COMPATIBILITY_PASSED,
        tissue_match,
        urgency,
        proximity,
        waiting_time,
        total: tissue_match + urgency + proximity + waiting_time,
    }
}

/// Points awarded for an urgency label; unknown labels score as `MEDIUM`.
pub fn urgency_points_for_label(label: &str) -> u8 {
    rules::urgency_points(UrgencyTier::parse_lenient(label))
}

#[cfg(test)]
pub(crate) use rules::{waiting_days, waiting_time_points};
