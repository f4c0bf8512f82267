use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{Donor, OrganType, Recipient, RecipientStatus};
use super::record::{MatchRecord, MatchStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrganDemand {
    pub donors_offering: usize,
    pub recipients_waiting: usize,
    pub transplants_accepted: usize,
}

/// Supply and demand per organ, in catalogue order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrganDemandReport {
    pub by_organ: BTreeMap<OrganType, OrganDemand>,
}

impl OrganDemandReport {
    pub fn build<'a>(
        donors: impl IntoIterator<Item = &'a Donor>,
        recipients: impl IntoIterator<Item = &'a Recipient>,
        matches: impl IntoIterator<Item = &'a MatchRecord>,
    ) -> Self {
        let mut by_organ: BTreeMap<OrganType, OrganDemand> = BTreeMap::new();

        for donor in donors {
            for organ in &donor.organs_offered {
                by_organ.entry(*organ).or_default().donors_offering += 1;
            }
        }

        for recipient in recipients {
            if recipient.status == RecipientStatus::Waiting {
                by_organ
                    .entry(recipient.organ_needed)
                    .or_default()
                    .recipients_waiting += 1;
            }
        }

        for record in matches {
            if record.status == MatchStatus::Accepted {
                by_organ.entry(record.organ).or_default().transplants_accepted += 1;
            }
        }

        Self { by_organ }
    }

    /// Organs with more waiting recipients than donors offering them.
    pub fn shortages(&self) -> Vec<(OrganType, usize)> {
        self.by_organ
            .iter()
            .filter(|(_, demand)| demand.recipients_waiting > demand.donors_offering)
            .map(|(organ, demand)| (*organ, demand.recipients_waiting - demand.donors_offering))
            .collect()
    }
}
