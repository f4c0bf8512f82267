use chrono::{DateTime, Utc};

use super::super::domain::{Location, UrgencyTier};

pub(crate) const TISSUE_MAX: u8 = 30;
pub(crate) const TISSUE_NEUTRAL: u8 = 15;
pub(crate) const TISSUE_PARTIAL: u8 = 15;

pub(crate) const PROXIMITY_SAME_CITY: u8 = 20;
pub(crate) const PROXIMITY_SAME_STATE: u8 = 14;
pub(crate) const PROXIMITY_FLOOR: u8 = 5;

/// Markers are compared after trimming; absent or blank markers score the neutral value.
pub(crate) fn tissue_points(donor: Option<&str>, recipient: Option<&str>) -> u8 {
    fn present(marker: Option<&str>) -> Option<&str> {
        marker.map(str::trim).filter(|value| !value.is_empty())
    }

    match (present(donor), present(recipient)) {
        (Some(donor), Some(recipient)) if donor == recipient => TISSUE_MAX,
        (Some(_), Some(_)) => TISSUE_PARTIAL,
        _ => TISSUE_NEUTRAL,
    }
}

pub(crate) fn urgency_points(urgency: UrgencyTier) -> u8 {
    match urgency {
        UrgencyTier::Critical => 30,
        UrgencyTier::High => 22,
        UrgencyTier::Medium => 14,
        UrgencyTier::Low => 6,
    }
}

pub(crate) fn proximity_points(donor: &Location, recipient: &Location) -> u8 {
    if donor.same_city(recipient) {
        PROXIMITY_SAME_CITY
    } else if donor.same_state(recipient) {
        PROXIMITY_SAME_STATE
    } else {
        PROXIMITY_FLOOR
    }
}

/// Whole days elapsed; a waiting-since in the future counts as zero.
pub(crate) fn waiting_days(waiting_since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - waiting_since).num_days().max(0)
}

pub(crate) fn waiting_time_points(days: i64) -> u8 {
    match days {
        d if d > 180 => 20,
        d if d > 90 => 15,
        d if d > 30 => 10,
        _ => 5,
    }
}
