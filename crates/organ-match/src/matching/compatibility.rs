//! ABO/Rh compatibility between a donor and a recipient.

use super::domain::BloodType;

pub const EXACT_MATCH_SCORE: u8 = 100;
pub const COMPATIBLE_SCORE: u8 = 80;

/// Recipient groups each donor group may give to.
pub fn compatible_recipient_types(donor: BloodType) -> &'static [BloodType] {
    use BloodType::*;

    match donor {
        ONegative => &[
            ONegative, OPositive, ANegative, APositive, BNegative, BPositive, AbNegative,
            AbPositive,
        ],
        OPositive => &[OPositive, APositive, BPositive, AbPositive],
        ANegative => &[ANegative, APositive, AbNegative, AbPositive],
        APositive => &[APositive, AbPositive],
        BNegative => &[BNegative, BPositive, AbNegative, AbPositive],
        BPositive => &[BPositive, AbPositive],
        AbNegative => &[AbNegative, AbPositive],
        AbPositive => &[AbPositive],
    }
}

/// Donor groups a recipient group may receive from, in catalogue order.
pub fn compatible_donor_types(recipient: BloodType) -> Vec<BloodType> {
    BloodType::ordered()
        .into_iter()
        .filter(|donor| is_compatible(*donor, recipient))
        .collect()
}

pub fn is_compatible(donor: BloodType, recipient: BloodType) -> bool {
    compatible_recipient_types(donor).contains(&recipient)
}

/// 100 for identical groups, 80 for compatible but different, 0 otherwise.
pub fn compatibility_score(donor: BloodType, recipient: BloodType) -> u8 {
    if donor == recipient {
        EXACT_MATCH_SCORE
    } else if is_compatible(donor, recipient) {
        COMPATIBLE_SCORE
    } else {
        0
    }
}

/// Label variant of [`is_compatible`]; unknown labels are never compatible.
pub fn is_compatible_labels(donor: &str, recipient: &str) -> bool {
    match (donor.parse::<BloodType>(), recipient.parse::<BloodType>()) {
        (Ok(donor), Ok(recipient)) => is_compatible(donor, recipient),
        _ => false,
    }
}

/// Label variant of [`compatibility_score`]; unknown labels score 0.
pub fn compatibility_score_labels(donor: &str, recipient: &str) -> u8 {
    match (donor.parse::<BloodType>(), recipient.parse::<BloodType>()) {
        (Ok(donor), Ok(recipient)) => compatibility_score(donor, recipient),
        _ => 0,
    }
}
