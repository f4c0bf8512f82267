use crate::matching::domain::{DonationMode, OrganType};
use crate::matching::eligibility::{
    available_organs, is_organ_valid_for, parse_organ_set, validate_donor, validate_organs,
    DonorScreening, EligibilityPolicy,
};

#[test]
fn living_kidney_is_valid() {
    let result = validate_organs(DonationMode::Living, &["KIDNEY"]);
    assert!(result.is_valid());
    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty());
}

#[test]
fn living_multiple_organs_yields_single_count_error() {
    let result = validate_organs(DonationMode::Living, &["KIDNEY", "LIVER"]);
    assert!(!result.is_valid());
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("found 2 organs"));
}

#[test]
fn living_non_kidney_is_invalid() {
    let result = validate_organs(DonationMode::Living, &["LIVER"]);
    assert!(!result.is_valid());
    assert!(result.errors[0].contains("LIVER"));

    let empty: [&str; 0] = [];
    assert!(!validate_organs(DonationMode::Living, &empty).is_valid());
}

#[test]
fn deceased_accepts_the_full_catalogue_and_normalises_labels() {
    let labels: Vec<&str> = OrganType::ordered()
        .iter()
        .map(|organ| organ.label())
        .collect();
    assert!(validate_organs(DonationMode::Deceased, &labels).is_valid());
    assert!(validate_organs(DonationMode::Deceased, &["bone marrow", "Lungs"]).is_valid());
}

#[test]
fn deceased_rejects_unknown_and_empty_sets() {
    let result = validate_organs(DonationMode::Deceased, &["KIDNEY", "SPLEEN"]);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("SPLEEN"));

    let empty: [&str; 0] = [];
    let result = validate_organs(DonationMode::Deceased, &empty);
    assert!(!result.is_valid());
}

#[test]
fn organ_catalogue_per_mode() {
    assert_eq!(available_organs(DonationMode::Living), &[OrganType::Kidney]);
    assert_eq!(available_organs(DonationMode::Deceased).len(), 8);
    assert!(is_organ_valid_for(DonationMode::Deceased, OrganType::Cornea));
    assert!(!is_organ_valid_for(DonationMode::Living, OrganType::Cornea));

    let (organs, unknown) = parse_organ_set(&["kidney", "KIDNEY", "gills"]);
    assert_eq!(organs.len(), 1);
    assert_eq!(unknown, vec!["gills".to_string()]);
}

#[test]
fn living_age_band_errors_below_minimum_and_warns_above_senior() {
    let policy = EligibilityPolicy::default();
    let organs = ["KIDNEY"];

    let minor = validate_donor(
        &policy,
        &DonorScreening {
            donation_mode: DonationMode::Living,
            organs: &organs,
            age: 17,
            consent_on_file: true,
        },
    );
    assert_eq!(minor.errors.len(), 1);
    assert!(minor.errors[0].contains("18"));

    let senior = validate_donor(
        &policy,
        &DonorScreening {
            donation_mode: DonationMode::Living,
            organs: &organs,
            age: 70,
            consent_on_file: true,
        },
    );
    assert!(senior.is_valid());
    assert_eq!(senior.warnings.len(), 1);

    let deceased_elder = validate_donor(
        &policy,
        &DonorScreening {
            donation_mode: DonationMode::Deceased,
            organs: &organs,
            age: 80,
            consent_on_file: true,
        },
    );
    assert!(deceased_elder.is_valid());
    assert!(deceased_elder.warnings.is_empty());
}

#[test]
fn missing_consent_warns_without_blocking() {
    let organs = ["HEART", "CORNEA"];
    let result = validate_donor(
        &EligibilityPolicy::default(),
        &DonorScreening {
            donation_mode: DonationMode::Deceased,
            organs: &organs,
            age: 30,
            consent_on_file: false,
        },
    );

    assert!(result.is_valid());
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("Consent"));
}

#[test]
fn custom_policy_moves_the_age_band() {
    let policy = EligibilityPolicy {
        minimum_living_donor_age: 21,
        senior_living_donor_age: 60,
    };
    let organs = ["KIDNEY"];
    let result = validate_donor(
        &policy,
        &DonorScreening {
            donation_mode: DonationMode::Living,
            organs: &organs,
            age: 19,
            consent_on_file: true,
        },
    );
    assert!(!result.is_valid());
    assert!(result.errors[0].contains("21"));
}
