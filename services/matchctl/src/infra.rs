use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use organ_match::error::AppError;
use organ_match::matching::{
    EligibilityPolicy, FixedClock, InMemoryMatchRepository, MatchingService,
};

pub(crate) type Service = MatchingService<InMemoryMatchRepository>;

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Midnight UTC on `date`, or the current instant when no date is given.
pub(crate) fn evaluation_instant(date: Option<NaiveDate>) -> DateTime<Utc> {
    date.and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_else(Utc::now)
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Splits a comma or semicolon separated organ list, dropping blanks.
pub(crate) fn split_organs(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|organ| !organ.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn build_service(policy: EligibilityPolicy, now: DateTime<Utc>) -> Arc<Service> {
    Arc::new(MatchingService::with_clock(
        Arc::new(InMemoryMatchRepository::default()),
        policy,
        Arc::new(FixedClock(now)),
    ))
}

pub(crate) fn require_path(
    explicit: Option<PathBuf>,
    configured: Option<&PathBuf>,
    flag: &str,
    env_var: &str,
) -> Result<PathBuf, AppError> {
    explicit.or_else(|| configured.cloned()).ok_or_else(|| {
        AppError::Usage(format!("pass --{flag} or set {env_var} to a registry CSV export"))
    })
}
