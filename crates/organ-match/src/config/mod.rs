use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::matching::eligibility::{
    EligibilityPolicy, DEFAULT_MINIMUM_LIVING_DONOR_AGE, DEFAULT_SENIOR_LIVING_DONOR_AGE,
};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub eligibility: EligibilityPolicy,
    pub intake: IntakeConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let eligibility = EligibilityPolicy {
            minimum_living_donor_age: age_var(
                "MATCHING_MIN_LIVING_DONOR_AGE",
                DEFAULT_MINIMUM_LIVING_DONOR_AGE,
            )?,
            senior_living_donor_age: age_var(
                "MATCHING_SENIOR_LIVING_DONOR_AGE",
                DEFAULT_SENIOR_LIVING_DONOR_AGE,
            )?,
        };
        if eligibility.minimum_living_donor_age > eligibility.senior_living_donor_age {
            return Err(ConfigError::InvertedAgeBand {
                minimum: eligibility.minimum_living_donor_age,
                senior: eligibility.senior_living_donor_age,
            });
        }

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            eligibility,
            intake: IntakeConfig {
                donors_csv: path_var("MATCHING_DONORS_CSV"),
                recipients_csv: path_var("MATCHING_RECIPIENTS_CSV"),
            },
        })
    }
}

/// Registry exports loaded when the CLI is not given explicit paths.
#[derive(Debug, Clone, Default)]
pub struct IntakeConfig {
    pub donors_csv: Option<PathBuf>,
    pub recipients_csv: Option<PathBuf>,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn age_var(var: &'static str, default: u8) -> Result<u8, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u8>()
            .map_err(|_| ConfigError::InvalidNumber { var }),
        Err(_) => Ok(default),
    }
}

fn path_var(var: &str) -> Option<PathBuf> {
    env::var(var)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { var: &'static str },
    InvertedAgeBand { minimum: u8, senior: u8 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { var } => {
                write!(f, "{} must be a whole number between 0 and 255", var)
            }
            ConfigError::InvertedAgeBand { minimum, senior } => write!(
                f,
                "minimum living donor age {} exceeds senior threshold {}",
                minimum, senior
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
