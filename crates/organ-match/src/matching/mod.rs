//! Donor/recipient matching: eligibility screening, blood-group compatibility, composite
//! scoring, match generation and the accept/reject lifecycle.
//!
//! Storage is reached only through [`MatchRepository`]; [`InMemoryMatchRepository`] is the
//! bundled implementation used by the CLI and the tests.

mod clock;
pub mod compatibility;
pub mod domain;
pub mod eligibility;
mod error;
mod generator;
pub mod import;
mod lifecycle;
mod memory;
pub mod record;
mod registration;
pub mod report;
pub mod repository;
pub mod scoring;
mod service;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    BloodType, DonationMode, Donor, DonorId, DonorStatus, HospitalId, Location, OrganType,
    Recipient, RecipientId, RecipientStatus, UnknownLabel, UrgencyTier,
};
pub use eligibility::{EligibilityPolicy, ValidationResult};
pub use error::MatchingError;
pub use generator::{GenerationReport, PairFailure};
pub use import::{ImportError, RegistryImporter};
pub use lifecycle::{AcceptOutcome, MatchStats};
pub use memory::InMemoryMatchRepository;
pub use record::{ActorId, Decision, MatchId, MatchRecord, MatchStatus, NewMatch};
pub use registration::{DonorRegistration, RecipientRegistration, RegisteredDonor};
pub use report::{OrganDemand, OrganDemandReport};
pub use repository::{
    DonorFilter, MatchRepository, RecipientFilter, RepositoryError, RepositoryTransaction,
};
pub use scoring::{ScoreBreakdown, ScoreInput};
pub use service::MatchingService;
