use super::eligibility::ValidationResult;
use super::record::{MatchId, MatchStatus};
use super::repository::RepositoryError;

/// Error raised by the matching engine. Nothing here is fatal to the process; retry
/// policy belongs to the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchingError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("eligibility check failed: {0}")]
    ValidationFailed(ValidationResult),
    #[error("match {match_id} already decided ({status})")]
    Conflict {
        match_id: MatchId,
        status: MatchStatus,
    },
    #[error("{entity} {id} already registered")]
    DuplicateRecord { entity: &'static str, id: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl MatchingError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Maps a failed conditional update on `match_id` to the engine's taxonomy.
    pub(crate) fn from_decision(match_id: MatchId, error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => Self::not_found("match", match_id),
            RepositoryError::StatusMismatch { actual, .. } => Self::Conflict {
                match_id,
                status: actual,
            },
            other => Self::Repository(other),
        }
    }
}
