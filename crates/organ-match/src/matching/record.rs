use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::{DonorId, OrganType, RecipientId};
use super::scoring::ScoreBreakdown;

/// Match identifier. UUIDv7 keeps ids ordered by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchId(pub Uuid);

impl MatchId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whoever recorded a decision: a hospital user, or the engine itself for expiries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

impl ActorId {
    pub fn system() -> Self {
        Self("system".to_string())
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
}

impl MatchStatus {
    pub const fn label(self) -> &'static str {
        match self {
            MatchStatus::Pending => "PENDING",
            MatchStatus::Accepted => "ACCEPTED",
            MatchStatus::Rejected => "REJECTED",
            MatchStatus::Expired => "EXPIRED",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, MatchStatus::Pending)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Who moved a match out of `PENDING`, when, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub decided_at: DateTime<Utc>,
    pub decided_by: ActorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Stored pairing of one donor organ with one recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub donor_id: DonorId,
    pub recipient_id: RecipientId,
    pub organ: OrganType,
    pub score: ScoreBreakdown,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
}

impl MatchRecord {
    pub fn rejection_reason(&self) -> Option<&str> {
        match self.status {
            MatchStatus::Rejected => self
                .decision
                .as_ref()
                .and_then(|decision| decision.reason.as_deref()),
            _ => None,
        }
    }
}

/// Insert request handed to the repository by the generator.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMatch {
    pub donor_id: DonorId,
    pub recipient_id: RecipientId,
    pub organ: OrganType,
    pub score: ScoreBreakdown,
    pub created_at: DateTime<Utc>,
}

impl NewMatch {
    pub fn into_record(self, id: MatchId) -> MatchRecord {
        MatchRecord {
            id,
            donor_id: self.donor_id,
            recipient_id: self.recipient_id,
            organ: self.organ,
            score: self.score,
            status: MatchStatus::Pending,
            created_at: self.created_at,
            decision: None,
        }
    }
}
