use serde::{Deserialize, Deserializer};

use super::policy::RetryKind;

/// Balance endpoint payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSnapshot {
    /// Absent or unreadable amounts are `None`; the pass count still applies.
    #[serde(default, deserialize_with = "number_or_string")]
    pub available_balance: Option<f64>,
    #[serde(default)]
    pub play_passes: i64,
}

/// The live API sends `availableBalance` as a decimal string; older builds sent a number.
fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse::<f64>().ok(),
        Some(Raw::Other(_)) | None => None,
    })
}

/// Server-side game handle, good for exactly one claim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub game_id: String,
}

/// Claim confirmation, kept only for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimResult(pub String);

impl ClaimResult {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Error body shape shared by all endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiMessage {
    #[serde(default)]
    pub message: String,
}

/// What a client call produced once its own retries are spent.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    /// 401: the session token was rejected. Fatal for the session.
    AuthExpired,
    /// 503 persisted past the retry.
    Unavailable,
    /// 400 the server will not change its mind about (e.g. out of tickets).
    Rejected(String),
    /// Transport or decode failure, unexpected status, or retries exhausted.
    Unknown,
}

impl<T> Outcome<T> {
    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_success(&self) -> Option<&T> {
        match self {
            Outcome::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Outcome::AuthExpired)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::AuthExpired => "auth_expired",
            Outcome::Unavailable => "unavailable",
            Outcome::Rejected(_) => "rejected",
            Outcome::Unknown => "unknown",
        }
    }
}

/// Per-call retry counters, one per retry kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attempts {
    /// Requests actually sent, first try included.
    pub sent: u32,
    pub unavailable_retries: u32,
    pub busy_retries: u32,
}

impl Attempts {
    pub fn retries(&self, kind: RetryKind) -> u32 {
        match kind {
            RetryKind::ServiceUnavailable => self.unavailable_retries,
            RetryKind::GameBusy => self.busy_retries,
        }
    }

    pub(crate) fn record_retry(&mut self, kind: RetryKind) {
        match kind {
            RetryKind::ServiceUnavailable => self.unavailable_retries += 1,
            RetryKind::GameBusy => self.busy_retries += 1,
        }
    }
}

/// An outcome plus how hard the client tried to get it.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempted<T> {
    pub outcome: Outcome<T>,
    pub attempts: Attempts,
}
