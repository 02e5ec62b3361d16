use std::time::Duration;

use super::endpoint::Operation;
use super::types::{ApiMessage, Attempts};
use crate::transport::HttpResponse;

/// Message the play endpoint returns while the previous game is still settling.
pub const GAME_BUSY_MESSAGE: &str = "cannot start game";

/// Transient conditions the client retries on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetryKind {
    /// HTTP 503 on any endpoint.
    ServiceUnavailable,
    /// HTTP 400 "cannot start game" on start-play.
    GameBusy,
}

impl RetryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetryKind::ServiceUnavailable => "service_unavailable",
            RetryKind::GameBusy => "game_busy",
        }
    }
}

/// Fixed delay and retry ceiling for one kind of transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryRule {
    pub delay: Duration,
    pub max_retries: u32,
}

/// Delay table per error kind. Counters are per call, never shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub service_unavailable: RetryRule,
    pub game_busy: RetryRule,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            service_unavailable: RetryRule {
                delay: Duration::from_secs(3),
                max_retries: 1,
            },
            game_busy: RetryRule {
                delay: Duration::from_secs(5),
                max_retries: 5,
            },
        }
    }
}

/// Internal decision for how to proceed after a transient response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Retry { delay: Duration },
    GiveUp,
}

impl RetryPolicy {
    pub fn rule(&self, kind: RetryKind) -> RetryRule {
        match kind {
            RetryKind::ServiceUnavailable => self.service_unavailable,
            RetryKind::GameBusy => self.game_busy,
        }
    }

    /// Which retry kind, if any, a response belongs to.
    pub fn classify(operation: Operation, response: &HttpResponse) -> Option<RetryKind> {
        match response.status {
            503 => Some(RetryKind::ServiceUnavailable),
            400 if operation == Operation::StartPlay => {
                let message = response.json::<ApiMessage>().unwrap_or_default().message;
                (message == GAME_BUSY_MESSAGE).then_some(RetryKind::GameBusy)
            }
            _ => None,
        }
    }

    /// Decide what to do after a transient response, given retries already spent.
    pub(crate) fn decide(&self, kind: RetryKind, attempts: &Attempts) -> Decision {
        let rule = self.rule(kind);
        if attempts.retries(kind) < rule.max_retries {
            Decision::Retry { delay: rule.delay }
        } else {
            Decision::GiveUp
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_server_expectations() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.service_unavailable.delay, Duration::from_secs(3));
        assert_eq!(policy.service_unavailable.max_retries, 1);
        assert_eq!(policy.game_busy.delay, Duration::from_secs(5));
        assert_eq!(policy.game_busy.max_retries, 5);
    }

    #[test]
    fn classify_503_everywhere() {
        let resp = HttpResponse::new(503, "");
        for op in [Operation::Balance, Operation::StartPlay, Operation::Claim] {
            assert_eq!(
                RetryPolicy::classify(op, &resp),
                Some(RetryKind::ServiceUnavailable)
            );
        }
    }

    #[test]
    fn busy_only_on_start_play_with_exact_message() {
        let busy = HttpResponse::new(400, r#"{"message":"cannot start game"}"#);
        let other = HttpResponse::new(400, r#"{"message":"not enough play passes"}"#);
        assert_eq!(
            RetryPolicy::classify(Operation::StartPlay, &busy),
            Some(RetryKind::GameBusy)
        );
        assert_eq!(RetryPolicy::classify(Operation::StartPlay, &other), None);
        assert_eq!(RetryPolicy::classify(Operation::Claim, &busy), None);
        assert_eq!(
            RetryPolicy::classify(Operation::StartPlay, &HttpResponse::new(400, "oops")),
            None
        );
    }

    #[test]
    fn decide_respects_ceiling_per_kind() {
        let policy = RetryPolicy::default();
        let mut attempts = Attempts::default();

        assert_eq!(
            policy.decide(RetryKind::ServiceUnavailable, &attempts),
            Decision::Retry {
                delay: Duration::from_secs(3)
            }
        );
        attempts.record_retry(RetryKind::ServiceUnavailable);
        assert_eq!(
            policy.decide(RetryKind::ServiceUnavailable, &attempts),
            Decision::GiveUp
        );

        // Busy retries are counted separately from 503 retries.
        for _ in 0..5 {
            assert!(matches!(
                policy.decide(RetryKind::GameBusy, &attempts),
                Decision::Retry { .. }
            ));
            attempts.record_retry(RetryKind::GameBusy);
        }
        assert_eq!(policy.decide(RetryKind::GameBusy, &attempts), Decision::GiveUp);
    }
}
