use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::context::RequestContext;
use super::endpoint::{Operation, DEFAULT_BASE_URL};
use super::policy::{Decision, RetryPolicy, GAME_BUSY_MESSAGE};
use super::types::{
    ApiMessage, Attempted, Attempts, BalanceSnapshot, ClaimResult, GameSession, Outcome,
};
use crate::pace::{self, Sleeper};
use crate::transport::{HttpRequest, HttpResponse, Transport};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClaimRequest<'a> {
    game_id: &'a str,
    points: u32,
}

/// Game API client. Each operation retries its own transient failures and
/// reports everything else as an [`Outcome`]; it never returns an error.
pub struct GameClient {
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
    base_url: String,
}

impl GameClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            sleeper: pace::tokio_sleeper(),
            policy: RetryPolicy::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub(crate) fn sleeper(&self) -> &Arc<dyn Sleeper> {
        &self.sleeper
    }

    /// Read the current balance and remaining play passes.
    pub async fn fetch_balance(&self, ctx: &RequestContext) -> Attempted<BalanceSnapshot> {
        let op = Operation::Balance;
        let (response, attempts) = self.send(op, ctx, None).await;

        let outcome = match response {
            None => {
                warn!("Cannot get balance");
                Outcome::Unknown
            }
            Some(resp) => match resp.status {
                401 => auth_expired(op, &resp),
                503 => Outcome::Unavailable,
                _ if resp.is_success() => match resp.json::<BalanceSnapshot>() {
                    Ok(balance) => Outcome::Success(balance),
                    Err(e) => {
                        warn!(error = %e, "Cannot get balance: unreadable body");
                        Outcome::Unknown
                    }
                },
                status => unexpected(op, status, &resp),
            },
        };

        Attempted { outcome, attempts }
    }

    /// Spend one play pass and open a game.
    pub async fn start_play(&self, ctx: &RequestContext) -> Attempted<GameSession> {
        let op = Operation::StartPlay;
        let (response, attempts) = self.send(op, ctx, None).await;

        let outcome = match response {
            None => Outcome::Unknown,
            Some(resp) => match resp.status {
                401 => auth_expired(op, &resp),
                503 => Outcome::Unavailable,
                400 => {
                    let message = resp.json::<ApiMessage>().unwrap_or_default().message;
                    if message == GAME_BUSY_MESSAGE {
                        // Busy retries exhausted; looks like a connection hiccup to the caller.
                        Outcome::Unknown
                    } else {
                        Outcome::Rejected(message)
                    }
                }
                _ if resp.is_success() => match resp.json::<GameSession>() {
                    Ok(game) => Outcome::Success(game),
                    Err(e) => {
                        warn!(error = %e, "play response carried no gameId");
                        Outcome::Unknown
                    }
                },
                status => unexpected(op, status, &resp),
            },
        };

        Attempted { outcome, attempts }
    }

    /// Report points for a finished game.
    pub async fn claim(
        &self,
        ctx: &RequestContext,
        game: &GameSession,
        points: u32,
    ) -> Attempted<ClaimResult> {
        let op = Operation::Claim;
        let body = match serde_json::to_string(&ClaimRequest {
            game_id: &game.game_id,
            points,
        }) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "cannot encode claim body");
                return Attempted {
                    outcome: Outcome::Unknown,
                    attempts: Attempts::default(),
                };
            }
        };

        let (response, attempts) = self.send(op, ctx, Some(body)).await;

        let outcome = match response {
            None => Outcome::Unknown,
            Some(resp) => match resp.status {
                200 => Outcome::Success(ClaimResult(resp.body)),
                401 => auth_expired(op, &resp),
                503 => Outcome::Unavailable,
                status => unexpected(op, status, &resp),
            },
        };

        Attempted { outcome, attempts }
    }

    /// Send one logical call, retrying transient responses per the policy.
    ///
    /// Returns the last response received (the retried one, not the first),
    /// or `None` when the transport itself failed.
    async fn send(
        &self,
        op: Operation,
        ctx: &RequestContext,
        body: Option<String>,
    ) -> (Option<HttpResponse>, Attempts) {
        let mut attempts = Attempts::default();

        loop {
            let request = HttpRequest {
                method: op.method(),
                url: op.url(&self.base_url),
                headers: ctx.headers_for(op),
                body: body.clone(),
            };
            attempts.sent += 1;

            let response = match self.transport.execute(request).await {
                Ok(resp) => resp,
                Err(e) => {
                    warn!(operation = op.name(), error = %e, "request failed");
                    return (None, attempts);
                }
            };

            debug!(
                operation = op.name(),
                http_status = response.status,
                attempt = attempts.sent,
                "response received"
            );

            let Some(kind) = RetryPolicy::classify(op, &response) else {
                return (Some(response), attempts);
            };

            match self.policy.decide(kind, &attempts) {
                Decision::Retry { delay } => {
                    let rule = self.policy.rule(kind);
                    info!(
                        operation = op.name(),
                        retry_kind = kind.as_str(),
                        retry = attempts.retries(kind) + 1,
                        max_retries = rule.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "transient response, retrying"
                    );
                    self.sleeper.sleep(delay).await;
                    attempts.record_retry(kind);
                }
                Decision::GiveUp => {
                    warn!(
                        operation = op.name(),
                        retry_kind = kind.as_str(),
                        retries = attempts.retries(kind),
                        "giving up after retries"
                    );
                    return (Some(response), attempts);
                }
            }
        }
    }
}

fn auth_expired<T>(op: Operation, resp: &HttpResponse) -> Outcome<T> {
    let message = resp.json::<ApiMessage>().unwrap_or_default().message;
    info!(operation = op.name(), message = message.as_str(), "session token rejected");
    Outcome::AuthExpired
}

fn unexpected<T>(op: Operation, status: u16, resp: &HttpResponse) -> Outcome<T> {
    warn!(
        operation = op.name(),
        http_status = status,
        body = resp.text(),
        "unexpected response"
    );
    Outcome::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::context::Credential;
    use crate::client::policy::RetryKind;
    use crate::pace::RecordingSleeper;
    use crate::testing::ScriptedTransport;
    use std::time::Duration;

    fn client(transport: &Arc<ScriptedTransport>, sleeper: &RecordingSleeper) -> GameClient {
        GameClient::new(transport.clone())
            .with_base_url("http://game.test/api/v1")
            .with_sleeper(Arc::new(sleeper.clone()))
    }

    fn ctx() -> RequestContext {
        RequestContext::new(&Credential::new("Bearer test"))
    }

    #[tokio::test]
    async fn balance_success() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(
            Operation::Balance,
            200,
            r#"{"availableBalance":"10.5","playPasses":3}"#,
        );
        let sleeper = RecordingSleeper::new();

        let got = client(&transport, &sleeper).fetch_balance(&ctx()).await;
        assert_eq!(
            got.outcome,
            Outcome::Success(BalanceSnapshot {
                available_balance: Some(10.5),
                play_passes: 3
            })
        );
        assert_eq!(got.attempts.sent, 1);

        let sent = transport.requests();
        assert_eq!(sent[0].url, "http://game.test/api/v1/user/balance");
        assert_eq!(sent[0].header("authorization"), Some("Bearer test"));
        assert!(sleeper.recorded().is_empty());
    }

    #[tokio::test]
    async fn balance_401_is_auth_expired_without_retry() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Operation::Balance, 401, r#"{"message":"Invalid jwt token"}"#);
        let sleeper = RecordingSleeper::new();

        let got = client(&transport, &sleeper).fetch_balance(&ctx()).await;
        assert_eq!(got.outcome, Outcome::AuthExpired);
        assert_eq!(transport.count(Operation::Balance), 1);
    }

    #[tokio::test]
    async fn balance_503_retries_once_and_uses_retried_body() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Operation::Balance, 503, "");
        transport.push(Operation::Balance, 200, r#"{"availableBalance":4,"playPasses":2}"#);
        let sleeper = RecordingSleeper::new();

        let got = client(&transport, &sleeper).fetch_balance(&ctx()).await;
        assert_eq!(got.outcome.as_success().map(|b| b.play_passes), Some(2));
        assert_eq!(got.attempts.sent, 2);
        assert_eq!(got.attempts.unavailable_retries, 1);
        assert_eq!(sleeper.recorded(), vec![Duration::from_secs(3)]);
    }

    #[tokio::test]
    async fn sustained_503_stops_after_one_retry() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Operation::Claim, 503, "");
        let sleeper = RecordingSleeper::new();
        let game = GameSession {
            game_id: "g".into(),
        };

        let got = client(&transport, &sleeper).claim(&ctx(), &game, 300).await;
        assert_eq!(got.outcome, Outcome::Unavailable);
        assert_eq!(transport.count(Operation::Claim), 2);
        assert_eq!(sleeper.recorded(), vec![Duration::from_secs(3)]);
    }

    #[tokio::test]
    async fn busy_start_play_retries_five_times_then_gives_up() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Operation::StartPlay, 400, r#"{"message":"cannot start game"}"#);
        let sleeper = RecordingSleeper::new();

        let got = client(&transport, &sleeper).start_play(&ctx()).await;
        assert_eq!(got.outcome, Outcome::Unknown);
        assert_eq!(got.attempts.busy_retries, 5);
        assert_eq!(got.attempts.retries(RetryKind::GameBusy), 5);
        assert_eq!(transport.count(Operation::StartPlay), 6);
        assert_eq!(sleeper.recorded(), vec![Duration::from_secs(5); 5]);
    }

    #[tokio::test]
    async fn busy_then_game_id() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Operation::StartPlay, 400, r#"{"message":"cannot start game"}"#);
        transport.push(Operation::StartPlay, 400, r#"{"message":"cannot start game"}"#);
        transport.push(Operation::StartPlay, 200, r#"{"gameId":"abc"}"#);
        let sleeper = RecordingSleeper::new();

        let got = client(&transport, &sleeper).start_play(&ctx()).await;
        assert_eq!(
            got.outcome,
            Outcome::Success(GameSession {
                game_id: "abc".into()
            })
        );
        assert_eq!(got.attempts.busy_retries, 2);
    }

    #[tokio::test]
    async fn other_400_on_start_play_is_rejected() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(
            Operation::StartPlay,
            400,
            r#"{"message":"not enough play passes"}"#,
        );
        let sleeper = RecordingSleeper::new();

        let got = client(&transport, &sleeper).start_play(&ctx()).await;
        assert_eq!(got.outcome, Outcome::Rejected("not enough play passes".into()));
        assert_eq!(got.attempts.sent, 1);
    }

    #[tokio::test]
    async fn start_play_sends_no_body_and_zero_length() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Operation::StartPlay, 200, r#"{"gameId":"x"}"#);
        let sleeper = RecordingSleeper::new();

        client(&transport, &sleeper).start_play(&ctx()).await;
        let sent = transport.requests();
        assert_eq!(sent[0].body, None);
        assert_eq!(sent[0].header("content-length"), Some("0"));
        assert_eq!(sent[0].header("content-type"), None);
    }

    #[tokio::test]
    async fn claim_returns_raw_text_on_200() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Operation::Claim, 200, "OK");
        let sleeper = RecordingSleeper::new();
        let game = GameSession {
            game_id: "g1".into(),
        };

        let got = client(&transport, &sleeper).claim(&ctx(), &game, 321).await;
        assert_eq!(got.outcome, Outcome::Success(ClaimResult("OK".into())));

        let sent = transport.requests();
        assert_eq!(sent[0].header("content-type"), Some("application/json"));
        let body: serde_json::Value =
            serde_json::from_str(sent[0].body.as_deref().unwrap_or_default()).unwrap();
        assert_eq!(body, serde_json::json!({"gameId": "g1", "points": 321}));
    }

    #[tokio::test]
    async fn claim_unexpected_status_is_unknown() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Operation::Claim, 404, r#"{"message":"game session not found"}"#);
        let sleeper = RecordingSleeper::new();
        let game = GameSession {
            game_id: "g1".into(),
        };

        let got = client(&transport, &sleeper).claim(&ctx(), &game, 300).await;
        assert_eq!(got.outcome, Outcome::Unknown);
    }

    #[tokio::test]
    async fn transport_failure_is_folded_into_unknown() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_failure(Operation::Balance);
        let sleeper = RecordingSleeper::new();

        let got = client(&transport, &sleeper).fetch_balance(&ctx()).await;
        assert_eq!(got.outcome, Outcome::Unknown);
        assert_eq!(got.attempts.sent, 1);
        assert!(sleeper.recorded().is_empty());
    }

    #[tokio::test]
    async fn malformed_balance_body_is_unknown() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Operation::Balance, 200, "<html>maintenance</html>");
        let sleeper = RecordingSleeper::new();

        let got = client(&transport, &sleeper).fetch_balance(&ctx()).await;
        assert_eq!(got.outcome, Outcome::Unknown);
    }

    #[tokio::test]
    async fn claim_401_is_auth_expired() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Operation::Claim, 401, r#"{"message":"Invalid jwt token"}"#);
        let sleeper = RecordingSleeper::new();
        let game = GameSession {
            game_id: "g".into(),
        };

        let got = client(&transport, &sleeper).claim(&ctx(), &game, 300).await;
        assert_eq!(got.outcome, Outcome::AuthExpired);
        assert_eq!(got.attempts.sent, 1);
        assert_eq!(transport.count(Operation::Claim), 1);
        assert!(sleeper.recorded().is_empty());
    }

    #[tokio::test]
    async fn claim_503_then_ok_returns_retried_text() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Operation::Claim, 503, "Service Unavailable");
        transport.push(Operation::Claim, 200, "OK");
        let sleeper = RecordingSleeper::new();
        let game = GameSession {
            game_id: "g7".into(),
        };

        let got = client(&transport, &sleeper).claim(&ctx(), &game, 321).await;
        assert_eq!(got.outcome, Outcome::Success(ClaimResult("OK".into())));
        assert_eq!(got.attempts.sent, 2);
        assert_eq!(got.attempts.unavailable_retries, 1);
        assert_eq!(transport.count(Operation::Claim), 2);
        assert_eq!(sleeper.recorded(), vec![Duration::from_secs(3)]);
    }
}
