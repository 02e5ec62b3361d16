use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::fmt;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::pacing::Pacing;
use crate::client::{BalanceSnapshot, Credential, GameClient, GameSession, Outcome, RequestContext};

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The last balance read showed no play passes.
    NoPlayPasses,
    /// The server rejected the session token.
    AuthExpired,
    /// start-play refused outright; carries the server message.
    OutOfTickets(String),
    /// The configured game cap was reached.
    GameLimitReached,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::NoPlayPasses => f.write_str("no play passes left"),
            StopReason::AuthExpired => f.write_str("access token expired or invalid"),
            StopReason::OutOfTickets(msg) => write!(f, "cannot start game: {}", msg),
            StopReason::GameLimitReached => f.write_str("game limit reached"),
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub games_played: u32,
    pub stop_reason: StopReason,
    /// Most recent successful balance read.
    pub last_balance: Option<BalanceSnapshot>,
}

enum State {
    Init,
    Playing,
    Claiming {
        game: GameSession,
        old_balance: Option<f64>,
    },
    Stopped(StopReason),
}

/// Mutable facts of one run. Play passes come only from the latest balance read.
#[derive(Default)]
struct Tally {
    play_passes: i64,
    games_played: u32,
    last_balance: Option<BalanceSnapshot>,
}

impl Tally {
    fn observe(&mut self, balance: &BalanceSnapshot) {
        self.play_passes = balance.play_passes;
        self.last_balance = Some(balance.clone());
    }
}

fn auth_stop() -> State {
    warn!("Access token is expired or invalid. Update the access token and re-run.");
    State::Stopped(StopReason::AuthExpired)
}

/// Owns the control loop. Strictly sequential: one request or one wait at a time.
pub struct SessionDriver {
    client: GameClient,
    pacing: Pacing,
    rng: Box<dyn RngCore + Send>,
    max_games: Option<u32>,
}

impl SessionDriver {
    pub fn new(client: GameClient) -> Self {
        Self {
            client,
            pacing: Pacing::default(),
            rng: Box::new(StdRng::from_entropy()),
            max_games: None,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Swap the random source, e.g. a seeded `StdRng` for reproducible runs.
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Stop after this many completed games even if passes remain.
    pub fn with_max_games(mut self, max_games: Option<u32>) -> Self {
        self.max_games = max_games;
        self
    }

    /// Run until a terminal state is reached.
    pub async fn run(&mut self, credential: &Credential) -> SessionReport {
        let span = info_span!("session", run_id = %Uuid::new_v4());
        self.run_inner(credential).instrument(span).await
    }

    async fn run_inner(&mut self, credential: &Credential) -> SessionReport {
        let ctx = RequestContext::new(credential);
        let mut tally = Tally::default();
        let mut state = State::Init;

        let stop_reason = loop {
            state = match state {
                State::Init => self.init(&ctx, &mut tally).await,
                State::Playing => self.play(&ctx, &mut tally).await,
                State::Claiming { game, old_balance } => {
                    self.claim(&ctx, &mut tally, game, old_balance).await
                }
                State::Stopped(reason) => break reason,
            };
        };

        info!(
            games_played = tally.games_played,
            reason = %stop_reason,
            "[ DONE ALL ]"
        );

        SessionReport {
            games_played: tally.games_played,
            stop_reason,
            last_balance: tally.last_balance,
        }
    }

    async fn init(&mut self, ctx: &RequestContext, tally: &mut Tally) -> State {
        match self.client.fetch_balance(ctx).await.outcome {
            Outcome::AuthExpired => auth_stop(),
            Outcome::Success(balance) => {
                info!(
                    balance = ?balance.available_balance,
                    play_passes = balance.play_passes,
                    "session started"
                );
                tally.observe(&balance);
                State::Playing
            }
            _ => State::Playing,
        }
    }

    async fn play(&mut self, ctx: &RequestContext, tally: &mut Tally) -> State {
        if let Some(max) = self.max_games {
            if tally.games_played >= max {
                info!(max_games = max, "game limit reached");
                return State::Stopped(StopReason::GameLimitReached);
            }
        }

        if tally.play_passes <= 0 {
            info!("No play passes left");
            return State::Stopped(StopReason::NoPlayPasses);
        }

        let game_no = tally.games_played + 1;
        info!(game = game_no, play_passes = tally.play_passes, "Play game..");

        let old_balance = match self.client.fetch_balance(ctx).await.outcome {
            Outcome::AuthExpired => return auth_stop(),
            Outcome::Success(balance) => {
                tally.observe(&balance);
                balance.available_balance
            }
            _ => None,
        };

        if tally.play_passes <= 0 {
            info!("No play passes left");
            return State::Stopped(StopReason::NoPlayPasses);
        }

        match self.client.start_play(ctx).await.outcome {
            Outcome::Success(game) => {
                info!(
                    game = game_no,
                    game_id = game.game_id.as_str(),
                    balance = ?old_balance,
                    "game started"
                );
                State::Claiming { game, old_balance }
            }
            Outcome::AuthExpired => auth_stop(),
            Outcome::Rejected(message) => {
                warn!(
                    message = message.as_str(),
                    "Cannot play game due to out of tickets. Invite more to get more tickets"
                );
                State::Stopped(StopReason::OutOfTickets(message))
            }
            Outcome::Unavailable | Outcome::Unknown => {
                let delay = self.pacing.reconnect_delay();
                warn!(
                    delay_ms = delay.as_millis() as u64,
                    "Cannot connect to start the game, waiting before trying again"
                );
                self.client.sleeper().sleep(delay).await;
                State::Playing
            }
        }
    }

    async fn claim(
        &mut self,
        ctx: &RequestContext,
        tally: &mut Tally,
        game: GameSession,
        old_balance: Option<f64>,
    ) -> State {
        let points = self.pacing.draw_points(&mut self.rng);
        let play_time = self.pacing.draw_play_time(&mut self.rng);

        info!(
            game_id = game.game_id.as_str(),
            seconds = play_time.as_secs(),
            "Playing the game"
        );
        self.client.sleeper().sleep(play_time).await;

        let claim = self.client.claim(ctx, &game, points).await;
        let claim_status = match &claim.outcome {
            Outcome::AuthExpired => return auth_stop(),
            Outcome::Success(result) => result.as_str().to_string(),
            other => other.label().to_string(),
        };
        tally.games_played += 1;

        let new_balance = match self.client.fetch_balance(ctx).await.outcome {
            Outcome::AuthExpired => return auth_stop(),
            Outcome::Success(balance) => {
                tally.observe(&balance);
                balance.available_balance
            }
            _ => None,
        };

        let gained = old_balance.zip(new_balance).map(|(old, new)| new - old);
        info!(
            game_id = game.game_id.as_str(),
            claim_status = claim_status.as_str(),
            points,
            gained = ?gained,
            new_balance = ?new_balance,
            "game claimed"
        );

        let rest = self.pacing.draw_rest(&mut self.rng);
        self.client.sleeper().sleep(rest).await;

        State::Playing
    }
}
