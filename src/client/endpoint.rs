//! Fixed endpoint table of the game API.

use crate::transport::Method;

pub const DEFAULT_BASE_URL: &str = "https://game-domain.blum.codes/api/v1";

/// The three calls the runner makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Balance,
    StartPlay,
    Claim,
}

impl Operation {
    pub fn method(&self) -> Method {
        match self {
            Operation::Balance => Method::Get,
            Operation::StartPlay | Operation::Claim => Method::Post,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Operation::Balance => "/user/balance",
            Operation::StartPlay => "/game/play",
            Operation::Claim => "/game/claim",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Balance => "fetch_balance",
            Operation::StartPlay => "start_play",
            Operation::Claim => "claim",
        }
    }

    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path())
    }
}
