//! # playpass
//!
//! Spends game play passes against the Blum game API, one game at a time:
//! read the balance, start a game, wait out a plausible play time, claim
//! points, repeat until the passes run out or the session token is rejected.
//!
//! ## Layers
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`transport`] | Executes one HTTP request; no retries, no status interpretation |
//! | [`client`] | fetch-balance / start-play / claim with bounded self-retry |
//! | [`session`] | The control loop: when to continue, wait, skip or stop |
//! | [`pace`] | Timed waits behind a trait so tests can skip them |
//! | [`config`] | Base URL, proxy and credential resolution |
//!
//! Control flows driver → client → transport. The client finishes its own
//! retries before returning; the driver only re-enters its loop.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use playpass::client::{Credential, GameClient};
//! use playpass::session::SessionDriver;
//! use playpass::transport::HttpTransport;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> playpass::Result<()> {
//!     let transport = Arc::new(HttpTransport::from_env()?);
//!     let mut driver = SessionDriver::new(GameClient::new(transport));
//!     let report = driver.run(&Credential::new("Bearer ...")).await;
//!     println!("{} games, stopped: {}", report.games_played, report.stop_reason);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod pace;
pub mod session;
pub mod testing;
pub mod transport;

pub use client::{Credential, GameClient, Outcome};
pub use session::{SessionDriver, SessionReport, StopReason};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
