//! Resilient game API client.
//!
//! Three operations (fetch-balance, start-play, claim), each wrapping the
//! transport with status interpretation and bounded self-retry. Results cross
//! into the session layer as [`Outcome`] values, never as errors.

pub mod context;
pub mod core;
pub mod endpoint;
pub mod policy;
pub mod types;

pub use context::{Credential, RequestContext};
pub use self::core::GameClient;
pub use endpoint::{Operation, DEFAULT_BASE_URL};
pub use policy::{RetryKind, RetryPolicy, RetryRule};
pub use types::{Attempted, Attempts, BalanceSnapshot, ClaimResult, GameSession, Outcome};
