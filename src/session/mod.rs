//! Session driver: the balance → play → wait → claim loop.
//!
//! ```text
//! INIT ──► PLAYING ──► CLAIMING ──► PLAYING ... ──► STOPPED
//!             │  ▲
//!             └──┘  no game obtained: wait, retry the cycle
//! ```
//!
//! The driver never retries a client call itself; transient failures are the
//! client's business. It only decides whether to continue, skip, or stop.

pub mod driver;
pub mod pacing;

pub use driver::{SessionDriver, SessionReport, StopReason};
pub use pacing::Pacing;
