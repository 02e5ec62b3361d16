use rand::Rng;
use std::ops::Range;
use std::time::Duration;

use crate::{Error, ErrorContext, Result};

/// Random draws and fixed waits that shape one game cycle.
///
/// All ranges are inclusive-low, exclusive-high. [`Pacing::new`] refuses empty
/// ones, so a draw never panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pacing {
    points: Range<u32>,
    play_secs: Range<u64>,
    rest_secs: Range<u64>,
    reconnect_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            points: 250..500,
            play_secs: 150..161,
            rest_secs: 5..11,
            reconnect_delay: Duration::from_secs(3),
        }
    }
}

impl Pacing {
    /// `points` is reported per claim, `play_secs` is the wait before claiming,
    /// `rest_secs` the wait between games. `reconnect_delay` applies when
    /// start-play yields no game.
    pub fn new(
        points: Range<u32>,
        play_secs: Range<u64>,
        rest_secs: Range<u64>,
        reconnect_delay: Duration,
    ) -> Result<Self> {
        non_empty("points", &points)?;
        non_empty("play_secs", &play_secs)?;
        non_empty("rest_secs", &rest_secs)?;
        Ok(Self {
            points,
            play_secs,
            rest_secs,
            reconnect_delay,
        })
    }

    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }

    pub fn draw_points<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.points.clone())
    }

    pub fn draw_play_time<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_secs(rng.gen_range(self.play_secs.clone()))
    }

    pub fn draw_rest<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_secs(rng.gen_range(self.rest_secs.clone()))
    }
}

fn non_empty<T: PartialOrd + std::fmt::Debug>(name: &str, range: &Range<T>) -> Result<()> {
    if range.is_empty() {
        return Err(Error::configuration(
            "pacing range is empty",
            ErrorContext::for_setting(name)
                .value(format!("{:?}", range))
                .origin("pacing"),
        ));
    }
    Ok(())
}
