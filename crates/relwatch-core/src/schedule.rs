use std::future::Future;
use std::time::Duration;

use log::debug;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// When periodic checks fire: once after `initial_delay`, then every `interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub initial_delay: Duration,
    pub interval: Duration,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl Schedule {
    #[must_use]
    pub fn new(initial_delay: Duration, interval: Duration) -> Self {
        Self {
            initial_delay,
            interval,
        }
    }
}

/// Drive `tick` on `schedule` until `token` is cancelled.
///
/// Each tick is awaited before the next one is considered, so ticks never
/// overlap. A tick still running at cancellation is dropped.
pub async fn run_schedule<F, Fut>(schedule: Schedule, token: CancellationToken, mut tick: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    tokio::select! {
        biased;
        () = token.cancelled() => return,
        () = tokio::time::sleep(schedule.initial_delay) => {}
    }

    let interval = schedule.interval.max(MIN_INTERVAL);
    let mut ticker = tokio::time::interval_at(Instant::now(), interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        debug!("Scheduled release check firing");
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            () = tick() => {}
        }
    }

    debug!("Release check schedule stopped");
}
