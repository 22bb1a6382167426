//! Fixed-cadence refresh of a displayed list.

use std::time::Duration;

use futures::future::BoxFuture;
use tokio::{
    task::{JoinHandle, JoinSet},
    time::{self, Instant, MissedTickBehavior},
};
use tracing::debug;

/// Running poll loop. Stopping (or dropping) it cancels the timer together
/// with every fetch it started that is still in flight.
#[derive(Debug)]
pub struct Handle {
    task: JoinHandle<()>,
}

impl Handle {
    /// Cancels polling; same as dropping the handle.
    pub fn stop(self) {
        drop(self);
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        self.task.abort();
        debug!("polling stopped");
    }
}

/// Issues `fetch` right away, then once every `period`.
///
/// Ticks do not wait for earlier fetches: a slow fetch may overlap the next
/// one, and whichever finishes last wins. Must be called inside a tokio
/// runtime.
pub fn start<F>(period: Duration, mut fetch: F) -> Handle
where
    F: FnMut() -> BoxFuture<'static, ()> + Send + 'static,
{
    // `interval_at` panics on a zero period.
    let period = period.max(Duration::from_millis(1));
    let mut fetches = JoinSet::new();
    fetches.spawn(fetch());
    let first_tick = Instant::now() + period;

    let task = tokio::spawn(async move {
        let mut ticks = time::interval_at(first_tick, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticks.tick().await;
            while fetches.try_join_next().is_some() {}
            fetches.spawn(fetch());
        }
    });
    debug!(?period, "polling started");

    Handle { task }
}
