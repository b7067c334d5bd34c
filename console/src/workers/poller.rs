//! Polling worker for periodic sync

use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::http::api::DeviceApi;
use crate::sync::session::{SessionController, SessionState};

/// Poller worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Polling interval
    pub interval: Duration,

    /// Delay before the first cycle
    pub initial_delay: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            initial_delay: Duration::ZERO,
        }
    }
}

/// Run sync cycles until `shutdown_signal` resolves.
///
/// `on_cycle` receives the session snapshot after every cycle, whether the
/// cycle succeeded or not.
pub async fn run<A, S, F, O>(
    options: &Options,
    session: &SessionController<A>,
    sleep_fn: S,
    mut on_cycle: O,
    mut shutdown_signal: BoxFuture<'static, ()>,
) where
    A: DeviceApi,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
    O: FnMut(&SessionState),
{
    info!("Poller worker starting, interval {:?}", options.interval);

    let mut delay = options.initial_delay;
    loop {
        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("Poller worker shutting down...");
                return;
            }
            _ = sleep_fn(delay) => {}
        }
        delay = options.interval;

        debug!("Polling for updates...");
        if let Err(e) = session.sync().await {
            warn!("Sync cycle failed: {}", e);
        }
        on_cycle(&session.snapshot());
    }
}
