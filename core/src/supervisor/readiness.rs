//! Bounded readiness polling

use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};

use crate::traits::Probe;

/// Interval between readiness probes
pub const READINESS_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Outcome of polling a server for readiness
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// The expected body was served
    Ready,

    /// The server answered, but with the wrong body
    Mismatch {
        /// Status of the reply
        status: u16,
        /// Body actually received
        body: String,
    },

    /// No valid answer before the deadline
    TimedOut,
}

/// Request the route every `interval` until the trimmed body equals `expected`
///
/// The first request fires one interval after the call. Requests that get no
/// reply are retried on the next tick. Any completed reply with a wrong body,
/// whatever its status, ends polling immediately. The deadline also bounds an
/// in-flight request, so this never returns later than `timeout`.
pub async fn poll_until_ready(
    probe: &dyn Probe,
    expected: &str,
    timeout: Duration,
    interval: Duration,
) -> Readiness {
    let deadline = Instant::now() + timeout;
    let expired = time::sleep_until(deadline);
    tokio::pin!(expired);

    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = &mut expired => return Readiness::TimedOut,

            _ = ticker.tick() => {
                match time::timeout_at(deadline, probe.fetch()).await {
                    Err(_) => return Readiness::TimedOut,
                    Ok(Ok(response)) => {
                        if response.body.trim() == expected {
                            return Readiness::Ready;
                        }
                        return Readiness::Mismatch {
                            status: response.status,
                            body: response.body,
                        };
                    }
                    Ok(Err(e)) => {
                        tracing::debug!(
                            endpoint = probe.endpoint(),
                            error = %e,
                            "Server not answering yet"
                        );
                    }
                }
            }
        }
    }
}
