// ABOUTME: Readiness poller: repeat a probe at a fixed interval until ready.
// ABOUTME: Bounded by max attempts and returns early on cancellation.

mod probe;

pub use probe::{CommandProbe, FnProbe, Probe, ProbeError, ProbeResult, probe_fn};

use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Interval and attempt budget for a readiness wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PollPolicy {
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_max_attempts() -> u32 {
    24
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Upper bound on time spent sleeping between attempts.
    pub fn ceiling(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

impl Default for PollPolicy {
    /// 5s × 24 attempts: a two-minute window for an HTTP health endpoint.
    fn default() -> Self {
        Self::new(default_interval(), default_max_attempts())
    }
}

/// Result of a poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The probe reported ready on attempt number `attempts`.
    Ready { attempts: u32 },
    /// Every attempt was not-ready or errored.
    ///
    /// `transient_errors` counts the attempts that errored rather than
    /// answering "not yet"; both are retried identically.
    TimedOut {
        attempts: u32,
        transient_errors: u32,
        last_error: Option<String>,
    },
    /// The cancellation token fired before the probe became ready.
    Cancelled { attempts: u32 },
}

impl PollOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, PollOutcome::Ready { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Ready { attempts }
            | PollOutcome::TimedOut { attempts, .. }
            | PollOutcome::Cancelled { attempts } => *attempts,
        }
    }
}

/// Polls a probe until it is ready, attempts run out, or the run is cancelled.
///
/// Holds no state between polls, so one poller can serve several waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadinessPoller {
    policy: PollPolicy,
}

impl ReadinessPoller {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Probe until ready.
    ///
    /// Returns `Ready` as soon as a probe succeeds without sleeping again.
    /// Sleeps `interval` after each failed attempt except the last, so a probe
    /// that never succeeds costs `(max_attempts - 1) × interval` plus probe time.
    pub async fn poll<P: Probe + ?Sized>(
        &self,
        probe: &P,
        cancel: &CancellationToken,
    ) -> PollOutcome {
        let PollPolicy {
            interval,
            max_attempts,
        } = self.policy;

        let mut transient_errors = 0;
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return PollOutcome::Cancelled { attempts: attempt - 1 };
                }
                result = probe.check(cancel) => result,
            };

            match result {
                Ok(true) => {
                    tracing::debug!(probe = probe.describe(), attempt, "probe ready");
                    return PollOutcome::Ready { attempts: attempt };
                }
                Ok(false) => {
                    tracing::debug!(probe = probe.describe(), attempt, max_attempts, "not ready yet");
                }
                Err(e) => {
                    tracing::debug!(probe = probe.describe(), attempt, max_attempts, error = %e, "probe failed");
                    transient_errors += 1;
                    last_error = Some(e.to_string());
                }
            }

            if attempt < max_attempts {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        return PollOutcome::Cancelled { attempts: attempt };
                    }
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        }

        PollOutcome::TimedOut {
            attempts: max_attempts,
            transient_errors,
            last_error,
        }
    }
}
