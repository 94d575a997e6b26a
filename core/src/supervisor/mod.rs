//! Server lifecycle supervision
//!
//! The ServerSupervisor owns one server process for one benchmark run:
//! - Launching the configured command with its directory and environment
//! - Polling the benchmarked route until the expected body is served
//! - Stopping with an interrupt, then a kill once the grace period is over
//! - Capturing the peak resident memory reported when the process is reaped
//!
//! ```text
//! NotStarted -> Running -> Ready | Failed -> Stopping -> Stopped
//! ```
//!
//! # Example
//!
//! ```ignore
//! let mut supervisor = ServerSupervisor::new(config);
//! supervisor.start()?;
//! if supervisor.wait_for_readiness(&probe, &case.expected, timeout).await {
//!     // drive load
//! }
//! supervisor.stop().await;
//! let usage = supervisor.resource_usage();
//! ```

mod process;
mod readiness;
mod usage;

pub use readiness::{poll_until_ready, Readiness, READINESS_POLL_INTERVAL};
pub use usage::{normalize_max_rss, ResourceUsage, RssUnit};

use std::process::{Command, Stdio};
use std::time::Duration;

use crate::config::BenchmarkConfig;
use crate::error::{BenchError, BenchResult};
use crate::traits::Probe;

use process::ServerProcess;

/// Time a server gets to exit after the interrupt before it is killed
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(3);

/// Lifecycle state of the supervised server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// `start` has not been called
    NotStarted,
    /// Launch attempted, readiness unknown
    Running,
    /// The expected body was served
    Ready,
    /// Readiness was never reached
    Failed,
    /// Shutdown in progress
    Stopping,
    /// Process reaped (or never launched)
    Stopped,
}

/// Where the server's stdout and stderr go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ServerOutput {
    /// Discard
    #[default]
    Null,
    /// Share the harness's stdout and stderr
    Inherit,
}

impl ServerOutput {
    fn stdio(self) -> Stdio {
        match self {
            ServerOutput::Null => Stdio::null(),
            ServerOutput::Inherit => Stdio::inherit(),
        }
    }
}

/// Supervises the server process of one benchmark run
pub struct ServerSupervisor {
    config: BenchmarkConfig,
    grace_period: Duration,
    poll_interval: Duration,
    output: ServerOutput,
    state: SupervisorState,
    process: Option<ServerProcess>,
    usage: Option<ResourceUsage>,
}

impl ServerSupervisor {
    /// Create a supervisor for `config`; nothing is launched yet
    pub fn new(config: BenchmarkConfig) -> Self {
        Self {
            config,
            grace_period: DEFAULT_GRACE_PERIOD,
            poll_interval: READINESS_POLL_INTERVAL,
            output: ServerOutput::default(),
            state: SupervisorState::NotStarted,
            process: None,
            usage: None,
        }
    }

    /// Override the shutdown grace period
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Override the readiness poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Choose where server output goes
    pub fn with_output(mut self, output: ServerOutput) -> Self {
        self.output = output;
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// OS process id, while a launched process is held
    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().map(ServerProcess::id)
    }

    /// Launch the server without waiting for it
    ///
    /// A spawn failure is only logged; it shows up as a readiness failure.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the config is invalid or if the
    /// supervisor was already started.
    pub fn start(&mut self) -> BenchResult<()> {
        if self.state != SupervisorState::NotStarted {
            return Err(BenchError::config(format!(
                "server `{}` was already started",
                self.config.name
            )));
        }
        self.config.validate()?;

        tracing::info!(command = ?self.config.command, "Starting server");

        let mut command = Command::new(&self.config.command[0]);
        command
            .args(&self.config.command[1..])
            .envs(self.config.env_pairs()?)
            .stdin(Stdio::null())
            .stdout(self.output.stdio())
            .stderr(self.output.stdio());
        if !self.config.dir.as_os_str().is_empty() {
            command.current_dir(&self.config.dir);
        }

        match ServerProcess::spawn(&mut command) {
            Ok(process) => {
                tracing::debug!(pid = process.id(), "Server process spawned");
                self.process = Some(process);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to launch server");
            }
        }

        self.state = SupervisorState::Running;
        Ok(())
    }

    /// Poll the server until it serves `expected` or `timeout` elapses
    ///
    /// Returns `true` once the trimmed body equals `expected`. A wrong body
    /// or a timeout returns `false`. Returns within `timeout + one poll
    /// interval`.
    pub async fn wait_for_readiness(
        &mut self,
        probe: &dyn Probe,
        expected: &str,
        timeout: Duration,
    ) -> bool {
        if self.state != SupervisorState::Running {
            tracing::warn!(state = ?self.state, "Readiness requested outside of Running state");
            return self.state == SupervisorState::Ready;
        }
        if self.process.is_none() {
            tracing::error!("Server process is not running");
            self.state = SupervisorState::Failed;
            return false;
        }

        let ready = match poll_until_ready(probe, expected, timeout, self.poll_interval).await {
            Readiness::Ready => {
                tracing::info!(endpoint = probe.endpoint(), "Response validation passed");
                true
            }
            Readiness::Mismatch { status, body } => {
                tracing::error!(
                    status,
                    actual = %body.trim(),
                    expected = %expected,
                    "Invalid response received"
                );
                false
            }
            Readiness::TimedOut => {
                tracing::error!(
                    timeout_ms = timeout.as_millis() as u64,
                    "The server is taking too long to start"
                );
                false
            }
        };

        self.state = if ready {
            SupervisorState::Ready
        } else {
            SupervisorState::Failed
        };
        ready
    }

    /// Stop the server: interrupt, wait up to the grace period, then kill
    ///
    /// Always waits for the process to be reaped. A no-op before `start` and
    /// after a previous `stop`.
    pub async fn stop(&mut self) {
        match self.state {
            SupervisorState::NotStarted | SupervisorState::Stopped => {
                tracing::debug!(state = ?self.state, "Nothing to stop");
                return;
            }
            _ => {}
        }

        let Some(process) = self.process.take() else {
            tracing::info!("Server is already stopped");
            self.state = SupervisorState::Stopped;
            return;
        };

        self.state = SupervisorState::Stopping;
        tracing::info!("Gracefully stopping server...");
        if let Err(e) = process.interrupt() {
            tracing::warn!(error = %e, "Failed to interrupt server");
        }

        let mut exit = tokio::task::spawn_blocking(process.exit_waiter());
        let reaped = match tokio::time::timeout(self.grace_period, &mut exit).await {
            Ok(reaped) => reaped,
            Err(_) => {
                tracing::warn!(
                    grace_ms = self.grace_period.as_millis() as u64,
                    "Server is taking too long, killing it"
                );
                if let Err(e) = process.kill() {
                    tracing::warn!(error = %e, "Failed to kill server");
                }
                exit.await
            }
        };

        match reaped {
            Ok(Ok(record)) => {
                tracing::info!(status = %record.status, "Server stopped");
                self.usage = Some(ResourceUsage::from_raw_max_rss(record.max_rss_raw));
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Failed to collect server exit status");
            }
            Err(e) => {
                tracing::error!(error = %e, "Exit waiter panicked");
            }
        }

        self.state = SupervisorState::Stopped;
    }

    /// Resource usage of the exited process
    ///
    /// `None` until the process has been stopped and reaped.
    pub fn resource_usage(&self) -> Option<ResourceUsage> {
        self.usage
    }
}

impl Drop for ServerSupervisor {
    fn drop(&mut self) {
        if let Some(process) = self.process.take() {
            tracing::warn!(pid = process.id(), "Supervisor dropped before stop, killing server");
            if let Err(e) = process.kill() {
                tracing::warn!(error = %e, "Failed to kill server");
            }
            let reap = process.exit_waiter();
            std::thread::spawn(move || {
                if let Err(e) = reap() {
                    tracing::warn!(error = %e, "Failed to reap server");
                }
            });
        }
    }
}

impl std::fmt::Debug for ServerSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSupervisor")
            .field("name", &self.config.name)
            .field("state", &self.state)
            .field("pid", &self.pid())
            .field("grace_period", &self.grace_period)
            .finish()
    }
}
