//! Platform layer for the server subprocess
//!
//! On Unix the process is signalled with `kill(2)` and reaped with `wait4(2)`,
//! which also returns its rusage. Signals and the reap share one lock, so a
//! signal is never sent to a pid that has already been reaped. Elsewhere the
//! graceful interrupt is not available and no memory figure is reported.

use std::io;
use std::process::{Child, Command};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Pause between non-blocking exit checks
const REAP_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// What the OS told us when the process was reaped
#[derive(Debug, Clone)]
pub(crate) struct ExitRecord {
    /// Human readable exit status
    pub status: String,

    /// Raw `ru_maxrss`, in the platform's native unit
    pub max_rss_raw: Option<i64>,
}

/// A launched server process
pub(crate) struct ServerProcess {
    #[cfg(unix)]
    pid: libc::pid_t,

    /// Set once `wait4` has collected the pid
    #[cfg(unix)]
    reaped: Arc<Mutex<bool>>,

    #[cfg(not(unix))]
    child: Arc<Mutex<Child>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(unix)]
impl ServerProcess {
    /// Spawn the prepared command
    pub fn spawn(command: &mut Command) -> io::Result<Self> {
        let child: Child = command.spawn()?;
        Ok(Self {
            pid: child.id() as libc::pid_t,
            reaped: Arc::new(Mutex::new(false)),
        })
    }

    /// OS process id
    pub fn id(&self) -> u32 {
        self.pid as u32
    }

    /// Ask the process to shut down (SIGINT)
    pub fn interrupt(&self) -> io::Result<()> {
        self.signal(libc::SIGINT)
    }

    /// Terminate the process (SIGKILL)
    pub fn kill(&self) -> io::Result<()> {
        self.signal(libc::SIGKILL)
    }

    fn signal(&self, signal: libc::c_int) -> io::Result<()> {
        let reaped = lock(&self.reaped);
        if *reaped {
            tracing::debug!(pid = self.pid, signal, "Process already reaped, not signalling");
            return Ok(());
        }
        send_signal(self.pid, signal)
    }

    /// Blocking closure that reaps the process and returns its accounting
    ///
    /// Must run off the async executor, e.g. in `spawn_blocking`.
    pub fn exit_waiter(&self) -> impl FnOnce() -> io::Result<ExitRecord> + Send + 'static {
        let pid = self.pid;
        let reaped = Arc::clone(&self.reaped);
        move || loop {
            {
                let mut reaped = lock(&reaped);
                if *reaped {
                    return Err(io::Error::other(format!(
                        "process {} was already reaped",
                        pid
                    )));
                }
                if let Some(record) = try_wait_with_usage(pid)? {
                    *reaped = true;
                    return Ok(record);
                }
            }
            std::thread::sleep(REAP_POLL_INTERVAL);
        }
    }
}

#[cfg(unix)]
fn send_signal(pid: libc::pid_t, signal: libc::c_int) -> io::Result<()> {
    // SAFETY: kill(2) has no memory-safety preconditions.
    let rc = unsafe { libc::kill(pid, signal) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Reap `pid` if it has exited, without blocking
#[cfg(unix)]
fn try_wait_with_usage(pid: libc::pid_t) -> io::Result<Option<ExitRecord>> {
    use std::os::unix::process::ExitStatusExt;

    loop {
        let mut status: libc::c_int = 0;
        // SAFETY: rusage is a plain C struct for which all-zero bytes are valid.
        let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
        // SAFETY: both out-pointers reference live locals for the whole call.
        let rc = unsafe { libc::wait4(pid, &mut status, libc::WNOHANG, &mut usage) };

        if rc == pid {
            return Ok(Some(ExitRecord {
                status: std::process::ExitStatus::from_raw(status).to_string(),
                max_rss_raw: Some(usage.ru_maxrss as i64),
            }));
        }
        if rc == 0 {
            return Ok(None);
        }

        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

#[cfg(not(unix))]
impl ServerProcess {
    /// Spawn the prepared command
    pub fn spawn(command: &mut Command) -> io::Result<Self> {
        let child = command.spawn()?;
        Ok(Self {
            child: Arc::new(Mutex::new(child)),
        })
    }

    /// OS process id
    pub fn id(&self) -> u32 {
        lock(&self.child).id()
    }

    /// No graceful interrupt on this platform; the grace period still applies
    pub fn interrupt(&self) -> io::Result<()> {
        tracing::debug!("Graceful interrupt unsupported on this platform");
        Ok(())
    }

    /// Terminate the process
    pub fn kill(&self) -> io::Result<()> {
        lock(&self.child).kill()
    }

    /// Blocking closure that waits for the process to exit
    pub fn exit_waiter(&self) -> impl FnOnce() -> io::Result<ExitRecord> + Send + 'static {
        let child = Arc::clone(&self.child);
        move || loop {
            let polled = lock(&child).try_wait();
            match polled {
                Ok(Some(status)) => {
                    return Ok(ExitRecord {
                        status: status.to_string(),
                        max_rss_raw: None,
                    })
                }
                Ok(None) => std::thread::sleep(REAP_POLL_INTERVAL),
                Err(err) => return Err(err),
            }
        }
    }
}
