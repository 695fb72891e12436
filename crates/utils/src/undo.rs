//! Stock undo actions for resources created by forward steps.
//!
//! Each function reverts one kind of resource and treats a resource that is
//! already gone as reverted.

use rollbackctx_core::{Error, Result};
use std::fs;
use std::io;
use std::path::Path;
use std::process::Child;
use std::time::{Duration, Instant};

/// How often a child process is polled while waiting for it to exit
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Upper bound for reaping a child after it was force-killed
const REAP_TIMEOUT: Duration = Duration::from_secs(5);

/// Remove a file created by a forward step
pub fn remove_file(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed file");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "file already gone");
            Ok(())
        }
        Err(e) => Err(Error::file_system(path, "remove file", e)),
    }
}

/// Remove a directory and everything below it
pub fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed directory");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "directory already gone");
            Ok(())
        }
        Err(e) => Err(Error::file_system(path, "remove directory", e)),
    }
}

/// Stop a child process started by a forward step.
///
/// Sends SIGTERM (unix only), gives the process `grace` to exit, then kills
/// it and reaps it.
pub fn terminate_process(mut child: Child, grace: Duration) -> Result<()> {
    let pid = child.id();

    if let Some(status) = poll(&mut child)? {
        tracing::debug!(pid, %status, "process already exited");
        return Ok(());
    }

    #[cfg(unix)]
    send_sigterm(pid)?;

    if let Some(status) = wait_until(&mut child, Instant::now() + grace)? {
        tracing::debug!(pid, %status, "process exited after SIGTERM");
        return Ok(());
    }

    tracing::warn!(pid, ?grace, "process still running after grace period, killing");
    match child.kill() {
        Ok(()) => {}
        // Exited between the last poll and the kill
        Err(e) if e.kind() == io::ErrorKind::InvalidInput => {}
        Err(e) => return Err(Error::process_with_source(pid, "failed to kill", e)),
    }

    match wait_until(&mut child, Instant::now() + REAP_TIMEOUT)? {
        Some(status) => {
            tracing::debug!(pid, %status, "process killed");
            Ok(())
        }
        None => Err(Error::timeout(format!("reap process {pid}"), REAP_TIMEOUT)),
    }
}

fn poll(child: &mut Child) -> Result<Option<std::process::ExitStatus>> {
    child
        .try_wait()
        .map_err(|e| Error::process_with_source(child.id(), "failed to poll", e))
}

fn wait_until(child: &mut Child, deadline: Instant) -> Result<Option<std::process::ExitStatus>> {
    loop {
        if let Some(status) = poll(child)? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(unix)]
fn send_sigterm(pid: u32) -> Result<()> {
    let raw = libc::pid_t::try_from(pid)
        .map_err(|_| Error::process(pid, "pid does not fit in pid_t"))?;

    // SAFETY: kill(2) has no memory-safety preconditions.
    let rc = unsafe { libc::kill(raw, libc::SIGTERM) };
    if rc == 0 {
        return Ok(());
    }

    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        Ok(())
    } else {
        Err(Error::process_with_source(pid, "failed to send SIGTERM", err))
    }
}
