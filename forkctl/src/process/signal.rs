//! Liveness probes and termination by pid.

/// Check whether `pid` is a live process this user can signal.
///
/// Sends signal 0. "No such process" and "operation not permitted" both
/// count as not alive; any other failure is logged and also counts as not
/// alive. Non-positive pids address process groups and are never probed.
///
/// A child of this process that already exited is reaped first, otherwise
/// its zombie would still answer signal 0.
pub fn is_alive(pid: i32) -> bool {
    if pid <= 0 {
        return false;
    }

    #[cfg(unix)]
    {
        use nix::errno::Errno;
        use nix::sys::signal::{kill, Signal};
        use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
        use nix::unistd::Pid;

        let pid = Pid::from_raw(pid);
        // ECHILD for anything we did not spawn.
        if let Ok(WaitStatus::Exited(..) | WaitStatus::Signaled(..)) =
            waitpid(pid, Some(WaitPidFlag::WNOHANG))
        {
            return false;
        }

        match kill(pid, None::<Signal>) {
            Ok(()) => true,
            Err(Errno::ESRCH | Errno::EPERM) => false,
            Err(e) => {
                tracing::warn!(pid = pid.as_raw(), error = %e, "error checking process");
                false
            }
        }
    }

    #[cfg(not(unix))]
    {
        false
    }
}

/// Send SIGKILL to `pid` without waiting for it to exit.
pub fn terminate(pid: i32) {
    if pid <= 0 {
        tracing::warn!(pid, "refusing to signal non-positive pid");
        return;
    }

    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        if let Err(e) = kill(Pid::from_raw(pid), Signal::SIGKILL) {
            tracing::debug!(pid, error = %e, "kill failed");
        }
    }
}
