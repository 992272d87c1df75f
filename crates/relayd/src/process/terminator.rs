//! Locates and terminates the recorded background process.

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;

/// Abstraction over process lookup and termination.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessTerminator: Send + Sync {
    /// Confirms that a process with `pid` exists.
    fn probe(&self, pid: u32) -> Result<(), Errno>;

    /// Terminates `pid` immediately, without a graceful handshake.
    fn kill(&self, pid: u32) -> Result<(), Errno>;
}

/// Terminator backed by `kill(2)`.
///
/// Lookup sends the null signal; termination sends `SIGKILL`, so listener
/// grace periods are never honoured on stop.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalTerminator;

impl ProcessTerminator for SignalTerminator {
    fn probe(&self, pid: u32) -> Result<(), Errno> {
        match kill(to_pid(pid)?, None) {
            // The process exists but belongs to someone else; the kill step
            // reports the permission failure.
            Ok(()) | Err(Errno::EPERM) => Ok(()),
            Err(errno) => Err(errno),
        }
    }

    fn kill(&self, pid: u32) -> Result<(), Errno> {
        kill(to_pid(pid)?, Signal::SIGKILL)
    }
}

fn to_pid(pid: u32) -> Result<Pid, Errno> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Ok(Pid::from_raw(raw)),
        _ => Err(Errno::EINVAL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;
    use std::os::unix::process::ExitStatusExt;
    use std::process::{Child, Command};

    fn spawn_sleeper() -> Option<Child> {
        match Command::new("sleep").arg("60").spawn() {
            Ok(child) => Some(child),
            Err(error) if error.kind() == ErrorKind::NotFound => {
                eprintln!("skipping test: sleep command not found");
                None
            }
            Err(error) => panic!("failed to spawn sleep process: {error}"),
        }
    }

    #[test]
    fn probe_finds_live_child() {
        let Some(mut child) = spawn_sleeper() else {
            return;
        };
        let result = SignalTerminator.probe(child.id());
        let _ = child.kill();
        let _ = child.wait();
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn probe_reports_reaped_child_as_missing() {
        let Some(mut child) = spawn_sleeper() else {
            return;
        };
        let pid = child.id();
        child.kill().expect("kill child");
        child.wait().expect("reap child");
        assert_eq!(SignalTerminator.probe(pid), Err(Errno::ESRCH));
    }

    #[test]
    fn kill_delivers_sigkill() {
        let Some(mut child) = spawn_sleeper() else {
            return;
        };
        SignalTerminator.kill(child.id()).expect("kill child");
        let status = child.wait().expect("wait for child");
        assert_eq!(status.signal(), Some(Signal::SIGKILL as i32));
    }

    #[test]
    fn rejects_pids_outside_signed_range() {
        assert_eq!(SignalTerminator.probe(0), Err(Errno::EINVAL));
        assert_eq!(SignalTerminator.kill(u32::MAX), Err(Errno::EINVAL));
    }
}
