//! Launcher that starts a real, harmless child in place of the daemon.

use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::sync::{Arc, Mutex};

use nix::sys::signal::Signal;

use crate::process::{ProcessLauncher, SpawnError};

#[derive(Default)]
struct Launched {
    children: Vec<Child>,
    configs: Vec<PathBuf>,
}

/// Spawns `sleep 30` for each launch and keeps the handles for inspection.
///
/// Clones share state, so a test can keep one while the supervisor owns
/// another. Children still running when the last clone drops are killed.
#[derive(Clone, Default)]
pub struct SleepLauncher {
    launched: Arc<Mutex<Launched>>,
}

impl SleepLauncher {
    /// Config paths passed to each launch, in order.
    pub fn configs(&self) -> Vec<PathBuf> {
        self.launched.lock().expect("launched lock").configs.clone()
    }

    /// Pids returned by each launch, in order.
    pub fn pids(&self) -> Vec<u32> {
        let launched = self.launched.lock().expect("launched lock");
        launched.children.iter().map(Child::id).collect()
    }

    pub fn launches(&self) -> usize {
        self.launched.lock().expect("launched lock").children.len()
    }

    /// Whether the child with `pid` has not exited yet.
    pub fn is_alive(&self, pid: u32) -> bool {
        let mut launched = self.launched.lock().expect("launched lock");
        let child = launched
            .children
            .iter_mut()
            .find(|child| child.id() == pid)
            .expect("pid was launched by this launcher");
        child.try_wait().expect("poll child").is_none()
    }

    /// Waits for `pid` and reports whether it died from `SIGKILL`.
    pub fn was_killed(&self, pid: u32) -> bool {
        let mut launched = self.launched.lock().expect("launched lock");
        let child = launched
            .children
            .iter_mut()
            .find(|child| child.id() == pid)
            .expect("pid was launched by this launcher");
        let status = child.wait().expect("wait for child");
        status.signal() == Some(Signal::SIGKILL as i32)
    }
}

impl ProcessLauncher for SleepLauncher {
    fn launch(&self, config_path: &Path) -> Result<u32, SpawnError> {
        let child = Command::new("sleep")
            .arg("30")
            .spawn()
            .map_err(|source| SpawnError {
                program: "sleep".into(),
                source,
            })?;
        let pid = child.id();
        let mut launched = self.launched.lock().expect("launched lock");
        launched.children.push(child);
        launched.configs.push(config_path.to_path_buf());
        Ok(pid)
    }
}

impl Drop for Launched {
    fn drop(&mut self) {
        for child in &mut self.children {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
