#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use tempfile::TempDir;

pub const BIN: &str = env!("CARGO_BIN_EXE_antikeylogger");

/// Temporary working directory laid out like a checkout: a shell stand-in for
/// the classifier under scripts/, run with `--python sh`.
pub struct Workspace {
    pub temp_dir: TempDir,
}

impl Workspace {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: tempfile::tempdir()?,
        })
    }

    /// Workspace with `scripts/predecir_keylogger.py` exiting with `exit_code`
    pub fn with_classifier(exit_code: i32) -> Result<Self> {
        let ws = Self::new()?;
        let scripts = ws.path().join("scripts");
        fs::create_dir_all(&scripts)?;
        fs::write(
            scripts.join("predecir_keylogger.py"),
            format!("echo \"stand-in classifier $*\"\nexit {}\n", exit_code),
        )?;
        Ok(ws)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("config").join("antivirus_config.json")
    }

    pub fn log_path(&self) -> PathBuf {
        self.path().join("logs").join("antivirus_daemon.log")
    }

    pub fn read_config(&self) -> String {
        fs::read_to_string(self.config_path()).unwrap_or_default()
    }

    pub fn read_log(&self) -> String {
        fs::read_to_string(self.log_path()).unwrap_or_default()
    }

    /// Run a control verb to completion in this workspace
    pub fn control(&self, args: &[&str]) -> std::process::Output {
        Command::new(BIN)
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("failed to run antikeylogger")
    }

    /// Start `antikeylogger daemon` in this workspace
    pub fn spawn_daemon(&self, extra: &[&str]) -> Result<DaemonProcess> {
        let child = Command::new(BIN)
            .arg("daemon")
            .args(["--python", "sh"])
            .args(extra)
            .current_dir(self.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(DaemonProcess { child: Some(child) })
    }

    /// Poll the daemon log until it contains `needle` `count` times
    pub fn wait_for_log(&self, needle: &str, count: usize, timeout: Duration) -> bool {
        wait_for_file(&self.log_path(), needle, count, timeout)
    }
}

/// Poll `path` until it contains `needle` at least `count` times
pub fn wait_for_file(path: &Path, needle: &str, count: usize, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        let contents = fs::read_to_string(path).unwrap_or_default();
        if contents.matches(needle).count() >= count {
            return true;
        }
        thread::sleep(Duration::from_millis(50));
    }
    false
}

/// Daemon child that is always reaped, even when an assertion fails
pub struct DaemonProcess {
    child: Option<Child>,
}

impl DaemonProcess {
    pub fn pid(&self) -> u32 {
        self.child.as_ref().map(Child::id).unwrap_or(0)
    }

    pub fn signal(&self, signal: i32) -> Result<()> {
        unsafe {
            let result = libc::kill(self.pid() as i32, signal);
            if result != 0 {
                return Err(anyhow::anyhow!("Failed to send signal {} to PID {}", signal, self.pid()));
            }
        }
        Ok(())
    }

    /// Wait for exit; `None` if it is still running after `timeout`
    pub fn wait_timeout(&mut self, timeout: Duration) -> Result<Option<(ExitStatus, Duration)>> {
        let start = Instant::now();
        let child = match self.child.as_mut() {
            Some(child) => child,
            None => return Ok(None),
        };

        while start.elapsed() < timeout {
            if let Some(status) = child.try_wait()? {
                self.child = None;
                return Ok(Some((status, start.elapsed())));
            }
            thread::sleep(Duration::from_millis(20));
        }
        Ok(None)
    }
}

impl Drop for DaemonProcess {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
