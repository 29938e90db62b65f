//! Lifecycle log for the daemon
//!
//! One append-mode handle per daemon lifetime, flushed after every line.
//! Lines are mirrored to the `log` facade at info level.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct DaemonLog {
    path: PathBuf,
    file: File,
}

impl DaemonLog {
    /// Open `path` for appending, creating its parent directory if needed
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Append one newline-terminated line and flush it
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        log::info!("{}", text);
        writeln!(self.file, "{}", text)?;
        self.file.flush()
    }

    /// Like [`DaemonLog::line`], but a failed write only produces a warning
    pub fn line_or_warn(&mut self, text: &str) {
        if let Err(e) = self.line(text) {
            log::warn!("failed to append to {}: {}", self.path.display(), e);
        }
    }
}
