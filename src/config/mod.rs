//! Persistent on/off flag shared between the control CLI and the daemon
//!
//! The config file is the only synchronization medium between the two
//! processes. Writes replace the whole file (temp file + rename); reads are
//! tolerant and fail safe: anything that cannot be understood reads as
//! disabled.

pub mod scan;

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::clock;
use crate::constants::{CONFIG_DIR, CONFIG_FILE_NAME};

/// Best-effort view of the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigRecord {
    /// Absent or unparseable reads as `false`
    pub enabled: bool,
    /// UTC ISO-Z stamp of the last write
    pub last_changed: Option<String>,
    /// Free text, in its on-disk escaped form
    pub notes: Option<String>,
}

impl ConfigRecord {
    /// Scan raw file contents for the recognized fields
    pub fn from_contents(content: &str) -> Self {
        Self {
            enabled: scan::parse_enabled(content).unwrap_or(false),
            last_changed: scan::parse_string_field(content, "last_changed"),
            notes: scan::parse_string_field(content, "notes"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to create config directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("Failed to write config file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Owner of the on-disk config file
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir>/config/antivirus_config.json`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CONFIG_DIR).join(CONFIG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and scan the file. `Ok(None)` when it does not exist.
    pub fn load(&self) -> Result<Option<ConfigRecord>, ConfigError> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                let content = String::from_utf8_lossy(&bytes);
                Ok(Some(ConfigRecord::from_contents(&content)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Best-effort record for status display; failures read as the default
    pub fn read_all(&self) -> ConfigRecord {
        match self.load() {
            Ok(record) => record.unwrap_or_default(),
            Err(e) => {
                log::warn!("{}", e);
                ConfigRecord::default()
            }
        }
    }

    /// `false` when the file is absent, unreadable, or lacks `enabled`
    pub fn is_enabled(&self) -> bool {
        match self.load() {
            Ok(Some(record)) => record.enabled,
            Ok(None) => false,
            Err(e) => {
                log::debug!("treating config as disabled: {}", e);
                false
            }
        }
    }

    /// Replace the file with the three fields, stamping `last_changed` now
    pub fn save(&self, enabled: bool, notes: &str) -> Result<ConfigRecord, ConfigError> {
        self.save_at(enabled, notes, &clock::now_iso_z())
    }

    /// Same as [`ConfigStore::save`] with an explicit timestamp
    pub fn save_at(
        &self,
        enabled: bool,
        notes: &str,
        last_changed: &str,
    ) -> Result<ConfigRecord, ConfigError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let escaped = scan::escape(notes);
        let contents = render(enabled, last_changed, &escaped);

        let tmp_path = self.temp_path();
        let write_result =
            fs::write(&tmp_path, contents.as_bytes()).and_then(|_| fs::rename(&tmp_path, &self.path));

        if let Err(source) = write_result {
            let _ = fs::remove_file(&tmp_path);
            return Err(ConfigError::Write {
                path: self.path.clone(),
                source,
            });
        }

        log::debug!(
            "config written to {} (enabled={})",
            self.path.display(),
            enabled
        );

        Ok(ConfigRecord {
            enabled,
            last_changed: Some(last_changed.to_string()),
            notes: Some(escaped),
        })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| CONFIG_FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Byte-stable on-disk layout; `escaped_notes` must already be escaped
pub fn render(enabled: bool, last_changed: &str, escaped_notes: &str) -> String {
    format!(
        "{{\n  \"enabled\": {},\n  \"last_changed\": \"{}\",\n  \"notes\": \"{}\"\n}}\n",
        enabled, last_changed, escaped_notes
    )
}
