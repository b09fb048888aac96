//! Whole-blob storage of vanish data.
//!
//! [`JsonFileStore`] keeps each blob in its own file under the data
//! directory. Missing files load as empty defaults. A file that fails to
//! load can be moved aside with [`PersistenceStore::quarantine`] so the next
//! save does not overwrite it.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::assignment::SettingsFile;
use crate::error::StoreError;
use crate::stats::{LogEntry, StatsFile};

pub const VANISHED_FILE: &str = "vanished_players.txt";
pub const SETTINGS_FILE: &str = "player_settings.json";
pub const STATS_FILE: &str = "stats.json";
pub const LOGS_FILE: &str = "logs.json";

pub const QUARANTINE_SUFFIX: &str = ".corrupt";

/// One of the blobs a store keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Blob {
    Vanished,
    Settings,
    Stats,
    Logs,
}

impl Blob {
    pub fn file_name(self) -> &'static str {
        match self {
            Blob::Vanished => VANISHED_FILE,
            Blob::Settings => SETTINGS_FILE,
            Blob::Stats => STATS_FILE,
            Blob::Logs => LOGS_FILE,
        }
    }
}

pub trait PersistenceStore: Send {
    fn load_vanished(&self) -> Result<Vec<String>, StoreError>;
    fn save_vanished(&mut self, names: &[String]) -> Result<(), StoreError>;
    fn load_settings(&self) -> Result<SettingsFile, StoreError>;
    fn save_settings(&mut self, settings: &SettingsFile) -> Result<(), StoreError>;
    fn load_stats(&self) -> Result<StatsFile, StoreError>;
    fn save_stats(&mut self, stats: &StatsFile) -> Result<(), StoreError>;
    fn load_logs(&self) -> Result<Vec<LogEntry>, StoreError>;
    fn save_logs(&mut self, logs: &[LogEntry]) -> Result<(), StoreError>;
    /// Move an unreadable blob out of the way. Later loads see it as empty.
    fn quarantine(&mut self, blob: Blob) -> Result<(), StoreError>;
}

// ─── JSON files ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    fn read_string(&self, file: &str) -> Result<Option<String>, StoreError> {
        let path = self.path(file);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn write_string(&self, file: &str, contents: &str) -> Result<(), StoreError> {
        self.ensure_dir()?;
        let path = self.path(file);
        fs::write(&path, contents).map_err(|source| StoreError::Io { path, source })
    }

    fn read_json<T: DeserializeOwned + Default>(&self, file: &str) -> Result<T, StoreError> {
        let Some(contents) = self.read_string(file)? else {
            return Ok(T::default());
        };
        if contents.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&contents).map_err(|source| StoreError::Json {
            path: self.path(file),
            source,
        })
    }

    fn write_json<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
            path: self.path(file),
            source,
        })?;
        self.write_string(file, &json)?;
        debug!("Saved {}", self.path(file).display());
        Ok(())
    }
}

impl PersistenceStore for JsonFileStore {
    fn load_vanished(&self) -> Result<Vec<String>, StoreError> {
        let contents = self.read_string(VANISHED_FILE)?.unwrap_or_default();
        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn save_vanished(&mut self, names: &[String]) -> Result<(), StoreError> {
        let mut contents = names.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        self.write_string(VANISHED_FILE, &contents)
    }

    fn load_settings(&self) -> Result<SettingsFile, StoreError> {
        self.read_json(SETTINGS_FILE)
    }

    fn save_settings(&mut self, settings: &SettingsFile) -> Result<(), StoreError> {
        self.write_json(SETTINGS_FILE, settings)
    }

    fn load_stats(&self) -> Result<StatsFile, StoreError> {
        self.read_json(STATS_FILE)
    }

    fn save_stats(&mut self, stats: &StatsFile) -> Result<(), StoreError> {
        self.write_json(STATS_FILE, stats)
    }

    fn load_logs(&self) -> Result<Vec<LogEntry>, StoreError> {
        self.read_json(LOGS_FILE)
    }

    fn save_logs(&mut self, logs: &[LogEntry]) -> Result<(), StoreError> {
        self.write_json(LOGS_FILE, logs)
    }

    /// Rename `<file>` to `<file>.corrupt`, replacing an older copy.
    fn quarantine(&mut self, blob: Blob) -> Result<(), StoreError> {
        let from = self.path(blob.file_name());
        let to = self.path(&format!("{}{QUARANTINE_SUFFIX}", blob.file_name()));
        match fs::rename(&from, &to) {
            Ok(()) => {
                warn!("Moved unreadable {} to {}", from.display(), to.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path: from, source }),
        }
    }
}

// ─── In memory ──────────────────────────────────────────────────────────────

/// Store that keeps every blob in memory. Writes can be made to fail, and
/// blobs marked corrupt fail to load until quarantined, to exercise the
/// persistence-error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub vanished: Vec<String>,
    pub settings: SettingsFile,
    pub stats: StatsFile,
    pub logs: Vec<LogEntry>,
    pub fail_writes: bool,
    pub corrupt: BTreeSet<Blob>,
    /// Blobs whose writes fail even when `fail_writes` is off.
    pub fail_blobs: BTreeSet<Blob>,
    pub quarantined: Vec<Blob>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_writable(&self, blob: Blob) -> Result<(), StoreError> {
        if self.fail_writes || self.fail_blobs.contains(&blob) {
            return Err(StoreError::Unavailable(format!(
                "writes to {} disabled",
                blob.file_name()
            )));
        }
        Ok(())
    }

    fn check_readable(&self, blob: Blob) -> Result<(), StoreError> {
        if self.corrupt.contains(&blob) {
            return Err(StoreError::Unavailable(format!("{} is corrupt", blob.file_name())));
        }
        Ok(())
    }
}

impl PersistenceStore for MemoryStore {
    fn load_vanished(&self) -> Result<Vec<String>, StoreError> {
        self.check_readable(Blob::Vanished)?;
        Ok(self.vanished.clone())
    }

    fn save_vanished(&mut self, names: &[String]) -> Result<(), StoreError> {
        self.check_writable(Blob::Vanished)?;
        self.vanished = names.to_vec();
        Ok(())
    }

    fn load_settings(&self) -> Result<SettingsFile, StoreError> {
        self.check_readable(Blob::Settings)?;
        Ok(self.settings.clone())
    }

    fn save_settings(&mut self, settings: &SettingsFile) -> Result<(), StoreError> {
        self.check_writable(Blob::Settings)?;
        self.settings = settings.clone();
        Ok(())
    }

    fn load_stats(&self) -> Result<StatsFile, StoreError> {
        self.check_readable(Blob::Stats)?;
        Ok(self.stats.clone())
    }

    fn save_stats(&mut self, stats: &StatsFile) -> Result<(), StoreError> {
        self.check_writable(Blob::Stats)?;
        self.stats = stats.clone();
        Ok(())
    }

    fn load_logs(&self) -> Result<Vec<LogEntry>, StoreError> {
        self.check_readable(Blob::Logs)?;
        Ok(self.logs.clone())
    }

    fn save_logs(&mut self, logs: &[LogEntry]) -> Result<(), StoreError> {
        self.check_writable(Blob::Logs)?;
        self.logs = logs.to_vec();
        Ok(())
    }

    fn quarantine(&mut self, blob: Blob) -> Result<(), StoreError> {
        self.check_writable(blob)?;
        self.corrupt.remove(&blob);
        self.quarantined.push(blob);
        Ok(())
    }
}
