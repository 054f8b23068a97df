//! Size/age bounded log file.
//!
//! # Responsibilities
//! - Append formatted lines to the active log file
//! - Track the active file's size and rotate before it would exceed the limit
//! - Retire rotated segments under timestamped names, optionally gzip them
//! - Enforce backup count and age limits
//!
//! # Design Decisions
//! - `RotatingFile` is a plain `io::Write`; callers serialize access
//! - Rotation only renames; retention and compression run on a maintenance
//!   thread so the writer lock is released as soon as the new file is open
//! - A single write larger than the limit goes to a fresh file instead of failing

pub mod backups;
pub mod maintenance;

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};

use crate::config::RotationConfig;
use crate::observability::metrics;
use crate::rotation::maintenance::Maintenance;

const MEGABYTE: u64 = 1024 * 1024;

/// Rotation parameters for one active file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Active file path.
    pub path: PathBuf,
    /// Size limit of the active file in bytes.
    pub max_bytes: u64,
    /// Backups older than this many days are purged (0 = keep forever).
    pub max_age_days: u32,
    /// Maximum number of retained backups (0 = unlimited).
    pub max_backups: usize,
    /// Gzip retired segments.
    pub compress: bool,
}

impl RotationPolicy {
    pub fn from_config(path: impl Into<PathBuf>, config: &RotationConfig) -> Self {
        Self {
            path: path.into(),
            max_bytes: config.max_size_mb.saturating_mul(MEGABYTE),
            max_age_days: config.max_age_days,
            max_backups: config.max_backups,
            compress: config.compress,
        }
    }
}

/// The active log file plus its rotation state.
#[derive(Debug)]
pub struct RotatingFile {
    policy: RotationPolicy,
    file: Option<File>,
    size: u64,
    last_backup: Option<DateTime<Utc>>,
    maintenance: Option<Maintenance>,
}

impl RotatingFile {
    /// Open (or create) the active file, appending to existing content.
    pub fn open(policy: RotationPolicy) -> io::Result<Self> {
        if let Some(dir) = policy.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = open_append(&policy.path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            policy,
            file: Some(file),
            size,
            last_backup: None,
            maintenance: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.policy.path
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Bytes written to the active file.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Retire the active file now and start a fresh one.
    pub fn rotate(&mut self) -> io::Result<PathBuf> {
        self.rotate_at(Utc::now())
    }

    fn rotate_at(&mut self, now: DateTime<Utc>) -> io::Result<PathBuf> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }

        // backup names must keep increasing even after older ones are purged
        let mut at = match self.last_backup {
            Some(last) if last >= now => last + Duration::milliseconds(1),
            _ => now,
        };
        let mut backup = backups::backup_path(&self.policy.path, at);
        while backup.exists() || compressed_sibling(&backup).exists() {
            at += Duration::milliseconds(1);
            backup = backups::backup_path(&self.policy.path, at);
        }

        fs::rename(&self.policy.path, &backup)?;
        self.last_backup = Some(at);
        self.file = Some(open_append(&self.policy.path)?);
        self.size = 0;
        metrics::record_rotation();

        if self.needs_maintenance() {
            self.maintenance()?.schedule(now);
        }

        Ok(backup)
    }

    /// Handle to the background retention thread, if one was started.
    pub fn maintenance_handle(&self) -> Option<Maintenance> {
        self.maintenance.clone()
    }

    /// Block until queued retention passes have finished.
    pub fn settle(&self) {
        if let Some(maintenance) = &self.maintenance {
            maintenance.settle();
        }
    }

    fn needs_maintenance(&self) -> bool {
        self.policy.compress || self.policy.max_backups > 0 || self.policy.max_age_days > 0
    }

    fn maintenance(&mut self) -> io::Result<&Maintenance> {
        if self.maintenance.is_none() {
            self.maintenance = Some(Maintenance::spawn(self.policy.clone())?);
        }
        self.maintenance
            .as_ref()
            .ok_or_else(|| io::Error::other("log maintenance unavailable"))
    }

    fn active(&mut self) -> io::Result<&mut File> {
        if self.file.is_none() {
            let file = open_append(&self.policy.path)?;
            self.size = file.metadata()?.len();
            self.file = Some(file);
        }
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("active log file unavailable"))
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = buf.len() as u64;
        if self.size > 0 && self.size + len > self.policy.max_bytes {
            self.rotate()?;
        }

        self.active()?.write_all(buf)?;
        self.size += len;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn compressed_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}
