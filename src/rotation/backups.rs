//! Retired segment naming, discovery, compression and retention.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;

const TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";
const GZ_SUFFIX: &str = ".gz";

/// A retired segment found next to the active file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    pub path: PathBuf,
    pub rotated_at: DateTime<Utc>,
    pub compressed: bool,
}

/// Splits `logs/app.log` into (`logs`, `app`, `.log`).
fn split_active(active: &Path) -> (PathBuf, String, String) {
    let dir = active
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let stem = active
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = active
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (dir, stem, ext)
}

/// Backup path for a rotation happening at `at`.
pub fn backup_path(active: &Path, at: DateTime<Utc>) -> PathBuf {
    let (dir, stem, ext) = split_active(active);
    dir.join(format!("{}-{}{}", stem, at.format(TIME_FORMAT), ext))
}

/// Recover the rotation instant from a backup file name.
pub fn parse_backup_name(active: &Path, file_name: &str) -> Option<(DateTime<Utc>, bool)> {
    let (_, stem, ext) = split_active(active);
    let rest = file_name.strip_prefix(&stem)?.strip_prefix('-')?;
    let (rest, compressed) = match rest.strip_suffix(GZ_SUFFIX) {
        Some(r) => (r, true),
        None => (rest, false),
    };
    let stamp = rest.strip_suffix(ext.as_str())?;
    let naive = NaiveDateTime::parse_from_str(stamp, TIME_FORMAT).ok()?;
    Some((naive.and_utc(), compressed))
}

/// All backups of `active`, newest first.
pub fn list_backups(active: &Path) -> io::Result<Vec<Backup>> {
    let (dir, _, _) = split_active(active);
    let mut backups = Vec::new();

    for dirent in fs::read_dir(&dir)? {
        let dirent = dirent?;
        if !dirent.file_type()?.is_file() {
            continue;
        }
        let name = dirent.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some((rotated_at, compressed)) = parse_backup_name(active, name) {
            backups.push(Backup { path: dirent.path(), rotated_at, compressed });
        }
    }

    backups.sort_by(|a, b| b.rotated_at.cmp(&a.rotated_at));
    Ok(backups)
}

/// Gzip `path` into `path.gz` and remove the original.
pub fn compress(path: &Path) -> io::Result<PathBuf> {
    let mut target = path.as_os_str().to_owned();
    target.push(GZ_SUFFIX);
    let target = PathBuf::from(target);

    let mut reader = BufReader::new(File::open(path)?);
    let mut encoder = GzEncoder::new(BufWriter::new(File::create(&target)?), Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.into_inner().map_err(|e| e.into_error())?.sync_all()?;

    fs::remove_file(path)?;
    Ok(target)
}

/// Remove backups beyond `max_backups` or older than `max_age_days`, then
/// compress whatever uncompressed backups remain when `compress` is set.
/// Zero disables the respective limit. Returns the removed paths.
pub fn enforce(
    active: &Path,
    max_backups: usize,
    max_age_days: u32,
    compress_backups: bool,
    now: DateTime<Utc>,
) -> io::Result<Vec<PathBuf>> {
    let backups = list_backups(active)?;
    let cutoff = (max_age_days > 0).then(|| now - chrono::Duration::days(i64::from(max_age_days)));

    let mut removed = Vec::new();
    let mut kept = Vec::new();
    for (index, backup) in backups.into_iter().enumerate() {
        let over_count = max_backups > 0 && index >= max_backups;
        let too_old = matches!(cutoff, Some(cutoff) if backup.rotated_at < cutoff);
        if over_count || too_old {
            fs::remove_file(&backup.path)?;
            removed.push(backup.path);
        } else {
            kept.push(backup);
        }
    }

    if compress_backups {
        for backup in kept.iter().filter(|b| !b.compressed) {
            compress(&backup.path)?;
        }
    }

    Ok(removed)
}
