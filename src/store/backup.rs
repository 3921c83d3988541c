//! Backup rotation for the tunnel configuration file.
//!
//! Before every rewrite, the current on-disk file is copied to
//! `<name>.<timestamp>.backup` and the rotation is pruned to the 10 most
//! recent copies. The timestamp is ISO-8601 with `:` and `.` replaced by
//! `-`, so a lexicographic sort of filenames is a chronological sort.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};

/// Number of backup files kept per config file.
pub const MAX_BACKUPS: usize = 10;

// Last stamp handed out, in epoch milliseconds. Kept strictly increasing so
// two writes within the same millisecond cannot collide on a filename and
// silently overwrite the earlier snapshot.
static LAST_STAMP_MS: AtomicI64 = AtomicI64::new(0);

fn next_timestamp() -> String {
    let now = Utc::now().timestamp_millis();
    let mut prev = LAST_STAMP_MS.load(Ordering::Relaxed);
    let stamp = loop {
        let candidate = now.max(prev + 1);
        match LAST_STAMP_MS.compare_exchange(prev, candidate, Ordering::Relaxed, Ordering::Relaxed)
        {
            Ok(_) => break candidate,
            Err(actual) => prev = actual,
        }
    };
    DateTime::<Utc>::from_timestamp_millis(stamp)
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

/// Copy `path` into the backup directory and prune old copies.
///
/// `dir` defaults to the config file's own directory and is created
/// recursively when missing.
pub fn rotate(path: &Path, dir: Option<&Path>) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "config path has no file name"))?
        .to_string_lossy()
        .into_owned();
    let backup_dir = dir
        .or_else(|| path.parent())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "config path has no parent"))?;

    if !backup_dir.exists() {
        fs::create_dir_all(backup_dir)?;
    }

    let backup_path = backup_dir.join(format!("{}.{}.backup", file_name, next_timestamp()));
    fs::copy(path, &backup_path)?;
    tracing::debug!(backup = %backup_path.display(), "config backup written");

    prune(backup_dir, &file_name)
}

/// Delete all but the [`MAX_BACKUPS`] newest backups of `file_name`.
fn prune(backup_dir: &Path, file_name: &str) -> io::Result<()> {
    let prefix = format!("{}.", file_name);
    let mut backups: Vec<String> = fs::read_dir(backup_dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with(&prefix) && name.ends_with(".backup"))
        .collect();

    backups.sort_unstable_by(|a, b| b.cmp(a));
    for stale in backups.iter().skip(MAX_BACKUPS) {
        fs::remove_file(backup_dir.join(stale))?;
        tracing::debug!(backup = %stale, "stale config backup removed");
    }
    Ok(())
}
