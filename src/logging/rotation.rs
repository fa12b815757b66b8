//! Numbered backup management
//!
//! The active file is `<prefix>.log`. Backups are `<prefix>_1.log` (newest)
//! through `<prefix>_<max>.log` (oldest).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::error::LoggerError;

/// Path of the active log file
pub fn active_path(dir: &Path, prefix: &str) -> PathBuf {
    dir.join(format!("{}.log", prefix))
}

/// Path of the backup with the given index (1 = newest)
pub fn backup_path(dir: &Path, prefix: &str, index: usize) -> PathBuf {
    dir.join(format!("{}_{}.log", prefix, index))
}

/// Parse the backup index out of a file name, if it is one of ours
fn backup_index(name: &str, prefix: &str) -> Option<usize> {
    let index = name
        .strip_prefix(prefix)?
        .strip_prefix('_')?
        .strip_suffix(".log")?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    index.parse().ok().filter(|i| *i > 0)
}

/// List existing backups for `prefix`, sorted by index
pub fn list_backups(dir: &Path, prefix: &str) -> io::Result<Vec<(usize, PathBuf)>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut backups = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(index) = backup_index(name, prefix) {
            if path.is_file() {
                backups.push((index, path));
            }
        }
    }

    backups.sort_by_key(|(index, _)| *index);
    Ok(backups)
}

fn remove(path: &Path) -> Result<(), LoggerError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(LoggerError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn rename(from: &Path, to: &Path) -> Result<(), LoggerError> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(LoggerError::Rename {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        }),
    }
}

/// Rename `from` to `to`, refusing to replace an existing `to`
fn rename_into(from: &Path, to: &Path) -> Result<(), LoggerError> {
    if to.exists() {
        return Err(LoggerError::Rename {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source: io::ErrorKind::AlreadyExists.into(),
        });
    }
    rename(from, to)
}

/// Move the active file into the backup chain
///
/// Drops the oldest backup, shifts the rest up by one and renames the active
/// file to index 1. With `max_backups == 0` the active file is deleted.
/// The active file must already be closed. Only existing backups are touched.
/// A file whose shift target is still occupied stays where it is, so a failed
/// step never overwrites a backup. The failures are returned for reporting.
pub fn rotate_files(dir: &Path, prefix: &str, max_backups: usize) -> Vec<LoggerError> {
    let mut failures = Vec::new();
    let active = active_path(dir, prefix);

    if max_backups == 0 {
        if let Err(e) = remove(&active) {
            failures.push(e);
        }
        return failures;
    }

    let backups = match list_backups(dir, prefix) {
        Ok(backups) => backups,
        Err(source) => {
            failures.push(LoggerError::Rename {
                from: active,
                to: backup_path(dir, prefix, 1),
                source,
            });
            return failures;
        }
    };

    for (index, path) in backups.into_iter().rev() {
        let result = if index >= max_backups {
            remove(&path)
        } else {
            rename_into(&path, &backup_path(dir, prefix, index + 1))
        };
        if let Err(e) = result {
            failures.push(e);
        }
    }

    if let Err(e) = rename_into(&active, &backup_path(dir, prefix, 1)) {
        failures.push(e);
    }

    failures
}

/// Delete backups whose index is beyond `max_backups`
///
/// Returns the number of files deleted.
pub fn prune_backups(dir: &Path, prefix: &str, max_backups: usize) -> Result<usize, LoggerError> {
    let backups = list_backups(dir, prefix).map_err(|source| LoggerError::Remove {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut deleted_count = 0;
    for (index, path) in backups {
        if index > max_backups {
            remove(&path)?;
            deleted_count += 1;
        }
    }

    Ok(deleted_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::write(path, content).unwrap();
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_backup_index_parsing() {
        assert_eq!(backup_index("app_1.log", "app"), Some(1));
        assert_eq!(backup_index("app_12.log", "app"), Some(12));
        assert_eq!(backup_index("app.log", "app"), None);
        assert_eq!(backup_index("app_0.log", "app"), None);
        assert_eq!(backup_index("app_x.log", "app"), None);
        assert_eq!(backup_index("other_1.log", "app"), None);
        assert_eq!(backup_index("app_1.txt", "app"), None);
    }

    #[test]
    fn test_rotate_first_time() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write(&active_path(dir, "app"), "first\n");

        let failures = rotate_files(dir, "app", 3);
        assert!(failures.is_empty());

        assert!(!active_path(dir, "app").exists());
        assert_eq!(read(&backup_path(dir, "app", 1)), "first\n");
    }

    #[test]
    fn test_rotate_shifts_and_drops_oldest() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write(&backup_path(dir, "app", 1), "one");
        write(&backup_path(dir, "app", 2), "two");
        write(&backup_path(dir, "app", 3), "three");
        write(&active_path(dir, "app"), "current");

        let failures = rotate_files(dir, "app", 3);
        assert!(failures.is_empty());

        assert_eq!(read(&backup_path(dir, "app", 1)), "current");
        assert_eq!(read(&backup_path(dir, "app", 2)), "one");
        assert_eq!(read(&backup_path(dir, "app", 3)), "two");
        assert!(!backup_path(dir, "app", 4).exists());
    }

    #[test]
    fn test_rotate_without_backups_deletes_active() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write(&active_path(dir, "app"), "current");

        assert!(rotate_files(dir, "app", 0).is_empty());
        assert!(!active_path(dir, "app").exists());
        assert!(list_backups(dir, "app").unwrap().is_empty());
    }

    #[test]
    fn test_rotate_missing_active_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(rotate_files(temp_dir.path(), "app", 2).is_empty());
    }

    #[test]
    fn test_rotate_keeps_backup_when_shift_fails() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write(&backup_path(dir, "app", 1), "precious backup");
        write(&active_path(dir, "app"), "current\n");
        // A non-empty directory cannot be removed or renamed over
        let blocker = backup_path(dir, "app", 2);
        fs::create_dir(&blocker).unwrap();
        write(&blocker.join("keep"), "x");

        let failures = rotate_files(dir, "app", 2);
        assert!(!failures.is_empty());

        assert_eq!(read(&backup_path(dir, "app", 1)), "precious backup");
        assert_eq!(read(&active_path(dir, "app")), "current\n");
    }

    #[test]
    fn test_rotate_skips_occupied_target_in_gapped_chain() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write(&backup_path(dir, "app", 1), "one");
        write(&backup_path(dir, "app", 2), "two");
        fs::create_dir(backup_path(dir, "app", 3)).unwrap();
        write(&active_path(dir, "app"), "current");

        let failures = rotate_files(dir, "app", 5);
        assert_eq!(failures.len(), 3);

        assert_eq!(read(&backup_path(dir, "app", 1)), "one");
        assert_eq!(read(&backup_path(dir, "app", 2)), "two");
        assert_eq!(read(&active_path(dir, "app")), "current");
    }

    #[test]
    fn test_rotate_with_large_backup_limit() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write(&backup_path(dir, "app", 1), "one");
        write(&backup_path(dir, "app", 3), "three");
        write(&active_path(dir, "app"), "current");

        let started = std::time::Instant::now();
        let failures = rotate_files(dir, "app", 2_000_000);
        assert!(failures.is_empty());
        assert!(started.elapsed() < std::time::Duration::from_secs(1));

        let indices: Vec<usize> = list_backups(dir, "app")
            .unwrap()
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        assert_eq!(indices, vec![1, 2, 4]);
        assert_eq!(read(&backup_path(dir, "app", 1)), "current");
        assert_eq!(read(&backup_path(dir, "app", 2)), "one");
        assert_eq!(read(&backup_path(dir, "app", 4)), "three");
    }

    #[test]
    fn test_backup_names_overlap_suffixed_prefix() {
        // The active file of prefix `app_2` reads as backup 2 of prefix `app`
        assert_eq!(backup_index("app_2.log", "app"), Some(2));
        assert_eq!(backup_index("app_2.log", "app_2"), None);
        assert_eq!(backup_index("app_2_1.log", "app"), None);
    }

    #[test]
    fn test_prune_backups() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        for i in 1..=5 {
            write(&backup_path(dir, "app", i), "x");
        }
        write(&dir.join("other_9.log"), "x");

        let deleted = prune_backups(dir, "app", 2).unwrap();
        assert_eq!(deleted, 3);

        let remaining: Vec<usize> = list_backups(dir, "app")
            .unwrap()
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        assert_eq!(remaining, vec![1, 2]);
        assert!(dir.join("other_9.log").exists());
    }

    #[test]
    fn test_prune_nonexistent_dir() {
        let path = Path::new("/nonexistent/path/for/testing");
        assert_eq!(prune_backups(path, "app", 1).unwrap(), 0);
    }
}
