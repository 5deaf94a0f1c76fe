//! # Organizer Module
//!
//! Sposta i file in sottocartelle `<base>/<bucket>/<filename>`.
//!
//! ## Modalità:
//! - `type`: estensione lower-case senza punto, `noext` se assente
//! - `size`: megabyte interi troncati, es. `12MB`
//! - `date`: mtime in nanosecondi dall'epoch (in pratica una cartella per file)
//!
//! ## Regole:
//! - In dry-run viene solo loggato lo spostamento previsto
//! - Un file già nella sua cartella di destinazione non viene toccato
//! - Se la destinazione è occupata da un altro file lo spostamento viene saltato

use crate::config::OrganizeMode;
use crate::file_manager::{FileManager, FileRecord};
use anyhow::Result;
use std::path::Path;
use std::time::UNIX_EPOCH;
use tracing::{debug, info, warn};

const NO_EXTENSION_BUCKET: &str = "noext";

/// Compute the bucket folder name for a record
pub fn bucket_key(record: &FileRecord, mode: OrganizeMode) -> Result<String> {
    let key = match mode {
        OrganizeMode::Type => record
            .extension()
            .filter(|ext| !ext.is_empty())
            .unwrap_or_else(|| NO_EXTENSION_BUCKET.to_string()),
        OrganizeMode::Size => format!("{}MB", record.size / (1024 * 1024)),
        OrganizeMode::Date => {
            let (_, modified) = FileManager::get_file_info(&record.path)?;
            modified.duration_since(UNIX_EPOCH)?.as_nanos().to_string()
        }
    };
    Ok(key)
}

/// Bucket every record under `base`; returns the records with their new paths
pub fn organize(base: &Path, records: Vec<FileRecord>, mode: OrganizeMode, dry_run: bool) -> Vec<FileRecord> {
    let mut organized = Vec::with_capacity(records.len());
    let mut moved = 0usize;

    for mut record in records {
        let bucket = match bucket_key(&record, mode) {
            Ok(bucket) => bucket,
            Err(e) => {
                warn!("Cannot organize {}: {}", record.path.display(), e);
                organized.push(record);
                continue;
            }
        };

        let folder = base.join(&bucket);
        let target = folder.join(record.path.file_name().unwrap_or_default());

        if target == record.path {
            debug!("{} already in {}", record.file_name(), bucket);
            organized.push(record);
            continue;
        }

        if dry_run {
            info!("📂 Would move {} -> {}", record.file_name(), bucket);
            organized.push(record);
            continue;
        }

        if target.exists() {
            warn!("Not moving {}: {} already exists", record.path.display(), target.display());
            organized.push(record);
            continue;
        }

        let result = std::fs::create_dir_all(&folder)
            .map_err(anyhow::Error::from)
            .and_then(|_| FileManager::move_file(&record.path, &target));

        match result {
            Ok(()) => {
                info!("📂 Moved: {} -> {}", record.file_name(), bucket);
                record.path = target;
                moved += 1;
            }
            Err(e) => warn!("Failed to move {}: {}", record.path.display(), e),
        }
        organized.push(record);
    }

    info!("Organize ({:?}): {} files moved", mode, moved);
    organized
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn enumerate(root: &Path) -> Vec<FileRecord> {
        FileManager::enumerate(root, None).unwrap()
    }

    #[test]
    fn test_bucket_keys() {
        let record = FileRecord::new("/x/Photo.JPG".into(), 5 * 1024 * 1024 + 3);
        assert_eq!(bucket_key(&record, OrganizeMode::Type).unwrap(), "jpg");
        assert_eq!(bucket_key(&record, OrganizeMode::Size).unwrap(), "5MB");

        let small = FileRecord::new("/x/Makefile".into(), 1024 * 1024 - 1);
        assert_eq!(bucket_key(&small, OrganizeMode::Type).unwrap(), "noext");
        assert_eq!(bucket_key(&small, OrganizeMode::Size).unwrap(), "0MB");
    }

    #[test]
    fn test_date_bucket_is_nanosecond_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clip.mp4");
        fs::write(&path, b"v").unwrap();
        let record = FileRecord::from_path(&path).unwrap();

        let expected = fs::metadata(&path)
            .unwrap()
            .modified()
            .unwrap()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
            .to_string();
        assert_eq!(bucket_key(&record, OrganizeMode::Date).unwrap(), expected);
    }

    #[test]
    fn test_organize_by_type() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        fs::write(root.join("a.jpg"), b"a").unwrap();
        fs::write(root.join("b.png"), b"b").unwrap();
        fs::write(root.join("c.txt"), b"c").unwrap();

        let records = organize(&root, enumerate(&root), OrganizeMode::Type, false);

        for (dir, name) in [("jpg", "a.jpg"), ("png", "b.png"), ("txt", "c.txt")] {
            let entries: Vec<_> = fs::read_dir(root.join(dir)).unwrap().map(|e| e.unwrap().file_name()).collect();
            assert_eq!(entries, vec![std::ffi::OsString::from(name)]);
        }
        assert!(!root.join("a.jpg").exists());
        assert!(records.iter().all(|r| r.path.exists()));
    }

    #[test]
    fn test_organize_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        fs::write(root.join("a.jpg"), b"a").unwrap();

        organize(&root, enumerate(&root), OrganizeMode::Type, false);
        let second = organize(&root, enumerate(&root), OrganizeMode::Type, false);

        assert_eq!(second.len(), 1);
        assert_eq!(second[0].path, root.join("jpg").join("a.jpg"));
        assert!(!root.join("jpg/jpg").exists());
    }

    #[test]
    fn test_organize_dry_run_moves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        fs::write(root.join("a.jpg"), b"a").unwrap();

        let records = organize(&root, enumerate(&root), OrganizeMode::Size, true);
        assert!(root.join("a.jpg").exists());
        assert!(!root.join("0MB").exists());
        assert_eq!(records[0].path, root.join("a.jpg"));
    }

    #[test]
    fn test_organize_does_not_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        fs::create_dir_all(root.join("jpg")).unwrap();
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("jpg/a.jpg"), b"first").unwrap();
        fs::write(root.join("sub/a.jpg"), b"second").unwrap();

        organize(&root, enumerate(&root), OrganizeMode::Type, false);

        assert_eq!(fs::read(root.join("jpg/a.jpg")).unwrap(), b"first");
        assert_eq!(fs::read(root.join("sub/a.jpg")).unwrap(), b"second");
    }
}
