//! # Backup Manager Module
//!
//! Copia gli originali in una cartella piatta prima di qualsiasi modifica
//! distruttiva e li ripristina su richiesta (`--undo`).
//!
//! ## Layout:
//! ```text
//! <backup_dir>/<nome_file_originale>
//! ```
//! Nessuna struttura annidata: due file con lo stesso nome in cartelle
//! diverse condividono la stessa entry (vince l'ultimo copiato).
//!
//! ## Scrittura:
//! Ogni copia viene scritta in un file temporaneo nella cartella di
//! destinazione e poi rinominata sopra l'entry finale. Con più worker
//! l'entry contiene sempre per intero una delle copie (l'ultima rinominata),
//! anche se l'entry precedente è in sola lettura.
//!
//! ## Metadata:
//! `std::fs::copy` preserva i permessi; la data di modifica viene
//! riapplicata con `filetime` sul file temporaneo prima del rename.

use crate::error::OptimizeError;
use anyhow::Result;
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Prefix of in-flight copies; never restored
const STAGING_PREFIX: &str = ".squash-staging-";

pub struct BackupManager;

impl BackupManager {
    /// Copy `file` into `backup_dir` under its own name
    pub fn backup(file: &Path, backup_dir: &Path) -> Result<PathBuf, OptimizeError> {
        let wrap = |source| OptimizeError::Backup {
            path: file.to_path_buf(),
            source,
        };

        fs::create_dir_all(backup_dir).map_err(wrap)?;

        let name = file.file_name().ok_or_else(|| OptimizeError::Backup {
            path: file.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        })?;
        let destination = backup_dir.join(name);

        Self::copy_preserving(file, &destination).map_err(wrap)?;
        debug!("Backed up {} -> {}", file.display(), destination.display());

        Ok(destination)
    }

    /// Copy every regular file of `backup_dir` into `target_dir`, overwriting
    pub fn restore(backup_dir: &Path, target_dir: &Path) -> Result<usize> {
        if !backup_dir.is_dir() {
            return Err(OptimizeError::Validation(format!(
                "Backup directory does not exist: {}",
                backup_dir.display()
            )).into());
        }

        let mut restored = 0;
        for entry in fs::read_dir(backup_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() || entry.file_name().to_string_lossy().starts_with(STAGING_PREFIX) {
                continue;
            }

            let destination = target_dir.join(entry.file_name());
            match Self::copy_preserving(&entry.path(), &destination) {
                Ok(()) => {
                    debug!("Restored {}", destination.display());
                    restored += 1;
                }
                Err(e) => warn!("Failed to restore {}: {}", entry.path().display(), e),
            }
        }

        info!("✅ Undo complete: {} originals restored", restored);
        Ok(restored)
    }

    /// Copy through a staging file in the destination folder, then rename over `to`
    fn copy_preserving(from: &Path, to: &Path) -> std::io::Result<()> {
        let folder = to.parent().unwrap_or_else(|| Path::new("."));
        let staging = tempfile::Builder::new().prefix(STAGING_PREFIX).tempfile_in(folder)?;

        fs::copy(from, staging.path())?;
        let modified = fs::metadata(from)?.modified()?;
        filetime::set_file_mtime(staging.path(), FileTime::from_system_time(modified))?;

        staging.persist(to).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::hash_file;
    use tempfile::TempDir;

    #[test]
    fn test_backup_creates_dir_and_copies() {
        let temp_dir = TempDir::new().unwrap();
        let original = temp_dir.path().join("song.flac");
        fs::write(&original, b"lossless bytes").unwrap();
        let backup_dir = temp_dir.path().join("backups/nested");

        let copy = BackupManager::backup(&original, &backup_dir).unwrap();

        assert_eq!(copy, backup_dir.join("song.flac"));
        assert_eq!(fs::read(&copy).unwrap(), b"lossless bytes");
        assert_eq!(
            fs::metadata(&copy).unwrap().modified().unwrap(),
            fs::metadata(&original).unwrap().modified().unwrap()
        );
    }

    #[test]
    fn test_backup_missing_source_fails() {
        let temp_dir = TempDir::new().unwrap();
        let err = BackupManager::backup(&temp_dir.path().join("nope.mp4"), temp_dir.path()).unwrap_err();
        assert!(matches!(err, OptimizeError::Backup { .. }));
    }

    #[test]
    fn test_backup_restore_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("media");
        let backup_dir = temp_dir.path().join("backup");
        fs::create_dir_all(&target).unwrap();

        let original = target.join("clip.mov");
        fs::write(&original, vec![3u8; 4096]).unwrap();
        let digest = hash_file(&original).unwrap();

        BackupManager::backup(&original, &backup_dir).unwrap();
        fs::remove_file(&original).unwrap();
        fs::write(target.join("clip.mp4"), b"transcoded").unwrap();

        let restored = BackupManager::restore(&backup_dir, &target).unwrap();

        assert_eq!(restored, 1);
        assert_eq!(hash_file(&original).unwrap(), digest);
    }

    #[test]
    fn test_restore_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let backup_dir = temp_dir.path().join("backup");
        fs::create_dir_all(&backup_dir).unwrap();
        fs::write(backup_dir.join("a.png"), b"original").unwrap();
        fs::write(temp_dir.path().join("a.png"), b"mutated").unwrap();

        BackupManager::restore(&backup_dir, temp_dir.path()).unwrap();
        assert_eq!(fs::read(temp_dir.path().join("a.png")).unwrap(), b"original");
    }

    #[cfg(unix)]
    #[test]
    fn test_read_only_original_backup_and_restore() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("media");
        let backup_dir = temp_dir.path().join("backup");
        fs::create_dir_all(&target).unwrap();

        let original = target.join("song.flac");
        fs::write(&original, b"read-only bytes").unwrap();
        let mtime = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&original, mtime).unwrap();
        fs::set_permissions(&original, fs::Permissions::from_mode(0o444)).unwrap();

        // The second copy lands on a read-only entry
        BackupManager::backup(&original, &backup_dir).unwrap();
        let copy = BackupManager::backup(&original, &backup_dir).unwrap();

        assert_eq!(fs::read(&copy).unwrap(), b"read-only bytes");
        let copied_mtime = FileTime::from_last_modification_time(&fs::metadata(&copy).unwrap());
        assert_eq!(copied_mtime, mtime);

        assert_eq!(BackupManager::restore(&backup_dir, &target).unwrap(), 1);
        assert_eq!(fs::read(&original).unwrap(), b"read-only bytes");
        assert_eq!(fs::read_dir(&backup_dir).unwrap().count(), 1);
    }

    #[test]
    fn test_concurrent_same_name_backups_never_mix() {
        let temp_dir = TempDir::new().unwrap();
        let backup_dir = temp_dir.path().join("backup");
        let size = 256 * 1024;

        let sources: Vec<PathBuf> = (0..8u8)
            .map(|i| {
                let folder = temp_dir.path().join(format!("album{}", i));
                fs::create_dir_all(&folder).unwrap();
                let path = folder.join("cover.png");
                fs::write(&path, vec![i; size]).unwrap();
                path
            })
            .collect();

        let handles: Vec<_> = sources
            .into_iter()
            .map(|source| {
                let backup_dir = backup_dir.clone();
                std::thread::spawn(move || BackupManager::backup(&source, &backup_dir).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let bytes = fs::read(backup_dir.join("cover.png")).unwrap();
        assert_eq!(bytes.len(), size);
        assert!(bytes.iter().all(|b| *b == bytes[0]));
        assert_eq!(fs::read_dir(&backup_dir).unwrap().count(), 1);
    }

    #[test]
    fn test_restore_skips_staging_leftovers() {
        let temp_dir = TempDir::new().unwrap();
        let backup_dir = temp_dir.path().join("backup");
        let target = temp_dir.path().join("media");
        fs::create_dir_all(&backup_dir).unwrap();
        fs::create_dir_all(&target).unwrap();
        fs::write(backup_dir.join("a.mp3"), b"mp3").unwrap();
        fs::write(backup_dir.join(format!("{}abc", STAGING_PREFIX)), b"partial").unwrap();

        assert_eq!(BackupManager::restore(&backup_dir, &target).unwrap(), 1);
        assert_eq!(fs::read_dir(&target).unwrap().count(), 1);
    }

    #[test]
    fn test_restore_without_backup_dir_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(BackupManager::restore(&temp_dir.path().join("missing"), temp_dir.path()).is_err());
    }
}
