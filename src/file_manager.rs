//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sui file e l'enumerazione della
//! cartella target.
//!
//! ## Responsabilità:
//! - Enumerazione ricorsiva dei file regolari in ordine deterministico
//! - Costruzione dei `FileRecord` (path, dimensione, categoria, digest)
//! - Spostamenti sicuri (rename con fallback copy + remove tra filesystem)
//! - Formattazione human-readable delle dimensioni
//! - Calcolo percentuali di riduzione
//!
//! ## Ordine di traversal:
//! I file vengono ordinati per path assoluto (ordinamento per componenti di
//! `Path`). Dedup e organize dipendono da quest'ordine: il primo file di un
//! gruppo di duplicati è sempre quello con il path minore.
//!
//! ## Esempio:
//! ```ignore
//! let files = FileManager::enumerate(Path::new("/path/to/media"), None)?;
//! for record in &files {
//!     println!("{} {}", record.file_name(), FileManager::format_size(record.size));
//! }
//! ```

use crate::classifier::MediaCategory;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A regular file found under the target folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size: u64,
    pub category: MediaCategory,
    /// Hex SHA-256, filled in by the dedup pass
    pub digest: Option<String>,
}

impl FileRecord {
    pub fn new(path: PathBuf, size: u64) -> Self {
        let category = MediaCategory::from_path(&path);
        Self {
            path,
            size,
            category,
            digest: None,
        }
    }

    /// Build a record from the file currently on disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path)?;
        Ok(Self::new(path.to_path_buf(), metadata.len()))
    }

    pub fn file_name(&self) -> String {
        self.path.file_name().unwrap_or_default().to_string_lossy().to_string()
    }

    /// Lower-cased extension without the dot
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }
}

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Get information about a file (size and modification time)
    pub fn get_file_info(path: &Path) -> Result<(u64, SystemTime)> {
        let metadata = fs::metadata(path)?;
        Ok((metadata.len(), metadata.modified()?))
    }

    /// Find every regular file under `root`, sorted by path.
    ///
    /// Anything under `exclude` (the backup directory, when it lives inside
    /// the target) is skipped. Unreadable entries are logged and skipped.
    pub fn enumerate(root: &Path, exclude: Option<&Path>) -> Result<Vec<FileRecord>> {
        let root = root.canonicalize()?;
        let exclude = exclude.and_then(|p| p.canonicalize().ok());

        let mut files = Vec::new();

        for entry in WalkDir::new(&root)
            .into_iter()
            .filter_entry(|e| match exclude {
                Some(ref excluded) => !e.path().starts_with(excluded),
                None => true,
            })
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            match entry.metadata() {
                Ok(metadata) => files.push(FileRecord::new(entry.path().to_path_buf(), metadata.len())),
                Err(e) => warn!("Skipping {}: {}", entry.path().display(), e),
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!("Enumerated {} files under {}", files.len(), root.display());

        Ok(files)
    }

    /// Move a file, falling back to copy + remove across filesystems
    pub fn move_file(from: &Path, to: &Path) -> Result<()> {
        if fs::rename(from, to).is_err() {
            fs::copy(from, to)?;
            fs::remove_file(from)?;
        }
        Ok(())
    }

    /// Get human-readable file size (one decimal, 1024 per step, up to PB)
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        format!("{:.1} {}", size, UNITS[unit_index])
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}
