//! # Deduplication Module
//!
//! Rimozione dei duplicati byte-identici tramite digest SHA-256.
//!
//! ## Responsabilità:
//! - Calcolo del digest in streaming a chunk fissi (8 KiB)
//! - Indice digest → file canonico, append-only per tutta la run
//! - Rimozione (o report in dry-run) dei duplicati successivi al canonico
//!
//! ## Regole:
//! - L'ordine di visita è quello di `FileManager::enumerate` (path ordinati),
//!   quindi il sopravvissuto di ogni gruppo è il file con il path minore
//! - Ogni file viene letto al massimo una volta
//! - Un errore di lettura esclude il file da dedup e dai pass successivi

use crate::error::OptimizeError;
use crate::file_manager::FileRecord;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const CHUNK_SIZE: usize = 8192;

/// Stream a file through SHA-256 and return the hex digest
pub fn hash_file(path: &Path) -> Result<String, OptimizeError> {
    let wrap = |source| OptimizeError::Hash {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(wrap)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let read = file.read(&mut buffer).map_err(wrap)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Digest → first file seen with that digest
#[derive(Debug, Default)]
pub struct DedupIndex {
    canonical: HashMap<String, FileRecord>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical record if `digest` was already seen,
    /// otherwise registers `record` as canonical.
    pub fn observe(&mut self, digest: &str, record: &FileRecord) -> Option<&FileRecord> {
        if self.canonical.contains_key(digest) {
            return self.canonical.get(digest);
        }
        self.canonical.insert(digest.to_string(), record.clone());
        None
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

/// A duplicate and the canonical file it matched
#[derive(Debug, Clone)]
pub struct Duplicate {
    pub path: PathBuf,
    pub canonical: PathBuf,
    pub size: u64,
    /// False in dry-run or when the delete failed
    pub removed: bool,
}

/// Result of a dedup pass
#[derive(Debug, Default)]
pub struct DedupOutcome {
    /// Records still on disk, in traversal order
    pub survivors: Vec<FileRecord>,
    pub duplicates: Vec<Duplicate>,
    /// Files that could not be read
    pub unreadable: Vec<PathBuf>,
}

impl DedupOutcome {
    pub fn bytes_reclaimed(&self) -> u64 {
        self.duplicates.iter().filter(|d| d.removed).map(|d| d.size).sum()
    }
}

/// Walks records in order and drops every file whose digest was already seen
pub struct Deduplicator {
    index: DedupIndex,
    dry_run: bool,
}

impl Deduplicator {
    pub fn new(dry_run: bool) -> Self {
        Self {
            index: DedupIndex::new(),
            dry_run,
        }
    }

    pub fn run(mut self, records: Vec<FileRecord>) -> DedupOutcome {
        let mut outcome = DedupOutcome::default();

        for mut record in records {
            let digest = match hash_file(&record.path) {
                Ok(digest) => digest,
                Err(e) => {
                    warn!("⚠️ {}", e);
                    outcome.unreadable.push(record.path);
                    continue;
                }
            };
            record.digest = Some(digest.clone());

            let canonical = match self.index.observe(&digest, &record) {
                None => {
                    outcome.survivors.push(record);
                    continue;
                }
                Some(canonical) => canonical.path.clone(),
            };

            let canonical_name = canonical.file_name().unwrap_or_default().to_string_lossy().to_string();

            if self.dry_run {
                info!("🗑️ Would remove {} (duplicate of {})", record.file_name(), canonical_name);
                outcome.duplicates.push(Duplicate {
                    path: record.path,
                    canonical,
                    size: record.size,
                    removed: false,
                });
                continue;
            }

            match std::fs::remove_file(&record.path) {
                Ok(()) => {
                    info!("🗑️ Removed duplicate: {} (duplicate of {})", record.file_name(), canonical_name);
                    outcome.duplicates.push(Duplicate {
                        path: record.path,
                        canonical,
                        size: record.size,
                        removed: true,
                    });
                }
                Err(e) => {
                    warn!("Failed to remove duplicate {}: {}", record.path.display(), e);
                    outcome.duplicates.push(Duplicate {
                        path: record.path.clone(),
                        canonical,
                        size: record.size,
                        removed: false,
                    });
                    outcome.survivors.push(record);
                }
            }
        }

        info!(
            "Dedup: {} unique, {} duplicates, {} unreadable",
            self.index.len(),
            outcome.duplicates.len(),
            outcome.unreadable.len()
        );

        outcome
    }
}
