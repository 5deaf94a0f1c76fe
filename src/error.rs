//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `OptimizeError` enum per categorizzare tutti gli errori possibili
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `FolderNotFound`: Cartella target mancante (unico errore fatale della run)
//! - `Io`: Errori di I/O (file non trovati, permessi, etc.)
//! - `Hash`: Lettura fallita durante il calcolo del digest (file saltato)
//! - `FFmpeg`: Encoder terminato con errore (job abbandonato)
//! - `Probe`: ffprobe fallito o output malformato (metadata saltati)
//! - `Backup`: Copia di backup fallita (job abbandonato prima di toccare l'originale)
//! - `Archive`: Errori di scrittura zip/tar
//! - `MissingDependency`: Tool esterno mancante (ffmpeg, ffprobe)
//! - `Validation`: Errori di validazione configurazione
//!
//! ## Esempio:
//! ```ignore
//! if !folder.exists() {
//!     return Err(OptimizeError::FolderNotFound(folder.to_path_buf()).into());
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for media optimization
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("Folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to hash {}: {source}", path.display())]
    Hash {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("FFmpeg error: {0}")]
    FFmpeg(String),

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Backup of {} failed: {source}", path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

impl From<zip::result::ZipError> for OptimizeError {
    fn from(err: zip::result::ZipError) -> Self {
        OptimizeError::Archive(err.to_string())
    }
}
