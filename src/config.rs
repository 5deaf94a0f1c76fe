//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i pass opzionali della pipeline
//! - Definisce i tier di qualità e i parametri encoder che ne derivano
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//!
//! ## Parametri di configurazione:
//! - `transcode`: Abilita il pass di ricodifica (default: false)
//! - `replace`: Sostituisce l'originale quando il candidato è più piccolo
//! - `backup_dir`: Cartella dove copiare gli originali prima di modificarli
//! - `undo`: Ripristina gli originali dal backup e termina
//! - `dry_run`: Mostra solo le azioni previste
//! - `dedup`: Rimuove i duplicati byte-identici
//! - `organize`: Riorganizza in sottocartelle (`type`, `size`, `date`)
//! - `quality`: Tier di qualità (`low`, `medium`, `high`, default: medium)
//! - `threads`: Numero di worker paralleli (default: 1)
//! - `force_hevc`: Ricodifica anche i video già HEVC
//! - `compress`: Archivia la cartella finale (`zip`, `tar`)
//! - `report` / `analyze` / `metadata`: Pass di sola lettura
//!
//! ## Esempio:
//! ```ignore
//! let config = Config {
//!     transcode: true,
//!     threads: 4,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::OptimizeError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::warn;

/// Quality tier: lower tiers trade fidelity for smaller output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityTier {
    /// x265 CRF (lower = better quality)
    pub fn video_crf(&self) -> u8 {
        match self {
            Self::Low => 32,
            Self::Medium => 28,
            Self::High => 23,
        }
    }

    /// Bitrate for Opus audio and for the AAC track of videos
    pub fn audio_bitrate(&self) -> &'static str {
        match self {
            Self::Low => "64k",
            Self::Medium => "96k",
            Self::High => "128k",
        }
    }

    /// libwebp `-q:v` value
    pub fn webp_quality(&self) -> u8 {
        match self {
            Self::Low => 70,
            Self::Medium => 80,
            Self::High => 90,
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Bucketing key for the organize pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OrganizeMode {
    /// Lower-cased extension
    Type,
    /// Whole megabytes
    Size,
    /// Modification time in nanoseconds
    Date,
}

/// Output container for the archive pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    /// Deflate-compressed zip
    Zip,
    /// Gzip-compressed tar
    Tar,
}

impl ArchiveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Tar => "tar.gz",
        }
    }
}

/// Configuration for a squash run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Re-encode eligible media
    pub transcode: bool,
    /// Delete the original when the candidate is strictly smaller
    pub replace: bool,
    /// Copy originals here before touching them
    pub backup_dir: Option<PathBuf>,
    /// Restore originals from `backup_dir` and stop
    pub undo: bool,
    /// Report intended actions only
    pub dry_run: bool,
    /// Remove byte-identical duplicates
    pub dedup: bool,
    /// Move files into buckets
    pub organize: Option<OrganizeMode>,
    /// Quality tier for the encoder
    pub quality: QualityTier,
    /// Number of parallel transcode workers
    pub threads: usize,
    /// Re-encode HEVC/H.265 sources too
    pub force_hevc: bool,
    /// Archive the final folder
    pub compress: Option<ArchiveFormat>,
    /// Print folder report at the end
    pub report: bool,
    /// Print per-file analysis at the end
    pub analyze: bool,
    /// Probe metadata for every file and stop
    pub metadata: bool,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transcode: false,
            replace: false,
            backup_dir: None,
            undo: false,
            dry_run: false,
            dedup: false,
            organize: None,
            quality: QualityTier::Medium,
            threads: 1,
            force_hevc: false,
            compress: None,
            report: false,
            analyze: false,
            metadata: false,
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(OptimizeError::Validation(
                "Number of threads must be greater than 0".to_string(),
            ).into());
        }

        if self.undo && self.backup_dir.is_none() {
            return Err(OptimizeError::Validation(
                "Undo requires a backup directory".to_string(),
            ).into());
        }

        if let Some(ref backup_dir) = self.backup_dir {
            if backup_dir.exists() && !backup_dir.is_dir() {
                return Err(OptimizeError::Validation(format!(
                    "Backup path is not a directory: {}",
                    backup_dir.display()
                )).into());
            }
        }

        Ok(())
    }

    /// Load configuration from file
    pub async fn from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            warn!("⚠️ Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.threads = 0;
        assert!(config.validate().is_err());

        config.threads = 2;
        config.undo = true;
        assert!(config.validate().is_err());

        config.backup_dir = Some(PathBuf::from("/tmp/does-not-matter"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.quality, QualityTier::Medium);
        assert_eq!(config.threads, 1);
        assert!(!config.transcode);
        assert!(!config.replace);
        assert!(!config.dry_run);
        assert!(config.organize.is_none());
        assert!(config.compress.is_none());
    }

    #[test]
    fn test_quality_tiers() {
        assert_eq!(QualityTier::Low.video_crf(), 32);
        assert_eq!(QualityTier::Medium.video_crf(), 28);
        assert_eq!(QualityTier::High.video_crf(), 23);
        assert!(QualityTier::Low.webp_quality() < QualityTier::High.webp_quality());
        assert_eq!(QualityTier::Medium.audio_bitrate(), "96k");
    }

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original_config = Config {
            transcode: true,
            replace: true,
            quality: QualityTier::High,
            threads: 8,
            organize: Some(OrganizeMode::Size),
            compress: Some(ArchiveFormat::Tar),
            ..Default::default()
        };

        original_config.save_to_file(&config_path).await.unwrap();
        let loaded_config = Config::from_file(&config_path).await.unwrap();

        assert!(loaded_config.transcode);
        assert!(loaded_config.replace);
        assert_eq!(loaded_config.quality, QualityTier::High);
        assert_eq!(loaded_config.threads, 8);
        assert_eq!(loaded_config.organize, Some(OrganizeMode::Size));
        assert_eq!(loaded_config.compress, Some(ArchiveFormat::Tar));
    }

    #[tokio::test]
    async fn test_partial_config_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        tokio::fs::write(&config_path, r#"{ "dedup": true, "quality": "low" }"#).await.unwrap();

        let loaded = Config::from_file(&config_path).await.unwrap();
        assert!(loaded.dedup);
        assert_eq!(loaded.quality, QualityTier::Low);
        assert_eq!(loaded.threads, 1);
    }

    #[tokio::test]
    async fn test_missing_config_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = Config::from_file(&temp_dir.path().join("typo.json")).await.unwrap();
        assert_eq!(loaded.threads, 1);
        assert!(!loaded.transcode);
    }

    #[tokio::test]
    async fn test_malformed_config_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        tokio::fs::write(&config_path, "{ not json").await.unwrap();
        assert!(Config::from_file(&config_path).await.is_err());
    }
}
