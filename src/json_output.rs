//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON (una riga per evento)
//! per l'uso programmatico della CLI (`--json`).
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio della run (cartella, numero file, configurazione)
//! - `job_complete`: Stato terminale di un job di transcode
//! - `complete`: Fine della run con i totali aggregati
//! - `error`: Errore non fatale durante l'elaborazione

use crate::config::{Config, QualityTier};
use crate::optimizer::task_optimizer::JobState;
use crate::progress::RunSummary;
use crate::stats::Savings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    Start {
        folder: PathBuf,
        total_files: usize,
        config: JsonConfig,
    },

    JobComplete {
        path: PathBuf,
        state: String,
        original_size: Option<u64>,
        new_size: Option<u64>,
        output: Option<PathBuf>,
        error: Option<String>,
    },

    Complete {
        jobs: usize,
        accepted: usize,
        replaced: usize,
        rejected_larger: usize,
        skipped: usize,
        failed: usize,
        original_bytes: u64,
        new_bytes: u64,
        bytes_saved: u64,
        percent_saved: f64,
        duration_seconds: f64,
    },

    Error {
        message: String,
        details: Option<String>,
    },
}

/// Configurazione per output JSON
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonConfig {
    pub transcode: bool,
    pub replace: bool,
    pub dedup: bool,
    pub quality: QualityTier,
    pub threads: usize,
    pub dry_run: bool,
}

impl From<&Config> for JsonConfig {
    fn from(config: &Config) -> Self {
        Self {
            transcode: config.transcode,
            replace: config.replace,
            dedup: config.dedup,
            quality: config.quality,
            threads: config.threads,
            dry_run: config.dry_run,
        }
    }
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(folder: &Path, total_files: usize, config: &Config) -> Self {
        Self::Start {
            folder: folder.to_path_buf(),
            total_files,
            config: JsonConfig::from(config),
        }
    }

    pub fn job_complete(path: &Path, state: &JobState) -> Self {
        let (original_size, new_size, output, error) = match state {
            JobState::Accepted { original_size, new_size, replaced_with } => {
                (Some(*original_size), Some(*new_size), replaced_with.clone(), None)
            }
            JobState::RejectedLarger { original_size, new_size } => {
                (Some(*original_size), Some(*new_size), None, None)
            }
            JobState::Failed(reason) => (None, None, None, Some(reason.clone())),
            JobState::SkippedUnsupported | JobState::SkippedAlreadyCompressed => (None, None, None, None),
        };

        Self::JobComplete {
            path: path.to_path_buf(),
            state: state.name().to_string(),
            original_size,
            new_size,
            output,
            error,
        }
    }

    pub fn complete(summary: &RunSummary, savings: &Savings, duration_seconds: f64) -> Self {
        Self::Complete {
            jobs: summary.total(),
            accepted: summary.accepted,
            replaced: summary.replaced,
            rejected_larger: summary.rejected_larger,
            skipped: summary.skipped_unsupported + summary.skipped_compressed,
            failed: summary.failed,
            original_bytes: savings.original_bytes,
            new_bytes: savings.new_bytes,
            bytes_saved: savings.saved(),
            percent_saved: savings.percent_saved(),
            duration_seconds,
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_complete_serialization() {
        let state = JobState::RejectedLarger { original_size: 100, new_size: 110 };
        let json = serde_json::to_value(JsonMessage::job_complete(Path::new("/m/a.mp4"), &state)).unwrap();

        assert_eq!(json["type"], "job_complete");
        assert_eq!(json["state"], "rejected-larger");
        assert_eq!(json["original_size"], 100);
        assert_eq!(json["new_size"], 110);
        assert!(json["error"].is_null());
    }

    #[test]
    fn test_start_carries_config() {
        let config = Config { transcode: true, threads: 3, ..Default::default() };
        let json = serde_json::to_value(JsonMessage::start(Path::new("/m"), 7, &config)).unwrap();

        assert_eq!(json["type"], "start");
        assert_eq!(json["total_files"], 7);
        assert_eq!(json["config"]["quality"], "medium");
        assert_eq!(json["config"]["threads"], 3);
    }
}
