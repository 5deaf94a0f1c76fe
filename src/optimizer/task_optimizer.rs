//! # Task Optimizer Module
//!
//! Coordinatore del singolo job di transcode, eseguito da un worker del pool.
//!
//! ## Pipeline per file:
//! 1. Eleggibilità dalla categoria (video, audio, immagine), altrimenti skip
//! 2. Skip dei formati già compressi (forzabile per i video con `--force-hevc`)
//! 3. Costruzione della richiesta encoder con i parametri del tier
//! 4. Backup dell'originale, se configurato, prima di qualsiasi modifica
//! 5. Esecuzione encoder; in caso di errore il job viene abbandonato
//! 6. Candidato non più piccolo dell'originale → scartato, originale intatto
//! 7. Candidato più piccolo → stats aggiornate, sostituzione se `replace`
//!
//! ## Invarianti:
//! - L'originale viene cancellato solo se `replace` e `new_size < old_size`
//! - Le stats vengono incrementate una sola volta per job accettato
//! - Il backup esiste sempre prima che l'originale venga toccato
//!
//! ## Collisioni di path:
//! I worker condividono un registro dei path riservati. Il candidato prende
//! il primo nome `<stem>_new[_N].<ext>` libero (né su disco né riservato),
//! così nessun file dell'utente né un altro job viene sovrascritto.
//! La sostituzione avviene solo se il path finale è il sorgente stesso o è
//! libero; altrimenti il candidato resta accanto all'originale.

use crate::backup::BackupManager;
use crate::classifier::MediaCategory;
use crate::config::Config;
use crate::encoder::{EncodeRequest, Encoder};
use crate::file_manager::{FileManager, FileRecord};
use crate::optimizer::path_resolver::PathResolver;
use crate::stats::AggregateStats;
use std::fs;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

/// Terminal state of a transcode job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    SkippedUnsupported,
    SkippedAlreadyCompressed,
    RejectedLarger {
        original_size: u64,
        new_size: u64,
    },
    Accepted {
        original_size: u64,
        new_size: u64,
        /// Final location when the original was replaced
        replaced_with: Option<PathBuf>,
    },
    /// Backup or encoder failure; nothing was replaced or recorded
    Failed(String),
}

impl JobState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SkippedUnsupported => "skipped-unsupported",
            Self::SkippedAlreadyCompressed => "skipped-already-compressed",
            Self::RejectedLarger { .. } => "rejected-larger",
            Self::Accepted { .. } => "accepted",
            Self::Failed(_) => "failed",
        }
    }
}

/// A planned re-encode of one file
#[derive(Debug, Clone)]
pub struct TranscodeJob {
    pub record: FileRecord,
    pub request: EncodeRequest,
    /// Destination when replacing the original
    pub final_path: PathBuf,
    pub target_extension: &'static str,
}

/// Worker per elaborazione singoli file
#[derive(Clone)]
pub struct TaskOptimizer {
    pub config: Config,
    encoder: Arc<dyn Encoder>,
    stats: Arc<AggregateStats>,
    /// Candidate and final paths reserved by jobs of this run
    claimed: Arc<Mutex<HashSet<PathBuf>>>,
}

impl TaskOptimizer {
    pub fn new(config: Config, encoder: Arc<dyn Encoder>, stats: Arc<AggregateStats>) -> Self {
        Self {
            config,
            encoder,
            stats,
            claimed: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    fn claimed(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        self.claimed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Point the request at a candidate name nobody else owns
    fn reserve_candidate(&self, job: &mut TranscodeJob) {
        let mut claimed = self.claimed();
        let candidate = PathResolver::free_candidate_path(&job.record.path, job.target_extension, |path| {
            claimed.contains(path) || path.exists()
        });
        claimed.insert(candidate.clone());
        job.request.destination = candidate;
    }

    /// Reserve the final path unless another file or job already owns it
    fn claim_final_path(&self, job: &TranscodeJob) -> bool {
        let mut claimed = self.claimed();
        let target = &job.final_path;
        if claimed.contains(target) || (*target != job.record.path && target.exists()) {
            return false;
        }
        claimed.insert(target.clone());
        true
    }

    /// Build the job for a record, or the skip state it ends in
    pub fn plan(&self, record: &FileRecord) -> Result<TranscodeJob, JobState> {
        let profile = record.category.profile().ok_or(JobState::SkippedUnsupported)?;

        let extension = record.extension().unwrap_or_default();
        let forced = self.config.force_hevc && record.category == MediaCategory::Video;
        if profile.is_already_compressed(&extension) && !forced {
            return Err(JobState::SkippedAlreadyCompressed);
        }

        let request = EncodeRequest {
            source: record.path.clone(),
            destination: PathResolver::candidate_path(&record.path, profile.extension),
            category: record.category,
            codec: profile.codec,
            quality: self.config.quality,
        };

        Ok(TranscodeJob {
            record: record.clone(),
            final_path: PathResolver::final_path(&record.path, profile.extension),
            target_extension: profile.extension,
            request,
        })
    }

    /// Run the whole pipeline for one file and return its terminal state
    pub fn process(&self, record: &FileRecord) -> JobState {
        let mut job = match self.plan(record) {
            Ok(job) => job,
            Err(state) => {
                match state {
                    JobState::SkippedAlreadyCompressed => {
                        info!("⏩ Skipped {} (already compressed)", record.file_name())
                    }
                    _ => debug!("Not a transcode candidate: {}", record.path.display()),
                }
                return state;
            }
        };

        if let Some(ref backup_dir) = self.config.backup_dir {
            if let Err(e) = BackupManager::backup(&record.path, backup_dir) {
                error!("❌ {}; leaving {} untouched", e, record.file_name());
                return JobState::Failed(e.to_string());
            }
        }

        self.reserve_candidate(&mut job);
        self.execute(&job)
    }

    fn execute(&self, job: &TranscodeJob) -> JobState {
        let source = &job.record.path;
        let candidate = &job.request.destination;
        let name = job.record.file_name();

        if let Err(e) = self.encoder.encode(&job.request) {
            warn!("⚠️ Encoding failed for {}: {}", name, e);
            let _ = fs::remove_file(candidate);
            return JobState::Failed(e.to_string());
        }
        info!("✅ {}", job.request.describe());

        let new_size = match fs::metadata(candidate) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                warn!("⚠️ Encoder produced no output for {}: {}", name, e);
                return JobState::Failed(format!("missing output {}: {}", candidate.display(), e));
            }
        };
        let original_size = fs::metadata(source).map(|m| m.len()).unwrap_or(job.record.size);

        if new_size >= original_size {
            info!(
                "⚖️ Skipped replacement (new file larger): {} ({} vs {})",
                name,
                FileManager::format_size(original_size),
                FileManager::format_size(new_size)
            );
            if let Err(e) = fs::remove_file(candidate) {
                warn!("Failed to discard {}: {}", candidate.display(), e);
            }
            return JobState::RejectedLarger { original_size, new_size };
        }

        self.stats.record(original_size, new_size);
        info!(
            "📉 {}: {} → {} ({:.1}% smaller)",
            name,
            FileManager::format_size(original_size),
            FileManager::format_size(new_size),
            FileManager::calculate_reduction(original_size, new_size)
        );

        let replaced_with = if !self.config.replace {
            None
        } else if self.claim_final_path(job) {
            self.replace_original(job)
        } else {
            warn!(
                "⚠️ Not replacing {}: {} is taken, keeping {}",
                name,
                job.final_path.display(),
                candidate.display()
            );
            None
        };

        JobState::Accepted {
            original_size,
            new_size,
            replaced_with,
        }
    }

    fn replace_original(&self, job: &TranscodeJob) -> Option<PathBuf> {
        let source = &job.record.path;

        if let Err(e) = fs::remove_file(source) {
            error!("Failed to remove original {}: {}", source.display(), e);
            return None;
        }

        match FileManager::move_file(&job.request.destination, &job.final_path) {
            Ok(()) => {
                info!(
                    "♻️ Replaced original: {} -> {}",
                    job.record.file_name(),
                    job.final_path.file_name().unwrap_or_default().to_string_lossy()
                );
                Some(job.final_path.clone())
            }
            Err(e) => {
                error!(
                    "Original {} removed but moving {} failed: {}",
                    source.display(),
                    job.request.destination.display(),
                    e
                );
                None
            }
        }
    }
}
