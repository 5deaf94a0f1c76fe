//! # Media Optimizer Main Orchestrator
//!
//! Orchestratore principale che esegue i pass della pipeline nell'ordine
//! fisso e delega il lavoro ai moduli specializzati.
//!
//! ## Ordine dei pass:
//! 1. `--undo`: ripristino dal backup e stop
//! 2. Enumerazione (una sola volta, ordine deterministico)
//! 3. `--metadata`: probe di ogni file e stop
//! 4. `--dry-run`: report delle azioni previste e stop
//! 5. Dedup → Organize → Transcode concorrente → join
//! 6. Riepilogo risparmio, archivio, report/analisi
//!
//! ## Concorrenza:
//! Un task tokio per job, limitato da un `Semaphore` con `threads` permessi.
//! Il corpo del job gira in `spawn_blocking` perché l'encoder è un processo
//! esterno bloccante. Tutti i task vengono attesi prima di leggere le stats.

use crate::{
    archive::compress_folder,
    backup::BackupManager,
    config::Config,
    dedup::Deduplicator,
    encoder::{Encoder, FfmpegEncoder},
    error::OptimizeError,
    file_manager::{FileManager, FileRecord},
    json_output::JsonMessage,
    optimizer::task_optimizer::{JobState, TaskOptimizer},
    organizer::organize,
    platform::PlatformCommands,
    probe::probe_file,
    progress::{ProgressManager, RunSummary},
    report::{analyze, FolderReport},
    stats::{AggregateStats, Savings},
};
use anyhow::Result;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// What a run did, for callers and tests
#[derive(Debug, Default, Clone)]
pub struct RunOutcome {
    pub summary: RunSummary,
    pub savings: Savings,
    pub duplicates_removed: usize,
    pub bytes_reclaimed: u64,
    /// Archive written by the compress pass
    pub archive: Option<PathBuf>,
    /// Number of originals restored by `--undo`
    pub restored: Option<usize>,
}

/// Orchestratore principale
pub struct MediaOptimizer {
    folder: PathBuf,
    config: Config,
    encoder: Arc<dyn Encoder>,
}

impl MediaOptimizer {
    /// Validate the configuration and the target folder; both are fatal
    pub fn new(folder: &Path, config: Config) -> Result<Self> {
        config.validate()?;

        if !folder.is_dir() {
            return Err(OptimizeError::FolderNotFound(folder.to_path_buf()).into());
        }

        Ok(Self {
            folder: folder.canonicalize()?,
            config,
            encoder: Arc::new(FfmpegEncoder::new()),
        })
    }

    /// Swap the encoder backend
    pub fn with_encoder(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Esegue la pipeline completa
    pub async fn run(&self) -> Result<RunOutcome> {
        let start_time = Instant::now();
        let mut outcome = RunOutcome::default();

        if self.config.undo {
            outcome.restored = Some(self.undo().await?);
            return Ok(outcome);
        }

        self.check_dependencies().await;

        let records = FileManager::enumerate(&self.folder, self.config.backup_dir.as_deref())?;

        if self.config.metadata {
            self.print_metadata(records).await?;
            return Ok(outcome);
        }

        self.emit_start_message(records.len());
        self.log_configuration();

        if self.config.dry_run {
            self.report_dry_run(records).await?;
            return Ok(outcome);
        }

        let records = if self.config.dedup {
            let dedup = tokio::task::spawn_blocking(move || Deduplicator::new(false).run(records)).await?;
            outcome.duplicates_removed = dedup.duplicates.iter().filter(|d| d.removed).count();
            outcome.bytes_reclaimed = dedup.bytes_reclaimed();
            dedup.survivors
        } else {
            records
        };

        let records = match self.config.organize {
            Some(mode) => {
                let base = self.folder.clone();
                tokio::task::spawn_blocking(move || organize(&base, records, mode, false)).await?
            }
            None => records,
        };

        if self.config.transcode {
            let stats = Arc::new(AggregateStats::new());
            outcome.summary = self.process_files_concurrently(records, Arc::clone(&stats)).await?;
            // Every job has been joined at this point
            outcome.savings = stats.snapshot();

            if !self.config.json_output {
                info!("📊 Summary");
                info!("{}", outcome.summary.format_summary(&outcome.savings));
                info!(
                    "💾 Total space saved: {} → {} ({} saved)",
                    FileManager::format_size(outcome.savings.original_bytes),
                    FileManager::format_size(outcome.savings.new_bytes),
                    FileManager::format_size(outcome.savings.saved())
                );
            }
        }

        if let Some(format) = self.config.compress {
            let folder = self.folder.clone();
            match tokio::task::spawn_blocking(move || compress_folder(&folder, format)).await? {
                Ok(archive) => outcome.archive = Some(archive),
                Err(e) => {
                    error!("Compression failed: {}", e);
                    if self.config.json_output {
                        JsonMessage::error("Compression failed".to_string(), Some(e.to_string())).emit();
                    }
                }
            }
        }

        if self.config.report || self.config.analyze {
            self.print_report()?;
        }

        if self.config.json_output {
            JsonMessage::complete(&outcome.summary, &outcome.savings, start_time.elapsed().as_secs_f64()).emit();
        } else {
            info!("Done in {:.1}s", start_time.elapsed().as_secs_f64());
        }

        Ok(outcome)
    }

    async fn undo(&self) -> Result<usize> {
        let backup_dir = self
            .config
            .backup_dir
            .clone()
            .ok_or_else(|| OptimizeError::Validation("Undo requires a backup directory".to_string()))?;
        let target = self.folder.clone();

        info!("↩️ Restoring originals from {}", backup_dir.display());
        tokio::task::spawn_blocking(move || BackupManager::restore(&backup_dir, &target)).await?
    }

    /// Missing tools only warn; the affected jobs fail on their own
    async fn check_dependencies(&self) {
        let platform = PlatformCommands::instance();

        if self.config.transcode && !self.config.dry_run && !platform.is_command_available("ffmpeg").await {
            warn!("⚠️ {}", OptimizeError::MissingDependency("ffmpeg not found in PATH, transcode jobs will fail".to_string()));
        }
        if self.config.metadata && !platform.is_command_available("ffprobe").await {
            warn!("⚠️ {}", OptimizeError::MissingDependency("ffprobe not found in PATH, metadata probing will fail".to_string()));
        }
    }

    fn emit_start_message(&self, total_files: usize) {
        if self.config.json_output {
            JsonMessage::start(&self.folder, total_files, &self.config).emit();
        } else {
            info!("🚀 Starting media squash in: {}", self.folder.display());
            info!("Found {} files", total_files);
        }
    }

    /// Logga configurazione (solo se non JSON mode)
    fn log_configuration(&self) {
        if self.config.json_output {
            return;
        }

        if self.config.dry_run {
            info!("Dry run mode: No files will be modified");
        }
        if self.config.dedup {
            info!("Dedup: remove byte-identical duplicates");
        }
        if let Some(mode) = self.config.organize {
            info!("Organize: by {:?}", mode);
        }
        if self.config.transcode {
            info!(
                "Transcode: quality {} with {} worker(s){}",
                self.config.quality,
                self.config.threads,
                if self.config.force_hevc { ", forcing HEVC sources" } else { "" }
            );
            if self.config.replace {
                info!("Mode: Replace originals when the result is smaller");
            } else {
                info!("Mode: Keep originals, write *_new files next to them");
            }
        }
        if let Some(ref backup_dir) = self.config.backup_dir {
            info!("Backup directory: {}", backup_dir.display());
        }
    }

    async fn print_metadata(&self, records: Vec<FileRecord>) -> Result<()> {
        tokio::task::spawn_blocking(move || {
            for record in &records {
                match probe_file(&record.path) {
                    Ok(data) => {
                        info!("📄 {}", record.path.display());
                        for line in data.describe() {
                            info!("   {}", line);
                        }
                    }
                    Err(e) => warn!("⚠️ Cannot probe {}: {}", record.file_name(), e),
                }
            }
        })
        .await?;
        Ok(())
    }

    /// Hash, bucket and plan without touching the tree
    async fn report_dry_run(&self, records: Vec<FileRecord>) -> Result<()> {
        let config = self.config.clone();
        let base = self.folder.clone();
        let task = TaskOptimizer::new(config.clone(), Arc::clone(&self.encoder), Arc::new(AggregateStats::new()));

        tokio::task::spawn_blocking(move || {
            let records = if config.dedup {
                Deduplicator::new(true).run(records).survivors
            } else {
                records
            };

            let records = match config.organize {
                Some(mode) => organize(&base, records, mode, true),
                None => records,
            };

            if config.transcode {
                let mut planned = 0;
                for record in &records {
                    match task.plan(record) {
                        Ok(job) => {
                            planned += 1;
                            info!(
                                "🔍 Would transcode {} -> {}",
                                record.file_name(),
                                job.request.destination.file_name().unwrap_or_default().to_string_lossy()
                            );
                        }
                        Err(JobState::SkippedAlreadyCompressed) => {
                            info!("⏩ Would skip {} (already compressed)", record.file_name())
                        }
                        Err(_) => {}
                    }
                }
                info!("Dry run: {} transcode jobs planned", planned);
            }

            if config.compress.is_some() {
                info!("📦 Would compress {}", base.display());
            }
        })
        .await?;

        Ok(())
    }

    /// Dispatch one job per media file, bounded by `threads`
    async fn process_files_concurrently(
        &self,
        records: Vec<FileRecord>,
        stats: Arc<AggregateStats>,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::new();
        let (eligible, unsupported): (Vec<_>, Vec<_>) =
            records.into_iter().partition(|r| r.category.profile().is_some());

        for record in &unsupported {
            debug!("Not a transcode candidate: {}", record.path.display());
            summary.add(&JobState::SkippedUnsupported);
        }

        let progress = if self.config.json_output {
            ProgressManager::hidden()
        } else {
            ProgressManager::new(eligible.len() as u64)
        };

        let semaphore = Arc::new(Semaphore::new(self.config.threads));
        let task_optimizer = TaskOptimizer::new(self.config.clone(), Arc::clone(&self.encoder), stats);
        let mut tasks = Vec::with_capacity(eligible.len());

        for record in eligible {
            let semaphore = Arc::clone(&semaphore);
            let task_optimizer = task_optimizer.clone();
            let progress = progress.clone();
            let json_output = self.config.json_output;

            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await?;

                let path = record.path.clone();
                let name = record.file_name();
                let state = tokio::task::spawn_blocking(move || task_optimizer.process(&record)).await?;

                progress.update(&format!("{} {}", state.name(), name));
                if json_output {
                    JsonMessage::job_complete(&path, &state).emit();
                }

                Ok::<JobState, anyhow::Error>(state)
            }));
        }

        for result in join_all(tasks).await {
            match result {
                Ok(Ok(state)) => summary.add(&state),
                Ok(Err(e)) => {
                    error!("Transcode job aborted: {}", e);
                    summary.add(&JobState::Failed(e.to_string()));
                }
                Err(e) => {
                    error!("Transcode task panicked: {}", e);
                    summary.add(&JobState::Failed(e.to_string()));
                }
            }
        }

        progress.finish(&format!("{} jobs done", summary.total()));
        Ok(summary)
    }

    fn print_report(&self) -> Result<()> {
        let records = FileManager::enumerate(&self.folder, self.config.backup_dir.as_deref())?;

        if self.config.report {
            info!("📋 Report for {}", self.folder.display());
            for line in FolderReport::from_records(&records).lines() {
                info!("   {}", line);
            }
        }
        if self.config.analyze {
            info!("🔎 Analysis");
            for line in analyze(&records) {
                info!("   {}", line);
            }
        }
        Ok(())
    }
}
