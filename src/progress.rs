//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e il riepilogo dei job.
//!
//! ## Componenti principali:
//! - `ProgressManager`: Progress bar `indicatif` per il pass di transcode
//! - `RunSummary`: Conteggio dei job per stato terminale
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:02:15] [========================================] 150/150 (100%) 📉 clip.mkv: 61.2% smaller
//! ```

use crate::file_manager::FileManager;
use crate::optimizer::task_optimizer::JobState;
use crate::stats::Savings;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for the transcode pass
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_jobs: u64) -> Self {
        let bar = ProgressBar::new(total_jobs);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// A bar that draws nothing (JSON mode)
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Counts of terminal job states for one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub accepted: usize,
    pub replaced: usize,
    pub rejected_larger: usize,
    pub skipped_unsupported: usize,
    pub skipped_compressed: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, state: &JobState) {
        match state {
            JobState::Accepted { replaced_with, .. } => {
                self.accepted += 1;
                if replaced_with.is_some() {
                    self.replaced += 1;
                }
            }
            JobState::RejectedLarger { .. } => self.rejected_larger += 1,
            JobState::SkippedUnsupported => self.skipped_unsupported += 1,
            JobState::SkippedAlreadyCompressed => self.skipped_compressed += 1,
            JobState::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.accepted + self.rejected_larger + self.skipped_unsupported + self.skipped_compressed + self.failed
    }

    pub fn format_summary(&self, savings: &Savings) -> String {
        format!(
            "Jobs: {} | Accepted: {} (replaced {}) | Larger: {} | Skipped: {} | Failed: {} | Saved: {} ({:.1}%)",
            self.total(),
            self.accepted,
            self.replaced,
            self.rejected_larger,
            self.skipped_unsupported + self.skipped_compressed,
            self.failed,
            FileManager::format_size(savings.saved()),
            savings.percent_saved()
        )
    }
}
