//! # Report Module
//!
//! Riepilogo in sola lettura della cartella dopo la pipeline.
//!
//! ## Contenuto:
//! - Numero totale di file e dimensione totale
//! - Conteggio e dimensione per categoria (video, audio, immagini)
//! - File più grande e più piccolo
//! - Analisi per file (`--analyze`): nome | categoria | dimensione

use crate::classifier::MediaCategory;
use crate::file_manager::{FileManager, FileRecord};
use std::path::PathBuf;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CategoryTotals {
    pub count: usize,
    pub size: u64,
}

impl CategoryTotals {
    fn add(&mut self, size: u64) {
        self.count += 1;
        self.size += size;
    }
}

#[derive(Debug, Default, Clone)]
pub struct FolderReport {
    pub total_files: usize,
    pub total_size: u64,
    pub videos: CategoryTotals,
    pub audios: CategoryTotals,
    pub images: CategoryTotals,
    pub largest: Option<(PathBuf, u64)>,
    pub smallest: Option<(PathBuf, u64)>,
}

impl FolderReport {
    pub fn from_records(records: &[FileRecord]) -> Self {
        let mut report = Self::default();

        for record in records {
            report.total_files += 1;
            report.total_size += record.size;

            match record.category {
                MediaCategory::Video => report.videos.add(record.size),
                MediaCategory::Audio => report.audios.add(record.size),
                MediaCategory::Image => report.images.add(record.size),
                MediaCategory::Other => {}
            }

            // Ties keep the first file in traversal order
            if report.largest.as_ref().map_or(true, |(_, size)| record.size > *size) {
                report.largest = Some((record.path.clone(), record.size));
            }
            if report.smallest.as_ref().map_or(true, |(_, size)| record.size < *size) {
                report.smallest = Some((record.path.clone(), record.size));
            }
        }

        report
    }

    pub fn lines(&self) -> Vec<String> {
        let fmt = FileManager::format_size;
        let name = |path: &PathBuf| path.file_name().unwrap_or_default().to_string_lossy().to_string();

        let mut lines = vec![
            format!("Total files: {}", self.total_files),
            format!("Total size: {}", fmt(self.total_size)),
            format!("Videos: {} ({})", self.videos.count, fmt(self.videos.size)),
            format!("Audios: {} ({})", self.audios.count, fmt(self.audios.size)),
            format!("Images: {} ({})", self.images.count, fmt(self.images.size)),
        ];
        if let Some((ref path, size)) = self.largest {
            lines.push(format!("Largest: {} ({})", name(path), fmt(size)));
        }
        if let Some((ref path, size)) = self.smallest {
            lines.push(format!("Smallest: {} ({})", name(path), fmt(size)));
        }
        lines
    }
}

/// One line per file: `name | category | size`
pub fn analyze(records: &[FileRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| format!("{} | {} | {}", r.file_name(), r.category, FileManager::format_size(r.size)))
        .collect()
}
