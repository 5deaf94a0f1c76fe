//! # Path Resolution Module
//!
//! Centralizza il calcolo dei path dei candidati e delle destinazioni finali.

use std::path::{Path, PathBuf};

/// Utility per calcolare i path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// `<dir>/<stem>_new.<extension>`, written next to the source
    pub fn candidate_path(source: &Path, extension: &str) -> PathBuf {
        let stem = source.file_stem().unwrap_or_default().to_string_lossy();
        source.with_file_name(format!("{}_new.{}", stem, extension))
    }

    /// First of `<stem>_new.<ext>`, `<stem>_new_2.<ext>`, ... that `taken` rejects
    pub fn free_candidate_path(source: &Path, extension: &str, mut taken: impl FnMut(&Path) -> bool) -> PathBuf {
        let stem = source.file_stem().unwrap_or_default().to_string_lossy();
        let mut candidate = Self::candidate_path(source, extension);
        let mut attempt = 2;
        while taken(&candidate) {
            candidate = source.with_file_name(format!("{}_new_{}.{}", stem, attempt, extension));
            attempt += 1;
        }
        candidate
    }

    /// Where an accepted candidate lands when replacing: same stem, new extension
    pub fn final_path(source: &Path, extension: &str) -> PathBuf {
        source.with_extension(extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_path() {
        assert_eq!(
            PathResolver::candidate_path(Path::new("/m/clip.mkv"), "mp4"),
            PathBuf::from("/m/clip_new.mp4")
        );
        assert_eq!(
            PathResolver::candidate_path(Path::new("/m/holiday.2023.jpg"), "webp"),
            PathBuf::from("/m/holiday.2023_new.webp")
        );
    }

    #[test]
    fn test_free_candidate_path_skips_taken_names() {
        let source = Path::new("/m/clip.mkv");
        let taken = [PathBuf::from("/m/clip_new.mp4"), PathBuf::from("/m/clip_new_2.mp4")];

        assert_eq!(
            PathResolver::free_candidate_path(source, "mp4", |p| taken.iter().any(|t| t == p)),
            PathBuf::from("/m/clip_new_3.mp4")
        );
        assert_eq!(
            PathResolver::free_candidate_path(source, "mp4", |_| false),
            PathBuf::from("/m/clip_new.mp4")
        );
    }

    #[test]
    fn test_final_path() {
        assert_eq!(PathResolver::final_path(Path::new("/m/song.flac"), "opus"), PathBuf::from("/m/song.opus"));
        assert_eq!(PathResolver::final_path(Path::new("/m/clip.mp4"), "mp4"), PathBuf::from("/m/clip.mp4"));
    }
}
