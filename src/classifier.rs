//! # Media Classifier Module
//!
//! Mappa le estensioni dei file su una categoria media chiusa e associa a
//! ogni categoria trascodificabile il suo profilo di destinazione.
//!
//! ## Categorie:
//! - **Video**: mp4, mkv, avi, mov, hevc, 265, h265, av1 → `.mp4` (H.265 + AAC)
//! - **Audio**: mp3, wav, aac, flac, m4a, opus → `.opus` (Opus)
//! - **Image**: jpg, jpeg, png, bmp, webp → `.webp` (WebP)
//! - **Other**: tutto il resto, mai trascodificato
//!
//! ## Formati già compressi:
//! Ogni profilo elenca le estensioni che sono già nella famiglia di codec di
//! destinazione. Ricodificarle non porta benefici, quindi vengono saltate
//! (solo per i video lo skip può essere forzato con `--force-hevc`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Closed set of media categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Video,
    Audio,
    Image,
    Other,
}

/// Where a category gets re-encoded to
#[derive(Debug)]
pub struct TargetProfile {
    /// Extension of the produced file, without the dot
    pub extension: &'static str,
    /// Encoder codec name passed to ffmpeg
    pub codec: &'static str,
    /// Source extensions already in the target codec family
    pub already_compressed: &'static [&'static str],
}

static VIDEO_PROFILE: TargetProfile = TargetProfile {
    extension: "mp4",
    codec: "libx265",
    already_compressed: &["hevc", "265", "h265"],
};

static AUDIO_PROFILE: TargetProfile = TargetProfile {
    extension: "opus",
    codec: "libopus",
    already_compressed: &["opus"],
};

static IMAGE_PROFILE: TargetProfile = TargetProfile {
    extension: "webp",
    codec: "libwebp",
    already_compressed: &["webp"],
};

impl MediaCategory {
    /// Classify a bare extension (no leading dot, any case)
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "mp4" | "mkv" | "avi" | "mov" | "hevc" | "265" | "h265" | "av1" => Self::Video,
            "mp3" | "wav" | "aac" | "flac" | "m4a" | "opus" => Self::Audio,
            "jpg" | "jpeg" | "png" | "bmp" | "webp" => Self::Image,
            _ => Self::Other,
        }
    }

    /// Classify a path by its extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .map(|ext| Self::from_extension(&ext.to_string_lossy()))
            .unwrap_or(Self::Other)
    }

    /// Target profile, `None` for files that are never transcoded
    pub fn profile(&self) -> Option<&'static TargetProfile> {
        match self {
            Self::Video => Some(&VIDEO_PROFILE),
            Self::Audio => Some(&AUDIO_PROFILE),
            Self::Image => Some(&IMAGE_PROFILE),
            Self::Other => None,
        }
    }

    /// Label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Image => "Image",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TargetProfile {
    /// Check whether `extension` is already in this profile's codec family
    pub fn is_already_compressed(&self, extension: &str) -> bool {
        let ext = extension.to_ascii_lowercase();
        self.already_compressed.iter().any(|c| *c == ext)
    }
}
