//! # Encoder Module
//!
//! Questo modulo costruisce ed esegue le richieste di ricodifica verso ffmpeg.
//!
//! ## Pipeline per categoria:
//! - **Video** → H.265 (`libx265`, preset `slow`, CRF dal tier) + AAC
//! - **Audio** → Opus (`libopus`, bitrate dal tier)
//! - **Image** → WebP (`libwebp`, `-q:v` dal tier)
//!
//! ## Controllo qualità:
//! | Tier   | CRF video | Bitrate audio | Qualità WebP |
//! |--------|-----------|---------------|--------------|
//! | low    | 32        | 64k           | 70           |
//! | medium | 28        | 96k           | 80           |
//! | high   | 23        | 128k          | 90           |
//!
//! ## Contratto:
//! L'encoder produce il file di destinazione e termina con successo, oppure
//! termina con errore. Il trait `Encoder` permette di sostituire ffmpeg nei
//! test con un'implementazione fittizia.

use crate::args;
use crate::classifier::MediaCategory;
use crate::config::QualityTier;
use crate::error::OptimizeError;
use crate::platform::PlatformCommands;
use anyhow::Result;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Everything needed to run one re-encode
#[derive(Debug, Clone)]
pub struct EncodeRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: MediaCategory,
    pub codec: &'static str,
    pub quality: QualityTier,
}

impl EncodeRequest {
    /// Fixed ffmpeg argument vector for this request
    pub fn ffmpeg_args(&self) -> Vec<String> {
        let source = self.source.to_string_lossy();
        let destination = self.destination.to_string_lossy();
        let crf = self.quality.video_crf().to_string();
        let webp_quality = self.quality.webp_quality().to_string();
        let bitrate = self.quality.audio_bitrate();

        let mut argv = args!["-hide_banner", "-loglevel", "error", "-y", "-i", &*source];
        match self.category {
            MediaCategory::Video => argv.extend(args![
                "-c:v", self.codec,
                "-preset", "slow",
                "-crf", crf.as_str(),
                "-c:a", "aac",
                "-b:a", bitrate,
            ]),
            MediaCategory::Audio => argv.extend(args!["-c:a", self.codec, "-b:a", bitrate]),
            MediaCategory::Image => argv.extend(args!["-c:v", self.codec, "-q:v", webp_quality.as_str()]),
            MediaCategory::Other => {}
        }
        argv.push(destination.to_string());
        argv
    }

    /// Short description used in log lines
    pub fn describe(&self) -> String {
        let name = self.source.file_name().unwrap_or_default().to_string_lossy();
        match self.category {
            MediaCategory::Video => format!("🎞️ Video -> H.265: {}", name),
            MediaCategory::Audio => format!("🎵 Audio -> Opus: {}", name),
            MediaCategory::Image => format!("🖼️ Image -> WebP: {}", name),
            MediaCategory::Other => name.to_string(),
        }
    }
}

/// Runs an encode request; `Ok` means the destination was written
pub trait Encoder: Send + Sync {
    fn encode(&self, request: &EncodeRequest) -> Result<()>;
}

/// Encoder backed by the ffmpeg binary
#[derive(Debug, Default, Clone)]
pub struct FfmpegEncoder;

impl FfmpegEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder for FfmpegEncoder {
    fn encode(&self, request: &EncodeRequest) -> Result<()> {
        let platform = PlatformCommands::instance();
        let ffmpeg_cmd = platform.get_command("ffmpeg");
        let argv = request.ffmpeg_args();

        debug!("🔧 {} {}", ffmpeg_cmd, argv.join(" "));

        let start_time = std::time::Instant::now();
        let output = Command::new(ffmpeg_cmd)
            .args(&argv)
            .output()
            .map_err(|e| OptimizeError::FFmpeg(format!("Failed to execute {}: {}", ffmpeg_cmd, e)))?;

        if !output.status.success() {
            return Err(OptimizeError::FFmpeg(format!(
                "{} exited with {}: {}",
                ffmpeg_cmd,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )).into());
        }

        debug!(
            "Encoded {} in {:.1}s",
            request.source.display(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(())
    }
}
