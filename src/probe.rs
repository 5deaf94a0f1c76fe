//! # Metadata Probe Module
//!
//! Estrae i metadata media tramite `ffprobe` e li presenta riga per riga.
//!
//! ## Dati estratti:
//! - **Format**: nome container, durata, dimensione, bitrate
//! - **Streams**: tipo e nome codec, risoluzione quando presente
//!
//! ## Errori:
//! Un ffprobe fallito o un JSON malformato non interrompe la run: il file
//! viene loggato e saltato.

use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use crate::platform::PlatformCommands;
use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

/// Complete ffprobe output structure
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeData {
    pub format: Option<ProbeFormat>,
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
}

/// Format-level metadata
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeFormat {
    pub format_name: Option<String>,
    pub duration: Option<String>,
    pub size: Option<String>,
    pub bit_rate: Option<String>,
}

/// Stream-level metadata
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeStream {
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ProbeData {
    /// Parse ffprobe's `-print_format json` output
    pub fn parse(json: &str) -> Result<Self, OptimizeError> {
        serde_json::from_str(json).map_err(|e| OptimizeError::Probe(format!("malformed ffprobe output: {}", e)))
    }

    /// Human-readable lines, one per fact
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(ref format) = self.format {
            let unknown = "?".to_string();
            lines.push(format!("Format: {}", format.format_name.as_ref().unwrap_or(&unknown)));
            lines.push(format!("Duration: {}s", format.duration.as_ref().unwrap_or(&unknown)));
            let size = format.size.as_deref().and_then(|s| s.parse::<u64>().ok()).unwrap_or(0);
            lines.push(format!("Size: {}", FileManager::format_size(size)));
            lines.push(format!("Bitrate: {} bps", format.bit_rate.as_ref().unwrap_or(&unknown)));
        }

        for (i, stream) in self.streams.iter().enumerate() {
            lines.push(format!(
                "Stream {}: {} | {}",
                i + 1,
                stream.codec_type.as_deref().unwrap_or("?"),
                stream.codec_name.as_deref().unwrap_or("?")
            ));
            if let (Some(width), Some(height)) = (stream.width, stream.height) {
                lines.push(format!("   Resolution: {}x{}", width, height));
            }
        }

        lines
    }
}

/// Run ffprobe on a file and parse its JSON output
pub fn probe_file(path: &Path) -> Result<ProbeData> {
    let platform = PlatformCommands::instance();
    let ffprobe_cmd = platform.get_command("ffprobe");

    let output = Command::new(ffprobe_cmd)
        .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
        .arg(path)
        .output()
        .map_err(|e| OptimizeError::Probe(format!("Failed to execute {}: {}", ffprobe_cmd, e)))?;

    if !output.status.success() {
        return Err(OptimizeError::Probe(format!(
            "{} exited with {} for {}",
            ffprobe_cmd,
            output.status,
            path.display()
        )).into());
    }

    Ok(ProbeData::parse(&String::from_utf8_lossy(&output.stdout))?)
}
