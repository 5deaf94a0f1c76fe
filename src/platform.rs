//! # Platform-specific utilities
//!
//! Risoluzione dei tool esterni (ffmpeg, ffprobe) per la piattaforma corrente
//! e controllo della loro presenza nel PATH prima di avviare la pipeline.

use std::sync::OnceLock;

/// External tools the pipeline shells out to
const KNOWN_TOOLS: &[(&str, &str)] = &[("ffmpeg", "ffmpeg.exe"), ("ffprobe", "ffprobe.exe")];

/// Platform-specific command manager
pub struct PlatformCommands {
    windows: bool,
    which_command: &'static str,
}

impl PlatformCommands {
    /// Get the singleton instance
    pub fn instance() -> &'static Self {
        static INSTANCE: OnceLock<PlatformCommands> = OnceLock::new();
        INSTANCE.get_or_init(|| Self::for_target(cfg!(windows)))
    }

    fn for_target(windows: bool) -> Self {
        Self {
            windows,
            which_command: if windows { "where" } else { "which" },
        }
    }

    /// Executable name for a known tool; unknown names pass through
    pub fn get_command<'a>(&self, base_name: &'a str) -> &'a str {
        if !self.windows {
            return base_name;
        }
        for &(name, exe) in KNOWN_TOOLS {
            if name == base_name {
                return exe;
            }
        }
        base_name
    }

    /// Get the command used to check if a program exists
    pub fn which_command(&self) -> &str {
        self.which_command
    }

    /// Check if a command is available on the PATH
    pub async fn is_command_available(&self, base_name: &str) -> bool {
        tokio::process::Command::new(self.which_command)
            .arg(self.get_command(base_name))
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}
