//! # Media Squash - Main Entry Point
//!
//! Punto di ingresso della CLI.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del logging con `tracing` (su stderr, stdout resta per `--json`)
//! - Caricamento del file di configurazione e override dai flag CLI
//! - Avvio di `MediaOptimizer`
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI
//! 2. Configura il logging (`RUST_LOG`, altrimenti INFO o DEBUG con `--verbose`)
//! 3. Costruisce la `Config` (file opzionale + flag espliciti)
//! 4. Valida cartella e configurazione (errori fatali)
//! 5. Esegue la pipeline
//!
//! ## Esempio di utilizzo:
//! ```bash
//! media-squash /path/to/media --dedup --transcode --replace --backup-dir /tmp/bk --threads 4
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use media_squash::config::{ArchiveFormat, OrganizeMode, QualityTier};
use media_squash::json_output::JsonMessage;
use media_squash::{Config, MediaOptimizer};

#[derive(Parser)]
#[command(name = "media-squash")]
#[command(about = "Deduplicate, organize and re-encode a media folder to save space")]
struct Args {
    /// Folder containing the media to process
    folder: PathBuf,

    /// Re-encode video to H.265, audio to Opus, images to WebP
    #[arg(long)]
    transcode: bool,

    /// Replace originals when the re-encoded file is smaller
    #[arg(long)]
    replace: bool,

    /// Copy originals here before replacing them
    #[arg(long)]
    backup_dir: Option<PathBuf>,

    /// Restore originals from the backup directory and exit
    #[arg(long, requires = "backup_dir")]
    undo: bool,

    /// Show what would happen without touching any file
    #[arg(long)]
    dry_run: bool,

    /// Remove byte-identical duplicates
    #[arg(long)]
    dedup: bool,

    /// Move files into subfolders by type, size or date
    #[arg(long, value_enum)]
    organize: Option<OrganizeMode>,

    /// Encoder quality tier [default: medium]
    #[arg(long, value_enum)]
    quality: Option<QualityTier>,

    /// Number of parallel transcode workers [default: 1]
    #[arg(long)]
    threads: Option<usize>,

    /// Re-encode HEVC/H.265 sources too
    #[arg(long)]
    force_hevc: bool,

    /// Archive the folder when done
    #[arg(long, value_enum)]
    compress: Option<ArchiveFormat>,

    /// Print a folder report at the end
    #[arg(long)]
    report: bool,

    /// Print name, category and size of every file at the end
    #[arg(long)]
    analyze: bool,

    /// Print ffprobe metadata for every file and exit
    #[arg(long)]
    metadata: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output progress and status as JSON lines on stdout
    #[arg(long)]
    json: bool,

    /// JSON configuration file; explicit flags override it
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    /// Layer explicit CLI flags over the base configuration
    fn apply(&self, mut config: Config) -> Config {
        config.transcode |= self.transcode;
        config.replace |= self.replace;
        config.undo |= self.undo;
        config.dry_run |= self.dry_run;
        config.dedup |= self.dedup;
        config.force_hevc |= self.force_hevc;
        config.report |= self.report;
        config.analyze |= self.analyze;
        config.metadata |= self.metadata;
        config.json_output |= self.json;

        if let Some(ref backup_dir) = self.backup_dir {
            config.backup_dir = Some(backup_dir.clone());
        }
        if let Some(mode) = self.organize {
            config.organize = Some(mode);
        }
        if let Some(quality) = self.quality {
            config.quality = quality;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(format) = self.compress {
            config.compress = Some(format);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    let base = match args.config {
        Some(ref path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    let config = args.apply(base);
    let json_output = config.json_output;

    let result = async {
        let optimizer = MediaOptimizer::new(&args.folder, config)?;
        optimizer.run().await
    }
    .await;

    if let Err(ref e) = result {
        if json_output {
            JsonMessage::error("Run aborted".to_string(), Some(format!("{:#}", e))).emit();
        }
    }

    result.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config_file() {
        let args = Args::parse_from([
            "media-squash", "/media", "--transcode", "--quality", "high", "--threads", "6",
        ]);
        let base = Config { dedup: true, threads: 2, ..Default::default() };
        let config = args.apply(base);

        assert!(config.transcode);
        assert!(config.dedup);
        assert_eq!(config.quality, QualityTier::High);
        assert_eq!(config.threads, 6);
    }

    #[test]
    fn test_undo_requires_backup_dir() {
        assert!(Args::try_parse_from(["media-squash", "/media", "--undo"]).is_err());
        assert!(Args::try_parse_from(["media-squash", "/media", "--undo", "--backup-dir", "/bk"]).is_ok());
    }

    #[test]
    fn test_value_enums() {
        let args = Args::parse_from(["media-squash", "/m", "--organize", "date", "--compress", "tar"]);
        assert_eq!(args.organize, Some(OrganizeMode::Date));
        assert_eq!(args.compress, Some(ArchiveFormat::Tar));
    }
}
