//! # Media Squash Library
//!
//! Modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `classifier`: Estensione → categoria media e profilo di destinazione
//! - `config`: Configurazione, tier di qualità e validazione parametri
//! - `error`: Tipi di errore custom
//! - `file_manager`: Enumerazione deterministica e operazioni sui file
//! - `dedup`: Digest SHA-256 e rimozione duplicati
//! - `organizer`: Smistamento in sottocartelle per tipo, dimensione o data
//! - `backup`: Copia degli originali e ripristino (`--undo`)
//! - `encoder`: Richieste ffmpeg e trait `Encoder`
//! - `optimizer`: Orchestratore della pipeline e job di transcode
//! - `stats`: Contatori atomici del risparmio
//! - `archive`: Archivi zip e tar.gz della cartella finale
//! - `report`: Report della cartella e analisi per file
//! - `probe`: Metadata via ffprobe
//! - `progress` / `json_output`: Feedback visivo e eventi JSON
//!
//! ## Utilizzo:
//! ```ignore
//! use media_squash::{Config, MediaOptimizer};
//!
//! let config = Config { dedup: true, transcode: true, ..Default::default() };
//! let outcome = MediaOptimizer::new(&path, config)?.run().await?;
//! ```

pub mod archive;
pub mod backup;
pub mod classifier;
pub mod config;
pub mod dedup;
pub mod encoder;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod optimizer;
pub mod organizer;
pub mod platform;
pub mod probe;
pub mod progress;
pub mod report;
pub mod stats;
pub mod utils;

pub use classifier::MediaCategory;
pub use config::Config;
pub use error::OptimizeError;
pub use file_manager::{FileManager, FileRecord};
pub use optimizer::{MediaOptimizer, RunOutcome};
