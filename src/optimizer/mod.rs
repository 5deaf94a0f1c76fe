//! # Optimizer Module
//!
//! Modulo che separa le responsabilità in sottomoduli:
//! - `media_optimizer`: Orchestratore principale della pipeline
//! - `task_optimizer`: Coordinatore del singolo job di transcode
//! - `path_resolver`: Logica di calcolo path centralizzata

pub mod media_optimizer;
pub mod path_resolver;
pub mod task_optimizer;

pub use media_optimizer::{MediaOptimizer, RunOutcome};
pub use path_resolver::PathResolver;
pub use task_optimizer::{JobState, TaskOptimizer, TranscodeJob};

#[cfg(test)]
pub(crate) mod testing {
    use crate::encoder::{EncodeRequest, Encoder};
    use anyhow::Result;

    /// Writes a candidate whose size is `percent`% of the source
    pub struct ScaledEncoder {
        pub percent: u64,
    }

    impl Encoder for ScaledEncoder {
        fn encode(&self, request: &EncodeRequest) -> Result<()> {
            let size = std::fs::metadata(&request.source)?.len() * self.percent / 100;
            std::fs::write(&request.destination, vec![0u8; size as usize])?;
            Ok(())
        }
    }

    /// Leaves a partial file behind and fails
    pub struct FailingEncoder;

    impl Encoder for FailingEncoder {
        fn encode(&self, request: &EncodeRequest) -> Result<()> {
            std::fs::write(&request.destination, b"partial")?;
            anyhow::bail!("encoder exited with status 1")
        }
    }
}
