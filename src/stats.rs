//! # Aggregate Stats Module
//!
//! Contatori globali dei byte originali/nuovi condivisi fra i worker.
//!
//! ## Concorrenza:
//! L'unica risorsa mutabile condivisa della pipeline. Ogni job accettato
//! chiama `record()` una sola volta; entrambi i contatori usano `fetch_add`
//! atomico, quindi nessun aggiornamento viene perso con N worker.
//! I totali vanno letti solo dopo il join di tutti i job.

use std::sync::atomic::{AtomicU64, Ordering};

/// Original/new byte totals over every accepted transcode
#[derive(Debug, Default)]
pub struct AggregateStats {
    original_bytes: AtomicU64,
    new_bytes: AtomicU64,
}

/// Snapshot of the totals taken after the join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Savings {
    pub original_bytes: u64,
    pub new_bytes: u64,
}

impl AggregateStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, old_size: u64, new_size: u64) {
        self.original_bytes.fetch_add(old_size, Ordering::Relaxed);
        self.new_bytes.fetch_add(new_size, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Savings {
        Savings {
            original_bytes: self.original_bytes.load(Ordering::Acquire),
            new_bytes: self.new_bytes.load(Ordering::Acquire),
        }
    }
}

impl Savings {
    pub fn saved(&self) -> u64 {
        self.original_bytes.saturating_sub(self.new_bytes)
    }

    /// Zero when nothing was recorded
    pub fn percent_saved(&self) -> f64 {
        if self.original_bytes > 0 {
            self.saved() as f64 / self.original_bytes as f64 * 100.0
        } else {
            0.0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.original_bytes == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_record_and_percent() {
        let stats = AggregateStats::new();
        assert!(stats.snapshot().is_empty());
        assert_eq!(stats.snapshot().percent_saved(), 0.0);

        stats.record(100, 40);
        stats.record(50, 10);
        let savings = stats.snapshot();

        assert_eq!(savings.original_bytes, 150);
        assert_eq!(savings.new_bytes, 50);
        assert_eq!(savings.saved(), 100);
        assert!((savings.percent_saved() - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_no_lost_updates_across_threads() {
        let stats = Arc::new(AggregateStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                thread::spawn(move || {
                    for i in 0..10_000u64 {
                        stats.record(i + 2, i + 1);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let per_thread_old: u64 = (0..10_000u64).map(|i| i + 2).sum();
        let per_thread_new: u64 = (0..10_000u64).map(|i| i + 1).sum();
        let savings = stats.snapshot();
        assert_eq!(savings.original_bytes, per_thread_old * 8);
        assert_eq!(savings.new_bytes, per_thread_new * 8);
    }
}
