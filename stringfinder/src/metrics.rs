use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// A shared, monotonically increasing counter.
///
/// Cloning hands out another handle to the same value. Only the walk task
/// increments; any task may take a snapshot.
#[derive(Debug, Clone, Default)]
pub struct ScanCounter(Arc<AtomicU64>);

impl ScanCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one and returns the new value
    pub fn increment(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Adds `n` and returns the new value
    pub fn add(&self, n: u64) -> u64 {
        self.0.fetch_add(n, Ordering::AcqRel) + n
    }

    pub fn snapshot(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }
}

/// Per-run counters for a search
#[derive(Debug, Clone, Default)]
pub struct ScanMetrics {
    processed: ScanCounter,
    matched: ScanCounter,
    bytes_read: ScanCounter,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter of candidates whose scan has finished
    pub fn processed(&self) -> &ScanCounter {
        &self.processed
    }

    pub fn record_match(&self) {
        self.matched.increment();
    }

    pub fn record_bytes(&self, bytes: u64) {
        let total = self.bytes_read.add(bytes);
        debug!("Read {} bytes, total: {} bytes", bytes, total);
    }

    pub fn get_stats(&self) -> ScanStats {
        ScanStats {
            processed_files: self.processed.snapshot(),
            matched_files: self.matched.snapshot(),
            bytes_read: self.bytes_read.snapshot(),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Scan stats: {} files processed, {} matched, {} bytes read",
            stats.processed_files, stats.matched_files, stats.bytes_read
        );
    }
}

/// Point-in-time copy of [`ScanMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub processed_files: u64,
    pub matched_files: u64,
    pub bytes_read: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_counter_handles_share_value() {
        let counter = ScanCounter::new();
        let handle = counter.clone();

        assert_eq!(counter.increment(), 1);
        assert_eq!(handle.increment(), 2);
        assert_eq!(counter.add(3), 5);
        assert_eq!(handle.snapshot(), 5);
    }

    #[test]
    fn test_snapshot_from_another_thread() {
        let counter = ScanCounter::new();
        let writer = counter.clone();
        thread::spawn(move || {
            for _ in 0..1000 {
                writer.increment();
            }
        })
        .join()
        .unwrap();
        assert_eq!(counter.snapshot(), 1000);
    }

    #[test]
    fn test_scan_metrics() {
        let metrics = ScanMetrics::new();
        metrics.processed().increment();
        metrics.processed().increment();
        metrics.record_match();
        metrics.record_bytes(512);
        metrics.record_bytes(100);

        assert_eq!(
            metrics.get_stats(),
            ScanStats {
                processed_files: 2,
                matched_files: 1,
                bytes_read: 612,
            }
        );
    }
}
